//! Letterhead overlay: stamping generated content onto a template page
//!
//! Every page of the content PDF becomes one output page. The output page is
//! a copy of the template's first page (its media box and resources), with the
//! template artwork drawn first and the content page drawn on top as a Form
//! XObject scaled to the template's page size.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::PageBox;
use super::import::{flattened_page, page_content, resolve, ObjectImporter};

/// Where the letterhead template comes from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Read from disk on every merge
    Path(PathBuf),
    /// Already in memory
    Bytes(Vec<u8>),
}

impl From<PathBuf> for TemplateSource {
    fn from(path: PathBuf) -> Self {
        TemplateSource::Path(path)
    }
}

impl From<&Path> for TemplateSource {
    fn from(path: &Path) -> Self {
        TemplateSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for TemplateSource {
    fn from(bytes: Vec<u8>) -> Self {
        TemplateSource::Bytes(bytes)
    }
}

impl TemplateSource {
    fn load(&self) -> Result<Document> {
        let doc = match self {
            TemplateSource::Path(path) => {
                // Read fully first so a missing file is reported as such, not as a parse error
                let bytes = std::fs::read(path).map_err(|_| Error::TemplateNotFound(path.clone()))?;
                Document::load_mem(&bytes)
            }
            TemplateSource::Bytes(bytes) => Document::load_mem(bytes),
        };
        doc.map_err(|e| Error::MalformedTemplate(e.to_string()))
    }
}

/// Name under which the content form is registered in each page's resources
const CONTENT_FORM_NAME: &str = "Content";

/// Template page 0, imported into the output document once and shared by all pages
struct ImportedTemplate {
    media_box: PageBox,
    /// Page attributes copied verbatim onto every output page (CropBox, Rotate)
    extra: Vec<(&'static str, Object)>,
    resources: Dictionary,
    /// Template artwork wrapped in q/Q
    background_id: ObjectId,
}

/// Merge a generated content PDF onto a one-page letterhead template.
///
/// Returns a new PDF with one page per content page. Each output page has the
/// template page's geometry; the content page is scaled to fill it exactly,
/// so content rendered at a different aspect ratio will be stretched.
/// Content with zero pages yields a valid PDF with zero pages. A page stream
/// that cannot be decoded fails the whole merge; no partial output is returned.
///
/// Only the template's first page is used, even if it has more.
///
/// # Example
///
/// ```no_run
/// use pdf_letterhead::pdf::{merge_with_template, TemplateSource};
/// use std::path::PathBuf;
///
/// let content = std::fs::read("content.pdf").expect("read content");
/// let template = TemplateSource::from(PathBuf::from("Assets/antet.pdf"));
/// let merged = merge_with_template(&content, &template).expect("Failed to merge");
/// std::fs::write("report.pdf", merged).expect("write output");
/// ```
pub fn merge_with_template(content: &[u8], template: &TemplateSource) -> Result<Vec<u8>> {
    let mut template_doc = template.load()?;
    let mut content_doc =
        Document::load_mem(content).map_err(|e| Error::MalformedContent(e.to_string()))?;

    // Decompress for easier content stream handling
    template_doc.decompress();
    content_doc.decompress();

    let template_page_id = template_doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| Error::MalformedTemplate("template has no pages".to_string()))?;

    let content_pages: Vec<ObjectId> = content_doc.get_pages().into_values().collect();

    debug!(
        content_pages = content_pages.len(),
        "merging content onto letterhead template"
    );

    let mut output = Document::with_version("1.5");
    let pages_id = output.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(content_pages.len());

    if !content_pages.is_empty() {
        let template = import_template(&template_doc, template_page_id, &mut output)?;
        let mut importer = ObjectImporter::new(&content_doc);

        for (i, content_page_id) in content_pages.iter().enumerate() {
            let page_id = add_overlay_page(
                &mut output,
                &mut importer,
                &content_doc,
                *content_page_id,
                &template,
                pages_id,
            )?;
            debug!(page = i + 1, "stamped content page");
            kids.push(Object::Reference(page_id));
        }
    }

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(kids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    output.objects.insert(pages_id, Object::Dictionary(pages_object));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = output.add_object(Object::Dictionary(catalog));
    output.trailer.set("Root", Object::Reference(catalog_id));

    // Compress and save
    output.compress();
    let mut buffer = Vec::new();
    output
        .save_to(&mut buffer)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    Ok(buffer)
}

/// Copy what every output page needs from the template's first page.
fn import_template(
    template_doc: &Document,
    page_id: ObjectId,
    output: &mut Document,
) -> Result<ImportedTemplate> {
    let page = flattened_page(template_doc, page_id)
        .ok_or_else(|| Error::MalformedTemplate("first page is not a dictionary".to_string()))?;

    let media_box = page
        .get(b"MediaBox")
        .ok()
        .map(|obj| resolve(template_doc, obj))
        .and_then(PageBox::from_object)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| Error::MalformedTemplate("first page has no usable MediaBox".to_string()))?;

    let mut importer = ObjectImporter::new(template_doc);

    let mut extra = Vec::new();
    for key in ["CropBox", "Rotate"] {
        if let Ok(value) = page.get(key.as_bytes()) {
            let value = resolve(template_doc, value).clone();
            extra.push((key, value));
        }
    }

    // Resources are inlined on each page so the content form can be added per page
    let resources = match page.get(b"Resources").map(|r| resolve(template_doc, r)) {
        Ok(Object::Dictionary(dict)) => match importer.import_object(output, &Object::Dictionary(dict.clone())) {
            Object::Dictionary(imported) => imported,
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    };

    let mut background = b"q\n".to_vec();
    let artwork = page_content(template_doc, &page)
        .map_err(|e| Error::MalformedTemplate(format!("undecodable content stream: {}", e)))?;
    background.extend_from_slice(&artwork);
    background.extend_from_slice(b"Q\n");
    let background_id = output.add_object(Stream::new(Dictionary::new(), background));

    Ok(ImportedTemplate {
        media_box,
        extra,
        resources,
        background_id,
    })
}

/// Append one output page: template background plus the given content page on top.
fn add_overlay_page(
    output: &mut Document,
    importer: &mut ObjectImporter<'_>,
    content_doc: &Document,
    content_page_id: ObjectId,
    template: &ImportedTemplate,
    pages_id: ObjectId,
) -> Result<ObjectId> {
    let content_page = flattened_page(content_doc, content_page_id)
        .ok_or_else(|| Error::MalformedContent("page is not a dictionary".to_string()))?;

    // A content page without its own box is assumed to match the template
    let content_box = content_page
        .get(b"MediaBox")
        .ok()
        .map(|obj| resolve(content_doc, obj))
        .and_then(PageBox::from_object)
        .filter(|b| !b.is_empty())
        .unwrap_or(template.media_box);

    let form_id = create_page_form(output, importer, content_doc, &content_page, &content_box)?;

    // Register the form without clobbering a template XObject of the same name
    let mut resources = template.resources.clone();
    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(xo)) => xo.clone(),
        Ok(Object::Reference(id)) => match output.get_object(*id) {
            Ok(Object::Dictionary(xo)) => xo.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    };
    let form_name = unique_resource_name(&xobjects, CONTENT_FORM_NAME);
    xobjects.set(form_name.clone(), Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let draw = placement_operators(&content_box, &template.media_box, &form_name);
    let draw_id = output.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", template.media_box.to_object());
    for (key, value) in &template.extra {
        page.set(*key, value.clone());
    }
    page.set("Resources", Object::Dictionary(resources));
    page.set(
        "Contents",
        Object::Array(vec![
            Object::Reference(template.background_id),
            Object::Reference(draw_id),
        ]),
    );

    Ok(output.add_object(Object::Dictionary(page)))
}

/// Turn a content page into a Form XObject in the output document.
fn create_page_form(
    output: &mut Document,
    importer: &mut ObjectImporter<'_>,
    content_doc: &Document,
    content_page: &Dictionary,
    content_box: &PageBox,
) -> Result<ObjectId> {
    let resources = match content_page.get(b"Resources") {
        Ok(res) => importer.import_object(output, res),
        Err(_) => Object::Dictionary(Dictionary::new()),
    };

    let mut form_dict = Dictionary::new();
    form_dict.set("Type", Object::Name(b"XObject".to_vec()));
    form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    form_dict.set("FormType", Object::Integer(1));
    form_dict.set("BBox", content_box.to_object());
    form_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    form_dict.set("Resources", resources);

    let content = page_content(content_doc, content_page)
        .map_err(|e| Error::MalformedContent(format!("undecodable content stream: {}", e)))?;
    Ok(output.add_object(Stream::new(form_dict, content)))
}

/// Content stream that draws the form so `from` exactly covers `to`.
fn placement_operators(from: &PageBox, to: &PageBox, form_name: &str) -> String {
    let sx = to.width() / from.width();
    let sy = to.height() / from.height();
    let tx = to.llx - sx * from.llx;
    let ty = to.lly - sy * from.lly;

    format!(
        "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        format_number(sx),
        format_number(sy),
        format_number(tx),
        format_number(ty),
        form_name
    )
}

/// Format a number for a content stream: no exponent, no trailing zeros
fn format_number(value: f32) -> String {
    let s = format!("{:.5}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// `base`, or `base1`, `base2`, ... whichever is not yet a key in `dict`
fn unique_resource_name(dict: &Dictionary, base: &str) -> String {
    if !dict.has(base.as_bytes()) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|name| !dict.has(name.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_identity_when_boxes_match() {
        let a4 = PageBox::new(0.0, 0.0, 595.0, 842.0);
        let ops = placement_operators(&a4, &a4, "Content");
        assert_eq!(ops, "q\n1 0 0 1 0 0 cm\n/Content Do\nQ\n");
    }

    #[test]
    fn test_placement_scales_to_template() {
        let letter = PageBox::new(0.0, 0.0, 612.0, 792.0);
        let half = PageBox::new(0.0, 0.0, 306.0, 396.0);
        let ops = placement_operators(&half, &letter, "Content");
        assert!(ops.contains("2 0 0 2 0 0 cm"), "unexpected operators: {}", ops);
    }

    #[test]
    fn test_placement_handles_offset_boxes() {
        let from = PageBox::new(10.0, 20.0, 110.0, 220.0);
        let to = PageBox::new(0.0, 0.0, 100.0, 200.0);
        let ops = placement_operators(&from, &to, "Content");
        assert!(ops.contains("1 0 0 1 -10 -20 cm"), "unexpected operators: {}", ops);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.25), "1.25");
    }

    #[test]
    fn test_unique_resource_name() {
        let mut dict = Dictionary::new();
        assert_eq!(unique_resource_name(&dict, "Content"), "Content");

        dict.set("Content", Object::Null);
        assert_eq!(unique_resource_name(&dict, "Content"), "Content1");

        dict.set("Content1", Object::Null);
        assert_eq!(unique_resource_name(&dict, "Content"), "Content2");
    }

    #[test]
    fn test_missing_template_path() {
        let source = TemplateSource::from(PathBuf::from("does-not-exist/antet.pdf"));
        let result = merge_with_template(b"%PDF-1.5", &source);
        assert!(matches!(result, Err(Error::TemplateNotFound(_))));
    }

    #[test]
    fn test_garbage_template_bytes() {
        let source = TemplateSource::from(b"not a pdf".to_vec());
        let result = merge_with_template(b"%PDF-1.5", &source);
        assert!(matches!(result, Err(Error::MalformedTemplate(_))));
    }
}
