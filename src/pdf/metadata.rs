//! PDF metadata extraction

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};
use crate::layout::PageBox;
use super::import::{flattened_page, resolve};

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()
        .map_err(|_| Error::General("No catalog in trailer".to_string()))?;

    // Get the Pages reference
    let pages_id = catalog.get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|_| Error::General("Pages is not a reference".to_string()))?;

    let pages_dict = doc.get_dictionary(pages_id)?;

    // Get the Count field
    let count = pages_dict.get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?;

    match count {
        Object::Integer(n) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::General("Count is not a non-negative integer".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Media box of the first page (if there is one)
    pub first_page_box: Option<PageBox>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    metadata_from_document(&doc)
}

/// Extract metadata from an in-memory PDF
pub fn metadata_from_bytes(bytes: &[u8]) -> Result<PdfMetadata> {
    let doc = Document::load_mem(bytes)?;
    metadata_from_document(&doc)
}

fn metadata_from_document(doc: &Document) -> Result<PdfMetadata> {
    // Use catalog-based counting for accuracy
    let page_count = count_pages_from_catalog(doc)?;

    let first_page_box = doc
        .get_pages()
        .values()
        .next()
        .and_then(|id| flattened_page(doc, *id))
        .and_then(|page| {
            page.get(b"MediaBox")
                .ok()
                .and_then(|obj| PageBox::from_object(resolve(doc, obj)))
        });

    // Try to extract title and author from Info dictionary
    let mut title = None;
    let mut author = None;

    if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
        if let Ok(info_dict) = doc.get_dictionary(*info_id) {
            title = info_string(info_dict, b"Title");
            author = info_string(info_dict, b"Author");
        }
    }

    Ok(PdfMetadata {
        page_count,
        first_page_box,
        title,
        author,
    })
}

fn info_string(info: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    count_pages_from_catalog(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, StringFormat};

    fn pdf_with_info(title: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => PageBox::new(0.0, 0.0, 612.0, 792.0).to_object(),
        });
        doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_metadata_from_bytes() {
        let metadata = metadata_from_bytes(&pdf_with_info("Antet")).unwrap();
        assert_eq!(metadata.page_count, 1);
        assert_eq!(metadata.title.as_deref(), Some("Antet"));
        assert!(metadata.author.is_none());

        let page_box = metadata.first_page_box.unwrap();
        assert_eq!(page_box.width(), 612.0);
        assert_eq!(page_box.height(), 792.0);
    }

    #[test]
    fn test_metadata_from_garbage() {
        assert!(metadata_from_bytes(b"garbage").is_err());
    }
}
