//! Copying objects between lopdf documents
//!
//! `Document::renumber_objects_with` works on whole documents. For the overlay
//! we only want what a single page actually uses, so objects are pulled in on
//! demand by following references from a starting object and renumbered into
//! the target as they are discovered.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Inheritable page attributes we resolve through the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Copies objects from one source document into a target, one reference at a time.
///
/// Each source object is imported at most once; repeated references map to
/// the same target id.
pub struct ObjectImporter<'a> {
    source: &'a Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectImporter<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source,
            id_map: HashMap::new(),
        }
    }

    /// Deep-copy an object into `target`, importing everything it references.
    pub fn import_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.import_reference(target, *id),
            Object::Array(arr) => Object::Array(
                arr.iter()
                    .map(|obj| self.import_object(target, obj))
                    .collect(),
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(target, dict)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dictionary(target, &stream.dict);
                Object::Stream(copy)
            }
            _ => object.clone(),
        }
    }

    fn import_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            new_dict.set(key.clone(), self.import_object(target, value));
        }
        new_dict
    }

    /// Import the object behind a reference and return a reference to the copy.
    ///
    /// Page tree nodes are never copied: a stray /P or /Parent link from an
    /// annotation or structure element would otherwise drag the whole source
    /// document along. Such links become null.
    fn import_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(new_id) = self.id_map.get(&id) {
            return Object::Reference(*new_id);
        }

        let source_object = match self.source.get_object(id) {
            Ok(obj) => obj,
            Err(_) => return Object::Null,
        };

        if is_page_tree_node(source_object) {
            return Object::Null;
        }

        // Register before recursing so reference cycles terminate
        let new_id = target.new_object_id();
        self.id_map.insert(id, new_id);

        let copied = self.import_object(target, source_object);
        target.objects.insert(new_id, copied);

        Object::Reference(new_id)
    }

    /// Number of distinct source objects imported so far
    pub fn imported_count(&self) -> usize {
        self.id_map.len()
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(|t| t.as_name()),
            Ok(b"Page") | Ok(b"Pages")
        ),
        _ => false,
    }
}

/// Page dictionary with inheritable attributes pulled down from its ancestors.
///
/// The returned dictionary is a copy; the source document is untouched.
/// `/Parent` is dropped since the page will be re-parented by the caller.
pub fn flattened_page(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut page = doc.get_dictionary(page_id).ok()?.clone();

    let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();
    // Page trees are shallow; the bound only guards against malformed cycles
    let mut depth = 0;
    while let Some(parent_id) = parent {
        if depth > 64 {
            break;
        }
        depth += 1;

        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    page.remove(b"Parent");
    Some(page)
}

/// Follow a reference to its target, or return the object itself.
pub fn resolve<'d>(doc: &'d Document, object: &'d Object) -> &'d Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Concatenated (decoded) content of a page's /Contents, one stream per line.
///
/// Fails on the first stream whose filter chain cannot be decoded. Callers
/// decompress the document up front, so a stream still carrying a /Filter
/// here is one that lopdf already failed to inflate.
pub fn page_content(doc: &Document, page: &Dictionary) -> lopdf::Result<Vec<u8>> {
    let mut content = Vec::new();

    let refs: Vec<&Object> = match page.get(b"Contents") {
        Ok(Object::Array(arr)) => arr.iter().collect(),
        Ok(obj) => vec![obj],
        Err(_) => return Ok(content),
    };

    for obj in refs {
        if let Object::Stream(stream) = resolve(doc, obj) {
            if stream.dict.has(b"Filter") {
                content.extend_from_slice(&stream.decompressed_content()?);
            } else {
                content.extend_from_slice(&stream.content);
            }
            content.push(b'\n');
        }
    }

    Ok(content)
}
