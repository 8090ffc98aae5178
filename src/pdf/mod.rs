//! PDF manipulation module

pub mod import;
pub mod metadata;
pub mod overlay;

// Re-export commonly used items
pub use metadata::{count_pages, extract_metadata, metadata_from_bytes, PdfMetadata};
pub use overlay::{merge_with_template, TemplateSource};
