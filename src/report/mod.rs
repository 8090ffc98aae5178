//! Report documents: model, HTML wrapping, rendering, storage and the service tying them together

pub mod document;
pub mod html;
pub mod render;
pub mod service;
pub mod store;

// Re-export commonly used items
pub use document::{
    ContentType, DocumentMetadata, DocumentRecord, GenerateRequest, GeneratedPdf, ReportRequest,
};
pub use render::{ContentRenderer, HttpRenderer};
pub use service::ReportService;
pub use store::{DiskStore, DocumentStore, MemoryStore};
