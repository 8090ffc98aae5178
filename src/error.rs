//! Error types for the letterhead library

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the letterhead library
#[derive(Error, Debug)]
pub enum Error {
    /// Template file could not be opened or read
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Template bytes are not a usable PDF
    #[error("Malformed template PDF: {0}")]
    MalformedTemplate(String),

    /// Content bytes are not a usable PDF
    #[error("Malformed content PDF: {0}")]
    MalformedContent(String),

    /// Writing the merged document failed
    #[error("Failed to serialize PDF: {0}")]
    Serialization(String),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Request rejected before any work was done
    #[error("{0}")]
    Validation(String),

    /// No stored document with this id
    #[error("PDF with ID {0} not found.")]
    DocumentNotFound(Uuid),

    /// External renderer failed or answered with garbage
    #[error("Render error: {0}")]
    Render(String),

    /// HTTP transport error talking to the renderer
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Document store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration file could not be loaded
    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    /// General error
    #[error("{0}")]
    General(String),
}
