//! PDF Letterhead Library
//!
//! Produces report PDFs printed on a fixed letterhead ("antet") template.
//! This library provides functionality to:
//! - Stamp every page of a rendered content PDF onto a one-page template
//! - Validate and persist report requests
//! - Wrap report text or HTML into the page sent to an external renderer
//! - Regenerate a stored report deterministically from its record
//! - Extract metadata (page counts, page size, etc.)
//!
//! # Example
//!
//! ```no_run
//! use pdf_letterhead::pdf::{merge_with_template, TemplateSource};
//! use std::path::Path;
//!
//! let content = std::fs::read("content.pdf").expect("read content");
//! let merged = merge_with_template(&content, &TemplateSource::from(Path::new("antet.pdf")))
//!     .expect("Failed to merge");
//! std::fs::write("report.pdf", merged).expect("write report");
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod report;

// Re-export commonly used items
pub use error::{Error, Result};
