//! Report requests and stored document records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Longest title the store accepts
pub const MAX_TITLE_LEN: usize = 500;

/// MIME type of every generated document
pub const CONTENT_TYPE: &str = "application/pdf";

/// How the body of a report is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    PlainText,
    Html,
}

impl FromStr for ContentType {
    type Err = Error;

    /// Accepts the request spellings `plain` and `html`, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(ContentType::PlainText),
            "html" => Ok(ContentType::Html),
            _ => Err(Error::Validation(
                "ContentType must be 'plain' or 'html'.".to_string(),
            )),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::PlainText => write!(f, "PlainText"),
            ContentType::Html => write!(f, "Html"),
        }
    }
}

/// Unvalidated input for a new report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub title: String,
    pub content: String,
    /// `"plain"` or `"html"`
    pub content_type: String,
}

impl GenerateRequest {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// Check required fields and parse the content type.
    ///
    /// Checks run in field order and the first failure wins.
    pub fn validate(&self) -> Result<ReportRequest> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title is required.".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::Validation("Content is required.".to_string()));
        }
        if self.content_type.trim().is_empty() {
            return Err(Error::Validation("ContentType is required.".to_string()));
        }

        let content_type = self.content_type.parse::<ContentType>()?;

        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::Validation(format!(
                "Title must be at most {} characters.",
                MAX_TITLE_LEN
            )));
        }

        Ok(ReportRequest {
            title: self.title.clone(),
            content: self.content.clone(),
            content_type,
        })
    }
}

/// A validated report request
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
}

/// A persisted report, enough to rebuild the PDF at any time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// New record with a fresh id, stamped now
    pub fn new(request: ReportRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: request.title,
            content: request.content,
            content_type: request.content_type,
            created_at: Utc::now(),
        }
    }

    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            id: self.id,
            title: self.title.clone(),
            content_type: self.content_type.to_string(),
            created_at: self.created_at,
        }
    }
}

/// Lightweight view of a record, without the body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: Uuid,
    pub title: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// A finished, letterheaded PDF
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub bytes: Vec<u8>,
}

impl GeneratedPdf {
    /// Download name, e.g. `report-0f8fad5bd9cb469fa16570867728950e.pdf`
    pub fn file_name(&self) -> String {
        format!("report-{}.pdf", self.id.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!("plain".parse::<ContentType>().unwrap(), ContentType::PlainText);
        assert_eq!("HTML".parse::<ContentType>().unwrap(), ContentType::Html);
        assert!("markdown".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_display() {
        assert_eq!(ContentType::PlainText.to_string(), "PlainText");
        assert_eq!(ContentType::Html.to_string(), "Html");
    }

    #[test]
    fn test_validate_ok() {
        let request = GenerateRequest::new("Report", "Body", "Plain").validate().unwrap();
        assert_eq!(request.content_type, ContentType::PlainText);
        assert_eq!(request.title, "Report");
    }

    #[test]
    fn test_validate_messages_in_order() {
        let cases = [
            (GenerateRequest::new("  ", "", ""), "Title is required."),
            (GenerateRequest::new("T", "\n", ""), "Content is required."),
            (GenerateRequest::new("T", "B", " "), "ContentType is required."),
            (GenerateRequest::new("T", "B", "pdf"), "ContentType must be 'plain' or 'html'."),
        ];

        for (request, expected) in cases {
            let err = request.validate().unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_validate_title_length() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(GenerateRequest::new(long, "B", "html").validate().is_err());

        let max = "ş".repeat(MAX_TITLE_LEN);
        assert!(GenerateRequest::new(max, "B", "html").validate().is_ok());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let record = DocumentRecord::new(ReportRequest {
            title: "T".to_string(),
            content: "B".to_string(),
            content_type: ContentType::Html,
        });
        let json = serde_json::to_value(record.metadata()).unwrap();

        assert_eq!(json["contentType"], "Html");
        assert_eq!(json["title"], "T");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_file_name_uses_simple_uuid() {
        let pdf = GeneratedPdf {
            id: Uuid::nil(),
            created_at: Utc::now(),
            bytes: Vec::new(),
        };
        assert_eq!(pdf.file_name(), "report-00000000000000000000000000000000.pdf");
    }
}
