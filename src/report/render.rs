//! Client for the external HTML-to-PDF rendering service
//!
//! The service takes `{"html": "..."}` and answers with the PDF bytes encoded
//! as base64 text. Page format, margins and background printing are its
//! concern; it is expected to render A4.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Default renderer endpoint inside the deployment network
pub const DEFAULT_RENDERER_URL: &str = "http://playwright:3000/generate-pdf";

/// Something that turns an HTML document into PDF bytes
pub trait ContentRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<Vec<u8>>;
}

impl<T: ContentRenderer + ?Sized> ContentRenderer for Box<T> {
    fn render(&self, html: &str) -> Result<Vec<u8>> {
        (**self).render(html)
    }
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
}

/// Renderer backed by the headless-browser HTTP service
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    endpoint: String,
    client: Client,
}

impl HttpRenderer {
    /// Create a renderer for the given endpoint with a request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ContentRenderer for HttpRenderer {
    fn render(&self, html: &str) -> Result<Vec<u8>> {
        debug!(endpoint = %self.endpoint, html_len = html.len(), "requesting PDF render");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RenderRequest { html })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Render(format!("{}: {}", status.as_u16(), message)));
        }

        let body = response.text()?;
        decode_pdf_body(&body)
    }
}

/// Decode the renderer's base64 answer and sanity-check that it is a PDF
pub fn decode_pdf_body(body: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(body.trim())
        .map_err(|e| Error::Render(format!("response is not base64: {}", e)))?;

    if !bytes.starts_with(b"%PDF-") {
        return Err(Error::Render("response is not a PDF".to_string()));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pdf_body() {
        let encoded = STANDARD.encode(b"%PDF-1.7\n%%EOF");
        assert_eq!(decode_pdf_body(&format!("{}\n", encoded)).unwrap(), b"%PDF-1.7\n%%EOF");
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        let err = decode_pdf_body("{\"error\":\"boom\"}").unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_decode_rejects_non_pdf() {
        let encoded = STANDARD.encode(b"<html></html>");
        assert!(matches!(decode_pdf_body(&encoded), Err(Error::Render(_))));
    }

    #[test]
    fn test_render_request_shape() {
        let json = serde_json::to_string(&RenderRequest { html: "<p/>" }).unwrap();
        assert_eq!(json, r#"{"html":"<p/>"}"#);
    }

    #[test]
    fn test_http_renderer_keeps_endpoint() {
        let renderer = HttpRenderer::new(DEFAULT_RENDERER_URL, Duration::from_secs(5)).unwrap();
        assert_eq!(renderer.endpoint(), DEFAULT_RENDERER_URL);
    }
}
