//! End-to-end report generation: validate, persist, render, stamp

use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::layout::PageMargins;
use crate::pdf::{merge_with_template, TemplateSource};
use super::document::{DocumentMetadata, DocumentRecord, GenerateRequest, GeneratedPdf};
use super::html::wrap_content;
use super::render::ContentRenderer;
use super::store::DocumentStore;

/// Generates letterheaded reports and rebuilds them from stored records
pub struct ReportService<R, S> {
    renderer: R,
    store: S,
    template: TemplateSource,
    margins: PageMargins,
}

impl<R: ContentRenderer, S: DocumentStore> ReportService<R, S> {
    pub fn new(renderer: R, store: S, template: TemplateSource) -> Self {
        Self {
            renderer,
            store,
            template,
            margins: PageMargins::default(),
        }
    }

    /// Override the page margins requested from the renderer
    pub fn with_margins(mut self, margins: PageMargins) -> Self {
        self.margins = margins;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Validate and persist a new report, then build its PDF.
    ///
    /// The record is stored before rendering, so a render failure still
    /// leaves a record that can be fetched again later.
    pub fn generate(&self, request: &GenerateRequest) -> Result<GeneratedPdf> {
        let record = DocumentRecord::new(request.validate()?);
        self.store.insert(&record)?;

        info!(id = %record.id, content_type = %record.content_type, "created document");

        self.build(&record)
    }

    /// Rebuild the PDF of a stored document from its record
    pub fn regenerate(&self, id: Uuid) -> Result<GeneratedPdf> {
        let record = self.store.get(id)?.ok_or(Error::DocumentNotFound(id))?;
        info!(id = %id, "regenerating document");
        self.build(&record)
    }

    pub fn metadata(&self, id: Uuid) -> Result<DocumentMetadata> {
        self.store
            .get(id)?
            .map(|record| record.metadata())
            .ok_or(Error::DocumentNotFound(id))
    }

    fn build(&self, record: &DocumentRecord) -> Result<GeneratedPdf> {
        let html = wrap_content(record, &self.margins);
        let content = self.renderer.render(&html)?;
        let bytes = merge_with_template(&content, &self.template)?;

        Ok(GeneratedPdf {
            id: record.id,
            created_at: record.created_at,
            bytes,
        })
    }
}
