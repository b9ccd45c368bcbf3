//! DOCX rendering of extracted use cases.

use casebook_domain::traits::DocumentRenderer;
use casebook_domain::{FieldValue, RenderedDocument, UseCaseField, UseCaseRecord};
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// MIME type of a word processing document
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCUMENT_TITLE: &str = "Extracted Use Cases";
const EMPTY_DOCUMENT_NOTE: &str = "No use cases were extracted.";
const EMPTY_FIELD: &str = "None";

// Run sizes are in half-points.
const TITLE_SIZE: usize = 40;
const HEADING_SIZE: usize = 30;
const BODY_SIZE: usize = 22;

/// Errors raised while producing the document
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document package could not be written
    #[error("Failed to package document: {0}")]
    Package(String),
}

/// Renders records into an in-memory `.docx`
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self
    }

    fn record_paragraphs(number: usize, record: &UseCaseRecord) -> Vec<Paragraph> {
        let mut paragraphs = vec![heading(
            &format!("Use Case {}: {}", number, record.title),
            HEADING_SIZE,
        )];

        for (field, value) in record.fields() {
            if field == UseCaseField::Title {
                continue;
            }
            match value {
                FieldValue::Text(text) => paragraphs.push(labelled(field, non_empty(text))),
                FieldValue::List(items) if field == UseCaseField::Actors => {
                    paragraphs.push(labelled(field, non_empty(&items.join(", "))))
                }
                FieldValue::List([]) => paragraphs.push(labelled(field, EMPTY_FIELD)),
                FieldValue::List(items) => {
                    paragraphs.push(labelled(field, ""));
                    paragraphs.extend(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, item)| body(&format!("{}. {}", i + 1, item))),
                    );
                }
            }
        }

        paragraphs
    }
}

impl DocumentRenderer for DocxRenderer {
    type Error = RenderError;

    fn render(&self, records: &[UseCaseRecord]) -> Result<RenderedDocument, RenderError> {
        let mut docx = Docx::new().add_paragraph(heading(DOCUMENT_TITLE, TITLE_SIZE));

        if records.is_empty() {
            docx = docx.add_paragraph(body(EMPTY_DOCUMENT_NOTE));
        }

        for (idx, record) in records.iter().enumerate() {
            for paragraph in Self::record_paragraphs(idx + 1, record) {
                docx = docx.add_paragraph(paragraph);
            }
            docx = docx.add_paragraph(Paragraph::new());
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| RenderError::Package(e.to_string()))?;

        let bytes = buffer.into_inner();
        debug!(records = records.len(), bytes = bytes.len(), "Document rendered");
        Ok(RenderedDocument::with_default_name(
            "docx",
            DOCX_CONTENT_TYPE,
            bytes,
        ))
    }
}

fn heading(text: &str, size: usize) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
}

fn labelled(field: UseCaseField, text: &str) -> Paragraph {
    Paragraph::new()
        .add_run(
            Run::new()
                .add_text(format!("{}: ", field.label()))
                .bold()
                .size(BODY_SIZE),
        )
        .add_run(Run::new().add_text(text).size(BODY_SIZE))
}

fn body(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).size(BODY_SIZE))
}

fn non_empty(text: &str) -> &str {
    if text.is_empty() {
        EMPTY_FIELD
    } else {
        text
    }
}
