//! Source document readers.
//!
//! Every format is reduced to one normalized string: LF line endings, form
//! feeds turned into paragraph breaks, NUL bytes removed.

use casebook_domain::traits::DocumentReader;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a source document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Extension is not one of pdf, docx, txt, md
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The file exists in a supported format but could not be read
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word processing document
    Docx,
    /// Plain text or Markdown
    Text,
}

impl DocumentFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" | "md" => Ok(DocumentFormat::Text),
            "" => Err(DocumentError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
            other => Err(DocumentError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Reads PDF, DOCX and plain text files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentReader;

impl FileDocumentReader {
    /// Create a new reader
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for FileDocumentReader {
    type Error = DocumentError;

    fn read(&self, path: &Path) -> Result<String, DocumentError> {
        let format = DocumentFormat::from_path(path)?;
        let read_error = |reason: String| DocumentError::Read {
            path: path.to_path_buf(),
            reason,
        };

        let raw = match format {
            DocumentFormat::Text => {
                std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?
            }
            DocumentFormat::Pdf => {
                let bytes = std::fs::read(path).map_err(|e| read_error(e.to_string()))?;
                pdf_extract::extract_text_from_mem(&bytes).map_err(|e| read_error(e.to_string()))?
            }
            DocumentFormat::Docx => {
                let bytes = std::fs::read(path).map_err(|e| read_error(e.to_string()))?;
                docx_text(bytes).map_err(read_error)?
            }
        };

        let text = normalize(&raw);
        debug!(path = %path.display(), ?format, chars = text.chars().count(), "Document read");
        Ok(text)
    }
}

/// Pull paragraph text out of `word/document.xml`
fn docx_text(bytes: Vec<u8>) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    // Depth inside field codes and tracked deletions
    let mut hidden = 0usize;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if is_hidden_text(e.name().as_ref()) => hidden += 1,
            Event::End(e) if is_hidden_text(e.name().as_ref()) => {
                hidden = hidden.saturating_sub(1)
            }
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:p" => text.push_str("\n\n"),
            Event::Text(t) if hidden == 0 => {
                text.push_str(&t.unescape().map_err(|e| e.to_string())?)
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn is_hidden_text(name: &[u8]) -> bool {
    matches!(name, b"w:instrText" | b"w:delText" | b"w:delInstrText")
}

/// CRLF and CR to LF, form feed to a paragraph break, NUL removed
pub fn normalize(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{000C}', "\n\n")
        .replace('\0', "")
}
