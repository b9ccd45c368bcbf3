//! Rendered output documents

/// Default file name for the rendered use case document
pub const DEFAULT_FILE_STEM: &str = "Extracted_Use_Cases";

/// A formatted document held in memory, ready to attach or save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// File name including extension
    pub file_name: String,

    /// MIME type of the content
    pub content_type: String,

    /// Raw document bytes
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Create a document named `Extracted_Use_Cases.<extension>`
    pub fn with_default_name(
        extension: &str,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: format!("{}.{}", DEFAULT_FILE_STEM, extension),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size of the document in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the document has no content
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
