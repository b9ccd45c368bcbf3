//! Chunk module - bounded slices of source text

/// A bounded slice of the source document, sized for one model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence (0-based)
    pub index: usize,

    /// Text of the slice
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
