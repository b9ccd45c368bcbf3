//! Result types for an extraction run

use casebook_domain::{RunId, UseCaseRecord};

/// Result of an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Records in chunk order, then parse order within a chunk
    pub records: Vec<UseCaseRecord>,

    /// Chunks that still failed after every retry
    pub skipped: Vec<ChunkFailure>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// True when every chunk produced a response
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A chunk that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    /// 0-based index of the chunk
    pub chunk_index: usize,

    /// Model calls made for this chunk
    pub attempts: usize,

    /// Last error seen
    pub reason: String,
}

/// Metadata about an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Identifier of this run
    pub run_id: RunId,

    /// Name of the model used
    pub model_name: String,

    /// Number of chunks the text was split into
    pub chunk_count: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
