//! Casebook Extractor
//!
//! Turns a document's text into structured use case records with a hosted
//! language model.
//!
//! # Architecture
//!
//! ```text
//! Text → TextChunker → PromptBuilder → ModelClient → parse_llm_response → Vec<UseCaseRecord>
//! ```
//!
//! # Key Features
//!
//! - **Bounded chunks**: paragraph packing with sentence and character fallbacks
//! - **Tolerant parsing**: label-anchored, survives markdown and list noise
//! - **Retries**: per-chunk timeout and exponential backoff; failing chunks are skipped
//! - **Ordered concurrency**: results follow chunk order whatever the concurrency
//!
//! # Example Usage
//!
//! ```
//! use casebook_extractor::{Extractor, ExtractorConfig};
//! use casebook_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let llm = MockProvider::new("- Use Case Title: Place Order\n- Actor(s): Customer");
//! let extractor = Extractor::new(llm, ExtractorConfig::default()).unwrap();
//!
//! let records = extractor.run("Customers place orders online.").await.unwrap();
//! assert_eq!(records[0].title, "Place Order");
//! assert_eq!(records[0].actors, vec!["Customer"]);
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod retry;
mod types;


pub use chunking::{Chunks, SizeFn, TextChunker};
pub use config::{ExtractorConfig, SizeMetric};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::parse_llm_response;
pub use prompt::PromptBuilder;
pub use retry::{RetryFailure, RetryPolicy};
pub use types::{ChunkFailure, ExtractionMetadata, ExtractionResult};
