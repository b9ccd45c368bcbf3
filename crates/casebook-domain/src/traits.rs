//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{RecipientAddress, RenderedDocument, UseCaseRecord};
use std::future::Future;
use std::path::Path;

/// Trait for hosted language model calls
///
/// Implemented by the infrastructure layer (casebook-llm).
/// One call sends one prompt; retries belong to the caller.
pub trait ModelClient {
    /// Error type for model calls
    type Error;

    /// Send a prompt and return the raw generated text
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Name of the model behind this client
    fn model_name(&self) -> &str;

    /// Whether `error` is worth retrying; everything is by default
    fn is_transient(_error: &Self::Error) -> bool {
        true
    }
}

/// Trait for turning a source file into normalized text
///
/// Implemented by the application layer (casebook-cli)
pub trait DocumentReader {
    /// Error type for read operations
    type Error;

    /// Read the file at `path` into a single normalized string
    fn read(&self, path: &Path) -> Result<String, Self::Error>;
}

/// Trait for producing a formatted document from records
///
/// Implemented by the application layer (casebook-cli)
pub trait DocumentRenderer {
    /// Error type for rendering
    type Error;

    /// Render records, in order, into an in-memory document
    fn render(&self, records: &[UseCaseRecord]) -> Result<RenderedDocument, Self::Error>;
}

/// Trait for delivering a rendered document
///
/// Implemented by the application layer (casebook-cli)
pub trait MailDispatcher {
    /// Error type for delivery
    type Error;

    /// Send `attachment` to every recipient under `subject`
    fn send(
        &self,
        subject: &str,
        attachment: &RenderedDocument,
        recipients: &[RecipientAddress],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
