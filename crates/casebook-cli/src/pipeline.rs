//! End-to-end run: recipients, document, extraction, rendering, delivery.

use crate::error::{CliError, Result};
use crate::mailer::subject_for;
use casebook_domain::traits::{DocumentReader, DocumentRenderer, MailDispatcher, ModelClient};
use casebook_domain::{RecipientAddress, RunId, UseCaseRecord};
use casebook_extractor::{ChunkFailure, Extractor};
use casebook_gatekeeper::{Rejection, RecipientValidator};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Source document
    pub input: PathBuf,

    /// Recipients file
    pub recipients: PathBuf,

    /// Where to write the rendered document, if anywhere
    pub save: Option<PathBuf>,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier of the extraction run
    pub run_id: RunId,

    /// Model that produced the records
    pub model_name: String,

    /// Chunks the document was split into
    pub chunk_count: usize,

    /// Extracted records in document order
    pub records: Vec<UseCaseRecord>,

    /// Chunks skipped after exhausting retries
    pub skipped: Vec<ChunkFailure>,

    /// Addresses the document was (or would be) sent to
    pub recipients: Vec<RecipientAddress>,

    /// Recipient lines that were refused
    pub rejected: Vec<Rejection>,

    /// File name of the rendered document
    pub document_name: String,

    /// Size of the rendered document in bytes
    pub document_bytes: usize,

    /// Local copy, when one was written
    pub saved_to: Option<PathBuf>,

    /// Whether mail was sent
    pub sent: bool,

    /// Wall-clock extraction time
    pub processing_time_ms: u64,
}

/// Wires a reader, extractor, renderer and optional mailer together
///
/// Without a mailer the run is a dry run and the document is always saved.
pub struct Pipeline<R, L, D, M>
where
    L: ModelClient,
{
    reader: R,
    extractor: Extractor<L>,
    renderer: D,
    mailer: Option<M>,
    validator: RecipientValidator,
}

impl<R, L, D, M> Pipeline<R, L, D, M>
where
    R: DocumentReader + Clone + Send + 'static,
    R::Error: Send + 'static,
    CliError: From<R::Error>,
    L: ModelClient + Sync,
    L::Error: fmt::Display,
    D: DocumentRenderer,
    CliError: From<D::Error>,
    M: MailDispatcher,
    CliError: From<M::Error>,
{
    /// Create a new pipeline
    pub fn new(
        reader: R,
        extractor: Extractor<L>,
        renderer: D,
        mailer: Option<M>,
        validator: RecipientValidator,
    ) -> Self {
        Self {
            reader,
            extractor,
            renderer,
            mailer,
            validator,
        }
    }

    /// Run once
    ///
    /// Recipients are checked before the document is read so a bad list
    /// fails without any model call. The read runs on the blocking pool.
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let validation = self.validator.validate_file(&request.recipients)?;
        let rejected = validation.rejected.clone();
        let recipients = validation.into_recipients()?;
        info!(
            accepted = recipients.len(),
            rejected = rejected.len(),
            "Recipients validated"
        );

        let reader = self.reader.clone();
        let input = request.input.clone();
        let text = tokio::task::spawn_blocking(move || reader.read(&input)).await??;
        let extraction = self.extractor.run_with_report(&text).await?;
        for failure in &extraction.skipped {
            warn!(
                chunk = failure.chunk_index,
                reason = %failure.reason,
                "Chunk missing from the output document"
            );
        }

        let document = self.renderer.render(&extraction.records)?;

        let save_path = match (&request.save, &self.mailer) {
            (Some(path), _) => Some(path.clone()),
            (None, None) => Some(PathBuf::from(&document.file_name)),
            (None, Some(_)) => None,
        };
        if let Some(path) = &save_path {
            write_document(path, &document.bytes)?;
            info!(path = %path.display(), bytes = document.len(), "Document saved");
        }

        let run_id = extraction.metadata.run_id;
        let sent = match &self.mailer {
            Some(mailer) => {
                mailer
                    .send(&subject_for(&run_id), &document, &recipients)
                    .await?;
                true
            }
            None => {
                info!("Dry run, mail not sent");
                false
            }
        };

        Ok(RunReport {
            run_id,
            model_name: extraction.metadata.model_name,
            chunk_count: extraction.metadata.chunk_count,
            records: extraction.records,
            skipped: extraction.skipped,
            recipients,
            rejected,
            document_name: document.file_name,
            document_bytes: document.bytes.len(),
            saved_to: save_path,
            sent,
            processing_time_ms: extraction.metadata.processing_time_ms,
        })
    }
}

fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
