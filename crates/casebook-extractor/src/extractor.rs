//! Core Extractor implementation

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use crate::retry::RetryPolicy;
use crate::types::{ChunkFailure, ExtractionMetadata, ExtractionResult};
use casebook_domain::traits::ModelClient;
use casebook_domain::{Chunk, RunId, UseCaseRecord};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

/// Drives chunking, prompting, model calls and parsing over a document
pub struct Extractor<L>
where
    L: ModelClient,
{
    llm: L,
    config: ExtractorConfig,
    chunker: TextChunker,
    prompts: PromptBuilder,
    retry: RetryPolicy,
}

/// Outcome of a single model call attempt
enum CallError<E> {
    Model(E),
    Timeout(u64),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Model(e) => write!(f, "{}", ExtractorError::Llm(e.to_string())),
            CallError::Timeout(secs) => write!(f, "{}", ExtractorError::Timeout(*secs)),
        }
    }
}

impl<L> Extractor<L>
where
    L: ModelClient + Sync,
    L::Error: fmt::Display,
{
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` fails validation.
    pub fn new(llm: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            chunker: TextChunker::from_config(&config),
            prompts: PromptBuilder::new(),
            retry: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
            llm,
            config,
        })
    }

    /// Replace the chunker, e.g. to measure with a real tokenizer
    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract records from `text`, in document order
    pub async fn run(&self, text: &str) -> Result<Vec<UseCaseRecord>, ExtractorError> {
        Ok(self.run_with_report(text).await?.records)
    }

    /// Extract records and report skipped chunks and run metadata
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::TextTooLong`] before any model call when
    /// `text` exceeds `max_text_length`. Chunk failures are not errors; they
    /// are listed in [`ExtractionResult::skipped`].
    pub async fn run_with_report(&self, text: &str) -> Result<ExtractionResult, ExtractorError> {
        let text_len = text.chars().count();
        if text_len > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                text_len,
                self.config.max_text_length,
            ));
        }

        let run_id = RunId::new();
        let span = info_span!("extraction", run_id = %run_id.short());

        async move {
            let start_time = Instant::now();

            info!(
                text_length = text_len,
                model = self.llm.model_name(),
                concurrency = self.config.concurrency,
                "Starting extraction"
            );

            let outcomes: Vec<Result<Vec<UseCaseRecord>, ChunkFailure>> =
                stream::iter(self.chunker.chunk(text))
                    .map(|chunk| self.process_chunk(chunk))
                    .buffered(self.config.concurrency.max(1))
                    .collect()
                    .await;

            let chunk_count = outcomes.len();
            let mut records = Vec::new();
            let mut skipped = Vec::new();
            for outcome in outcomes {
                match outcome {
                    Ok(chunk_records) => records.extend(chunk_records),
                    Err(failure) => skipped.push(failure),
                }
            }

            let metadata = ExtractionMetadata {
                run_id,
                model_name: self.llm.model_name().to_string(),
                chunk_count,
                processing_time_ms: start_time.elapsed().as_millis() as u64,
            };

            info!(
                chunks = chunk_count,
                records = records.len(),
                skipped = skipped.len(),
                elapsed_ms = metadata.processing_time_ms,
                "Extraction complete"
            );

            Ok(ExtractionResult {
                records,
                skipped,
                metadata,
            })
        }
        .instrument(span)
        .await
    }

    /// Prompt, call and parse one chunk
    async fn process_chunk(&self, chunk: Chunk) -> Result<Vec<UseCaseRecord>, ChunkFailure> {
        let prompt = self.prompts.build(&chunk);
        debug!(chunk = chunk.index, prompt_chars = prompt.len(), "Processing chunk");

        let call_timeout = self.config.model_timeout();
        let timeout_secs = self.config.model_timeout_secs;
        let operation = format!("chunk {}", chunk.index);
        let prompt = &prompt;

        let response = self
            .retry
            .retry_if(
                &operation,
                |e: &CallError<L::Error>| match e {
                    CallError::Timeout(_) => true,
                    CallError::Model(inner) => L::is_transient(inner),
                },
                move || async move {
                    match timeout(call_timeout, self.llm.generate(prompt)).await {
                        Ok(Ok(text)) => Ok(text),
                        Ok(Err(e)) => Err(CallError::Model(e)),
                        Err(_) => Err(CallError::Timeout(timeout_secs)),
                    }
                },
            )
            .await;

        match response {
            Ok(text) => {
                debug!(chunk = chunk.index, response_chars = text.len(), "Model responded");
                let records = parse_llm_response(&text);
                info!(chunk = chunk.index, records = records.len(), "Chunk parsed");
                Ok(records)
            }
            Err(failure) => {
                warn!(
                    chunk = chunk.index,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "Skipping chunk"
                );
                Err(ChunkFailure {
                    chunk_index: chunk.index,
                    attempts: failure.attempts,
                    reason: failure.error.to_string(),
                })
            }
        }
    }
}
