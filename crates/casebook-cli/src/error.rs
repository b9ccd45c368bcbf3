//! Error types for the CLI application.

use crate::mailer::DispatchError;
use crate::reader::DocumentError;
use crate::render::RenderError;
use casebook_extractor::ExtractorError;
use casebook_gatekeeper::GatekeeperError;
use casebook_llm::LlmError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be read
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Extraction could not start
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractorError),

    /// Recipient list unusable
    #[error("Recipient error: {0}")]
    Recipients(#[from] GatekeeperError),

    /// Model client could not be created
    #[error("Model client error: {0}")]
    Llm(#[from] LlmError),

    /// Output document could not be produced
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Mail could not be delivered
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Blocking work panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
