//! Gatekeeper error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Every line was blank, a comment, malformed or a duplicate
    #[error("No valid recipients ({rejected} line(s) rejected)")]
    NoValidRecipients {
        /// Number of rejected lines
        rejected: usize,
    },

    /// The recipients file could not be read
    #[error("Failed to read recipients from {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
