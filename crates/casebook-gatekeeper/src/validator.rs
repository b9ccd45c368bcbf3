//! Recipient validation logic

use crate::{GatekeeperError, ValidationConfig};
use casebook_domain::{AddressError, RecipientAddress};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Result of validating a recipient list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// Valid, unique addresses in first-occurrence order
    pub accepted: Vec<RecipientAddress>,

    /// Lines that were refused
    pub rejected: Vec<Rejection>,
}

/// A refused line
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// 1-based line number in the input
    pub line_number: usize,

    /// The trimmed line
    pub input: String,

    /// Why it was refused
    pub reason: RejectionReason,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Does not match the address grammar
    Malformed(AddressError),

    /// Already accepted on an earlier line
    Duplicate,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Malformed(e) => write!(f, "malformed ({})", e),
            RejectionReason::Duplicate => f.write_str("duplicate"),
        }
    }
}

impl ValidationResult {
    /// Accepted addresses, or an error when there are none
    pub fn into_recipients(self) -> Result<Vec<RecipientAddress>, GatekeeperError> {
        if self.accepted.is_empty() {
            return Err(GatekeeperError::NoValidRecipients {
                rejected: self.rejected.len(),
            });
        }
        Ok(self.accepted)
    }
}

/// Validates recipient lists before any mail is sent
#[derive(Debug, Clone)]
pub struct RecipientValidator {
    config: ValidationConfig,
}

impl RecipientValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate one address per line
    ///
    /// Never fails. Blank lines and comments are skipped silently; every
    /// other refused line is logged and returned with its reason.
    pub fn validate<I>(&self, lines: I) -> ValidationResult
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut result = ValidationResult::default();
        let mut seen = HashSet::new();

        for (idx, raw) in lines.into_iter().enumerate() {
            let line_number = idx + 1;
            let line = raw.as_ref().trim();

            if line.is_empty() || self.is_comment(line) {
                continue;
            }

            let reason = match RecipientAddress::parse(line) {
                Ok(address) => {
                    if seen.insert(self.dedup_key(address.as_str())) {
                        result.accepted.push(address);
                        continue;
                    }
                    RejectionReason::Duplicate
                }
                Err(e) => RejectionReason::Malformed(e),
            };

            warn!(line = line_number, input = line, reason = %reason, "Rejected recipient");
            result.rejected.push(Rejection {
                line_number,
                input: line.to_string(),
                reason,
            });
        }

        debug!(
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            "Recipient validation complete"
        );
        result
    }

    /// Validate the recipients file at `path`
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult, GatekeeperError> {
        let content = std::fs::read_to_string(path).map_err(|source| GatekeeperError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.validate(content.lines()))
    }

    fn is_comment(&self, line: &str) -> bool {
        !self.config.comment_prefix.is_empty() && line.starts_with(&self.config.comment_prefix)
    }

    fn dedup_key(&self, address: &str) -> String {
        if self.config.case_insensitive_duplicates {
            address.to_lowercase()
        } else {
            address.to_string()
        }
    }
}
