//! Casebook Gatekeeper
//!
//! Filters a raw recipient list down to valid, unique email addresses before
//! anything is sent.
//!
//! The Gatekeeper provides:
//! - Address grammar checks (`local@domain.tld`)
//! - Duplicate detection, optionally case-insensitive
//! - Comment and blank line skipping
//! - Per-line rejection reasons with line numbers
//!
//! # Examples
//!
//! ```
//! use casebook_gatekeeper::{RecipientValidator, RejectionReason};
//!
//! let validator = RecipientValidator::default_config();
//! let result = validator.validate(["a@x.com", "bad", "a@x.com", "b@y.com"]);
//!
//! let accepted: Vec<&str> = result.accepted.iter().map(|a| a.as_str()).collect();
//! assert_eq!(accepted, vec!["a@x.com", "b@y.com"]);
//! assert_eq!(result.rejected[1].reason, RejectionReason::Duplicate);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{Rejection, RejectionReason, RecipientValidator, ValidationResult};
