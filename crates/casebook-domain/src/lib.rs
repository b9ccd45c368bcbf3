//! Casebook Domain Layer
//!
//! Core value types and boundary traits for the use case extraction pipeline.
//! The only external dependency is `uuid`, used for run identifiers.
//!
//! ## Key Concepts
//!
//! - **UseCaseRecord**: the eight-field unit extracted from a document
//! - **Chunk**: a bounded, ordered slice of source text sized for one model request
//! - **RecipientAddress**: an email address that passed the basic grammar check
//! - **RunId**: identifies one extraction run in logs and outgoing mail
//!
//! ## Architecture
//!
//! Infrastructure (model clients, document readers, renderers, mail transports)
//! lives in other crates and plugs in through the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod document;
pub mod recipient;
pub mod record;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use document::{RenderedDocument, DEFAULT_FILE_STEM};
pub use recipient::{AddressError, RecipientAddress};
pub use record::{FieldValue, UseCaseField, UseCaseRecord};
pub use run::RunId;
