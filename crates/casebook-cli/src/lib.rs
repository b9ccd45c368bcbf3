//! Casebook CLI library.
//!
//! This library provides the pieces of the `casebook` command: argument
//! parsing, environment settings, document readers, the DOCX renderer, the
//! SMTP mailer, console output, and the pipeline that wires them together.

pub mod cli;
pub mod config;
pub mod error;
pub mod mailer;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod render;

pub use cli::{Cli, CliFormat, Preset};
pub use config::{OutputFormat, RunConfig, Settings};
pub use error::{CliError, Result};
pub use mailer::SmtpMailer;
pub use output::Formatter;
pub use pipeline::{Pipeline, RunReport, RunRequest};
pub use reader::FileDocumentReader;
pub use render::DocxRenderer;
