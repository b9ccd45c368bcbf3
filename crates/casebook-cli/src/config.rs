//! Configuration management for the CLI.
//!
//! Credentials and transport settings come from the environment (after an
//! optional `.env` file is loaded). Extractor and recipient tuning comes from
//! an optional TOML file or a preset.

use crate::error::{CliError, Result};
use casebook_extractor::ExtractorConfig;
use casebook_gatekeeper::ValidationConfig;
use casebook_llm::huggingface::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SMTP_MAX_RETRIES: usize = 3;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Tuning loaded from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Chunking, timeout and retry settings
    pub extractor: ExtractorConfig,

    /// Recipient list rules
    pub recipients: ValidationConfig,
}

impl RunConfig {
    /// Load tuning from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Tuning from a preset, with default recipient rules.
    pub fn from_extractor(extractor: ExtractorConfig) -> Self {
        Self {
            extractor,
            recipients: ValidationConfig::default(),
        }
    }
}

/// Credentials and transport settings for one run.
#[derive(Clone)]
pub struct Settings {
    /// Hosted model access
    pub model: ModelSettings,

    /// Mail delivery; absent on dry runs
    pub smtp: Option<SmtpSettings>,
}

/// Hugging Face Inference API settings.
#[derive(Clone)]
pub struct ModelSettings {
    /// Bearer token
    pub token: String,

    /// Model id
    pub model: String,

    /// Inference base URL override
    pub endpoint: Option<String>,

    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
}

/// SMTP settings.
#[derive(Clone)]
pub struct SmtpSettings {
    /// Mail host
    pub server: String,

    /// Mail port
    pub port: u16,

    /// Login user
    pub username: String,

    /// Login password
    pub password: String,

    /// Sender address
    pub from: String,

    /// Per-attempt send timeout (seconds)
    pub timeout_secs: u64,

    /// Retries after the first send attempt
    pub max_retries: usize,
}

impl ModelSettings {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SmtpSettings {
    /// Send timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first.
    ///
    /// SMTP variables are only required when `require_smtp` is set.
    pub fn from_env(require_smtp: bool) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), require_smtp)
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F, require_smtp: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require =
            |key: &str| get(key).ok_or_else(|| CliError::Config(format!("{} is not set", key)));
        let parse_or = |key: &str, default| parse_value(key, get(key), default);

        let model = ModelSettings {
            token: require("HUGGINGFACE_TOKEN")?,
            model: get("CASEBOOK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: get("CASEBOOK_MODEL_ENDPOINT"),
            timeout_secs: parse_or("CASEBOOK_MODEL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        };

        let smtp = if require_smtp {
            let username = require("EMAIL_USERNAME")?;
            Some(SmtpSettings {
                server: require("SMTP_SERVER")?,
                port: parse_value("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                password: require("EMAIL_PASSWORD")?,
                from: get("EMAIL_FROM").unwrap_or_else(|| username.clone()),
                username,
                timeout_secs: parse_or("SMTP_TIMEOUT_SECS", DEFAULT_SMTP_TIMEOUT_SECS)?,
                max_retries: parse_value(
                    "SMTP_MAX_RETRIES",
                    get("SMTP_MAX_RETRIES"),
                    DEFAULT_SMTP_MAX_RETRIES,
                )?,
            })
        } else {
            None
        };

        if model.timeout_secs == 0 {
            return Err(CliError::Config(
                "CASEBOOK_MODEL_TIMEOUT_SECS must be greater than 0".into(),
            ));
        }
        if smtp.as_ref().is_some_and(|s| s.timeout_secs == 0) {
            return Err(CliError::Config("SMTP_TIMEOUT_SECS must be greater than 0".into()));
        }

        Ok(Self { model, smtp })
    }
}

fn parse_value<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| CliError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("token", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
