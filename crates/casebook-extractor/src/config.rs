//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How chunk size is measured against `max_chunk_tokens`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMetric {
    /// Unicode scalar values
    Characters,
    /// Approximate model tokens (4 chars ~ 1 token, rounded up)
    ApproxTokens,
    /// Whitespace-separated words
    Words,
}

impl Default for SizeMetric {
    fn default() -> Self {
        SizeMetric::ApproxTokens
    }
}

impl SizeMetric {
    /// Size of `text` under this metric
    pub fn measure(self, text: &str) -> usize {
        match self {
            SizeMetric::Characters => text.chars().count(),
            SizeMetric::ApproxTokens => text.chars().count().div_ceil(4),
            SizeMetric::Words => text.split_whitespace().count(),
        }
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Maximum chunk size, in units of `size_metric`
    pub max_chunk_tokens: usize,

    /// Unit used to measure chunks
    pub size_metric: SizeMetric,

    /// Maximum time for a single model call (seconds)
    pub model_timeout_secs: u64,

    /// Retries per chunk after the first attempt
    pub max_retries: usize,

    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u64,

    /// Upper bound on the doubling backoff (milliseconds)
    pub max_backoff_ms: u64,

    /// Chunks in flight at once; 1 is sequential
    pub concurrency: usize,
}

impl ExtractorConfig {
    /// Get the model call timeout as a Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_chunk_tokens == 0 {
            return Err("max_chunk_tokens must be greater than 0".to_string());
        }
        if self.model_timeout_secs == 0 {
            return Err("model_timeout_secs must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(format!(
                "initial_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 500_000,
            max_chunk_tokens: 2_500,
            size_metric: SizeMetric::ApproxTokens,
            model_timeout_secs: 120,
            max_retries: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 16_000,
            concurrency: 1,
        }
    }
}

impl ExtractorConfig {
    /// Fast preset: bigger chunks, parallel calls, short retry budget
    pub fn fast() -> Self {
        Self {
            max_text_length: 200_000,
            max_chunk_tokens: 3_500,
            size_metric: SizeMetric::ApproxTokens,
            model_timeout_secs: 60,
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 4_000,
            concurrency: 4,
        }
    }

    /// Thorough preset: smaller chunks, patient timeouts and retries
    pub fn thorough() -> Self {
        Self {
            max_text_length: 1_000_000,
            max_chunk_tokens: 1_500,
            size_metric: SizeMetric::ApproxTokens,
            model_timeout_secs: 300,
            max_retries: 8,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
            concurrency: 1,
        }
    }

    /// Load configuration from TOML string
    ///
    /// Missing keys fall back to [`ExtractorConfig::default`].
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
