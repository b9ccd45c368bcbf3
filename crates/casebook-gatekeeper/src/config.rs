//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for recipient validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Lines starting with this prefix (after trimming) are skipped
    pub comment_prefix: String,

    /// Treat `A@X.com` and `a@x.com` as the same recipient
    pub case_insensitive_duplicates: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            comment_prefix: "#".to_string(),
            case_insensitive_duplicates: false,
        }
    }
}

impl ValidationConfig {
    /// Default rules, with case-insensitive duplicate detection
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive_duplicates: true,
            ..Self::default()
        }
    }
}
