//! Casebook LLM Provider Layer
//!
//! Implementations of the `ModelClient` trait from `casebook-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `HuggingFaceProvider`: Hugging Face Inference API text generation
//!
//! Providers make exactly one request per call. Retrying is left to the
//! extraction orchestrator.
//!
//! # Examples
//!
//! ```
//! use casebook_llm::MockProvider;
//! use casebook_domain::traits::ModelClient;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod huggingface;

use casebook_domain::traits::ModelClient;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use huggingface::{GenerationParameters, HuggingFaceProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Model is loading, unknown, or the service is down
    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Token missing, expired, or lacking access to the model
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether a later attempt has a reasonable chance of succeeding
    pub fn is_transient(&self) -> bool {
        !matches!(self, LlmError::Unauthorized(_))
    }
}

/// How a mock rule matches a prompt
#[derive(Debug, Clone)]
enum PromptMatch {
    Exact(String),
    Contains(String),
}

impl PromptMatch {
    fn matches(&self, prompt: &str) -> bool {
        match self {
            PromptMatch::Exact(p) => p == prompt,
            PromptMatch::Contains(needle) => prompt.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct MockRule {
    matcher: PromptMatch,
    reply: Option<Result<String, LlmError>>,
    latency: Option<Duration>,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Clones share call counts and rules.
///
/// # Examples
///
/// ```
/// use casebook_llm::MockProvider;
/// use casebook_domain::traits::ModelClient;
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_response_containing("invoice", "response2");
/// assert_eq!(provider.generate("prompt1").await.unwrap(), "response1");
/// assert_eq!(provider.generate("about an invoice").await.unwrap(), "response2");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<MockRule>>>,
    failures_remaining: Arc<Mutex<usize>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            failures_remaining: Arc::new(Mutex::new(0)),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.push_rule(PromptMatch::Exact(prompt.into()), Some(Ok(response.into())), None);
    }

    /// Add a response for any prompt containing `needle`
    pub fn add_response_containing(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.push_rule(PromptMatch::Contains(needle.into()), Some(Ok(response.into())), None);
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.push_rule(
            PromptMatch::Exact(prompt.into()),
            Some(Err(LlmError::ModelUnavailable("mock".to_string()))),
            None,
        );
    }

    /// Configure to return `error` for any prompt containing `needle`
    pub fn add_error_containing(&mut self, needle: impl Into<String>, error: LlmError) {
        self.push_rule(PromptMatch::Contains(needle.into()), Some(Err(error)), None);
    }

    /// Delay replies to prompts containing `needle`
    pub fn add_latency_containing(&mut self, needle: impl Into<String>, latency: Duration) {
        self.push_rule(PromptMatch::Contains(needle.into()), None, Some(latency));
    }

    /// Fail the next `count` calls with `ModelUnavailable`, whatever the prompt
    pub fn fail_next(&self, count: usize) {
        *self.failures_remaining.lock().unwrap() = count;
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn push_rule(
        &mut self,
        matcher: PromptMatch,
        reply: Option<Result<String, LlmError>>,
        latency: Option<Duration>,
    ) {
        self.rules.lock().unwrap().push(MockRule {
            matcher,
            reply,
            latency,
        });
    }

    fn respond(&self, prompt: &str) -> (Result<String, LlmError>, Option<Duration>) {
        *self.call_count.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        let rules = self.rules.lock().unwrap();
        let latency = rules
            .iter()
            .filter(|r| r.matcher.matches(prompt))
            .find_map(|r| r.latency);

        {
            let mut remaining = self.failures_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return (
                    Err(LlmError::ModelUnavailable("mock scripted failure".to_string())),
                    latency,
                );
            }
        }

        let reply = rules
            .iter()
            .filter(|r| r.matcher.matches(prompt))
            .find_map(|r| r.reply.clone())
            .unwrap_or_else(|| Ok(self.default_response.clone()));

        (reply, latency)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ModelClient for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send {
        let (reply, latency) = self.respond(prompt);
        async move {
            if let Some(delay) = latency {
                tokio::time::sleep(delay).await;
            }
            reply
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    fn is_transient(error: &Self::Error) -> bool {
        error.is_transient()
    }
}
