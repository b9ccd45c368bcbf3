//! Hugging Face Provider Implementation
//!
//! Sends prompts to the Hugging Face Inference API text-generation endpoint.
//!
//! # Features
//!
//! - Async HTTP communication with bearer-token auth
//! - Configurable endpoint, model and generation parameters
//! - Status codes mapped onto [`LlmError`] variants the orchestrator can retry
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use casebook_llm::HuggingFaceProvider;
//! use std::time::Duration;
//!
//! let provider = HuggingFaceProvider::new(
//!     "hf_xxx",
//!     "HuggingFaceH4/zephyr-7b-beta",
//!     Duration::from_secs(60),
//! ).unwrap();
//! ```

use crate::LlmError;
use casebook_domain::traits::ModelClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default Hugging Face inference endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Default model
pub const DEFAULT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Sample instead of greedy decoding
    pub do_sample: bool,

    /// Echo the prompt in the output
    pub return_full_text: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 500,
            temperature: 0.7,
            do_sample: true,
            return_full_text: false,
        }
    }
}

/// Hugging Face Inference API provider
pub struct HuggingFaceProvider {
    endpoint: String,
    model: String,
    token: String,
    parameters: GenerationParameters,
    client: reqwest::Client,
}

/// Request body for the text-generation task
#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

/// The API answers with a list for batched inputs and an object otherwise
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HuggingFaceProvider {
    /// Create a new provider against the public inference endpoint
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(
        token: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            token: token.into(),
            parameters: GenerationParameters::default(),
            client,
        })
    }

    /// Point the provider at a different inference base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the generation parameters
    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.model)
    }

    /// Generate text for one prompt
    ///
    /// # Errors
    ///
    /// - [`LlmError::Unauthorized`] on 401/403
    /// - [`LlmError::ModelUnavailable`] on 404/503
    /// - [`LlmError::RateLimited`] on 429
    /// - [`LlmError::Timeout`] when the request exceeds the client timeout
    /// - [`LlmError::Communication`] / [`LlmError::InvalidResponse`] otherwise
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: &self.parameters,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generation request");

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &self.model, error_text));
        }

        let parsed = response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                }
            })?;

        match parsed {
            GenerationResponse::Single(output) => Ok(output.generated_text),
            GenerationResponse::Batch(outputs) => outputs
                .into_iter()
                .next()
                .map(|o| o.generated_text)
                .ok_or_else(|| LlmError::InvalidResponse("Empty generation list".to_string())),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

fn map_status(status: StatusCode, model: &str, body: String) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized(body),
        StatusCode::NOT_FOUND => LlmError::ModelUnavailable(model.to_string()),
        StatusCode::SERVICE_UNAVAILABLE => {
            LlmError::ModelUnavailable(format!("{}: {}", model, body))
        }
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => LlmError::Timeout,
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

impl ModelClient for HuggingFaceProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send {
        HuggingFaceProvider::generate(self, prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_transient(error: &Self::Error) -> bool {
        error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "acme/tiny-model";

    fn provider_for(server: &MockServer, timeout: Duration) -> HuggingFaceProvider {
        HuggingFaceProvider::new("hf_test", MODEL, timeout)
            .unwrap()
            .with_endpoint(server.uri())
    }

    #[test]
    fn test_provider_creation() {
        let provider = HuggingFaceProvider::new("tok", DEFAULT_MODEL, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.parameters, GenerationParameters::default());
        assert_eq!(
            provider.url(),
            "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let provider = HuggingFaceProvider::new("tok", "m", Duration::from_secs(5))
            .unwrap()
            .with_endpoint("http://localhost:8080/");
        assert_eq!(provider.url(), "http://localhost:8080/m");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/acme/tiny-model"))
            .and(header("authorization", "Bearer hf_test"))
            .and(body_partial_json(json!({
                "inputs": "extract please",
                "parameters": { "max_new_tokens": 500, "return_full_text": false }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "generated_text": "- Use Case Title: Login" }])),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let text = provider.generate("extract please").await.unwrap();
        assert_eq!(text, "- Use Case Title: Login");
    }

    #[tokio::test]
    async fn test_generate_single_object_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generated_text": "hi" })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        assert_eq!(provider.generate("x").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (429u16, LlmError::RateLimited),
            (401u16, LlmError::Unauthorized("denied".to_string())),
            (404u16, LlmError::ModelUnavailable(MODEL.to_string())),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("denied"))
                .mount(&server)
                .await;

            let provider = provider_for(&server, Duration::from_secs(5));
            assert_eq!(provider.generate("x").await.unwrap_err(), expected);
        }
    }

    #[tokio::test]
    async fn test_model_loading_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({ "error": "Model is currently loading", "estimated_time": 20.0 })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        match provider.generate("x").await {
            Err(LlmError::ModelUnavailable(msg)) => assert!(msg.contains("loading")),
            other => panic!("Expected ModelUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "generated_text": "late" }]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_millis(50));
        assert_eq!(provider.generate("x").await.unwrap_err(), LlmError::Timeout);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        assert!(matches!(
            provider.generate("x").await,
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        assert!(matches!(
            provider.generate("x").await,
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let provider = HuggingFaceProvider::new("tok", "m", Duration::from_secs(2))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9");

        let result = provider.generate("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_)) | Err(LlmError::Timeout)));
    }
}
