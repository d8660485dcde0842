//! Generative-text backend: trait seam, Gemini client, and a test mock.
//!
//! The pipeline talks to [`TextGenerator`] rather than a concrete client so
//! integration tests can substitute [`MockGenerator`] and assert on exact
//! call ordering. Production wiring constructs a [`GeminiClient`] once in
//! `main` and injects it; there is no ambient global client.

pub mod types;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use types::{GenerateContentRequest, GenerateContentResponse};

/// Errors surfaced by a generation backend.
#[derive(Debug, Error, Diagnostic)]
pub enum GenAiError {
    /// Transport-level failure: connection, TLS, non-success status.
    #[error("generation request failed: {0}")]
    #[diagnostic(code(gistsmith::genai::transport))]
    Transport(#[from] reqwest::Error),

    /// The endpoint URL could not be assembled.
    #[error("invalid generation endpoint: {0}")]
    #[diagnostic(code(gistsmith::genai::endpoint))]
    Endpoint(#[from] url::ParseError),

    /// The response parsed but carried no candidate text.
    #[error("generation response carried no text")]
    #[diagnostic(
        code(gistsmith::genai::empty_response),
        help("The prompt may have been blocked; inspect the raw response.")
    )]
    EmptyResponse,

    /// External provider or scripted mock error.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(gistsmith::genai::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },
}

/// Opaque prompt-to-text completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError>;
}

/// Gemini REST client for the `generateContent` endpoint.
///
/// # Examples
///
/// ```no_run
/// use gistsmith::genai::GeminiClient;
///
/// let client = GeminiClient::new("api-key").with_model("gemini-2.0-flash");
/// ```
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: Url,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Public Gemini API host.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    /// Model used when none is configured.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    /// Creates a client for the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(Self::DEFAULT_BASE_URL)
                .expect("default base URL is valid"),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at a different host. Used by tests to target a
    /// local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    fn endpoint(&self) -> Result<Url, GenAiError> {
        Ok(self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))?)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        tracing::debug!(
            model = %self.model,
            prompt_bytes = prompt.len(),
            "issuing generation request"
        );

        let response = self
            .http
            .post(self.endpoint()?)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or(GenAiError::EmptyResponse)
    }
}

/// Deterministic in-memory generator for tests.
///
/// Records every prompt it receives, in order, and answers either from a
/// scripted reply queue or with a synthesized `mock-summary-N` string once
/// the script runs dry. Mirrors the role the mock embedding provider plays
/// in chunking pipelines: exact call sequences become assertable without a
/// network.
#[derive(Debug, Default)]
pub struct MockGenerator {
    prompts: Mutex<Vec<String>>,
    script: Mutex<VecDeque<String>>,
    failure: Option<String>,
}

impl MockGenerator {
    /// A mock that answers every prompt with `mock-summary-N`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that answers from `replies` in order, then falls back to the
    /// synthesized form.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// A mock whose every call fails with a provider error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock lock poisoned").clone()
    }

    /// Number of generation calls issued against this mock.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("mock lock poisoned").len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let call_index = {
            let mut prompts = self.prompts.lock().expect("mock lock poisoned");
            prompts.push(prompt.to_string());
            prompts.len()
        };

        if let Some(message) = &self.failure {
            return Err(GenAiError::Provider {
                provider: "mock",
                message: message.clone(),
            });
        }

        let scripted = self.script.lock().expect("mock lock poisoned").pop_front();
        Ok(scripted.unwrap_or_else(|| format!("mock-summary-{call_index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_prompts_in_order() {
        let mock = MockGenerator::new();
        mock.generate("first").await.unwrap();
        mock.generate("second").await.unwrap();
        assert_eq!(mock.prompts(), vec!["first", "second"]);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn mock_plays_script_then_synthesizes() {
        let mock = MockGenerator::with_replies(["scripted"]);
        assert_eq!(mock.generate("a").await.unwrap(), "scripted");
        assert_eq!(mock.generate("b").await.unwrap(), "mock-summary-2");
    }

    #[tokio::test]
    async fn failing_mock_reports_provider_error() {
        let mock = MockGenerator::failing("backend down");
        let err = mock.generate("a").await.unwrap_err();
        assert!(err.to_string().contains("backend down"));
        // The failed call is still recorded for ordering assertions.
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn endpoint_is_assembled_from_base_model_pair() {
        let client = GeminiClient::new("k").with_model("gemini-2.0-flash");
        let endpoint = client.endpoint().unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
