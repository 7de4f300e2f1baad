//! `UpstreamClient` trait and the `GeminiClient` implementation.
//!
//! The client owns everything provider-specific on the wire: URL layout,
//! the catalog response shape, the `generateContent` request body and
//! status handling.  It makes exactly one attempt per call; retries belong to
//! whoever wraps the pipeline.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::selector::ModelCandidate;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the provider or reading its reply.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The provider answered with a non-2xx status.  `body` is the provider's
    /// error payload, verbatim.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP body could not be decoded as JSON of the expected shape.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// Valid JSON, but the field we need is missing.
    #[error("unexpected provider response: {0}")]
    Malformed(String),

    /// The model catalog listed no models.
    #[error("provider model catalog is empty")]
    EmptyCatalog,
}

/// Header carrying the credential; keeps the key out of URLs and error text.
const API_KEY_HEADER: &str = "x-goog-api-key";

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest appends the request URL to its message; never surface it.
        let e = e.without_url();
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::Parse(e.to_string())
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Provider API key.  `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// `None` when the key is blank.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ---------------------------------------------------------------------------
// RawProviderResponse
// ---------------------------------------------------------------------------

/// Untrusted JSON returned by `generateContent`.  Interpreted by
/// [`ResponseNormalizer`](crate::llm::ResponseNormalizer).
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderResponse(pub serde_json::Value);

impl RawProviderResponse {
    pub fn json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Build the shape the provider returns for a single text candidate.
    /// Handy for test doubles.
    pub fn from_text(text: &str) -> Self {
        Self(serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
        }))
    }
}

// ---------------------------------------------------------------------------
// UpstreamClient trait
// ---------------------------------------------------------------------------

/// Async access to the generative-language provider.
///
/// Implementors must be `Send + Sync` so one instance can serve every
/// concurrent request (e.g. behind `Arc<dyn UpstreamClient>`).
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// List the catalog in provider order.
    async fn list_models(&self, credential: &Credential) -> Result<Vec<ModelCandidate>, LlmError>;

    /// Run one generation with `prompt` as the sole text part.
    async fn generate(
        &self,
        credential: &Credential,
        model: &str,
        prompt: &str,
    ) -> Result<RawProviderResponse, LlmError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ModelDescriptor {
    name: String,
}

/// Calls the Google generative-language REST API.
///
/// All connection details come from [`LlmConfig`]; the credential is passed
/// per call so the pipeline can check it before any traffic.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Build a client whose transport deadline is `config.timeout_secs`.
    ///
    /// A default client is used as a last resort if the builder fails (only
    /// happens when the TLS backend cannot initialise).
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model_path(model))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, LlmError> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Catalog ids already carry the `models/` prefix; configured ids may not.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn candidates_from(list: ModelList) -> Vec<ModelCandidate> {
    list.models
        .into_iter()
        .map(|m| ModelCandidate::new(m.name))
        .collect()
}

#[async_trait]
impl UpstreamClient for GeminiClient {
    async fn list_models(&self, credential: &Credential) -> Result<Vec<ModelCandidate>, LlmError> {
        let req = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, credential.expose());

        let list: ModelList = self.send(req).await?.json().await?;
        let candidates = candidates_from(list);
        log::debug!("catalog lists {} models", candidates.len());
        Ok(candidates)
    }

    async fn generate(
        &self,
        credential: &Credential,
        model: &str,
        prompt: &str,
    ) -> Result<RawProviderResponse, LlmError> {
        let body = serde_json::json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ]
        });

        let req = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, credential.expose())
            .json(&body);

        let json: serde_json::Value = self.send(req).await?.json().await?;
        Ok(RawProviderResponse(json))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
