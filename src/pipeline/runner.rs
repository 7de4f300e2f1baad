//! Request pipeline: validate → prompt → (select model) → call → normalize.
//!
//! [`RequestPipeline`] holds only immutable configuration and a shared
//! [`UpstreamClient`], so one instance behind an `Arc` serves any number of
//! concurrent requests.  Each call makes at most two sequential outbound
//! requests: the catalog listing (grammar / spell only) and the generation,
//! which targets the model the listing produced.

use std::sync::Arc;

use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::{
    Credential, LlmError, ModelPreference, ModelSelector, PromptBuilder, ResponseNormalizer,
    UpstreamClient,
};
use crate::task::{CorrectionRequest, CorrectionResult};

use super::state::{PipelineStage, StageTrace};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Every way a request can fail.  Messages are shown to the editor user
/// verbatim; provider details inside them are display-only text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No provider credential configured.
    #[error("Gemini API key not found in environment variables")]
    MissingCredential,
    /// Input was empty or whitespace.
    #[error("Text is required")]
    EmptyInput,
    /// Transport failure, timeout or non-2xx provider status.
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The provider answered but not in the expected shape.
    #[error("upstream provider returned an unexpected response: {0}")]
    UpstreamMalformed(String),
}

impl PipelineError {
    /// HTTP-equivalent status: client defect 400, everything else 500.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::EmptyInput => 400,
            PipelineError::MissingCredential
            | PipelineError::UpstreamUnavailable(_)
            | PipelineError::UpstreamMalformed(_) => 500,
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Request(_) | LlmError::Timeout | LlmError::Status { .. } => {
                PipelineError::UpstreamUnavailable(e.to_string())
            }
            LlmError::Parse(_) | LlmError::Malformed(_) | LlmError::EmptyCatalog => {
                PipelineError::UpstreamMalformed(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RequestPipeline
// ---------------------------------------------------------------------------

pub struct RequestPipeline {
    upstream: Arc<dyn UpstreamClient>,
    credential: Option<Credential>,
    selector: ModelSelector,
    normalizer: ResponseNormalizer,
    rephrase_model: String,
}

impl RequestPipeline {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        credential: Option<Credential>,
        selector: ModelSelector,
        rephrase_model: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            credential,
            selector,
            normalizer: ResponseNormalizer::new(),
            rephrase_model: rephrase_model.into(),
        }
    }

    /// Wire a pipeline from config.  A missing credential is not an error
    /// here; it surfaces as [`PipelineError::MissingCredential`] per request.
    pub fn from_config(config: &LlmConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        let credential = config.credential().and_then(Credential::new);
        let preference = ModelPreference::from_patterns(config.model_preference.as_slice());
        let selector = ModelSelector::new(preference);
        Self::new(upstream, credential, selector, config.rephrase_model.clone())
    }

    /// Run one request to completion.
    pub async fn handle(
        &self,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResult, PipelineError> {
        self.handle_traced(request).await.0
    }

    /// Like [`handle`](Self::handle), also returning the stages entered.
    pub async fn handle_traced(
        &self,
        request: &CorrectionRequest,
    ) -> (Result<CorrectionResult, PipelineError>, StageTrace) {
        let mut trace = StageTrace::new();
        let result = self.run(request, &mut trace).await;

        match &result {
            Ok(_) => trace.enter(PipelineStage::Done),
            Err(e) => {
                log::warn!(
                    "pipeline: {} failed during {}: {e}",
                    request.task,
                    trace.current().map(|s| s.label()).unwrap_or("startup")
                );
                trace.enter(PipelineStage::Failed);
            }
        }
        (result, trace)
    }

    async fn run(
        &self,
        request: &CorrectionRequest,
        trace: &mut StageTrace,
    ) -> Result<CorrectionResult, PipelineError> {
        // ── 1. Validation (no network) ───────────────────────────────────
        trace.enter(PipelineStage::Validating);
        let credential = self
            .credential
            .as_ref()
            .ok_or(PipelineError::MissingCredential)?;
        if request.input_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        // ── 2. Prompt ────────────────────────────────────────────────────
        trace.enter(PipelineStage::BuildingPrompt);
        let prompt = PromptBuilder::build(request.task, &request.input_text);

        // ── 3. Model (catalog lookup for grammar / spell only) ───────────
        let model = if request.task.requires_model_selection() {
            trace.enter(PipelineStage::SelectingModel);
            let catalog = self.upstream.list_models(credential).await?;
            self.selector.select(&catalog)?.id
        } else {
            self.rephrase_model.clone()
        };
        log::info!("pipeline: {} using model {model}", request.task);

        // ── 4. Generation ────────────────────────────────────────────────
        trace.enter(PipelineStage::CallingUpstream);
        let raw = self.upstream.generate(credential, &model, &prompt).await?;

        // ── 5. Normalization ─────────────────────────────────────────────
        trace.enter(PipelineStage::Normalizing);
        Ok(self.normalizer.normalize(request.task, &raw)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
