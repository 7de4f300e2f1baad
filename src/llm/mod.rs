//! Upstream LLM access and response handling.
//!
//! This module provides:
//! * [`PromptBuilder`]: task-specific instruction text with few-shot examples.
//! * [`ModelSelector`] / [`ModelPreference`]: deterministic catalog model choice.
//! * [`UpstreamClient`]: async trait for the provider; [`GeminiClient`] is the
//!   REST implementation.
//! * [`ResponseNormalizer`]: provider payload → [`CorrectionResult`](crate::task::CorrectionResult),
//!   with layered rephrase parsing.
//! * [`LlmError`]: error variants for provider calls and payload reading.

pub mod client;
pub mod normalizer;
pub mod prompt;
pub mod selector;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{Credential, GeminiClient, LlmError, RawProviderResponse, UpstreamClient};
pub use normalizer::{
    EnumeratedLinesStrategy, JsonObjectStrategy, RephraseStrategy, ResponseNormalizer,
    FALLBACK_CORRECTION,
};
pub use prompt::PromptBuilder;
pub use selector::{ModelCandidate, ModelPreference, ModelRule, ModelSelector, ModelTier};
