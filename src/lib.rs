//! AI writing assistant backend.
//!
//! The editor sends selected text; this crate asks a generative-language
//! provider for a rephrasing, a grammar correction or a spelling-only
//! correction, and turns the provider's free-form reply into a strict result.
//!
//! * [`config`]  : TOML settings, env overrides, startup validation.
//! * [`task`]    : request/result value types.
//! * [`llm`]     : prompts, model selection, provider client, normalization.
//! * [`pipeline`]: per-request orchestration and the error taxonomy.
//! * [`server`]  : axum routes the editor calls.

pub mod config;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod task;
