//! Configuration module for the writing-assistant service.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the HTTP server
//! and the upstream LLM provider, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, LlmConfig, ServerConfig};
