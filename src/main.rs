//! Application entry point: AI writing assistant API.
//!
//! # Startup sequence
//!
//! 1. Load `.env` (if present) and initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults when missing), overlay env vars.
//! 3. Validate: refuse to start without a provider credential.
//! 4. Build the [`GeminiClient`] and the shared [`RequestPipeline`].
//! 5. Serve the editor routes until the process is stopped.

use std::sync::Arc;

use writing_assistant::{
    config::AppConfig,
    llm::{GeminiClient, UpstreamClient},
    pipeline::RequestPipeline,
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment + logging
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Ok(path) = dotenv {
        log::debug!("loaded environment from {}", path.display());
    }
    log::info!("AI writing assistant starting up");

    // 2. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env_overrides();

    // 3. Fail fast on a missing credential
    if let Err(e) = config.validate() {
        log::error!("invalid configuration: {e}");
        return Err(e);
    }
    log::info!("Gemini key loaded");

    // 4. Pipeline
    let upstream: Arc<dyn UpstreamClient> = Arc::new(GeminiClient::from_config(&config.llm));
    let pipeline = Arc::new(RequestPipeline::from_config(&config.llm, upstream));

    // 5. HTTP
    server::serve(&config.server, pipeline).await
}
