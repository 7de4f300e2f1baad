//! HTTP boundary the browser editor talks to.
//!
//! Routes:
//! * `GET /`: liveness message.
//! * `POST /api/analyze`: `{ "sentence" }` → `{ "rephrasedSentences": [..] }`
//! * `POST /api/grammarcheck`: `{ "text" }` → `{ "corrected": ".." }`
//! * `POST /api/spellcheck`: `{ "text" }` → `{ "corrected": ".." }`
//!
//! Failures answer `{ "error": ".." }` with the status from
//! [`PipelineError::status_code`](crate::pipeline::PipelineError::status_code).

pub mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::pipeline::RequestPipeline;

pub use routes::{ApiError, RephraseBody, ResultBody, TextBody};

/// State shared by every handler; cloning is an `Arc` bump.
#[derive(Clone)]
pub struct ServerState {
    pub pipeline: Arc<RequestPipeline>,
}

/// Build the router with permissive CORS (the editor is served from a
/// different origin).
pub fn router(pipeline: Arc<RequestPipeline>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/analyze", post(routes::analyze))
        .route("/api/grammarcheck", post(routes::grammar_check))
        .route("/api/spellcheck", post(routes::spell_check))
        .with_state(ServerState { pipeline })
        .layer(CorsLayer::permissive())
}

/// Bind `config.bind_addr()` and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, pipeline: Arc<RequestPipeline>) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Server is running on {addr}");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}
