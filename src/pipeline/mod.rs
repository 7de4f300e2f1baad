//! Request pipeline for the writing-assistance tasks.
//!
//! # Architecture
//!
//! ```text
//! CorrectionRequest { task, input_text }
//!        │
//!        ▼
//! RequestPipeline::handle()
//!        │
//!        ├─ Validating      credential present? input non-blank?
//!        ├─ BuildingPrompt  PromptBuilder::build
//!        ├─ SelectingModel  UpstreamClient::list_models + ModelSelector  (grammar / spell)
//!        ├─ CallingUpstream UpstreamClient::generate
//!        └─ Normalizing     ResponseNormalizer::normalize
//!        │
//!        ▼
//! Result<CorrectionResult, PipelineError>
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use writing_assistant::config::AppConfig;
//! use writing_assistant::llm::GeminiClient;
//! use writing_assistant::pipeline::RequestPipeline;
//! use writing_assistant::task::{CorrectionRequest, Task};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = AppConfig::default();
//!     config.apply_env_overrides();
//!
//!     let upstream = Arc::new(GeminiClient::from_config(&config.llm));
//!     let pipeline = RequestPipeline::from_config(&config.llm, upstream);
//!
//!     let request = CorrectionRequest::new(Task::SpellCheck, "where are yu going");
//!     match pipeline.handle(&request).await {
//!         Ok(result) => println!("{result:?}"),
//!         Err(e) => eprintln!("{} {e}", e.status_code()),
//!     }
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{PipelineError, RequestPipeline};
pub use state::{PipelineStage, StageTrace};
