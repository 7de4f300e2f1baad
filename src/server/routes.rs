//! Request/response bodies and handlers for the editor-facing routes.
//!
//! The rephrase route reads `sentence` while the check routes read `text`;
//! the existing editor sends exactly these names, so they are kept here and
//! folded into one [`CorrectionRequest`] immediately.  A body that is not
//! readable JSON (wrong content type, syntax or field types) counts as
//! missing input, so every failure still answers with `{ "error" }`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;
use crate::task::{CorrectionRequest, CorrectionResult, Task};

use super::ServerState;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RephraseBody {
    #[serde(default)]
    pub sentence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultBody {
    Rephrased {
        #[serde(rename = "rephrasedSentences")]
        rephrased_sentences: Vec<String>,
    },
    Corrected {
        corrected: String,
    },
}

impl From<CorrectionResult> for ResultBody {
    fn from(result: CorrectionResult) -> Self {
        match result {
            CorrectionResult::Rephrased { alternatives } => ResultBody::Rephrased {
                rephrased_sentences: alternatives,
            },
            CorrectionResult::Corrected { corrected_text } => ResultBody::Corrected {
                corrected: corrected_text,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log::error!("request failed: {error}");
        }
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl ApiError {
    /// The rephrase route names its input `sentence`, and so does its
    /// empty-input message.
    fn for_task(task: Task, error: PipelineError) -> Self {
        match (task, &error) {
            (Task::Rephrase, PipelineError::EmptyInput) => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Sentence is required".into(),
            },
            _ => error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "AI Writing Assistant API is running!"
    }))
}

async fn run(
    state: &ServerState,
    task: Task,
    input: Option<String>,
) -> Result<Json<ResultBody>, ApiError> {
    let request = CorrectionRequest::new(task, input.unwrap_or_default());
    let result = state
        .pipeline
        .handle(&request)
        .await
        .map_err(|e| ApiError::for_task(task, e))?;
    Ok(Json(result.into()))
}

fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            log::debug!("unreadable request body, treating as empty: {rejection}");
            T::default()
        }
    }
}

pub async fn analyze(
    State(state): State<ServerState>,
    payload: Result<Json<RephraseBody>, JsonRejection>,
) -> Result<Json<ResultBody>, ApiError> {
    let body = body_or_default(payload);
    run(&state, Task::Rephrase, body.sentence).await
}

pub async fn grammar_check(
    State(state): State<ServerState>,
    payload: Result<Json<TextBody>, JsonRejection>,
) -> Result<Json<ResultBody>, ApiError> {
    let body = body_or_default(payload);
    run(&state, Task::GrammarCheck, body.text).await
}

pub async fn spell_check(
    State(state): State<ServerState>,
    payload: Result<Json<TextBody>, JsonRejection>,
) -> Result<Json<ResultBody>, ApiError> {
    let body = body_or_default(payload);
    run(&state, Task::SpellCheck, body.text).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::Request;
    use crate::llm::{
        Credential, LlmError, ModelCandidate, ModelSelector, RawProviderResponse, UpstreamClient,
    };
    use crate::pipeline::RequestPipeline;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replies with a fixed text; optionally fails every generation.
    struct FixedUpstream {
        reply: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UpstreamClient for FixedUpstream {
        async fn list_models(&self, _key: &Credential) -> Result<Vec<ModelCandidate>, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ModelCandidate::new("models/gemini-1.5-flash")])
        }

        async fn generate(
            &self,
            _key: &Credential,
            _model: &str,
            _prompt: &str,
        ) -> Result<RawProviderResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::Request("connection refused".into()));
            }
            Ok(RawProviderResponse::from_text(self.reply))
        }
    }

    fn state(reply: &'static str, fail: bool) -> (ServerState, Arc<FixedUpstream>) {
        let upstream = Arc::new(FixedUpstream {
            reply,
            fail,
            calls: AtomicUsize::new(0),
        });
        let pipeline = RequestPipeline::new(
            upstream.clone(),
            Credential::new("key"),
            ModelSelector::default(),
            "models/gemini-2.0-flash",
        );
        (
            ServerState {
                pipeline: Arc::new(pipeline),
            },
            upstream,
        )
    }

    async fn into_json(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn index_reports_running() {
        let (status, json) = into_json(index().await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "AI Writing Assistant API is running!");
    }

    #[tokio::test]
    async fn analyze_returns_rephrased_sentences() {
        let (st, _) = state("1. One\n2. Two\n3. Three", false);
        let body = RephraseBody {
            sentence: Some("one two three".into()),
        };

        let (status, json) = into_json(analyze(State(st), Ok(Json(body))).await.into_response()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "rephrasedSentences": ["One", "Two", "Three"] }));
    }

    #[tokio::test]
    async fn spellcheck_returns_corrected() {
        let (st, _) = state("where are you going", false);
        let body = TextBody {
            text: Some("where are yu going".into()),
        };

        let (status, json) =
            into_json(spell_check(State(st), Ok(Json(body))).await.into_response()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "corrected": "where are you going" }));
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (st, upstream) = state("unused", false);

        let (status, json) =
            into_json(grammar_check(State(st), Ok(Json(TextBody::default()))).await.into_response())
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Text is required");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_server_error() {
        let (st, _) = state("unused", true);
        let body = TextBody {
            text: Some("some text".into()),
        };

        let (status, json) =
            into_json(grammar_check(State(st), Ok(Json(body))).await.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"]
            .as_str()
            .is_some_and(|m| m.contains("connection refused")));
    }

    /// Run a raw body through the real `Json` extractor.
    async fn extract<T>(
        content_type: Option<&str>,
        body: &'static str,
    ) -> Result<Json<T>, JsonRejection>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header(CONTENT_TYPE, value);
        }
        let request = builder.body(Body::from(body)).unwrap();
        Json::<T>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn form_body_without_json_content_type_is_json_bad_request() {
        let (st, upstream) = state("unused", false);
        let payload = extract::<TextBody>(None, "text=hello").await;
        assert!(payload.is_err());

        let (status, json) =
            into_json(grammar_check(State(st), payload).await.into_response()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Text is required" }));
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_or_mistyped_json_is_json_bad_request() {
        for raw in [r#"{"text": "#, r#"{"text": 42}"#] {
            let (st, upstream) = state("unused", false);
            let payload = extract::<TextBody>(Some("application/json"), raw).await;
            assert!(payload.is_err(), "{raw} should be rejected by the extractor");

            let (status, json) =
                into_json(spell_check(State(st), payload).await.into_response()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(json["error"], "Text is required");
            assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn blank_sentence_names_the_sentence_field() {
        let (st, upstream) = state("unused", false);
        let body = RephraseBody {
            sentence: Some("   ".into()),
        };

        let (status, json) =
            into_json(analyze(State(st.clone()), Ok(Json(body))).await.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Sentence is required" }));

        let payload = extract::<RephraseBody>(None, "sentence=hi").await;
        let (status, json) = into_json(analyze(State(st), payload).await.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Sentence is required");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rephrase_body_ignores_text_field() {
        let body: RephraseBody = serde_json::from_str(r#"{"text": "wrong field"}"#).unwrap();
        assert!(body.sentence.is_none());
    }
}
