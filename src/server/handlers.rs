//! HTTP handlers for the debate API.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;

use crate::debate::{Advance, DebateConfig, DebateEngine, JudgeResult};

use super::api::{DoneResponse, SessionRequest, StartResponse};
use super::error::ApiError;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The debate engine serving all sessions.
    pub engine: Arc<DebateEngine>,
}

impl AppState {
    /// Create new app state over an engine.
    #[must_use]
    pub fn new(engine: Arc<DebateEngine>) -> Self {
        Self { engine }
    }
}

/// GET /health - liveness probe.
pub async fn get_health() -> &'static str {
    "debate-arena backend is running"
}

/// POST /debate/start - create a session from a debate config.
pub async fn post_start(
    State(state): State<AppState>,
    Json(config): Json<DebateConfig>,
) -> Result<Json<StartResponse>, ApiError> {
    let session_id = state.engine.start(config).await?;
    Ok(Json(StartResponse { session_id }))
}

/// POST /debate/step_stream - advance the debate by one streamed turn.
///
/// Replies with a `{"status":"done",...}` JSON object when the turn limit
/// was already reached, otherwise with an `application/x-ndjson` body: one
/// `delta` object per fragment, then a single terminal `final` object. An
/// engine failure mid-stream aborts the body.
pub async fn post_step_stream(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Response, ApiError> {
    match state.engine.advance(&request.session_id).await? {
        Advance::Done { history } => Ok(Json(DoneResponse::new(history)).into_response()),
        Advance::Streaming(events) => {
            let lines = events.map(|event| {
                let mut line = serde_json::to_vec(&event?)?;
                line.push(b'\n');
                Ok::<_, axum::BoxError>(Bytes::from(line))
            });

            let response = (
                [(header::CONTENT_TYPE, "application/x-ndjson")],
                Body::from_stream(lines),
            );
            Ok(response.into_response())
        }
    }
}

/// POST /debate/judge - aggregate the transcript and return the verdict.
pub async fn post_judge(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<JudgeResult>, ApiError> {
    let verdict = state.engine.judge(&request.session_id).await?;
    Ok(Json(verdict))
}
