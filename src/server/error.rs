//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::debate::DebateError;
use crate::provider::ProviderError;

use super::api::ErrorBody;

/// Engine error carried across the HTTP boundary.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] DebateError);

impl ApiError {
    /// Status code and stable error code for the wrapped error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DebateError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            DebateError::InvalidConfig(_) | DebateError::MissingCredential => {
                (StatusCode::BAD_REQUEST, "invalid_config")
            }
            DebateError::Provider(ProviderError::Auth { .. }) => {
                (StatusCode::BAD_GATEWAY, "provider_auth")
            }
            DebateError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            DebateError::SchemaValidation(_) => (StatusCode::BAD_GATEWAY, "judge_schema"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "Request failed");
        } else {
            tracing::debug!(error = %self.0, code, "Request rejected");
        }

        let body = ErrorBody {
            error: code.to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
