//! Provider error taxonomy.

/// Errors from provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected the credential or model access (HTTP 401/403).
    #[error("provider auth/model error ({status}): {detail}")]
    Auth { status: u16, detail: String },

    /// Any other non-success response from the provider.
    #[error("provider request failed (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL does not parse.
    #[error("invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The completion payload carried no usable content.
    #[error("provider response contained no content")]
    MissingContent,

    /// The completion payload was not the JSON we asked for.
    #[error("provider returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether this error is an authorization failure.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// Classify a non-success HTTP status into the provider taxonomy.
pub(crate) fn classify_status(status: u16, detail: String) -> ProviderError {
    if status == 401 || status == 403 {
        ProviderError::Auth { status, detail }
    } else {
        ProviderError::Status {
            status,
            body: detail,
        }
    }
}
