//! Debate engine error types.

use crate::provider::ProviderError;

/// Errors from debate engine operations.
#[derive(Debug, thiserror::Error)]
pub enum DebateError {
    /// No session exists under the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The supplied debate configuration is unusable.
    #[error("invalid debate config: {0}")]
    InvalidConfig(String),

    /// No provider credential was supplied, in the request or environment.
    #[error("provider API key is required")]
    MissingCredential,

    /// A provider failure aborted the operation.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The judge's structured output did not conform to the verdict shape.
    #[error("judge verdict failed validation: {0}")]
    SchemaValidation(String),
}

impl DebateError {
    /// Whether this error should be reported as the caller's fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_) | Self::InvalidConfig(_) | Self::MissingCredential
        )
    }
}
