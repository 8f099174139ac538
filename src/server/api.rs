//! Request and response types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::debate::Turn;

/// Response for POST /debate/start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    /// Identifier of the newly created session.
    pub session_id: String,
}

/// Request body identifying an existing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// Response for a step request on a debate that already hit its turn limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoneResponse {
    /// Always `"done"`.
    pub status: String,
    /// The full recorded history, in debate order.
    pub history: Vec<Turn>,
}

impl DoneResponse {
    #[must_use]
    pub fn new(history: Vec<Turn>) -> Self {
        Self {
            status: "done".to_string(),
            history,
        }
    }
}

/// JSON body attached to error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable error code.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}
