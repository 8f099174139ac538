//! HTTP boundary for the debate engine.

mod api;
mod error;
mod handlers;
#[allow(clippy::module_inception)]
mod server;

pub use api::{DoneResponse, ErrorBody, SessionRequest, StartResponse};
pub use error::ApiError;
pub use handlers::AppState;
pub use server::DebateServer;
