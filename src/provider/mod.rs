//! Model capability client: streaming and schema-constrained chat completions.

mod client;
mod error;
mod sse;
mod types;

pub use client::{ChatProvider, OpenRouterClient, TokenStream};
pub use error::ProviderError;
pub use sse::{delta_fragment, FrameBuffer, SseFrame};
pub use types::{ChatMessage, ChatRequest, ChatRole};
