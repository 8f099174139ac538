//! OpenRouter-backed implementation of the chat provider capabilities.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use crate::config::ProviderConfig;

use super::error::{classify_status, ProviderError};
use super::sse::{delta_fragment, FrameBuffer, SseFrame};
use super::types::ChatRequest;

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for blocking (structured) completions. Streamed
/// completions deliberately carry no overall deadline.
const STRUCTURED_TIMEOUT: Duration = Duration::from_secs(120);

/// Buffered fragments between the transport reader and the consumer.
const FRAGMENT_CHANNEL_CAPACITY: usize = 64;

/// Lazy, finite, non-restartable sequence of generated text fragments.
pub type TokenStream = Pin<Box<dyn futures_core::Stream<Item = Result<String, ProviderError>> + Send>>;

/// Text-generation capabilities consumed by the debate engine.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open a streaming chat completion, yielding incremental text fragments.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Auth` when the provider rejects the
    /// credential, and a transport or status error for any other failure to
    /// open the stream. Failures after the stream opened surface as `Err`
    /// items on the stream itself.
    async fn stream_chat(
        &self,
        credential: &str,
        request: ChatRequest,
    ) -> Result<TokenStream, ProviderError>;

    /// Issue one blocking completion constrained to the given JSON schema.
    ///
    /// # Errors
    ///
    /// Same auth/transport taxonomy as [`ChatProvider::stream_chat`], plus
    /// `ProviderError::Malformed` when the payload is not parseable JSON.
    async fn complete_structured(
        &self,
        credential: &str,
        request: ChatRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;
}

/// Build an HTTP client with proper timeout configuration.
fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Chat client for the OpenRouter completions API.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    web_search: bool,
}

impl OpenRouterClient {
    /// Create a new client from provider configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: build_http_client(),
            base_url: config.base_url.clone(),
            web_search: config.web_search,
        }
    }

    /// Completions endpoint derived from the configured base URL.
    fn endpoint(&self) -> Result<Url, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        Ok(Url::parse(&url)?)
    }

    /// Request body for a streamed completion.
    fn streaming_payload(&self, request: &ChatRequest) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "model": request.model,
            "temperature": request.temperature,
            "messages": request.messages,
            "stream": true,
        });
        if self.web_search {
            payload["plugins"] = serde_json::json!([{ "id": "web" }]);
        }
        payload
    }

    /// Request body for a schema-constrained completion.
    fn structured_payload(request: &ChatRequest, schema: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "temperature": request.temperature,
            "messages": request.messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "output_schema",
                    "strict": true,
                    "schema": schema,
                },
            },
        })
    }
}

/// Reject non-success responses, reading the provider detail for the error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(classify_status(status.as_u16(), detail))
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: serde_json::Value,
}

#[async_trait]
impl ChatProvider for OpenRouterClient {
    async fn stream_chat(
        &self,
        credential: &str,
        request: ChatRequest,
    ) -> Result<TokenStream, ProviderError> {
        let url = self.endpoint()?;
        let payload = self.streaming_payload(&request);

        tracing::debug!(model = %request.model, "Opening streamed completion");
        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut bytes = response.bytes_stream();
        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut frames = FrameBuffer::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(ProviderError::Transport(e))).await;
                        return;
                    }
                };

                for frame in frames.feed(&chunk) {
                    let data = match frame {
                        SseFrame::Done => return,
                        SseFrame::Data(data) => data,
                    };
                    match delta_fragment(&data) {
                        Ok(Some(fragment)) => {
                            if tx.send(Ok(fragment)).await.is_err() {
                                // Consumer went away; stop reading.
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::debug!(error = %e, "Skipping malformed stream frame");
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn complete_structured(
        &self,
        credential: &str,
        request: ChatRequest,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let url = self.endpoint()?;
        let payload = Self::structured_payload(&request, schema);

        tracing::debug!(model = %request.model, "Requesting structured completion");
        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .timeout(STRUCTURED_TIMEOUT)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        let completion: Completion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::MissingContent)?
            .message
            .content;

        // Providers differ on whether constrained output arrives as a JSON
        // string or an already-parsed object.
        match content {
            serde_json::Value::String(text) => Ok(serde_json::from_str(&text)?),
            value @ serde_json::Value::Object(_) => Ok(value),
            _ => Err(ProviderError::MissingContent),
        }
    }
}
