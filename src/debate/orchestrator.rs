//! Turn orchestration: alternation, streaming, and persistence.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

use crate::config::DEFAULT_API_KEY_ENV;
use crate::provider::{ChatProvider, ChatRequest};
use crate::store::SessionStore;

use super::assembler::build_turn_messages;
use super::{DebateConfig, DebateError, Role, Session, Turn};

/// Buffered turn events between the generating task and the caller.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// One event of an advance-one-turn stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TurnEvent {
    /// An incremental text fragment, relayed as soon as it arrives.
    Delta { role: Role, data: String },
    /// Terminal event after the turn was finalized and persisted.
    Final {
        role: Role,
        next_role: Role,
        turns_done: usize,
        finished: bool,
    },
}

/// Event stream of one advance call: zero or more deltas, one final event.
pub type TurnStream = ReceiverStream<Result<TurnEvent, DebateError>>;

/// Outcome of an advance call.
pub enum Advance {
    /// The debate had already reached its turn limit; nothing was mutated.
    Done { history: Vec<Turn> },
    /// A turn is being generated; consume the events to completion.
    Streaming(TurnStream),
}

/// Per-session locks serializing advancement and judging.
///
/// The store has no transactional read-modify-write, so two concurrent
/// operations on one session would race on `next_role` and history.
#[derive(Debug, Default)]
struct SessionLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.inner
            .lock()
            .await
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }
}

/// The debate engine: session lifecycle, turn orchestration, and judging.
pub struct DebateEngine {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn ChatProvider>,
    credential_env: String,
    locks: SessionLocks,
}

impl DebateEngine {
    /// Create an engine over a store and a provider.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            store,
            provider,
            credential_env: DEFAULT_API_KEY_ENV.to_string(),
            locks: SessionLocks::default(),
        }
    }

    /// Set the environment variable consulted when a start request carries
    /// no API key (builder pattern).
    #[must_use]
    pub fn with_credential_env(mut self, var: impl Into<String>) -> Self {
        self.credential_env = var.into();
        self
    }

    pub(super) fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub(super) fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    pub(super) async fn lock_session(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks.lock_for(session_id).await
    }

    /// Create a session and return its identifier.
    ///
    /// The credential is resolved before any provider call: the request's
    /// key wins, then the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `DebateError::MissingCredential` when no non-blank key can be
    /// resolved, and `DebateError::InvalidConfig` for a zero round count.
    pub async fn start(&self, mut config: DebateConfig) -> Result<String, DebateError> {
        if config.rounds == 0 {
            return Err(DebateError::InvalidConfig(
                "rounds must be at least 1".to_string(),
            ));
        }

        if config.api_key.trim().is_empty() {
            let fallback = std::env::var(&self.credential_env).unwrap_or_default();
            if fallback.trim().is_empty() {
                return Err(DebateError::MissingCredential);
            }
            config.api_key = fallback;
        }

        let session = Session::new(config);
        let session_id = session.id.clone();
        tracing::info!(session_id = %session_id, topic = %session.config.topic, "Debate started");
        self.store.put(&session_id, session).await;
        Ok(session_id)
    }

    /// Advance the debate by one streamed turn.
    ///
    /// Alternation is flipped on a working copy before streaming begins;
    /// the session is persisted only once the stream has ended, so an abort
    /// (provider failure or caller disconnect) leaves the stored session
    /// untouched. An empty generation persists the flip but records no turn.
    ///
    /// # Errors
    ///
    /// Returns `DebateError::SessionNotFound` for unknown identifiers and a
    /// provider error when the stream cannot be opened. Mid-stream failures
    /// arrive as `Err` items on the returned stream.
    pub async fn advance(&self, session_id: &str) -> Result<Advance, DebateError> {
        let lock = self.lock_session(session_id).await;
        let guard = lock.lock_owned().await;

        let session = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| DebateError::SessionNotFound(session_id.to_string()))?;

        if session.is_complete() {
            tracing::debug!(session_id = %session_id, "Advance on finished debate is a no-op");
            return Ok(Advance::Done {
                history: session.history,
            });
        }

        let mut work = session;
        let max_turns = work.max_turns();
        let role = work.next_role;
        // Flip before streaming: the next call addresses the other side even
        // though the flip only becomes durable on successful completion.
        work.next_role = role.other();

        let messages = build_turn_messages(&work.config, &work.history, role);
        let request = ChatRequest::new(
            work.config.model_for(role),
            messages,
            work.config.temperature_for(role),
        );

        let mut fragments = self
            .provider
            .stream_chat(&work.config.api_key, request)
            .await?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let store = Arc::clone(&self.store);
        let session_id = session_id.to_string();

        tokio::spawn(async move {
            // Serialize the whole turn, including persistence.
            let _guard = guard;
            let mut accumulator = String::new();

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        accumulator.push_str(&fragment);
                        let event = TurnEvent::Delta {
                            role,
                            data: fragment,
                        };
                        if tx.send(Ok(event)).await.is_err() {
                            tracing::debug!(session_id = %session_id, "Caller disconnected mid-turn, discarding");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Generation failed mid-turn");
                        let _ = tx.send(Err(DebateError::Provider(e))).await;
                        return;
                    }
                }
            }

            let text = accumulator.trim();
            if text.is_empty() {
                tracing::warn!(session_id = %session_id, role = %role, "Empty generation, turn dropped");
            } else {
                work.history.push(Turn::new(role, text));
            }
            work.touch();

            let turns_done = work.history.len();
            let next_role = work.next_role;
            store.put(&session_id, work).await;
            tracing::info!(
                session_id = %session_id,
                role = %role,
                turns_done,
                "Turn persisted"
            );

            let _ = tx
                .send(Ok(TurnEvent::Final {
                    role,
                    next_role,
                    turns_done,
                    finished: turns_done >= max_turns,
                }))
                .await;
        });

        Ok(Advance::Streaming(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::provider::{ProviderError, TokenStream};
    use crate::store::MemoryStore;

    use super::*;

    /// Provider that replays scripted fragment sequences, one per call.
    struct ScriptedProvider {
        scripts: StdMutex<Vec<Vec<Result<String, ProviderError>>>>,
        requests: StdMutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(scripts: Vec<Vec<Result<String, ProviderError>>>) -> Self {
            Self {
                scripts: StdMutex::new(scripts),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn fragments(texts: &[&str]) -> Vec<Result<String, ProviderError>> {
            texts.iter().map(|t| Ok((*t).to_string())).collect()
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn stream_chat(
            &self,
            _credential: &str,
            request: ChatRequest,
        ) -> Result<TokenStream, ProviderError> {
            self.requests.lock().unwrap().push(request);
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                return Err(ProviderError::MissingContent);
            }
            let script = scripts.remove(0);
            Ok(Box::pin(tokio_stream::iter(script)))
        }

        async fn complete_structured(
            &self,
            _credential: &str,
            _request: ChatRequest,
            _schema: serde_json::Value,
        ) -> Result<serde_json::Value, ProviderError> {
            unimplemented!("not used in orchestrator tests")
        }
    }

    fn engine_with(provider: ScriptedProvider) -> DebateEngine {
        DebateEngine::new(Arc::new(MemoryStore::new()), Arc::new(provider))
    }

    fn config(rounds: u32) -> DebateConfig {
        let mut config = DebateConfig::new("Testing is worthwhile");
        config.api_key = "test-key".to_string();
        config.rounds = rounds;
        config
    }

    async fn drain(advance: Advance) -> Vec<TurnEvent> {
        match advance {
            Advance::Done { .. } => panic!("expected a streamed turn"),
            Advance::Streaming(mut events) => {
                let mut collected = Vec::new();
                while let Some(event) = events.next().await {
                    collected.push(event.expect("stream errored"));
                }
                collected
            }
        }
    }

    #[tokio::test]
    async fn test_start_requires_rounds() {
        let engine = engine_with(ScriptedProvider::new(vec![]));
        let mut config = config(1);
        config.rounds = 0;
        let result = engine.start(config).await;
        assert!(matches!(result, Err(DebateError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_start_requires_credential() {
        let engine = engine_with(ScriptedProvider::new(vec![]))
            .with_credential_env("DEBATE_ARENA_TEST_UNSET_KEY");
        let mut config = config(1);
        config.api_key = "   ".to_string();
        let result = engine.start(config).await;
        assert!(matches!(result, Err(DebateError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_start_credential_env_fallback() {
        std::env::set_var("DEBATE_ARENA_TEST_KEY", "env-key");
        let engine = engine_with(ScriptedProvider::new(vec![]))
            .with_credential_env("DEBATE_ARENA_TEST_KEY");
        let mut config = config(1);
        config.api_key = String::new();

        let session_id = engine.start(config).await.unwrap();
        let session = engine.store().get(&session_id).await.unwrap();
        assert_eq!(session.config.api_key, "env-key");
        std::env::remove_var("DEBATE_ARENA_TEST_KEY");
    }

    #[tokio::test]
    async fn test_advance_unknown_session() {
        let engine = engine_with(ScriptedProvider::new(vec![]));
        let result = engine.advance("missing").await;
        assert!(matches!(result, Err(DebateError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_single_round_lifecycle() {
        let provider = ScriptedProvider::new(vec![
            ScriptedProvider::fragments(&["Test", "ing ", "matters."]),
            ScriptedProvider::fragments(&["Hardly ", "ever."]),
        ]);
        let engine = engine_with(provider);
        let session_id = engine.start(config(1)).await.unwrap();

        // First advance: pro speaks.
        let events = drain(engine.advance(&session_id).await.unwrap()).await;
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            TurnEvent::Delta {
                role: Role::Pro,
                data: "Test".to_string()
            }
        );
        assert_eq!(
            *events.last().unwrap(),
            TurnEvent::Final {
                role: Role::Pro,
                next_role: Role::Con,
                turns_done: 1,
                finished: false,
            }
        );

        let session = engine.store().get(&session_id).await.unwrap();
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].role, Role::Pro);
        assert_eq!(session.history[0].text, "Testing matters.");
        assert_eq!(session.next_role, Role::Con);

        // Second advance: con speaks and the debate finishes.
        let events = drain(engine.advance(&session_id).await.unwrap()).await;
        assert_eq!(
            *events.last().unwrap(),
            TurnEvent::Final {
                role: Role::Con,
                next_role: Role::Pro,
                turns_done: 2,
                finished: true,
            }
        );

        // Third advance: no-op, history untouched.
        match engine.advance(&session_id).await.unwrap() {
            Advance::Done { history } => {
                assert_eq!(history.len(), 2);
                assert_eq!(history[0].role, Role::Pro);
                assert_eq!(history[1].role, Role::Con);
            }
            Advance::Streaming(_) => panic!("expected done"),
        }
        let session = engine.store().get(&session_id).await.unwrap();
        assert_eq!(session.next_role, Role::Pro);
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn test_whitespace_generation_drops_turn_but_flips_role() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::fragments(&[
            "  ", "\n", "\t ",
        ])]);
        let engine = engine_with(provider);
        let session_id = engine.start(config(2)).await.unwrap();

        let events = drain(engine.advance(&session_id).await.unwrap()).await;
        assert_eq!(
            *events.last().unwrap(),
            TurnEvent::Final {
                role: Role::Pro,
                next_role: Role::Con,
                turns_done: 0,
                finished: false,
            }
        );

        let session = engine.store().get(&session_id).await.unwrap();
        assert!(session.history.is_empty());
        assert_eq!(session.next_role, Role::Con);
    }

    #[tokio::test]
    async fn test_provider_error_mid_stream_persists_nothing() {
        let provider = ScriptedProvider::new(vec![vec![
            Ok("partial ".to_string()),
            Err(ProviderError::Status {
                status: 500,
                body: "upstream".to_string(),
            }),
        ]]);
        let engine = engine_with(provider);
        let session_id = engine.start(config(1)).await.unwrap();

        let mut events = match engine.advance(&session_id).await.unwrap() {
            Advance::Streaming(events) => events,
            Advance::Done { .. } => panic!("expected stream"),
        };
        assert!(matches!(
            events.next().await,
            Some(Ok(TurnEvent::Delta { .. }))
        ));
        assert!(matches!(events.next().await, Some(Err(_))));
        assert!(events.next().await.is_none());

        // Abort left the stored session untouched, including next_role.
        let session = engine.store().get(&session_id).await.unwrap();
        assert!(session.history.is_empty());
        assert_eq!(session.next_role, Role::Pro);
    }

    #[tokio::test]
    async fn test_caller_disconnect_discards_turn() {
        let provider = ScriptedProvider::new(vec![ScriptedProvider::fragments(&[
            "one ", "two ", "three",
        ])]);
        let engine = engine_with(provider);
        let session_id = engine.start(config(1)).await.unwrap();

        match engine.advance(&session_id).await.unwrap() {
            Advance::Streaming(events) => drop(events),
            Advance::Done { .. } => panic!("expected stream"),
        }

        // Give the abandoned task a chance to observe the closed channel.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let session = engine.store().get(&session_id).await.unwrap();
        assert!(session.history.is_empty());
        assert_eq!(session.next_role, Role::Pro);
    }

    #[tokio::test]
    async fn test_concurrent_advances_serialize() {
        let provider = ScriptedProvider::new(vec![
            ScriptedProvider::fragments(&["pro says"]),
            ScriptedProvider::fragments(&["con says"]),
        ]);
        let engine = Arc::new(engine_with(provider));
        let session_id = engine.start(config(1)).await.unwrap();

        let first = {
            let engine = Arc::clone(&engine);
            let id = session_id.clone();
            tokio::spawn(async move { drain(engine.advance(&id).await.unwrap()).await })
        };
        let second = {
            let engine = Arc::clone(&engine);
            let id = session_id.clone();
            tokio::spawn(async move { drain(engine.advance(&id).await.unwrap()).await })
        };

        let _ = first.await.unwrap();
        let _ = second.await.unwrap();

        // Serialized advancement produced strict alternation, no duplicates.
        let session = engine.store().get(&session_id).await.unwrap();
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::Pro);
        assert_eq!(session.history[1].role, Role::Con);
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn test_prompt_context_uses_role_model_and_temperature() {
        let provider = ScriptedProvider::new(vec![
            ScriptedProvider::fragments(&["pro opening"]),
            ScriptedProvider::fragments(&["con reply"]),
        ]);
        let engine_provider = Arc::new(provider);
        let engine = DebateEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::clone(&engine_provider) as Arc<dyn ChatProvider>,
        );

        let mut config = config(1);
        config.pro_model = "models/pro".to_string();
        config.con_model = "models/con".to_string();
        config.con_temperature = 0.95;
        let session_id = engine.start(config).await.unwrap();

        drain(engine.advance(&session_id).await.unwrap()).await;
        drain(engine.advance(&session_id).await.unwrap()).await;

        let requests = engine_provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "models/pro");
        assert_eq!(requests[1].model, "models/con");
        assert!((requests[1].temperature - 0.95).abs() < f32::EPSILON);
        // Con's closing instruction rebuts pro's recorded turn.
        assert!(requests[1]
            .messages
            .last()
            .unwrap()
            .content
            .contains("---pro opening---"));
    }
}
