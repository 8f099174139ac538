//! Session persistence.

mod memory;

use async_trait::async_trait;

use crate::debate::Session;

pub use memory::MemoryStore;

/// Key-value persistence of session state.
///
/// Implementations only need get/replace semantics; the debate engine owns
/// per-session serialization of read-modify-write cycles.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by identifier.
    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Insert or replace a session.
    async fn put(&self, session_id: &str, session: Session);
}
