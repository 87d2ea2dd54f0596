//! The room state service.
//!
//! Every operation is one load of the room document, an in-memory
//! transformation and at most one write back. Nothing here locks across that
//! cycle: two requests for the same room can interleave and the last `set` wins.

mod ai;
mod room;
mod submission;
mod vote;

pub use ai::GeneratedAnswer;
pub use submission::ANSWER_RECORDED;
pub use vote::VOTE_RECORDED;

use crate::llm::{LlmConfig, LlmError, LlmProvider};
use crate::store::{KvStore, StoreError};
use crate::types::{RoomId, RoomState};
use std::sync::Arc;

/// Errors returned by room operations
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The request is missing a field or carries an invalid value
    #[error("{0}")]
    InvalidInput(String),

    /// The room exists but is not in a state that allows the operation
    #[error("{0}")]
    InvalidState(String),

    /// The room has no stored state yet
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to encode room state: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Shared application state: the injected store and text-generation collaborators
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub llm_config: LlmConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, llm: Arc<dyn LlmProvider>, llm_config: LlmConfig) -> Self {
        Self {
            store,
            llm,
            llm_config,
        }
    }

    /// Load a room document; documents that do not decode as a room state count as absent
    async fn load_room(&self, room: &RoomId) -> Result<Option<RoomState>, RoomError> {
        let Some(raw) = self.store.get(&room.state_key()).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<RoomState>(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!("Discarding malformed state for room {}: {}", room, e);
                Ok(None)
            }
        }
    }

    /// Replace the stored room document
    async fn save_room(&self, room: &RoomId, state: &RoomState) -> Result<(), RoomError> {
        let raw = serde_json::to_string(state)?;
        self.store.set(&room.state_key(), raw).await?;
        Ok(())
    }
}

/// Treat missing and whitespace-only strings alike
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::llm::CannedProvider;
    use crate::store::MemoryStore;

    /// An app state over a fresh memory store, plus a handle to that store
    pub fn memory_state() -> (AppState, MemoryStore) {
        with_provider(Arc::new(CannedProvider::new()))
    }

    pub fn with_provider(llm: Arc<dyn LlmProvider>) -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), llm, LlmConfig::default());
        (state, store)
    }

    /// Raw stored document for a room
    pub async fn stored(store: &MemoryStore, room: &str) -> Option<serde_json::Value> {
        let raw = store
            .get(&RoomId::resolve(Some(room)).state_key())
            .await
            .unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }

    /// Store a room whose question `index` is active
    pub async fn started_room(state: &AppState, room: &str, index: i64) {
        let room = RoomId::resolve(Some(room));
        let doc = RoomState {
            current_question: index,
            ..RoomState::default()
        };
        state.save_room(&room, &doc).await.unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::store::KvStore;

    #[tokio::test]
    async fn test_malformed_document_loads_as_absent() {
        let (state, store) = memory_state();
        store
            .set("room:r1:state", "not json".to_string())
            .await
            .unwrap();

        let loaded = state.load_room(&RoomId::resolve(Some("r1"))).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (state, _store) = memory_state();
        let room = RoomId::resolve(Some("r1"));
        let doc = RoomState {
            current_question: 2,
            ..RoomState::default()
        };

        state.save_room(&room, &doc).await.unwrap();

        assert_eq!(state.load_room(&room).await.unwrap(), Some(doc));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("G1")), Some("G1"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
