//! Key-value store collaborators.
//!
//! Room documents are stored as JSON text under a single key per room. The
//! store only has to offer atomic `get`/`set` per key; there are no
//! transactions, so concurrent writers to one room race and the last write wins.

mod memory;
mod redis_store;

use async_trait::async_trait;
use crate::config::env_non_empty;
use std::sync::Arc;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store command failed: {0}")]
    Command(String),
}

/// Trait that all key-value backends must implement
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Get the name of this backend
    fn name(&self) -> &str;
}

/// Which backend holds the room documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// In-process map; state is lost on restart
    Memory,
    /// Redis server at the given URL
    Redis { url: String },
}

impl StoreConfig {
    /// Load config from STORE_BACKEND and REDIS_URL (or KV_URL)
    pub fn from_env() -> Self {
        let url = env_non_empty("REDIS_URL").or_else(|| env_non_empty("KV_URL"));

        match (env_non_empty("STORE_BACKEND").map(|b| b.to_lowercase()).as_deref(), url) {
            (Some("memory"), _) => Self::Memory,
            (Some("redis") | None, Some(url)) => Self::Redis { url },
            (Some("redis"), None) => {
                tracing::warn!("STORE_BACKEND=redis but REDIS_URL is not set, using memory store");
                Self::Memory
            }
            (None, None) => {
                tracing::warn!("No REDIS_URL set, using memory store - state is lost on restart!");
                Self::Memory
            }
            (Some(other), _) => {
                tracing::warn!("Unknown STORE_BACKEND '{}', using memory store", other);
                Self::Memory
            }
        }
    }

    /// Connect to the configured backend
    pub async fn connect(&self) -> StoreResult<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::Redis { url } => Arc::new(RedisStore::connect(url).await?),
        };
        Ok(store)
    }
}
