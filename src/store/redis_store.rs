use super::*;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed store
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`)
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        // ConnectionManager is a cheap handle onto a shared multiplexed connection
        let mut conn = self.connection.clone();
        conn.get(key)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }

    fn name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let result = RedisStore::connect("not a url").await;
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }

    #[tokio::test]
    #[ignore] // Only run with Redis running locally
    async fn test_redis_round_trip() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        let store = RedisStore::connect(&url).await.unwrap();

        store
            .set("room:quizroom-test:state", "{}".to_string())
            .await
            .unwrap();
        let value = store.get("room:quizroom-test:state").await.unwrap();
        assert_eq!(value.as_deref(), Some("{}"));
    }
}
