// Redis Store Implementation
// This implements the KeyValueStore protocol against a live Redis server
// over the redis crate's multiplexed async connection.

use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::info;

use crate::contracts::KeyValueStore;
use crate::errors::CacheError;

/// Default server address, database 0.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";

/// Redis-backed key-value store.
///
/// The connection is multiplexed: cloning it is cheap and every command is
/// one round trip on the shared pipe. Counter atomicity is INCR's guarantee,
/// list ordering is RPUSH/LRANGE's. Any transport failure surfaces as
/// `CacheError::Connectivity` with no retry.
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1:6379/`).
    ///
    /// The server is assumed to already be running; this crate does not
    /// manage its lifecycle.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| CacheError::Connectivity(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connectivity(e.to_string()))?;
        info!("Connected to Redis at {}", url);
        Ok(Self { connection })
    }

    /// Connect to `DEFAULT_REDIS_URL`.
    pub async fn connect_default() -> Result<Self> {
        Self::connect(DEFAULT_REDIS_URL).await
    }
}

fn connectivity(e: redis::RedisError) -> CacheError {
    CacheError::Connectivity(e.to_string())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut con = self.connection.clone();
        let value: Option<Vec<u8>> = con.get(key).await.map_err(connectivity)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = con.set(key, value).await.map_err(connectivity)?;
        Ok(())
    }

    async fn increment(&self, counter: &str) -> Result<i64> {
        let mut con = self.connection.clone();
        let value: i64 = con.incr(counter, 1).await.map_err(connectivity)?;
        Ok(value)
    }

    async fn append(&self, list: &str, value: &[u8]) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = con.rpush(list, value).await.map_err(connectivity)?;
        Ok(())
    }

    async fn range(&self, list: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        let mut con = self.connection.clone();
        let items: Vec<Vec<u8>> = con
            .lrange(list, start as isize, end as isize)
            .await
            .map_err(connectivity)?;
        Ok(items)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut con)
            .await
            .map_err(connectivity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running Redis server on the default port; run with
    // `cargo test -- --ignored` against a disposable instance, it flushes
    // the active database.
    #[tokio::test]
    #[ignore]
    async fn test_protocol_round_trip_against_live_server() -> Result<()> {
        let store = RedisStore::connect_default().await?;
        store.clear_all().await?;

        store.set("k", b"v").await?;
        assert_eq!(store.get("k").await?, Some(b"v".to_vec()));
        assert_eq!(store.get("missing").await?, None);

        assert_eq!(store.increment("n").await?, 1);
        assert_eq!(store.increment("n").await?, 2);

        store.append("l", b"a").await?;
        store.append("l", b"b").await?;
        assert_eq!(
            store.range("l", 0, -1).await?,
            vec![b"a".to_vec(), b"b".to_vec()]
        );

        store.clear_all().await?;
        assert_eq!(store.get("k").await?, None);
        Ok(())
    }
}
