// In-Memory Store Implementation
// This implements the KeyValueStore protocol with process-local maps.
// Used as the zero-infrastructure backend and by the test suite.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::contracts::KeyValueStore;

/// Process-local key-value store.
///
/// Counters share the value map with plain keys and are kept as decimal
/// text, matching what a networked store would hand back. Increments run
/// under the write lock, which is what makes them atomic here.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
    lists: RwLock<HashMap<String, Vec<Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Clamp an LRANGE-style index pair onto a list of length `len`, returning
/// the resolved inclusive bounds, or `None` when the range selects nothing.
fn resolve_range(start: i64, end: i64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let mut start = if start < 0 { start + len } else { start };
    let mut end = if end < 0 { end + len } else { end };
    if start < 0 {
        start = 0;
    }
    if end >= len {
        end = len - 1;
    }
    if start > end || start >= len || end < 0 {
        return None;
    }
    Some((start as usize, end as usize))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn increment(&self, counter: &str) -> Result<i64> {
        let mut values = self.values.write().await;
        let current = match values.get(counter) {
            Some(bytes) => std::str::from_utf8(bytes)
                .context("Counter holds non-UTF-8 bytes")?
                .parse::<i64>()
                .context("Counter holds a non-integer value")?,
            None => 0,
        };
        let next = current + 1;
        values.insert(counter.to_string(), next.to_string().into_bytes());
        Ok(next)
    }

    async fn append(&self, list: &str, value: &[u8]) -> Result<()> {
        self.lists
            .write()
            .await
            .entry(list.to_string())
            .or_default()
            .push(value.to_vec());
        Ok(())
    }

    async fn range(&self, list: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        let lists = self.lists.read().await;
        let Some(items) = lists.get(list) else {
            return Ok(Vec::new());
        };
        match resolve_range(start, end, items.len()) {
            Some((start, end)) => Ok(items[start..=end].to_vec()),
            None => Ok(Vec::new()),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        self.values.write().await.clear();
        self.lists.write().await.clear();
        Ok(())
    }
}
