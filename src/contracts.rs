// Contract-First Design
// This module defines the contracts (preconditions, postconditions,
// invariants) for the two seams of the system: the external key-value store
// protocol, and the tracked-operation interface that instrumentation wraps.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CachedValue, OperationName};

/// The external key-value store protocol.
///
/// The store is an external collaborator: it owns the actual bytes, the
/// counters, and the history lists. This crate never implements durability
/// or eviction of its own, and every method is one round trip.
///
/// All failures from the store bubble unchanged to the caller; implementors
/// must not retry internally.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Postconditions
    /// - Returns `Some(bytes)` if the key is set
    /// - Returns `None` if the key was never set or has expired - absence
    ///   is not an error anywhere in this protocol
    /// - Does not modify any state
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`, overwriting any previous value.
    ///
    /// # Postconditions
    /// - A subsequent `get(key)` observes exactly these bytes
    /// - One key maps to exactly one value at a time
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Atomically add one to the integer stored under `counter`.
    ///
    /// # Preconditions
    /// - The key is unset or holds a decimal integer rendering
    ///
    /// # Postconditions
    /// - Returns the post-increment value
    /// - An unset counter is treated as 0, so the first increment returns 1
    ///
    /// # Invariants
    /// - Atomicity is the store's guarantee: concurrent increments never
    ///   lose updates
    async fn increment(&self, counter: &str) -> Result<i64>;

    /// Append `value` to the tail of the list named `list`.
    ///
    /// # Postconditions
    /// - The list grows by exactly one element
    /// - Existing elements keep their positions (append-only ordering)
    async fn append(&self, list: &str, value: &[u8]) -> Result<()>;

    /// Read elements `start..=end` of the list named `list`.
    ///
    /// Indices follow Redis LRANGE semantics: both ends inclusive, negative
    /// indices count from the tail, so `range(list, 0, -1)` reads the whole
    /// list.
    ///
    /// # Postconditions
    /// - Elements come back in append order
    /// - Out-of-bounds ranges yield an empty vector, not an error
    async fn range(&self, list: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>>;

    /// Discard every key, counter, and list in the active store.
    ///
    /// # Postconditions
    /// - The store is observably empty
    /// - Irreversible: there is no undo
    async fn clear_all(&self) -> Result<()>;
}

/// A single operation the instrumentation layer can wrap.
///
/// The signature is fixed: a positional argument list in, a single value
/// out. The name is the stable identity under which counts and history are
/// recorded - it must not change across process restarts, or the operation
/// starts a fresh record.
#[async_trait]
pub trait TrackedOperation: Send + Sync {
    /// The stable, qualified name of this operation.
    fn name(&self) -> &OperationName;

    /// Execute the operation.
    ///
    /// # Postconditions
    /// - On success, returns the operation's single result value
    /// - On failure, no result value exists (wrappers rely on this to skip
    ///   the output record)
    async fn invoke(&self, args: &[CachedValue]) -> Result<CachedValue>;
}
