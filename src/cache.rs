// Cache Facade
// The public store/retrieve surface over the external key-value store.
// Composes the instrumentation wrappers around its store operation at
// construction time.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::contracts::{KeyValueStore, TrackedOperation};
use crate::errors::CacheError;
use crate::observability::{log_operation, with_trace_id, Operation, OperationContext};
use crate::types::{CacheKey, CachedValue, OperationName};
use crate::wrappers::{instrument, InstrumentedOperation};

/// The facade's store operation: generate a unique key, write the value
/// under it, hand the key back. Packaged as a `TrackedOperation` so the
/// instrumentation stack can wrap it.
pub struct StoreValue {
    name: OperationName,
    store: Arc<dyn KeyValueStore>,
}

impl StoreValue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            name: OperationName::new("store")?,
            store,
        })
    }
}

#[async_trait]
impl TrackedOperation for StoreValue {
    fn name(&self) -> &OperationName {
        &self.name
    }

    async fn invoke(&self, args: &[CachedValue]) -> Result<CachedValue> {
        anyhow::ensure!(
            args.len() == 1,
            "store takes exactly one value, got {}",
            args.len()
        );
        let value = &args[0];
        let key = CacheKey::generate();

        let mut ctx = OperationContext::new("cache.store");
        ctx.add_attribute("key", key.to_string());
        ctx.add_attribute("size", value.encoded_len().to_string());

        let result = self
            .store
            .set(&key.to_string(), &value.to_bytes())
            .await
            .context("Failed to write value to the backing store");

        log_operation(
            &ctx,
            &Operation::CacheWrite {
                key: key.as_uuid(),
                size_bytes: value.encoded_len(),
            },
            &result.as_ref().map(|_| ()).map_err(|e| anyhow::anyhow!("{e}")),
        );
        result?;

        Ok(CachedValue::Text(key.to_string()))
    }
}

/// Cache facade over an external key-value store.
///
/// Owns the unique-key generation policy and the instrumentation of its
/// store operation. Retrieval is deliberately NOT instrumented: only
/// creating operations are tracked, which bounds history growth to creation
/// events.
///
/// # Construction is destructive
///
/// `CacheFacade::new` clears ALL existing data in the backing store - every
/// prior key, counter, and history list is discarded. This is a deliberate
/// fresh-session contract. The store's key namespace is global and flat, so
/// a second facade built over the same store wipes the first one's data too.
pub struct CacheFacade {
    store: Arc<dyn KeyValueStore>,
    store_op: InstrumentedOperation<StoreValue>,
}

impl CacheFacade {
    /// Connect the facade to a backing store and reset that store to empty.
    ///
    /// Fails only if the store is unreachable. See the type-level warning:
    /// the reset discards all data in the active store, irreversibly.
    pub async fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        with_trace_id("cache.init", async {
            store
                .clear_all()
                .await
                .context("Failed to reset the backing store")?;
            warn!("Backing store reset: all prior keys, counters, and history discarded");

            let ctx = OperationContext::new("cache.init");
            log_operation(&ctx, &Operation::StoreReset, &Ok(()));

            let store_op = instrument(StoreValue::new(Arc::clone(&store))?, Arc::clone(&store));
            Ok(Self { store, store_op })
        })
        .await
    }

    /// Store a value under a freshly generated unique key and return the key.
    ///
    /// Counted and recorded: each call increments the `store` counter and
    /// appends to the input/output history before/after the write. No retry
    /// on connectivity failure - the increment lands before the write, so a
    /// blind retry would double-count.
    pub async fn store(&self, value: CachedValue) -> Result<CacheKey> {
        let output = self
            .store_op
            .invoke(std::slice::from_ref(&value))
            .await?;
        match output {
            CachedValue::Text(text) => CacheKey::parse(&text),
            other => bail!("store produced a non-key result: {other}"),
        }
    }

    /// Read the raw bytes stored under `key`.
    ///
    /// Returns `None` for a key that was never set (or has been wiped by a
    /// later facade construction) - never an error. Not instrumented.
    pub async fn retrieve_raw(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let found = self
            .store
            .get(&key.to_string())
            .await
            .context("Failed to read from the backing store")?;

        debug!(key = %key, found = found.is_some(), "Cache read");
        let mut ctx = OperationContext::new("cache.retrieve");
        ctx.add_attribute("key", key.to_string());
        log_operation(
            &ctx,
            &Operation::CacheRead {
                key: key.as_uuid(),
                found: found.is_some(),
            },
            &Ok(()),
        );

        Ok(found)
    }

    /// Read the value under `key` and decode it with `transform`.
    ///
    /// The transform only runs when the key is present; absence stays
    /// `None`.
    pub async fn retrieve<T, F>(&self, key: &CacheKey, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        match self.retrieve_raw(key).await? {
            Some(bytes) => Ok(Some(transform(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read the value under `key` as UTF-8 text.
    pub async fn retrieve_text(&self, key: &CacheKey) -> Result<Option<String>> {
        self.retrieve(key, |bytes| {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            Ok(text.to_string())
        })
        .await
    }

    /// Read the value under `key` as a decimal integer.
    pub async fn retrieve_int(&self, key: &CacheKey) -> Result<Option<i64>> {
        self.retrieve(key, |bytes| {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            let n = text
                .parse::<i64>()
                .map_err(|e| CacheError::Serialization(format!("{text:?}: {e}")))?;
            Ok(n)
        })
        .await
    }

    /// The qualified name under which `store` calls are counted and
    /// recorded. Hand this to the replay reporter together with
    /// `backing_store()`.
    pub fn store_operation(&self) -> &OperationName {
        self.store_op.name()
    }

    /// The backing store handle, for the replay reporter and for callers
    /// composing their own instrumented operations over the same store.
    pub fn backing_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}
