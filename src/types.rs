// Validated Types
// Strongly-typed wrappers that enforce invariants at construction time.
// These types cannot be built from invalid data, so the rest of the crate
// never re-checks them.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::CacheError;

/// A payload the cache can hold.
///
/// Identity is the key a value is stored under, never its content: there is
/// no content addressing and no deduplication. Two equal payloads stored
/// twice get two distinct keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedValue {
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
}

impl CachedValue {
    /// Canonical byte encoding written to the store.
    ///
    /// Text, integers, and floats all land as their textual rendering, so a
    /// value written as `Int(42)` reads back as the bytes `b"42"` and can be
    /// decoded by `retrieve_int` or `retrieve_text` alike.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            CachedValue::Text(text) => text.as_bytes().to_vec(),
            CachedValue::Bytes(bytes) => bytes.clone(),
            CachedValue::Int(n) => n.to_string().into_bytes(),
            CachedValue::Float(x) => x.to_string().into_bytes(),
        }
    }

    /// Size of the canonical encoding, for logging.
    pub fn encoded_len(&self) -> usize {
        match self {
            CachedValue::Text(text) => text.len(),
            CachedValue::Bytes(bytes) => bytes.len(),
            CachedValue::Int(n) => n.to_string().len(),
            CachedValue::Float(x) => x.to_string().len(),
        }
    }
}

/// Display is the canonical history form: quoted text, `b"..."` bytes with
/// ASCII escapes, bare numbers. Call history and replay output both use it.
impl fmt::Display for CachedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachedValue::Text(text) => write!(f, "{text:?}"),
            CachedValue::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
            CachedValue::Int(n) => write!(f, "{n}"),
            CachedValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for CachedValue {
    fn from(text: &str) -> Self {
        CachedValue::Text(text.to_string())
    }
}

impl From<String> for CachedValue {
    fn from(text: String) -> Self {
        CachedValue::Text(text)
    }
}

impl From<Vec<u8>> for CachedValue {
    fn from(bytes: Vec<u8>) -> Self {
        CachedValue::Bytes(bytes)
    }
}

impl From<i64> for CachedValue {
    fn from(n: i64) -> Self {
        CachedValue::Int(n)
    }
}

impl From<f64> for CachedValue {
    fn from(x: f64) -> Self {
        CachedValue::Float(x)
    }
}

/// A storage key that is guaranteed to be globally unique.
///
/// Keys are generated at store time from a random 128-bit UUID and are never
/// derived from the value they point at. Collision resistance is delegated
/// to the generator; the facade does not double-check uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    inner: Uuid,
}

impl CacheKey {
    /// Generate a fresh key.
    pub fn generate() -> Self {
        Self {
            inner: Uuid::new_v4(),
        }
    }

    /// Create from an existing UUID with validation.
    pub fn from_uuid(id: Uuid) -> Result<Self> {
        ensure!(!id.is_nil(), "Cache key cannot be the nil UUID");
        Ok(Self { inner: id })
    }

    /// Parse a key from its string rendering.
    pub fn parse(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s).map_err(|e| CacheError::InvalidKey(format!("{s}: {e}")))?;
        Self::from_uuid(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.inner
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A stable, qualified name for an instrumented operation.
///
/// The name is the key namespace for everything the instrumentation records:
/// the counter lives under the name itself, the history lists under
/// `<name>:inputs` and `<name>:outputs`. Two facade instances using the same
/// name share one record in the backing store.
///
/// # Invariants
/// - Non-empty after trimming
/// - No whitespace
/// - No `:` (reserved as the history-list separator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationName {
    inner: String,
}

impl OperationName {
    /// Create a validated operation name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(CacheError::InvalidOperationName("name is empty".to_string()).into());
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(CacheError::InvalidOperationName(format!(
                "{trimmed:?} contains whitespace"
            ))
            .into());
        }
        if trimmed.contains(':') {
            return Err(CacheError::InvalidOperationName(format!(
                "{trimmed:?} contains the reserved character ':'"
            ))
            .into());
        }

        Ok(Self {
            inner: trimmed.to_string(),
        })
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Store key holding this operation's invocation counter.
    pub fn counter_key(&self) -> &str {
        &self.inner
    }

    /// Store list holding this operation's recorded inputs.
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.inner)
    }

    /// Store list holding this operation's recorded outputs.
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.inner)
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
