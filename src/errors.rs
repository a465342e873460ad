// Error Taxonomy
// Typed failures surfaced by the cache facade and its collaborators.
// Store failures bubble to the caller unchanged; the facade adds no retry,
// no backoff, and no circuit breaking.

use thiserror::Error;

/// Failures the cache facade can surface to its callers.
///
/// A missing key is NOT an error anywhere in this crate - retrieval returns
/// `Option::None` for absent keys, and callers distinguishing "never set"
/// from "set to empty" must inspect the option explicitly.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The external key-value store is unreachable, at connection time or
    /// mid-operation.
    #[error("key-value store unreachable: {0}")]
    Connectivity(String),

    /// A stored payload could not be decoded into the requested shape.
    #[error("failed to decode stored value: {0}")]
    Serialization(String),

    /// A key string did not parse as a generated cache key.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),

    /// An operation name failed validation (empty, whitespace, or a
    /// reserved namespace character).
    #[error("invalid operation name: {0}")]
    InvalidOperationName(String),

    /// The recorded counter and history lengths for an operation disagree.
    /// Detected at replay time only; a wrapped call that fails after its
    /// input was recorded leaves exactly this state behind.
    #[error(
        "call history for {name} is inconsistent: counter={counter}, inputs={inputs}, outputs={outputs}"
    )]
    HistoryMismatch {
        name: String,
        counter: u64,
        inputs: usize,
        outputs: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_mismatch_names_all_three_figures() {
        let err = CacheError::HistoryMismatch {
            name: "store".to_string(),
            counter: 3,
            inputs: 3,
            outputs: 2,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("store"));
        assert!(rendered.contains("counter=3"));
        assert!(rendered.contains("inputs=3"));
        assert!(rendered.contains("outputs=2"));
    }
}
