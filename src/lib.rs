// Recache - An Instrumented Cache Facade
// Root library module

pub mod observability;
pub mod errors;
pub mod contracts;
pub mod types;
pub mod wrappers;
pub mod cache;
pub mod replay;
pub mod memory_store;
#[cfg(feature = "redis-backend")]
pub mod redis_store;

// Re-export key types
pub use observability::{
    init_logging, init_logging_with_level, log_operation, record_metric, with_trace_id,
    MetricType, Operation,
};

pub use errors::CacheError;

pub use contracts::{KeyValueStore, TrackedOperation};

// Re-export validated types
pub use types::{CacheKey, CachedValue, OperationName};

// Re-export wrappers
pub use wrappers::{instrument, CountedOperation, InstrumentedOperation, RecordedOperation};

// Re-export the facade
pub use cache::{CacheFacade, StoreValue};

// Re-export the replay reporter
pub use replay::{print_replay, render_replay};

// Re-export store implementations
pub use memory_store::MemoryStore;
#[cfg(feature = "redis-backend")]
pub use redis_store::{RedisStore, DEFAULT_REDIS_URL};
