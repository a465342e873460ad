// Wrapper Components
// This module provides the instrumentation decorators that attach counting
// and call-history behavior to any tracked operation without touching the
// operation's own logic.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::contracts::{KeyValueStore, TrackedOperation};
use crate::observability::{record_metric, MetricType};
use crate::types::{CachedValue, OperationName};

/// Render a positional argument list into its canonical history form.
fn render_args(args: &[CachedValue]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Operation wrapper that counts invocations.
///
/// The counter lives in the backing store under the operation's name, so it
/// survives facade restarts and is shared by every facade instance using the
/// same name. The increment is the store's atomic primitive and completes
/// strictly before the wrapped call executes, so the count reflects
/// attempts, not successes.
pub struct CountedOperation<O: TrackedOperation> {
    inner: O,
    store: Arc<dyn KeyValueStore>,
}

impl<O: TrackedOperation> CountedOperation<O> {
    /// Wrap an operation with invocation counting.
    pub fn new(inner: O, store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<O: TrackedOperation> TrackedOperation for CountedOperation<O> {
    fn name(&self) -> &OperationName {
        self.inner.name()
    }

    async fn invoke(&self, args: &[CachedValue]) -> Result<CachedValue> {
        let name = self.inner.name();
        let count = self
            .store
            .increment(name.counter_key())
            .await
            .with_context(|| format!("Failed to count invocation of {name}"))?;

        debug!(operation = %name, count, "Invocation counted");
        record_metric(MetricType::Counter {
            name: "operation.calls",
            value: 1,
        });

        self.inner.invoke(args).await
    }
}

/// Operation wrapper that records call history.
///
/// Inputs are appended to `<name>:inputs` before the wrapped call runs,
/// outputs to `<name>:outputs` after it returns. The two lists are parallel:
/// the i-th input corresponds to the i-th output. If the wrapped call fails,
/// no output is appended and the input record stays dangling - the replay
/// reporter accounts for that at read time rather than this layer repairing
/// it.
pub struct RecordedOperation<O: TrackedOperation> {
    inner: O,
    store: Arc<dyn KeyValueStore>,
}

impl<O: TrackedOperation> RecordedOperation<O> {
    /// Wrap an operation with input/output history recording.
    pub fn new(inner: O, store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<O: TrackedOperation> TrackedOperation for RecordedOperation<O> {
    fn name(&self) -> &OperationName {
        self.inner.name()
    }

    async fn invoke(&self, args: &[CachedValue]) -> Result<CachedValue> {
        let name = self.inner.name();
        let rendered = render_args(args);
        self.store
            .append(&name.inputs_key(), rendered.as_bytes())
            .await
            .with_context(|| format!("Failed to record inputs of {name}"))?;
        record_metric(MetricType::Counter {
            name: "history.inputs",
            value: 1,
        });

        let output = self.inner.invoke(args).await?;

        self.store
            .append(&name.outputs_key(), output.to_string().as_bytes())
            .await
            .with_context(|| format!("Failed to record output of {name}"))?;
        record_metric(MetricType::Counter {
            name: "history.outputs",
            value: 1,
        });
        debug!(operation = %name, input = %rendered, "Call recorded");

        Ok(output)
    }
}

/// The full instrumentation stack in its fixed composition order: history
/// recording outermost, counting inside it, so a single call runs
/// append-input, increment, the operation itself, then append-output.
pub type InstrumentedOperation<O> = RecordedOperation<CountedOperation<O>>;

/// Compose the instrumentation stack around an operation.
pub fn instrument<O: TrackedOperation>(
    op: O,
    store: Arc<dyn KeyValueStore>,
) -> InstrumentedOperation<O> {
    let counted = CountedOperation::new(op, Arc::clone(&store));
    RecordedOperation::new(counted, store)
}
