// Replay Reporter
// Reconstructs and renders the recorded call trace for one instrumented
// operation. The store handle and operation name come in explicitly; the
// reporter discovers nothing reflectively.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use tracing::warn;

use crate::contracts::KeyValueStore;
use crate::errors::CacheError;
use crate::observability::{log_operation, Operation, OperationContext};
use crate::types::OperationName;

/// Render the full call trace recorded for `name`.
///
/// Output is a summary line `<name> was called <count> times:` followed by
/// one line per recorded pair, `<name>(<input>) -> <output>`, in call order.
/// The count comes from the counter, decoded from its decimal-text form; an
/// absent counter renders as 0.
///
/// When the counter disagrees with the history lengths, or the two lists
/// differ in length (a wrapped call that failed mid-flight leaves a dangling
/// input), the reporter logs a warning naming all three figures and pairs up
/// to the shorter list. It never errors over inconsistent history: the
/// report stays available exactly when it is most interesting.
pub async fn render_replay(store: &dyn KeyValueStore, name: &OperationName) -> Result<String> {
    let counter = match store
        .get(name.counter_key())
        .await
        .with_context(|| format!("Failed to read the counter for {name}"))?
    {
        Some(bytes) => std::str::from_utf8(&bytes)
            .map_err(|e| CacheError::Serialization(e.to_string()))?
            .trim()
            .parse::<u64>()
            .map_err(|e| CacheError::Serialization(format!("counter for {name}: {e}")))?,
        None => 0,
    };

    let inputs = store
        .range(&name.inputs_key(), 0, -1)
        .await
        .with_context(|| format!("Failed to read recorded inputs of {name}"))?;
    let outputs = store
        .range(&name.outputs_key(), 0, -1)
        .await
        .with_context(|| format!("Failed to read recorded outputs of {name}"))?;

    if counter as usize != inputs.len() || inputs.len() != outputs.len() {
        let mismatch = CacheError::HistoryMismatch {
            name: name.to_string(),
            counter,
            inputs: inputs.len(),
            outputs: outputs.len(),
        };
        warn!(%mismatch, "Call history is inconsistent; pairing up to the shorter list");
    }

    let mut report = String::new();
    writeln!(report, "{name} was called {counter} times:")?;
    for (input, output) in inputs.iter().zip(outputs.iter()) {
        writeln!(
            report,
            "{}({}) -> {}",
            name,
            String::from_utf8_lossy(input),
            String::from_utf8_lossy(output)
        )?;
    }

    let ctx = OperationContext::new("cache.replay");
    log_operation(
        &ctx,
        &Operation::Replay {
            name: name.to_string(),
            pairs: inputs.len().min(outputs.len()),
        },
        &Ok(()),
    );

    Ok(report)
}

/// Render the call trace for `name` and write it to stdout.
pub async fn print_replay(store: &dyn KeyValueStore, name: &OperationName) -> Result<()> {
    let report = render_replay(store, name).await?;
    print!("{report}");
    Ok(())
}
