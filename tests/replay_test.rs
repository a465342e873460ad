// Tests for the Replay Reporter
// These tests drive the facade through recorded calls and check the
// rendered trace line by line.

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use recache::{render_replay, CacheFacade, CachedValue, KeyValueStore, MemoryStore};

#[tokio::test]
async fn test_replay_renders_three_calls_in_order() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;

    let key_a = facade.store(CachedValue::from("a")).await?;
    let key_b = facade.store(CachedValue::from("b")).await?;
    let key_3 = facade.store(CachedValue::Int(3)).await?;

    let report = render_replay(store.as_ref(), facade.store_operation()).await?;
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "store was called 3 times:");
    assert_eq!(lines[1], format!("store(\"a\") -> \"{key_a}\""));
    assert_eq!(lines[2], format!("store(\"b\") -> \"{key_b}\""));
    assert_eq!(lines[3], format!("store(3) -> \"{key_3}\""));
    Ok(())
}

#[tokio::test]
async fn test_replay_of_untouched_operation_is_just_the_header() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;

    let report = render_replay(store.as_ref(), facade.store_operation()).await?;
    assert_eq!(report, "store was called 0 times:\n");
    Ok(())
}

#[tokio::test]
async fn test_replay_survives_a_dangling_input() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;
    let name = facade.store_operation().clone();

    let key = facade.store(CachedValue::from("ok")).await?;

    // Simulate a call that died between its input record and its output
    // record: counted, input appended, no output
    store.increment(name.counter_key()).await?;
    store.append(&name.inputs_key(), b"\"lost\"").await?;

    let report = render_replay(store.as_ref(), &name).await?;
    let lines: Vec<&str> = report.lines().collect();

    // Header still reports the counter; pairing stops at the shorter list
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "store was called 2 times:");
    assert_eq!(lines[1], format!("store(\"ok\") -> \"{key}\""));
    Ok(())
}

#[tokio::test]
async fn test_replay_reads_through_the_facades_backing_store_handle() -> Result<()> {
    let facade = CacheFacade::new(Arc::new(MemoryStore::new())).await?;
    facade.store(CachedValue::Float(1.5)).await?;

    let report = render_replay(
        facade.backing_store().as_ref(),
        facade.store_operation(),
    )
    .await?;

    assert!(report.starts_with("store was called 1 times:\n"));
    assert!(report.contains("store(1.5) -> "));
    Ok(())
}
