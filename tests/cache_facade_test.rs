// Tests for the Cache Facade
// These tests exercise the public store/retrieve surface and the
// instrumentation it composes over the in-memory backing store.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use recache::{CacheFacade, CachedValue, KeyValueStore, MemoryStore, TrackedOperation};

#[tokio::test]
async fn test_round_trip_identity_for_each_payload_type() -> Result<()> {
    let facade = CacheFacade::new(Arc::new(MemoryStore::new())).await?;

    let key = facade.store(CachedValue::from("hello")).await?;
    assert_eq!(facade.retrieve_text(&key).await?, Some("hello".to_string()));

    let key = facade.store(CachedValue::Bytes(vec![0, 159, 146, 150])).await?;
    assert_eq!(
        facade.retrieve_raw(&key).await?,
        Some(vec![0, 159, 146, 150])
    );

    let key = facade.store(CachedValue::Int(-42)).await?;
    assert_eq!(facade.retrieve_int(&key).await?, Some(-42));

    let key = facade.store(CachedValue::Float(1.5)).await?;
    let decoded = facade
        .retrieve(&key, |bytes| {
            Ok(std::str::from_utf8(bytes)?.parse::<f64>()?)
        })
        .await?;
    assert_eq!(decoded, Some(1.5));

    Ok(())
}

#[tokio::test]
async fn test_generated_keys_are_unique() -> Result<()> {
    let facade = CacheFacade::new(Arc::new(MemoryStore::new())).await?;

    let mut keys = HashSet::new();
    for i in 0..100 {
        let key = facade.store(CachedValue::Int(i)).await?;
        assert!(keys.insert(key), "key {key} was produced twice");
    }
    assert_eq!(keys.len(), 100);
    Ok(())
}

#[tokio::test]
async fn test_absent_key_yields_none_not_error() -> Result<()> {
    let facade = CacheFacade::new(Arc::new(MemoryStore::new())).await?;
    let never_stored = recache::CacheKey::generate();

    assert_eq!(facade.retrieve_raw(&never_stored).await?, None);
    assert_eq!(facade.retrieve_text(&never_stored).await?, None);
    assert_eq!(facade.retrieve_int(&never_stored).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_counter_and_history_track_every_store_call() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;
    let name = facade.store_operation().clone();

    let values = [
        CachedValue::from("a"),
        CachedValue::from("b"),
        CachedValue::Int(3),
    ];
    let mut returned_keys = Vec::new();
    for value in &values {
        returned_keys.push(facade.store(value.clone()).await?);
    }

    // Counter equals the number of calls, stored as decimal text
    assert_eq!(store.get(name.counter_key()).await?, Some(b"3".to_vec()));

    // Parallel sequences: inputs[i] is the serialized i-th argument list,
    // outputs[i] the serialized i-th returned key
    let inputs = store.range(&name.inputs_key(), 0, -1).await?;
    let outputs = store.range(&name.outputs_key(), 0, -1).await?;
    assert_eq!(inputs.len(), 3);
    assert_eq!(outputs.len(), 3);
    for (i, value) in values.iter().enumerate() {
        assert_eq!(inputs[i], value.to_string().into_bytes());
        assert_eq!(
            outputs[i],
            format!("{:?}", returned_keys[i].to_string()).into_bytes()
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_retrieval_is_not_instrumented() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;
    let name = facade.store_operation().clone();

    let key = facade.store(CachedValue::from("tracked")).await?;
    for _ in 0..5 {
        facade.retrieve_text(&key).await?;
    }

    // Only the single store call shows up in the record
    assert_eq!(store.get(name.counter_key()).await?, Some(b"1".to_vec()));
    assert_eq!(store.range(&name.inputs_key(), 0, -1).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_construction_discards_all_prior_data() -> Result<()> {
    let store = Arc::new(MemoryStore::new());

    let facade = CacheFacade::new(store.clone()).await?;
    let key = facade.store(CachedValue::from("survives?")).await?;
    assert!(facade.retrieve_raw(&key).await?.is_some());

    // A second facade over the same store starts a fresh session
    let fresh = CacheFacade::new(store.clone()).await?;
    assert_eq!(fresh.retrieve_raw(&key).await?, None);

    // Counters and history went with it
    let name = fresh.store_operation();
    assert_eq!(store.get(name.counter_key()).await?, None);
    assert!(store.range(&name.inputs_key(), 0, -1).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_counters_accumulate_across_facades_without_reset() -> Result<()> {
    // Two facades sharing one store: the record is keyed by operation name,
    // not by facade instance, so their calls land in the same counter
    let store = Arc::new(MemoryStore::new());
    let facade = CacheFacade::new(store.clone()).await?;
    let name = facade.store_operation().clone();

    facade.store(CachedValue::Int(1)).await?;
    facade.store(CachedValue::Int(2)).await?;

    let other = recache::StoreValue::new(store.clone() as Arc<dyn KeyValueStore>)?;
    let other = recache::instrument(other, store.clone() as Arc<dyn KeyValueStore>);
    other.invoke(&[CachedValue::Int(3)]).await?;

    assert_eq!(store.get(name.counter_key()).await?, Some(b"3".to_vec()));
    Ok(())
}
