// packages/engine/src/memory/shared_memory.rs
//! Shared memory visible to every agent in an environment
//!
//! Backed by a lock-striped `DashMap`. A `put` is visible to any `get`
//! issued after it returns, from any thread. Racing writes to the same key
//! are last-writer-wins; use [`SharedMemory::update`] when the new value
//! depends on the old one.

use crate::utils::errors::{EngineError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Cloneable handle to one environment's shared key/value store
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    entries: Arc<DashMap<String, Value>>,
}

impl SharedMemory {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `key` with `value`, replacing any previous value
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        trace!("shared put {}", key);
        self.entries.insert(key, value.into());
    }

    /// Current value for `key`, or `None` if it was never set
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Whether a value has been set for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Atomically replace the value for `key` with `f(current)`
    ///
    /// The shard holding `key` stays locked while `f` runs, so concurrent
    /// updates to one key never lose a write. Returns the stored value.
    ///
    /// `f` must not call back into this store (`get`, `put`, `update`, ...):
    /// reaching the locked shard again deadlocks.
    pub fn update<F>(&self, key: impl Into<String>, f: F) -> Value
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                let next = f(Some(occupied.get()));
                occupied.insert(next.clone());
                next
            }
            Entry::Vacant(vacant) => {
                let next = f(None);
                vacant.insert(next.clone());
                next
            }
        }
    }

    /// Add `delta` to an integer counter, treating a missing key as 0
    ///
    /// Fails with `InvalidArgument`, leaving the value untouched, when `key`
    /// holds something other than an `i64` or the sum overflows.
    pub fn increment(&self, key: impl Into<String>, delta: i64) -> Result<i64> {
        let key = key.into();

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let base = occupied.get().as_i64().ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "'{}' does not hold an integer counter",
                        occupied.key()
                    ))
                })?;
                let next = base.checked_add(delta).ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "counter '{}' overflows adding {}",
                        occupied.key(),
                        delta
                    ))
                })?;

                occupied.insert(Value::from(next));
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Value::from(delta));
                Ok(delta)
            }
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Point-in-time copy, ordered by key
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_put_get() {
        let memory = SharedMemory::new();
        memory.put("announcement", "System update available");

        assert_eq!(
            memory.get("announcement"),
            Some(json!("System update available"))
        );
        assert!(memory.contains("announcement"));
    }

    #[test]
    fn test_missing_key() {
        let memory = SharedMemory::new();
        assert_eq!(memory.get("nothing"), None);
        assert!(!memory.contains("nothing"));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let memory = SharedMemory::new();
        memory.put("k", 1);
        memory.put("k", json!({"nested": true}));

        assert_eq!(memory.get("k"), Some(json!({"nested": true})));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let memory = SharedMemory::new();
        let handle = memory.clone();
        handle.put("seen", true);

        assert_eq!(memory.get("seen"), Some(json!(true)));
    }

    #[test]
    fn test_snapshot_and_keys_sorted() {
        let memory = SharedMemory::new();
        memory.put("b", 2);
        memory.put("a", 1);

        assert_eq!(memory.keys(), vec!["a".to_string(), "b".to_string()]);
        let snapshot = memory.snapshot();
        assert_eq!(snapshot.into_iter().next(), Some(("a".to_string(), json!(1))));
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let memory = SharedMemory::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memory = memory.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        memory.increment("counter", 1).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(memory.get("counter"), Some(json!(4000)));
    }

    #[test]
    fn test_increment_rejects_non_counters_and_overflow() {
        let memory = SharedMemory::new();

        memory.put("label", "not a number");
        assert!(matches!(
            memory.increment("label", 1),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(memory.get("label"), Some(json!("not a number")));

        assert_eq!(memory.increment("c", i64::MAX).unwrap(), i64::MAX);
        assert!(memory.increment("c", 1).is_err());
        assert_eq!(memory.get("c"), Some(json!(i64::MAX)));

        assert_eq!(memory.increment("c", -1).unwrap(), i64::MAX - 1);
    }

    #[test]
    fn test_concurrent_puts_on_distinct_keys() {
        let memory = SharedMemory::new();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let memory = memory.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        memory.put(format!("t{}-{}", t, i), i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(memory.len(), 1000);
        assert_eq!(memory.get("t3-249"), Some(json!(249)));
    }

    proptest! {
        #[test]
        fn prop_put_then_get_returns_value(key in ".{0,16}", value in any::<i64>()) {
            let memory = SharedMemory::new();
            memory.put(key.clone(), value);
            prop_assert_eq!(memory.get(&key), Some(json!(value)));
        }
    }
}
