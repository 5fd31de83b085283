// packages/engine/src/memory/agent_memory.rs
//! Private memory owned by a single agent

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Key under which an agent stores the output of its most recent `act`
pub const LAST_OUTPUT_KEY: &str = "last_output";

/// Per-agent key/value store
///
/// Never shared between agents. It is still behind a mutex because an
/// agent is driven through `&self` from worker threads.
#[derive(Debug, Default)]
pub struct AgentMemory {
    entries: Mutex<HashMap<String, Value>>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    pub fn recall(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    pub fn forget(&self, key: &str) -> Option<Value> {
        self.entries.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remember_recall_forget() {
        let memory = AgentMemory::new();
        memory.remember(LAST_OUTPUT_KEY, "Agent says: Hi there!");

        assert_eq!(memory.recall(LAST_OUTPUT_KEY), Some(json!("Agent says: Hi there!")));
        assert_eq!(memory.len(), 1);

        assert!(memory.forget(LAST_OUTPUT_KEY).is_some());
        assert!(memory.recall(LAST_OUTPUT_KEY).is_none());
        assert!(memory.is_empty());
    }
}
