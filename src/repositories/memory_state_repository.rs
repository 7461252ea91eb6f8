use dashmap::DashMap;
use crate::errors::GarageDoorResult;
use crate::repositories::StateStore;

/// In-process state store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStateRepository {
    states: DashMap<String, bool>,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `open` under `key`
    pub fn with_state(key: &str, open: bool) -> Self {
        let store = Self::new();
        store.states.insert(key.to_string(), open);
        store
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateStore for MemoryStateRepository {
    fn get(&self, key: &str) -> Option<bool> {
        self.states.get(key).map(|entry| *entry.value())
    }

    fn set(&self, key: &str, open: bool) -> GarageDoorResult<()> {
        self.states.insert(key.to_string(), open);
        Ok(())
    }
}
