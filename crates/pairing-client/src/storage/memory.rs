//! In-memory session storage

use std::collections::HashMap;

use parking_lot::RwLock;
use pairing_core::SessionStorage;

/// Process-lifetime storage, the headless equivalent of `sessionStorage`
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.slots.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.slots.write().remove(key)
    }
}
