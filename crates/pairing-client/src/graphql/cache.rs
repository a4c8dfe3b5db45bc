//! In-memory query cache
//!
//! Results are stored as raw JSON keyed by operation name and canonical
//! variables, so any typed operation can be decoded from the same entry.
//! Mutations evict by operation name.

use std::time::Instant;

use dashmap::DashMap;
use tracing::debug;

/// Cache key: operation name + variables serialized with sorted keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: String,
    pub variables: String,
}

impl CacheKey {
    pub fn new(operation: &str, variables: &serde_json::Value) -> Self {
        // serde_json maps are ordered, so equal variables give equal strings
        Self {
            operation: operation.to_string(),
            variables: variables.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    data: serde_json::Value,
    stored_at: Instant,
}

/// Concurrent cache of query results
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<CacheKey, CachedEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Age of an entry
    pub fn age(&self, key: &CacheKey) -> Option<std::time::Duration> {
        self.entries.get(key).map(|entry| entry.stored_at.elapsed())
    }

    pub fn put(&self, key: CacheKey, data: serde_json::Value) {
        self.entries.insert(
            key,
            CachedEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    /// Evict every entry of the named operations, returning how many were removed
    pub fn invalidate(&self, operations: &[&str]) -> usize {
        if operations.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !operations.contains(&key.operation.as_str()));
        let removed = before.saturating_sub(self.entries.len());
        debug!(?operations, removed, "Invalidated cached queries");
        removed
    }

    /// Drop everything (sign-out)
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_field_order() {
        let a = CacheKey::new("ListUsers", &json!({ "search": "ada", "organizationId": "o1" }));
        let b = CacheKey::new("ListUsers", &json!({ "organizationId": "o1", "search": "ada" }));
        assert_eq!(a, b);
    }

    #[test]
    fn test_put_get() {
        let cache = QueryCache::new();
        let key = CacheKey::new("CurrentUser", &json!({}));
        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), json!({ "me": { "id": "u1" } }));
        assert_eq!(cache.get(&key).unwrap()["me"]["id"], "u1");
        assert!(cache.age(&key).is_some());
    }

    #[test]
    fn test_invalidate_by_name() {
        let cache = QueryCache::new();
        cache.put(CacheKey::new("ListUsers", &json!({ "search": "a" })), json!(1));
        cache.put(CacheKey::new("ListUsers", &json!({ "search": "b" })), json!(2));
        cache.put(CacheKey::new("CurrentUser", &json!({})), json!(3));

        assert_eq!(cache.invalidate(&["ListUsers"]), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.invalidate(&[]), 0);
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.put(CacheKey::new("MyPairings", &json!({})), json!([]));
        cache.clear();
        assert!(cache.is_empty());
    }
}
