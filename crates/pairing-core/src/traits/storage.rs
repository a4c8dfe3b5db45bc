//! Session storage port - short-lived key/value slots scoped to one app session
//!
//! Mirrors the browser `sessionStorage` contract: string keys, string values,
//! cleared when the session ends.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::DomainResult;

pub trait SessionStorage: Send + Sync {
    /// Read a slot
    fn get(&self, key: &str) -> Option<String>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: String);

    /// Remove a slot, returning its previous value
    fn remove(&self, key: &str) -> Option<String>;
}

/// Read and decode a JSON slot. A missing slot is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn SessionStorage,
    key: &str,
) -> DomainResult<Option<T>> {
    storage
        .get(key)
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(Into::into)
}

/// Encode a value as JSON into a slot
pub fn write_json<T: Serialize>(
    storage: &dyn SessionStorage,
    key: &str,
    value: &T,
) -> DomainResult<()> {
    storage.set(key, serde_json::to_string(value)?);
    Ok(())
}
