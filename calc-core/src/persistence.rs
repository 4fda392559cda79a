//! Local persistence used for resume-on-restart.
//!
//! A [`SnapshotStore`] is a plain key-value store of JSON values. The
//! calculator only ever reaches it through [`StateSnapshots`], which scopes
//! keys under a fixed namespace and turns every failure into a logged
//! warning: persistence is a convenience, never a durability guarantee.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Prefix shared by every key the calculator writes.
pub const NAMESPACE: &str = "calculator_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait SnapshotStore: Send {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<Value>, StoreError>;

    fn set(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Removes every key starting with `prefix`.
    fn clear(
        &mut self,
        prefix: &str,
    ) -> Result<(), StoreError>;
}

/// Process-local store. Clones share the same underlying map, so a test
/// can hand one clone to a calculator and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn clear(
        &mut self,
        prefix: &str,
    ) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

/// Namespaced, failure-tolerant access to a [`SnapshotStore`].
pub struct StateSnapshots {
    store: Box<dyn SnapshotStore>,
    namespace: &'static str,
}

impl StateSnapshots {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            store,
            namespace: NAMESPACE,
        }
    }

    fn full_key(
        &self,
        key: &str,
    ) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Returns `None` when nothing is stored or the stored value is unusable.
    pub fn load<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Option<T> {
        let full_key = self.full_key(key);
        let value = match self.store.get(&full_key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(error) => {
                warn!(key = %full_key, %error, "failed to read snapshot, starting fresh");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                warn!(key = %full_key, %error, "discarding malformed snapshot");
                None
            }
        }
    }

    pub fn save<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
    ) {
        let full_key = self.full_key(key);
        let result = serde_json::to_value(value)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&full_key, json));

        if let Err(error) = result {
            warn!(key = %full_key, %error, "failed to save snapshot");
        }
    }

    /// Drops every key in the namespace.
    pub fn clear(&mut self) {
        if let Err(error) = self.store.clear(self.namespace) {
            warn!(namespace = self.namespace, %error, "failed to clear snapshots");
        }
    }
}
