//! The storage seam every service talks to.
//!
//! Services never touch LMDB directly; they receive an `Arc<dyn KeyValueStore>`
//! so tests can hand them a [`MemoryStore`] instead of a real environment.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::app_response::AppResponse;

/// Key-value string store holding JSON documents under static key names.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Removes `key`. Returns `false` when nothing was stored under it.
    fn remove(&self, key: &str) -> Result<bool, AppResponse>;
}

/// In-memory [`KeyValueStore`] used by tests and by hosts that do not need
/// persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> AppResponse {
        AppResponse::DatabaseError("Memory store lock poisoned".to_string())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, AppResponse> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.remove(key).is_some())
    }
}
