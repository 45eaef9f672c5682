use std::collections::HashMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::error::{AppError, AppResult};

/// Process-local store. An optional quota (total bytes) makes writes fail the
/// way a full browser store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(bytes),
        }
    }

    fn poisoned() -> AppError {
        AppError::StorageError("memory store lock poisoned".to_string())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(AppError::StorageError(format!(
                    "quota exceeded while writing {key}"
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
