use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Key under which frontends cache the logged-in session
pub const SESSION_KEY: &str = "session";

/// Key under which frontends keep the `EditorConfig`
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("failed (de)serializing stored value")]
    Serde(#[from] serde_json::Error),
}

/// String-keyed local persistence, as offered by browsers' local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&mut self, key: &str);

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            None => Ok(None),
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
        }
    }

    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_string(value)?;
        self.set(key, &value)
    }
}

/// In-memory store. Clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Store refusing writes that would bring the total size of keys and values
    /// above `bytes`
    pub fn with_quota(bytes: usize) -> MemoryStore {
        MemoryStore {
            data: Rc::default(),
            quota: Some(bytes),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.borrow().keys().cloned().collect()
    }

    fn used_without(&self, key: &str) -> usize {
        self.data
            .borrow()
            .iter()
            .filter(|(k, _)| *k != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) {
        self.data.borrow_mut().remove(key);
    }
}
