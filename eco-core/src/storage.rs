use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eco_types::{LedgerSnapshot, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Per-device key/value persistence for ledger snapshots.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<LedgerSnapshot>, StorageError>;
    async fn save(&self, key: &str, snapshot: &LedgerSnapshot) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: LedgerStorage + ?Sized> LedgerStorage for Arc<S> {
    async fn load(&self, key: &str) -> Result<Option<LedgerSnapshot>, StorageError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        (**self).save(key, snapshot).await
    }
}

/// Storage key scoped to one user.
pub fn scoped_key(storage_key: &str, user_id: UserId) -> String {
    format!("{}:{}", storage_key, user_id)
}

/// Keeps serialized snapshots in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses every write, like a full browser quota.
    pub fn read_only() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            reject_writes: true,
        }
    }

    /// Put raw bytes under a key, bypassing serialization.
    pub fn insert_raw(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<LedgerSnapshot>, StorageError> {
        let payload = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?
            .get(key)
            .cloned();

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        if self.reject_writes {
            return Err(StorageError::Backend("storage quota exceeded".to_string()));
        }

        let payload = serde_json::to_string(snapshot)?;
        self.insert_raw(key, &payload)
    }
}
