use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use anyhow::{anyhow, Result};

use super::KeyValueStore;

/// Keeps documents in process memory. Nothing survives the process; used for throwaway sessions
/// and tests.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        // Nothing else can hold the lock while the store is owned here.
        let mut values = self
            .values
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.into());
        Self {
            values: Mutex::new(values),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        values.insert(key.to_owned(), value);
        Ok(())
    }
}
