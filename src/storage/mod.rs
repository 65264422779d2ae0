//! Persistence for the two small records the application keeps.
//!  - [KeyValueStore] is the raw keyed storage, holding one JSON document per key as bytes.
//!  - [records] maps typed records onto those keys with a single load/save pair.
//!  - [file_store::FileStore] keeps every key in its own file in the application directory.

pub mod entities;
pub mod file_store;
pub mod memory_store;
pub mod records;

use std::{future::Future, ops::Deref};

use anyhow::Result;

/// Interface for abstracting the keyed storage records are written into.
pub trait KeyValueStore {
    /// Returns the stored document, or `None` when the key was never written.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Overwrites the document stored under `key`.
    fn save(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        self.deref().load(key)
    }

    fn save(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        self.deref().save(key, value)
    }
}
