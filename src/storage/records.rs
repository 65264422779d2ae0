use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::KeyValueStore;

/// A typed record persisted under a fixed key. Each record has exactly one way in and one way
/// out of storage: [load_record] and [save_record].
pub trait PersistedRecord: Sized {
    const KEY: &'static str;

    type Entity: Serialize + DeserializeOwned;

    fn to_entity(&self) -> Self::Entity;

    /// Builds the record from a parsed document, filling absent fields from defaults.
    fn from_entity(entity: Self::Entity, now: DateTime<Utc>) -> Self;

    /// Value used on first run and whenever the stored document is unreadable.
    fn fallback(now: DateTime<Utc>) -> Self;
}

/// Loads a record. Malformed documents degrade to [PersistedRecord::fallback], only failures of
/// the store itself are returned as errors.
pub async fn load_record<R: PersistedRecord>(
    store: &impl KeyValueStore,
    now: DateTime<Utc>,
) -> Result<R> {
    let Some(raw) = store.load(R::KEY).await? else {
        debug!("No stored {}, starting from defaults", R::KEY);
        return Ok(R::fallback(now));
    };

    // Invalid UTF-8 is reported by serde_json like any other syntax error.
    match serde_json::from_slice::<R::Entity>(&raw) {
        Ok(entity) => Ok(R::from_entity(entity, now)),
        Err(e) => {
            warn!("Stored {} is malformed, using defaults: {e}", R::KEY);
            Ok(R::fallback(now))
        }
    }
}

pub async fn save_record<R: PersistedRecord>(store: &impl KeyValueStore, record: &R) -> Result<()> {
    let value = serde_json::to_vec(&record.to_entity())?;
    debug!("Persisting {} as {}", R::KEY, String::from_utf8_lossy(&value));
    store.save(R::KEY, value).await
}
