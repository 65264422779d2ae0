use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::debug;

use crate::fs::operations::{read_locked, write_locked};

use super::KeyValueStore;

/// The main realization of [KeyValueStore]. Each key lives in `<dir>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Storage key {key:?} may only contain ASCII letters, digits, '-' and '_'");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        debug!("Loading {key} from {path:?}");
        Ok(read_locked(&path).await?)
    }

    async fn save(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        debug!("Saving {key} into {path:?}");
        write_locked(&path, &value).await?;
        Ok(())
    }
}
