//! # File-backed State Store

//! Keeps each door's last settled state in its own JSON file under a directory.
//! Files are replaced through a temporary file and a rename so a reader never sees a half-written record.
//! Anything unreadable is reported as absent so the door falls back to its default state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::errors::{GarageDoorError, GarageDoorResult};
use crate::models::local_now;
use crate::repositories::StateStore;

/// The on-disk form of one stored state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDoorRecord {
    /// The key the record was written under
    pub key: String,
    /// `true` if the door last settled OPEN
    pub value: bool,
    pub updated_at: NaiveDateTime,
}

/// A state store writing one JSON file per key
#[derive(Debug, Clone)]
pub struct FileStateRepository {
    dir: PathBuf,
}

impl FileStateRepository {
    /// Opens a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> GarageDoorResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("State store opened at {:?}", dir);
        Ok(Self { dir })
    }

    /// The file a key is stored in
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced, so distinct keys can share a file;
    /// the key stored inside the record disambiguates them on read.
    pub fn record_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_stem))
    }

    fn read_record(&self, path: &Path) -> GarageDoorResult<Option<PersistedDoorRecord>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl StateStore for FileStateRepository {
    fn get(&self, key: &str) -> Option<bool> {
        let path = self.record_path(key);
        match self.read_record(&path) {
            Ok(Some(record)) if record.key == key => Some(record.value),
            Ok(Some(record)) => {
                warn!("State file {:?} belongs to {:?}, not {:?}; ignoring", path, record.key, key);
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Unreadable state for {:?} at {:?}, treating as absent: {}", key, path, e);
                None
            }
        }
    }

    fn set(&self, key: &str, open: bool) -> GarageDoorResult<()> {
        let record = PersistedDoorRecord {
            key: key.to_string(),
            value: open,
            updated_at: local_now(),
        };
        let path = self.record_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let contents = serde_json::to_vec_pretty(&record)?;
        fs::write(&tmp_path, contents)
            .and_then(|_| fs::rename(&tmp_path, &path))
            .map_err(|e| GarageDoorError::PersistenceError(format!("Failed to write {:?}: {}", path, e)))?;

        debug!("Persisted {} = {} to {:?}", key, open, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileStateRepository::open(dir.path()).unwrap();
        assert_eq!(store.get("Dummy Garage"), None);
    }

    #[test]
    fn values_survive_reopening() {
        let dir = TempDir::new().unwrap();
        let store = FileStateRepository::open(dir.path()).unwrap();
        store.set("Dummy Garage", false).unwrap();
        store.set("Dummy Garage", true).unwrap();
        store.set("Side Door", false).unwrap();

        let reopened = FileStateRepository::open(dir.path()).unwrap();
        assert_eq!(reopened.get("Dummy Garage"), Some(true));
        assert_eq!(reopened.get("Side Door"), Some(false));
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileStateRepository::open(dir.path()).unwrap();
        fs::write(store.record_path("Dummy Garage"), "{not json").unwrap();
        assert_eq!(store.get("Dummy Garage"), None);
    }

    #[test]
    fn colliding_file_names_do_not_leak_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateRepository::open(dir.path()).unwrap();
        store.set("Dummy Garage", false).unwrap();
        assert_eq!(store.record_path("Dummy Garage"), store.record_path("Dummy_Garage"));
        assert_eq!(store.get("Dummy_Garage"), None);
    }
}
