//! Persistence of the groups a user follows.
//!
//! The selection lives in a key-value store under a single key, as a comma-joined list of ids.

use log::{debug, error, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub type GroupId = i32;
pub type GroupSelection = BTreeSet<GroupId>;

/// Key the selection is stored under.
pub const SELECTION_KEY: &str = "UserGroups";

const STORE_FILE: &str = "store.json";
// Maximum allowed size for the store file (1MB)
const MAX_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed store file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store file exceeds the size limit")]
    TooLarge,
    #[error("Store lock poisoned")]
    Poisoned,
}

/// String key-value storage, the collaborator the selection is persisted through.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Key-value store kept as a flat JSON object in one file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at `<dir>/store.json`. The directory is created on first write.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(STORE_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let metadata = fs::metadata(&self.path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(StoreError::TooLarge);
        }

        let reader = BufReader::new(File::open(&self.path)?);
        match serde_json::from_reader(reader)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.read_all()?;
        Ok(map.get(key).and_then(Value::as_str).map(String::from))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = match self.read_all() {
            Ok(map) => map,
            Err(e) => {
                warn!("Discarding unreadable store {}: {}", self.path.display(), e);
                Map::new()
            }
        };
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &map)?;
        writer.flush()?;
        Ok(())
    }
}

/// In-process key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Comma-joined ids, ascending.
pub fn encode(ids: &GroupSelection) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Reads a comma-joined id list. Tokens that are not integers are dropped.
pub fn decode(value: &str) -> GroupSelection {
    value.split(',').filter_map(|token| token.parse().ok()).collect()
}

/// Load, save and toggle of the followed groups over a [`KeyValueStore`].
#[derive(Debug)]
pub struct SelectionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SelectionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current selection; unreadable storage counts as no selection.
    pub fn load(&self) -> GroupSelection {
        match self.store.get(SELECTION_KEY) {
            Ok(Some(value)) => decode(&value),
            Ok(None) => GroupSelection::new(),
            Err(e) => {
                error!("Failed to read group selection: {}", e);
                GroupSelection::new()
            }
        }
    }

    pub fn save(&self, ids: &GroupSelection) {
        debug!("Saving group selection {:?}", ids);
        if let Err(e) = self.store.set(SELECTION_KEY, &encode(ids)) {
            error!("Failed to save group selection: {}", e);
        }
    }

    /// Flips membership of `id`, persists, and returns the new selection.
    pub fn toggle(&self, id: GroupId) -> GroupSelection {
        let mut ids = self.load();
        if !ids.remove(&id) {
            ids.insert(id);
        }
        self.save(&ids);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    fn selection(ids: &[GroupId]) -> GroupSelection {
        ids.iter().copied().collect()
    }

    #[test_case("" => selection(&[]); "empty")]
    #[test_case("12" => selection(&[12]); "single")]
    #[test_case("3,1,2" => selection(&[1, 2, 3]); "unordered")]
    #[test_case("4,x,,5, 6" => selection(&[4, 5]); "junk tokens dropped")]
    #[test_case("7,7" => selection(&[7]); "duplicates collapse")]
    #[test_case("-2" => selection(&[-2]); "negative")]
    fn test_decode(value: &str) -> GroupSelection {
        decode(value)
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&selection(&[30, 4, 12])), "4,12,30");
        assert_eq!(encode(&GroupSelection::new()), "");
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let store = SelectionStore::new(MemoryStore::default());
        store.save(&selection(&[1, 2]));

        assert_eq!(store.toggle(3), selection(&[1, 2, 3]));
        assert_eq!(store.toggle(3), selection(&[1, 2]));
        assert_eq!(store.toggle(1), selection(&[2]));
        assert_eq!(store.toggle(1), selection(&[1, 2]));
        assert_eq!(store.load(), selection(&[1, 2]));
    }

    #[test]
    fn test_save_load_is_idempotent() {
        let store = SelectionStore::new(MemoryStore::default());
        store.save(&selection(&[5, 9]));
        let first = store.load();
        store.save(&first);
        assert_eq!(store.load(), first);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = SelectionStore::new(MemoryStore::default());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() -> Result<(), StoreError> {
        let temp_dir = tempdir()?;
        let store = FileStore::in_dir(temp_dir.path().join("state"));
        assert_eq!(store.get(SELECTION_KEY)?, None);

        store.set(SELECTION_KEY, "1,2")?;
        store.set("other", "kept")?;
        assert_eq!(store.get(SELECTION_KEY)?, Some("1,2".to_string()));
        assert_eq!(store.get("other")?, Some("kept".to_string()));

        let reopened = FileStore::in_dir(temp_dir.path().join("state"));
        assert_eq!(reopened.get(SELECTION_KEY)?, Some("1,2".to_string()));
        Ok(())
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_selection() -> Result<(), StoreError> {
        let temp_dir = tempdir()?;
        let file_store = FileStore::in_dir(temp_dir.path());
        fs::write(file_store.path(), "{ not json")?;

        let store = SelectionStore::new(file_store);
        assert!(store.load().is_empty());

        // Saving over a corrupt file replaces it.
        store.save(&selection(&[8]));
        assert_eq!(store.load(), selection(&[8]));
        Ok(())
    }
}
