//! Whole-snapshot persistence for the inventory.
//!
//! The inventory is stored as a single JSON blob under one key of a
//! key-value byte store. Loading never fails: a missing slot and an
//! unreadable or malformed blob both yield an empty inventory.

use crate::error::Result;
use crate::model::Inventory;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key of the inventory snapshot. The suffix versions the layout.
pub const STORAGE_KEY: &str = "rackboard-v1";

/// A key-value byte store owned by this application.
pub trait Storage {
    /// Read a slot. `Ok(None)` when the slot was never written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a slot's contents.
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(key);
        // Write beside the target and rename so readers never see half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot with raw bytes.
    pub fn with_slot(mut self, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.slots.insert(key.to_string(), bytes.into());
        self
    }

    pub fn slot(&self, key: &str) -> Option<&[u8]> {
        self.slots.get(key).map(Vec::as_slice)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.slots.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Loads and saves the inventory snapshot through a [`Storage`].
#[derive(Debug, Clone)]
pub struct Persistence<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: STORAGE_KEY.to_string(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Last saved inventory, or an empty one if there is nothing usable.
    pub fn load(&self) -> Inventory {
        let bytes = match self.storage.read(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "no saved inventory");
                return Inventory::default();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read saved inventory, starting empty");
                return Inventory::default();
            }
        };

        match serde_json::from_slice::<Inventory>(&bytes) {
            Ok(inventory) => {
                debug!(
                    servers = inventory.servers.len(),
                    services = inventory.services.len(),
                    "loaded inventory"
                );
                inventory
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "saved inventory is malformed, starting empty");
                Inventory::default()
            }
        }
    }

    /// Overwrite the snapshot with the full inventory.
    pub fn save(&mut self, inventory: &Inventory) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(inventory)?;
        self.storage.write(&self.key, &bytes)?;
        debug!(bytes = bytes.len(), "saved inventory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Server, Service, Status};
    use tempfile::TempDir;

    fn sample() -> Inventory {
        Inventory {
            servers: vec![Server {
                id: "srv".into(),
                name: "srv-1".into(),
                ip: "10.0.0.1".into(),
                note: "edge".into(),
                status: Status::Inactive,
            }],
            services: vec![Service {
                id: "svc".into(),
                name: "api".into(),
                desc: "rust".into(),
                server_id: "srv".into(),
                status: Status::Inactive,
            }],
        }
    }

    #[test]
    fn test_load_missing_slot_is_empty() {
        let persistence = Persistence::new(MemoryStorage::new());
        assert_eq!(persistence.load(), Inventory::default());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let storage = MemoryStorage::new().with_slot(STORAGE_KEY, "{not json");
        let persistence = Persistence::new(storage);
        assert_eq!(persistence.load(), Inventory::default());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let storage = MemoryStorage::new().with_slot(STORAGE_KEY, r#"{"servers": 42}"#);
        let persistence = Persistence::new(storage);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_load_missing_collections_defaults_to_empty() {
        let storage = MemoryStorage::new().with_slot(STORAGE_KEY, "{}");
        let persistence = Persistence::new(storage);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_load_legacy_layout_defaults_status_to_active() {
        let legacy = r#"{
            "servers": [{"id": "a", "name": "srv", "ip": "10.0.0.1", "note": ""}],
            "services": [{"id": "b", "name": "api", "desc": "", "serverId": "a"}]
        }"#;
        let storage = MemoryStorage::new().with_slot(STORAGE_KEY, legacy);
        let inventory = Persistence::new(storage).load();
        assert_eq!(inventory.servers[0].status, Status::Active);
        assert_eq!(inventory.services[0].status, Status::Active);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut persistence = Persistence::new(MemoryStorage::new());
        let inventory = sample();
        persistence.save(&inventory).unwrap();
        assert_eq!(persistence.load(), inventory);
    }

    #[test]
    fn test_saved_layout_uses_expected_field_names() {
        let mut persistence = Persistence::new(MemoryStorage::new());
        persistence.save(&sample()).unwrap();
        let raw = persistence.storage().slot(STORAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
        assert_eq!(value["servers"][0]["ip"], "10.0.0.1");
        assert_eq!(value["servers"][0]["status"], "inactive");
        assert_eq!(value["services"][0]["serverId"], "srv");
        assert_eq!(value["services"][0]["desc"], "rust");
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path().join("data"));
        let mut persistence = Persistence::new(storage);
        persistence.save(&sample()).unwrap();

        let reopened = Persistence::new(FileStorage::with_dir(temp_dir.path().join("data")));
        assert_eq!(reopened.load(), sample());
    }

    #[test]
    fn test_file_storage_overwrites_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::with_dir(temp_dir.path());
        storage.write("slot", b"first").unwrap();
        storage.write("slot", b"second").unwrap();

        assert_eq!(storage.read("slot").unwrap().unwrap(), b"second");
        assert!(!temp_dir.path().join("slot.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_missing_slot_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path());
        assert!(storage.read("absent").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_garbage_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path());
        fs::write(storage.slot_path(STORAGE_KEY), b"\x00\x01garbage").unwrap();
        assert!(Persistence::new(storage).load().is_empty());
    }
}
