//! Persisted user settings backed by a single JSON file.
//!
//! The store is a flat key-value map. Values are arbitrary JSON and are
//! decoded on access; an unreadable or corrupt file reads as an empty store
//! rather than an error.

use crate::ConfigError;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key under which the user's custom prompt is stored.
pub const CUSTOM_PROMPT_KEY: &str = "custom_prompt";
/// Key under which the user's generation settings are stored.
pub const GENERATION_SETTINGS_KEY: &str = "generation_settings";

/// File-backed key-value settings store.
#[derive(Debug)]
pub struct SettingsStore {
    /// Location of the JSON settings file.
    path: PathBuf,
    /// Serialize write access to the settings file.
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Create a store persisting to the given file, creating parent
    /// directories as needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("initialized settings store (path={})", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Fetch and decode a value, returning `None` when absent or undecodable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.read_map();
        let value = map.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!("undecodable settings value (key={key}): {err}");
                None
            }
        }
    }

    /// Encode and persist a value under a key.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let encoded = serde_json::to_value(value)?;
        let _guard = self.write_lock.lock();
        let mut map = self.read_map();
        let _ = map.insert(key.to_string(), encoded);
        self.write_map(&map)?;
        debug!("persisted settings value (key={key})");
        Ok(())
    }

    /// Remove a key, returning whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, ConfigError> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map();
        let removed = map.remove(key).is_some();
        if removed {
            self.write_map(&map)?;
        }
        Ok(removed)
    }

    /// Read the whole map, treating absence or corruption as empty.
    fn read_map(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("settings file corrupt, treating as empty (path={})", self.path.display());
                Map::new()
            }
        }
    }

    /// Rewrite the settings file atomically via a temp-file rename.
    fn write_map(&self, map: &Map<String, Value>) -> Result<(), ConfigError> {
        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let body = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
            writeln!(file, "{body}")?;
        }
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
