//! Small string key-value store, the stand-in for browser local storage.
//!
//! Holds the auth token and the theme preference. Implementations use
//! interior mutability so a single `Arc` handle can be shared between the
//! theme store and the API client.

use anyhow::Result;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const TOKEN_KEY: &str = "token";
pub const THEME_COLOR_KEY: &str = "themeColor";
pub const THEME_MODE_KEY: &str = "theme";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local storage; forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens `storage.json` in the data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::data_dir()?.join("storage.json"))
    }

    /// Opens (or starts) the store at `path`. An unreadable or corrupt file
    /// is backed up next to itself and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            Self::read_entries(&path)
        } else {
            log::debug!("Storage file {} does not exist yet", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("SYNE_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let dirs = ProjectDirs::from("com", "syne", "syne")
            .ok_or_else(|| anyhow::anyhow!("Could not determine the data directory"))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    fn read_entries(path: &Path) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read storage file {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        if content.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to parse storage file {}: {}", path.display(), e);
                let backup_path = path.with_extension("bak");
                if let Err(e) = std::fs::copy(path, &backup_path) {
                    log::warn!("Failed to backup broken storage file: {}", e);
                } else {
                    log::info!("Backed up broken storage file to: {}", backup_path.display());
                }
                BTreeMap::new()
            }
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create storage directory: {} - {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).map_err(|e| {
            anyhow::anyhow!(
                "Failed to write storage file: {} - {}",
                self.path.display(),
                e
            )
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
