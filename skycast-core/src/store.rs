//! Persisted blob store: a get/set string store plus the two values the
//! session keeps across runs (saved locations, theme). Callers tolerate
//! absent or corrupt values by falling back to defaults; writes are
//! fire-and-forget from the session's point of view.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::model::{Coordinate, Theme};

pub const SAVED_LOCATIONS_KEY: &str = "saved_locations";
pub const THEME_KEY: &str = "theme";

pub trait KvStore: Send + Sync + Debug {
    /// Stored value for `key`, or `None` when absent/unreadable.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-per-key store under the platform data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::at(dirs.data_dir().to_path_buf()))
    }

    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.dir.join(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write store entry: {}", path.display()))
    }
}

/// In-memory store; backs tests and any caller that wants a throwaway
/// session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("store mutex poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Insertion-ordered favorite list, deduplicated by exact (lat, lon)
/// equality and serialized as JSON through the store.
#[derive(Debug, Default)]
pub struct SavedLocations {
    entries: Vec<Coordinate>,
}

impl SavedLocations {
    /// Read the list back, degrading to empty on absence or corruption.
    pub fn load(store: &dyn KvStore) -> Self {
        let Some(raw) = store.get(SAVED_LOCATIONS_KEY) else {
            return Self::default();
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Self { entries },
            Err(err) => {
                tracing::warn!("Ignoring corrupt saved-location list: {err}");
                Self::default()
            }
        }
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries.iter().any(|entry| entry.same_point(coordinate))
    }

    /// Append unless an equal coordinate is already present. Returns
    /// whether the list changed.
    pub fn push(&mut self, coordinate: Coordinate) -> bool {
        if self.contains(&coordinate) {
            return false;
        }
        self.entries.push(coordinate);
        true
    }

    /// Write the list through the store. Failures are logged and swallowed:
    /// persistence never blocks or fails the main flow.
    pub fn persist(&self, store: &dyn KvStore) {
        let serialized = match serde_json::to_string(&self.entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!("Failed to serialize saved locations: {err}");
                return;
            }
        };

        if let Err(err) = store.set(SAVED_LOCATIONS_KEY, &serialized) {
            tracing::warn!("Failed to persist saved locations: {err:#}");
        }
    }

    pub fn entries(&self) -> &[Coordinate] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Theme name from the store; absent or unrecognized values fall back to
/// the default theme.
pub fn load_theme(store: &dyn KvStore) -> Theme {
    store
        .get(THEME_KEY)
        .map(|name| Theme::from_name(&name))
        .unwrap_or_default()
}

pub fn persist_theme(store: &dyn KvStore, theme: Theme) {
    if let Err(err) = store.set(THEME_KEY, theme.name()) {
        tracing::warn!("Failed to persist theme: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn coordinate(lat: f64, lon: f64, name: &str) -> Coordinate {
        Coordinate {
            latitude: lat,
            longitude: lon,
            display_name: name.to_string(),
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::at(dir.path().join("store"));

        assert_eq!(store.get("missing"), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn saved_locations_roundtrip_through_store() {
        let store = MemoryStore::default();

        let mut saved = SavedLocations::default();
        assert!(saved.push(coordinate(50.45, 30.52, "Kyiv")));
        assert!(saved.push(coordinate(49.84, 24.03, "Lviv")));
        saved.persist(&store);

        let reloaded = SavedLocations::load(&store);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0].display_name, "Kyiv");
        assert_eq!(reloaded.entries()[1].display_name, "Lviv");
    }

    #[test]
    fn saved_locations_dedup_by_point() {
        let mut saved = SavedLocations::default();
        assert!(saved.push(coordinate(50.45, 30.52, "Kyiv")));
        assert!(!saved.push(coordinate(50.45, 30.52, "Kiev")));
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn corrupt_saved_locations_degrade_to_empty() {
        let store = MemoryStore::default();
        store.set(SAVED_LOCATIONS_KEY, "{not json").unwrap();

        let saved = SavedLocations::load(&store);
        assert!(saved.is_empty());
    }

    #[test]
    fn absent_theme_defaults_to_light() {
        let store = MemoryStore::default();
        assert_eq!(load_theme(&store), Theme::Light);

        persist_theme(&store, Theme::Dark);
        assert_eq!(load_theme(&store), Theme::Dark);
    }

    #[test]
    fn unknown_theme_name_defaults_to_light() {
        let store = MemoryStore::default();
        store.set(THEME_KEY, "mauve").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }
}
