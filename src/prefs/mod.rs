//! Persisted user preferences: filter text, collapsed flag, active target.
//!
//! The engine only ever reads and writes plain strings through
//! [`PreferenceStore`]. Values are read leniently: absent or malformed
//! values fall back to defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Preference keys
pub mod keys {
    pub const FILTER: &str = "filter";
    pub const COLLAPSED: &str = "collapsed";
    pub const ACTIVE: &str = "active";
    pub const DEBUG: &str = "debug";
}

/// String-valued key/value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Box<P> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }
}

/// `"1"` is true; anything else, including absence, is false.
pub fn read_flag<P: PreferenceStore + ?Sized>(store: &P, key: &str) -> bool {
    store.get(key).is_some_and(|v| v.trim() == "1")
}

pub fn write_flag<P: PreferenceStore + ?Sized>(store: &mut P, key: &str, value: bool) {
    store.set(key, if value { "1" } else { "0" });
}

/// Volatile store, used by tests and when no config directory exists.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs {
    values: BTreeMap<String, String>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// JSON-file backed store, rewritten on every change.
#[derive(Debug, Clone)]
pub struct FilePrefs {
    values: BTreeMap<String, String>,
    path: PathBuf,
}

impl FilePrefs {
    /// Open the store in the user config directory.
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Self::load_from(config_dir.join("respnav").join("prefs.json"))
    }

    /// Open the store at `path`. A missing file is an empty store; a file
    /// that does not parse is ignored rather than reported.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self { values, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all values to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;

        std::fs::write(&self.path, content).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to persist preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_read_leniently() {
        let mut prefs = MemoryPrefs::new();
        assert!(!read_flag(&prefs, keys::COLLAPSED));

        prefs.set(keys::COLLAPSED, "yes");
        assert!(!read_flag(&prefs, keys::COLLAPSED));

        write_flag(&mut prefs, keys::COLLAPSED, true);
        assert_eq!(prefs.get(keys::COLLAPSED).as_deref(), Some("1"));
        assert!(read_flag(&prefs, keys::COLLAPSED));
    }

    #[test]
    fn file_prefs_persist_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut prefs = FilePrefs::load_from(&path).unwrap();
        assert!(prefs.get(keys::FILTER).is_none());
        prefs.set(keys::FILTER, "good");
        prefs.set(keys::ACTIVE, "m3");

        let reloaded = FilePrefs::load_from(&path).unwrap();
        assert_eq!(reloaded.get(keys::FILTER).as_deref(), Some("good"));
        assert_eq!(reloaded.get(keys::ACTIVE).as_deref(), Some("m3"));
    }

    #[test]
    fn malformed_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let prefs = FilePrefs::load_from(&path).unwrap();
        assert!(prefs.get(keys::FILTER).is_none());
    }
}
