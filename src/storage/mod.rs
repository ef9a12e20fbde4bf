//! # Persisted Local State
//!
//! A flat key/value store holding JSON strings, mirroring browser local
//! storage. Nothing here is required for rendering: a missing or broken
//! value falls back to its default and the app keeps going.

mod session;

pub use session::Session;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::customize::{FontChoice, StylePreferences, TextColorScheme};
use crate::error::StorageError;
use crate::model::ResumeDocument;
use crate::template::TemplateId;
use crate::validate::FormSection;

pub const RESUME_DATA_KEY: &str = "resumeData";
pub const SELECTED_FONT_KEY: &str = "selectedFont";
pub const SELECTED_TEXT_COLOR_KEY: &str = "selectedTextColor";
pub const TEMPLATE_COLORS_KEY: &str = "templateColors";
pub const CURRENT_SECTION_KEY: &str = "currentSection";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io = |source: std::io::Error| StorageError::Io {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io)?;
        tmp.write_all(value.as_bytes()).map_err(io)?;
        tmp.persist(&path).map_err(|e| io(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

/// Read and parse one key. Any failure is logged and reads as absent.
fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted value, using default");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            let e = StorageError::Corrupt {
                key: key.to_string(),
                source,
            };
            tracing::warn!(key, error = %e, "discarding persisted value");
            None
        }
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Accent map as persisted: template id → hex. Unknown template ids are
/// dropped rather than failing the whole map.
fn read_accents(store: &impl KeyValueStore) -> BTreeMap<TemplateId, String> {
    read_json::<BTreeMap<String, String>>(store, TEMPLATE_COLORS_KEY)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, hex)| match id.parse::<TemplateId>() {
            Ok(template) => Some((template, hex)),
            Err(_) => {
                tracing::warn!(template = %id, "dropping accent for unknown template");
                None
            }
        })
        .collect()
}

/// Everything the builder restores on startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub document: ResumeDocument,
    pub preferences: StylePreferences,
    pub section: FormSection,
}

impl PersistedState {
    /// Read every key once. Never fails.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut document = read_json::<ResumeDocument>(store, RESUME_DATA_KEY).unwrap_or_default();
        let backfilled = document.backfill_empty_sections();
        if backfilled > 0 {
            tracing::debug!(backfilled, "backfilled empty resume sections");
        }

        let mut preferences = StylePreferences {
            font: read_json::<FontChoice>(store, SELECTED_FONT_KEY).unwrap_or_default(),
            text_color: read_json::<TextColorScheme>(store, SELECTED_TEXT_COLOR_KEY).unwrap_or_default(),
            accents: read_accents(store),
        };
        let dropped = preferences.retain_valid_accents();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped accents that are not template swatches");
        }

        let section = read_json::<FormSection>(store, CURRENT_SECTION_KEY).unwrap_or_default();

        Self {
            document,
            preferences,
            section,
        }
    }

    /// Write every key. Stops at the first failure.
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        write_json(store, RESUME_DATA_KEY, &self.document)?;
        write_json(store, SELECTED_FONT_KEY, &self.preferences.font)?;
        write_json(store, SELECTED_TEXT_COLOR_KEY, &self.preferences.text_color)?;
        write_json(store, TEMPLATE_COLORS_KEY, &self.preferences.accents)?;
        write_json(store, CURRENT_SECTION_KEY, &self.section)
    }
}
