use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use snafu::ResultExt;

use crate::common::{PreferenceSnafu, Result};

use super::DEFAULT_PAGE_SIZE;

pub const PAGE_SIZE_KEY: &str = "rewrites_page_size";

/// Key/value storage for view preferences that outlive a session.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Stored page size, or the default when missing or unusable.
pub fn stored_page_size(store: &impl PreferenceStore) -> usize {
    store
        .get(PAGE_SIZE_KEY)
        .and_then(|v| v.as_u64())
        .and_then(|v| usize::try_from(v).ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Box<T> {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, serde_json::Value>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: HashMap<String, serde_json::Value>,
}

impl FilePreferences {
    /// A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .boxed_local()
                .context(PreferenceSnafu {
                    message: "Failed to parse preferences",
                    path: &path,
                })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err).boxed_local().context(PreferenceSnafu {
                    message: "Failed to read preferences",
                    path,
                })
            }
        };
        Ok(Self { path, values })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .boxed_local()
                .context(PreferenceSnafu {
                    message: "Failed to create directory for",
                    path: &self.path,
                })?;
        }
        let text = serde_json::to_string_pretty(&self.values)
            .boxed_local()
            .context(PreferenceSnafu {
                message: "Failed to encode preferences for",
                path: &self.path,
            })?;
        fs::write(&self.path, text)
            .boxed_local()
            .context(PreferenceSnafu {
                message: "Failed to write preferences",
                path: &self.path,
            })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
