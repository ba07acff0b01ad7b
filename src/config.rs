use std::path::PathBuf;

use crate::adguard::AdGuardBackend;
use crate::common::Result;
use crate::panel::{FilePreferences, MemoryPreferences, PreferenceStore};

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `REWRITES_ADGUARD__BASE_URL`.
pub const ENV_PREFIX: &str = "REWRITES";

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub adguard: crate::adguard::Config,

    /// JSON file holding view preferences such as the page size.
    /// Preferences only live for the process when unset.
    pub preferences: Option<PathBuf>,
}

impl Config {
    #[cfg(feature = "cli")]
    pub fn from_env() -> Result<Self> {
        ::config::Config::builder()
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|err| {
                crate::common::ConfigSnafu {
                    message: err.to_string(),
                    prefix: ENV_PREFIX,
                }
                .build()
            })
    }

    pub fn backend(&self) -> Result<AdGuardBackend> {
        AdGuardBackend::try_from(self.adguard.clone())
    }

    pub fn preference_store(&self) -> Result<Box<dyn PreferenceStore>> {
        Ok(match &self.preferences {
            Some(path) => Box::new(FilePreferences::load(path)?),
            None => Box::new(MemoryPreferences::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{stored_page_size, PAGE_SIZE_KEY};

    fn config(preferences: Option<PathBuf>) -> Config {
        Config {
            adguard: crate::adguard::Config {
                base_url: url::Url::parse("http://127.0.0.1:3000/").unwrap(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
            },
            preferences,
        }
    }

    #[test]
    fn builds_backend_from_settings() {
        assert!(config(None).backend().is_ok());
    }

    #[test]
    fn preference_store_follows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut prefs = config(Some(path.clone())).preference_store().unwrap();
        prefs.set(PAGE_SIZE_KEY, 20.into()).unwrap();
        assert!(path.exists());

        let prefs = config(Some(path)).preference_store().unwrap();
        assert_eq!(stored_page_size(&prefs), 20);
    }
}
