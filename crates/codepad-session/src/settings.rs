//! Persisted session token and theme preference.
//!
//! Values live in a flat JSON key/value file under the well-known keys
//! [`TOKEN_KEY`] and [`THEME_KEY`]. Every write re-reads the file, applies one
//! key and writes it back, so concurrent writers (several open views) are
//! last-write-wins per key. These values are advisory UI state; no locking is
//! applied across processes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use codepad_core::Theme;
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type Values = BTreeMap<String, String>;

/// Explicit session/config object handed to the components that need the
/// token or theme.
#[derive(Debug)]
pub struct Settings {
    path: Option<PathBuf>,
    values: RwLock<Values>,
}

impl Settings {
    /// Opens the settings file at `path`. A missing file starts empty and is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = read_values(&path)?;
        Ok(Settings {
            path: Some(path),
            values: RwLock::new(values),
        })
    }

    /// Settings that are never written to disk.
    pub fn in_memory() -> Self {
        Settings {
            path: None,
            values: RwLock::new(Values::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current session token, if someone is logged in.
    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn login(&self, token: impl Into<String>) -> Result<(), SettingsError> {
        self.write(TOKEN_KEY, Some(token.into()))
    }

    pub fn logout(&self) -> Result<(), SettingsError> {
        self.write(TOKEN_KEY, None)
    }

    /// Stored theme; unknown or missing values read as the default.
    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), SettingsError> {
        self.write(THEME_KEY, Some(theme.as_str().to_string()))
    }

    pub fn toggle_theme(&self) -> Result<Theme, SettingsError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: Option<String>) -> Result<(), SettingsError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);

        let Some(path) = &self.path else {
            apply(&mut values, key, value);
            return Ok(());
        };

        let mut on_disk = read_values(path)?;
        apply(&mut on_disk, key, value);
        let json = serde_json::to_string_pretty(&on_disk).map_err(|source| SettingsError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(key, path = %path.display(), "settings written");

        *values = on_disk;
        Ok(())
    }
}

fn apply(values: &mut Values, key: &str, value: Option<String>) {
    match value {
        Some(v) => {
            values.insert(key.to_string(), v);
        }
        None => {
            values.remove(key);
        }
    }
}

fn read_values(path: &Path) -> Result<Values, SettingsError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Values::new()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(Values::new());
    }
    serde_json::from_str(&raw).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })
}
