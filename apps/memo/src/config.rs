//! User settings: store location, recognized extensions, queue thresholds.

use memo_core::{Grade, MASTERY_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`Settings::store_path`].
pub const STORE_PATH_ENV: &str = "MEMO_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The problem store file. Its folder is the scan root.
    pub store_path: PathBuf,
    /// File extensions registered as problems, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Problems last graded below this are resurfaced when nothing is due.
    pub mastery_threshold: u8,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            extensions: vec!["sgf".to_string()],
            mastery_threshold: MASTERY_THRESHOLD,
            daily_reset_hour: 0,
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memo")
        .join("memo.db")
}

/// Folder holding the store file at `store_path`; problem ids are relative to it.
pub fn store_folder(store_path: &Path) -> PathBuf {
    match store_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl Settings {
    /// Default location of the settings file.
    pub fn settings_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memo").join("settings.json"))
    }

    /// Load settings from the default file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::settings_file() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        settings.apply_store_override(env::var(STORE_PATH_ENV).ok());
        Ok(settings)
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.normalized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_err)
    }

    /// Replace the store path with a non-empty override.
    pub fn apply_store_override(&mut self, value: Option<String>) {
        if let Some(path) = value.filter(|v| !v.trim().is_empty()) {
            self.store_path = PathBuf::from(path);
        }
    }

    /// Folder that is scanned for problems.
    pub fn scan_root(&self) -> PathBuf {
        store_folder(&self.store_path)
    }

    /// Whether `path` has one of the recognized extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    fn normalized(mut self) -> Self {
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self.mastery_threshold = self.mastery_threshold.clamp(1, Grade::MAX + 1);
        self.daily_reset_hour = self.daily_reset_hour.min(23);
        self
    }
}
