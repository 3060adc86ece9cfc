//! Persisted key/value settings
//!
//! A small JSON map on disk. The document root lives here under `DOCS_PATH`
//! so an administrator can move the corpus without editing the config file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{RagError, Result};

/// Setting key holding the document root
pub const DOCS_PATH_KEY: &str = "DOCS_PATH";

/// One stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether `set` inserted or replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// File-backed settings map
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every setting; a missing file is an empty map
    pub fn all(&self) -> Result<BTreeMap<String, Setting>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&json).map_err(|e| {
            RagError::ConfigError(format!(
                "Failed to parse settings {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(settings)
    }

    /// Value for `key`, if set
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.all()?.remove(key).map(|s| s.value))
    }

    /// Insert or replace `key`
    pub fn set(&self, key: &str, value: &str) -> Result<Upsert> {
        if key.trim().is_empty() {
            return Err(RagError::InvalidInput("setting key must not be empty".to_string()));
        }

        let mut settings = self.all()?;
        let now = Utc::now();

        let outcome = match settings.get_mut(key) {
            Some(existing) => {
                existing.value = value.to_string();
                existing.updated_at = now;
                Upsert::Updated
            }
            None => {
                settings.insert(
                    key.to_string(),
                    Setting {
                        value: value.to_string(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                Upsert::Created
            }
        };

        self.save(&settings)?;
        info!(key, ?outcome, "setting stored");
        Ok(outcome)
    }

    fn save(&self, settings: &BTreeMap<String, Setting>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Document root: `DOCS_PATH` if stored, otherwise `fallback`
    ///
    /// An unreadable settings file falls back too, with a warning.
    pub fn docs_path(&self, fallback: &Path) -> PathBuf {
        match self.get(DOCS_PATH_KEY) {
            Ok(Some(path)) if !path.trim().is_empty() => PathBuf::from(path),
            Ok(_) => fallback.to_path_buf(),
            Err(e) => {
                warn!(error = %e, "could not read settings, using default document path");
                fallback.to_path_buf()
            }
        }
    }
}
