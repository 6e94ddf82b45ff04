//! Configuration Store - JSON File Persistence
//!
//! A missing file is not an error: it loads the first-run defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fields::{FieldConfig, NamerConfig, Preferences};
use crate::validation::Validator;
use crate::STORAGE_VERSION;

pub const CONFIG_ENV: &str = "SOURCENAMER_CONFIG";
const APP_DIR: &str = "sourcenamer";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Could not determine a configuration directory; pass --config")]
    NoConfigDir,
}

/// On-disk layout: the configuration plus a format version.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    template: String,
    #[serde(default)]
    fields: Vec<FieldConfig>,
    #[serde(default)]
    preferences: Preferences,
}

impl From<StoredConfig> for NamerConfig {
    fn from(stored: StoredConfig) -> Self {
        Self {
            template: stored.template,
            fields: stored.fields,
            preferences: stored.preferences,
        }
    }
}

impl From<&NamerConfig> for StoredConfig {
    fn from(config: &NamerConfig) -> Self {
        Self {
            version: Some(STORAGE_VERSION),
            template: config.template.clone(),
            fields: config.fields.clone(),
            preferences: config.preferences.clone(),
        }
    }
}

/// Default location: `<config dir>/sourcenamer/config.json`.
pub fn default_config_path() -> Result<PathBuf, StoreError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(StoreError::NoConfigDir)
}

pub struct ConfigStore {
    path: PathBuf,
    validator: Validator,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validator: Validator::new(),
        }
    }

    /// Store at `path` if given, else at the platform default location.
    pub fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(default_config_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<NamerConfig, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved configuration, using defaults");
            return Ok(NamerConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "configuration file unreadable");
            e
        })?;
        let stored: StoredConfig = serde_json::from_str(&content).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "configuration file is not valid JSON");
            e
        })?;
        if let Some(version) = stored.version {
            if version > STORAGE_VERSION {
                tracing::warn!(version, supported = STORAGE_VERSION, "configuration written by a newer version");
            }
        }
        tracing::debug!(path = %self.path.display(), fields = stored.fields.len(), "configuration loaded");
        Ok(stored.into())
    }

    /// Normalizes, validates and writes `config`, returning what was written.
    ///
    /// Errors block the write; warnings are logged.
    pub fn save(&self, config: &NamerConfig) -> Result<NamerConfig, StoreError> {
        let mut config = config.clone();
        config.normalize();

        let result = self.validator.validate(&config);
        if !result.valid {
            return Err(StoreError::ValidationFailed(result.error_summary()));
        }
        for violation in &result.violations {
            tracing::warn!(rule = %violation.rule, "{}", violation.message);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&StoredConfig::from(&config))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), fields = config.fields.len(), "configuration saved");
        Ok(config)
    }

    /// Removes the saved file so the next load yields the defaults.
    pub fn reset(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
