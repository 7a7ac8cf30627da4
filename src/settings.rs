//! Persisted engine settings (§3 Settings table).
//!
//! Loaded from a JSON document; missing keys fall back to defaults and
//! unrecognized top-level keys are logged and ignored rather than rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_backup_base_dir() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Save Warden Backups")
}

fn default_max_backups() -> u32 {
    3
}

fn default_max_source_size_mb() -> i64 {
    500
}

fn default_compression_mode() -> CompressionMode {
    CompressionMode::Standard
}

fn default_true() -> bool {
    true
}

fn default_min_free_space_gb() -> u64 {
    2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionMode {
    Standard,
    Maximum,
    Stored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_backup_base_dir")]
    pub backup_base_dir: PathBuf,

    #[serde(default = "default_max_backups")]
    pub max_backups: u32,

    /// -1 means unlimited.
    #[serde(default = "default_max_source_size_mb")]
    pub max_source_size_mb: i64,

    #[serde(default = "default_compression_mode")]
    pub compression_mode: CompressionMode,

    #[serde(default = "default_true")]
    pub check_free_space_enabled: bool,

    #[serde(default = "default_min_free_space_gb")]
    pub min_free_space_gb: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_base_dir: default_backup_base_dir(),
            max_backups: default_max_backups(),
            max_source_size_mb: default_max_source_size_mb(),
            compression_mode: default_compression_mode(),
            check_free_space_enabled: true,
            min_free_space_gb: default_min_free_space_gb(),
        }
    }
}

impl Settings {
    /// Load from `path`. A missing or unparseable file yields defaults, with
    /// a warning logged for the latter (never an error).
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                log::info!("settings file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
        };

        match serde_json::from_str::<serde_json::Value>(&contents) {
            Ok(value) => {
                warn_on_unknown_keys(&value);
                match serde_json::from_value(value) {
                    Ok(settings) => Ok(settings),
                    Err(e) => {
                        log::warn!("settings file {} is malformed ({e}); using defaults", path.display());
                        Ok(Self::default())
                    }
                }
            }
            Err(e) => {
                log::warn!("settings file {} is not valid JSON ({e}); using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::EngineError::SettingsInvalid(e.to_string()))?;
        crate::profile_store::atomic_write(path, json.as_bytes())
    }

    /// Byte form of `min_free_space_gb`.
    pub fn min_free_space_bytes(&self) -> u64 {
        self.min_free_space_gb * 1024 * 1024 * 1024
    }

    /// Byte form of `max_source_size_mb`, or `None` when unlimited.
    pub fn max_source_size_bytes(&self) -> Option<u64> {
        if self.max_source_size_mb < 0 {
            None
        } else {
            Some(self.max_source_size_mb as u64 * 1024 * 1024)
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "backup_base_dir",
    "max_backups",
    "max_source_size_mb",
    "compression_mode",
    "check_free_space_enabled",
    "min_free_space_gb",
];

fn warn_on_unknown_keys(value: &serde_json::Value) {
    let Some(map) = value.as_object() else { return };
    for key in map.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            log::warn!("ignoring unknown settings key: {key}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.max_backups, 3);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.max_backups, 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_backups": 7}"#).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.max_backups, 7);
        assert_eq!(settings.min_free_space_gb, 2);
    }

    #[test]
    fn unknown_keys_are_ignored_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_backups": 4, "totally_unknown": true}"#).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.max_backups, 4);
    }

    #[test]
    fn max_source_size_bytes_unlimited_when_negative() {
        let mut settings = Settings::default();
        settings.max_source_size_mb = -1;
        assert_eq!(settings.max_source_size_bytes(), None);
    }

    #[test]
    fn round_trip_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.max_backups = 9;
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.max_backups, 9);
    }
}
