// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::loader::ConfigSource;
use crate::procedure::ProcedureAlias;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_timeout() -> u64 {
    30
}

fn default_source() -> ConfigSource {
    ConfigSource::File {
        path: crate::get_config_root().join("procedures.json"),
    }
}

/// Procedure literals whose fix cannot be read from the name itself.
fn default_aliases() -> Vec<ProcedureAlias> {
    vec![ProcedureAlias {
        airport: "EGLC".to_string(),
        procedure: "ODUKU1H".to_string(),
        fix: "BPK".to_string(),
        suffix: "1H".to_string(),
    }]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_source")]
    pub source: ConfigSource,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Mirror of the last downloaded document.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    /// Log the verbose line of every evaluation.
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_aliases")]
    pub procedure_aliases: Vec<ProcedureAlias>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: default_source(),
            request_timeout_secs: default_timeout(),
            cache_path: None,
            debug: false,
            procedure_aliases: default_aliases(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("settings.json")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| crate::get_config_root().join("procedures.cache.json"))
    }

    /// Loads settings from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file; using defaults — path={}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create settings directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.procedure_aliases.len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            source: ConfigSource::Http {
                url: "https://example.com/sids.json".to_string(),
            },
            debug: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"debug": true, "request_timeout_secs": 5}"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.source, default_source());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
