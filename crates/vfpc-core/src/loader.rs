// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::{ConfigDocument, ConfigError};
use crate::registry::Registry;
use crate::settings::Settings;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the procedure document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConfigSource {
    Http { url: String },
    File { path: PathBuf },
}

impl ConfigSource {
    /// `http://` and `https://` values become HTTP sources, anything else a file path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            ConfigSource::Http {
                url: value.to_string(),
            }
        } else {
            ConfigSource::File {
                path: PathBuf::from(value),
            }
        }
    }

    pub fn fetch(&self, timeout: Duration) -> Result<String, ConfigError> {
        match self {
            ConfigSource::Http { url } => {
                info!("Fetching procedure data — url={} timeout_secs={}", url, timeout.as_secs());
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()?;
                let body = client.get(url).send()?.error_for_status()?.text()?;
                debug!("Downloaded procedure data — bytes={}", body.len());
                Ok(body)
            }
            ConfigSource::File { path } => {
                debug!("Reading procedure data — path={}", path.display());
                Ok(fs::read_to_string(path)?)
            }
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Http { url } => f.write_str(url),
            ConfigSource::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches the raw document. HTTP results are mirrored to `cache_path` and
/// the mirror is used when the endpoint cannot be reached.
pub fn fetch_with_cache(
    source: &ConfigSource,
    timeout: Duration,
    cache_path: &Path,
) -> Result<String, ConfigError> {
    let ConfigSource::Http { .. } = source else {
        return source.fetch(timeout);
    };

    match source.fetch(timeout) {
        Ok(body) => {
            if let Err(e) = write_cache(cache_path, &body) {
                warn!(
                    "Could not update procedure cache — cache_path={} error={}",
                    cache_path.display(),
                    e
                );
            }
            Ok(body)
        }
        Err(err) if cache_path.exists() => {
            warn!(
                "Procedure download failed; using cached procedure data — cache_path={} error={}",
                cache_path.display(),
                err
            );
            Ok(fs::read_to_string(cache_path)?)
        }
        Err(err) => Err(err),
    }
}

fn write_cache(cache_path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = cache_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(cache_path, body)
}

/// Fetch, parse and index the configured procedure document.
pub fn load_registry(settings: &Settings) -> Result<Registry, ConfigError> {
    let text = fetch_with_cache(&settings.source, settings.timeout(), &settings.cache_file())?;
    let document = ConfigDocument::from_json(&text)?;
    Ok(Registry::build(&document)?.with_aliases(&settings.procedure_aliases))
}
