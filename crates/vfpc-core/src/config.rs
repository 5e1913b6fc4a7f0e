// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Wire schema of the procedure document.
//!
//! Every field past the airport code is optional. The earlier capitalised
//! spelling of each key is accepted as an alias so both data generations load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{airport}/{fix}: invalid time '{value}' (expected HHMM)")]
    InvalidTime {
        airport: String,
        fix: String,
        value: String,
    },
    #[error("{airport}/{fix}: invalid validity window ({reason})")]
    InvalidWindow {
        airport: String,
        fix: String,
        reason: String,
    },
    #[error("{airport}/{fix}: invalid level direction '{value}'")]
    InvalidParity {
        airport: String,
        fix: String,
        value: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ConfigDocument {
    pub airports: Vec<AirportConfig>,
}

impl ConfigDocument {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AirportConfig {
    #[serde(alias = "Icao")]
    pub icao: String,
    #[serde(default, alias = "Sids")]
    pub sids: Option<Vec<SidConfig>>,
    /// Airport specific procedure literal -> fix mappings.
    #[serde(default, alias = "Aliases")]
    pub aliases: Vec<AliasConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AliasConfig {
    #[serde(alias = "Sid")]
    pub sid: String,
    #[serde(alias = "Point")]
    pub point: String,
    #[serde(default, alias = "Suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SidConfig {
    #[serde(alias = "Point")]
    pub point: String,
    #[serde(default, alias = "Restrictions")]
    pub restrictions: Vec<RestrictionConfig>,
    #[serde(default, alias = "Constraints")]
    pub constraints: Vec<ConstraintConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConstraintConfig {
    #[serde(default, alias = "Dests")]
    pub dests: Vec<String>,
    #[serde(default, alias = "NoDests")]
    pub nodests: Vec<String>,
    #[serde(default, alias = "Route")]
    pub route: Vec<String>,
    #[serde(default, alias = "NoRoute")]
    pub noroute: Vec<String>,
    #[serde(default, alias = "Points")]
    pub points: Vec<String>,
    #[serde(default, alias = "NoPoints")]
    pub nopoints: Vec<String>,
    #[serde(default, alias = "Min")]
    pub min: Option<i32>,
    #[serde(default, alias = "Max")]
    pub max: Option<i32>,
    #[serde(default, alias = "Dir")]
    pub dir: Option<String>,
    #[serde(default, alias = "Nav")]
    pub nav: Option<String>,
    #[serde(default, rename = "override", alias = "Override")]
    pub override_sid_wide: bool,
    #[serde(default, alias = "Restrictions")]
    pub restrictions: Vec<RestrictionConfig>,
    /// Engine type codes of the older format, e.g. `"J"` or `["J", "T"]`.
    #[serde(default, alias = "Eng", skip_serializing_if = "Option::is_none")]
    pub eng: Option<OneOrMany>,
}

/// A value written either as a single string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RestrictionConfig {
    #[serde(default, alias = "Types")]
    pub types: Vec<String>,
    #[serde(default, alias = "Suffix")]
    pub suffix: Vec<String>,
    #[serde(default, alias = "Start")]
    pub start: Option<WindowBound>,
    #[serde(default, alias = "End")]
    pub end: Option<WindowBound>,
    #[serde(default, rename = "override", alias = "Override")]
    pub override_sid_wide: bool,
    /// Suggested alternative procedures.
    #[serde(default, alias = "Alt")]
    pub alt: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WindowBound {
    /// Day of week, 0 = Sunday.
    #[serde(default, alias = "Date")]
    pub date: Option<u8>,
    /// HHMM, e.g. "0630".
    #[serde(default, alias = "Time")]
    pub time: Option<String>,
}
