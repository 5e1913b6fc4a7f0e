// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Departure procedure checking for filed flight plans.
//!
//! A [`Registry`] built from the procedure document is the only data the
//! checker needs. [`evaluate`] runs a flight plan through it and returns an
//! [`EvaluationResult`] with one pass/fail line per check.

pub mod config;
pub mod constraint;
pub mod context;
pub mod evaluator;
pub mod flight_plan;
pub mod loader;
pub mod procedure;
pub mod registry;
pub mod report;
pub mod restriction;
pub mod result;
pub mod route;
pub mod settings;
pub mod tag;

use directories::ProjectDirs;
use std::path::PathBuf;

pub use config::{ConfigDocument, ConfigError};
pub use context::AppContext;
pub use evaluator::{evaluate, DataUnavailable, EvaluationError};
pub use flight_plan::{FlightPlan, FlightRules};
pub use loader::{load_registry, ConfigSource};
pub use registry::Registry;
pub use restriction::CurrentTime;
pub use result::{short_code, Category, CheckStatus, EvaluationResult, Verbosity};
pub use settings::Settings;
pub use tag::{tag_text, RotationCounter};

/// Directory holding settings and the procedure cache.
pub fn get_config_root() -> PathBuf {
    ProjectDirs::from("org", "vfpc", "vfpc")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".vfpc"))
}
