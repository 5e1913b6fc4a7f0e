// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::constraint::LevelCheck;
use crate::evaluator::{EvaluationError, NarrowingTrace};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Syntax,
    Procedure,
    Destination,
    Route,
    NavPerformance,
    Level,
    Parity,
    Suffix,
    Restrictions,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Syntax => "Syntax",
            Category::Procedure => "SID",
            Category::Destination => "Destination",
            Category::Route => "Route",
            Category::NavPerformance => "Navigation Performance",
            Category::Level => "Min/Max Level",
            Category::Parity => "Level Direction",
            Category::Suffix => "Suffix",
            Category::Restrictions => "Restrictions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CheckStatus {
    #[default]
    NotEvaluated,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    /// Operator-facing line.
    pub concise: String,
    /// Log-facing line.
    pub verbose: String,
}

impl CheckOutcome {
    pub fn passed(concise: String, verbose: String) -> Self {
        Self {
            status: CheckStatus::Passed,
            concise,
            verbose,
        }
    }

    pub fn failed(concise: String, verbose: String) -> Self {
        Self {
            status: CheckStatus::Failed,
            concise,
            verbose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Concise,
    Verbose,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub callsign: String,
    pub passed: bool,
    /// Normalised cleared procedure, once it could be read.
    pub procedure: Option<String>,
    pub checks: BTreeMap<Category, CheckOutcome>,
    /// Number of rounds cleared before total elimination (6 = all).
    pub rounds_cleared: usize,
    pub level_failure: LevelCheck,
    #[serde(skip)]
    pub error: Option<EvaluationError>,
    #[serde(skip)]
    pub trace: Option<NarrowingTrace>,
}

impl EvaluationResult {
    pub fn new(callsign: &str) -> Self {
        Self {
            callsign: callsign.to_string(),
            ..Default::default()
        }
    }

    pub fn status(&self, category: Category) -> CheckStatus {
        self.checks
            .get(&category)
            .map_or(CheckStatus::NotEvaluated, |check| check.status)
    }

    pub fn check(&self, category: Category) -> Option<&CheckOutcome> {
        self.checks.get(&category)
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.checks
            .iter()
            .filter(|(_, check)| check.status == CheckStatus::Failed)
            .map(|(category, _)| *category)
            .collect()
    }

    /// Three letter tags of every failed check, in display order.
    pub fn failure_codes(&self) -> Vec<&'static str> {
        let mut codes = Vec::new();
        let failed = |category| self.status(category) == CheckStatus::Failed;

        if failed(Category::Procedure) {
            codes.push("SID");
        }
        if failed(Category::Destination) {
            codes.push("DST");
        }
        if failed(Category::Route) {
            codes.push("RTE");
        }
        if failed(Category::NavPerformance) {
            codes.push("NAV");
        }
        if failed(Category::Level) {
            let LevelCheck {
                below_min,
                above_max,
            } = self.level_failure;
            if below_min || !above_max {
                codes.push("MIN");
            }
            if above_max || !below_min {
                codes.push("MAX");
            }
        }
        if failed(Category::Parity) {
            codes.push("DIR");
        }
        if failed(Category::Suffix) {
            codes.push("SUF");
        }
        if failed(Category::Restrictions) {
            codes.push("RST");
        }
        if failed(Category::Syntax) {
            codes.push("CHK");
        }
        codes
    }

    /// Joins every evaluated line plus the overall verdict with " | ".
    pub fn summary(&self, verbosity: Verbosity) -> String {
        let mut parts: Vec<&str> = self
            .checks
            .values()
            .filter(|check| check.status != CheckStatus::NotEvaluated)
            .map(|check| match verbosity {
                Verbosity::Concise => check.concise.as_str(),
                Verbosity::Verbose => check.verbose.as_str(),
            })
            .collect();
        parts.push(if self.passed { "Passed" } else { "Failed" });
        parts.join(" | ")
    }
}

/// Picks one failure tag, cycling through the failed checks as `rotation` advances.
pub fn short_code(result: &EvaluationResult, rotation: usize) -> &'static str {
    let codes = result.failure_codes();
    if codes.is_empty() {
        return "OK!";
    }
    codes[rotation % codes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_failures(categories: &[Category]) -> EvaluationResult {
        let mut result = EvaluationResult::new("TEST1");
        for category in categories {
            result.checks.insert(
                *category,
                CheckOutcome::failed("x".to_string(), "y".to_string()),
            );
        }
        result
    }

    #[test]
    fn test_short_code_rotates() {
        let mut result = with_failures(&[Category::Restrictions, Category::Suffix]);
        result
            .checks
            .insert(Category::Destination, CheckOutcome::passed("a".into(), "b".into()));

        assert_eq!(short_code(&result, 0), "SUF");
        assert_eq!(short_code(&result, 1), "RST");
        assert_eq!(short_code(&result, 2), "SUF");
        assert_eq!(short_code(&result, 841), "RST");
    }

    #[test]
    fn test_short_code_when_nothing_failed() {
        let mut result = EvaluationResult::new("TEST2");
        result.passed = true;
        assert_eq!(short_code(&result, 7), "OK!");
    }

    #[test]
    fn test_level_codes() {
        let mut result = with_failures(&[Category::Level]);
        result.level_failure = LevelCheck {
            below_min: true,
            above_max: false,
        };
        assert_eq!(result.failure_codes(), vec!["MIN"]);

        result.level_failure = LevelCheck {
            below_min: false,
            above_max: true,
        };
        assert_eq!(result.failure_codes(), vec!["MAX"]);

        result.level_failure = LevelCheck::default();
        assert_eq!(result.failure_codes(), vec!["MIN", "MAX"]);
    }

    #[test]
    fn test_code_order() {
        let result = with_failures(&[Category::Syntax, Category::Procedure]);
        assert_eq!(result.failure_codes(), vec!["SID", "CHK"]);
    }

    #[test]
    fn test_summary_skips_unevaluated() {
        let mut result = EvaluationResult::new("TEST3");
        result.checks.insert(
            Category::Procedure,
            CheckOutcome::passed("Valid SID - CPT2C.".into(), "v1".into()),
        );
        result.checks.insert(Category::Route, CheckOutcome::default());
        result.checks.insert(
            Category::Destination,
            CheckOutcome::failed("Failed Destination.".into(), "v2".into()),
        );
        assert_eq!(
            result.summary(Verbosity::Concise),
            "Valid SID - CPT2C. | Failed Destination. | Failed"
        );
        assert_eq!(result.summary(Verbosity::Verbose), "v1 | v2 | Failed");
    }
}
