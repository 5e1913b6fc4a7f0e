// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Human readable explanations of what a procedure would have accepted.
//!
//! Every renderer takes the constraint sets still in play for a round and
//! returns a key-labelled body. Empty states render as "None", "Any" or
//! "None Specified", never as an empty string.

use crate::constraint::{ConstraintSet, Parity};

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn sorted_unique<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = items.into_iter().collect();
    out.sort();
    out.dedup();
    out
}

fn pad_code(code: &str) -> String {
    format!("{code:*<4}")
}

/// "Destination. Valid Destinations: EINN, EG**, Not EGCC"
///
/// Allow and deny entries are merged across sets: an entry allowed by one
/// set is never listed as denied, and a later allow lifts an earlier deny.
pub fn destination_body(sets: &[&ConstraintSet]) -> String {
    let mut allowed: Vec<String> = Vec::new();
    let mut denied: Vec<String> = Vec::new();

    for set in sets {
        let mut good: Vec<String> = set.dests.iter().map(|d| pad_code(d)).collect();
        let mut bad: Vec<String> = set.nodests.iter().map(|d| pad_code(d)).collect();

        good.retain(|d| !allowed.contains(d));
        bad.retain(|d| !allowed.contains(d));
        denied.retain(|d| !good.contains(d));
        bad.retain(|d| !denied.contains(d));

        allowed.extend(good);
        denied.extend(bad);
    }

    let entries: Vec<String> = allowed
        .into_iter()
        .chain(denied.into_iter().map(|d| format!("Not {d}")))
        .collect();
    format!("Destination. Valid Destinations: {}", join_or(&entries, "None"))
}

fn level_suffix(set: &ConstraintSet) -> String {
    match (set.min_level(), set.max_level()) {
        (Some(min), Some(max)) => format!("(FL{min} - {max})"),
        (Some(min), None) => format!("(FL{min}+)"),
        (None, Some(max)) => format!("(FL{max}-)"),
        (None, None) => "(All Levels)".to_string(),
    }
}

fn describe_route(set: &ConstraintSet) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !set.routes.is_empty() {
        parts.push(set.routes.join(" or "));
    }
    if !set.noroutes.is_empty() {
        let not = format!("not {}", set.noroutes.join(", "));
        parts.push(if parts.is_empty() { not } else { format!("but {not}") });
    }
    if !set.points.is_empty() {
        parts.push(format!("via {}", set.points.join(", ")));
    }
    if !set.nopoints.is_empty() {
        parts.push(format!("avoiding {}", set.nopoints.join(", ")));
    }
    if parts.is_empty() {
        parts.push("Any".to_string());
    }
    parts.push(level_suffix(set));
    parts.join(" ")
}

/// "Route. Valid Initial Routes: Q41 or L9 (FL100+) / Any (All Levels)"
pub fn route_body(sets: &[&ConstraintSet]) -> String {
    let mut routes: Vec<String> = Vec::new();
    for description in sets.iter().map(|set| describe_route(set)) {
        if !routes.contains(&description) {
            routes.push(description);
        }
    }
    let out = if routes.is_empty() {
        "None".to_string()
    } else {
        routes.join(" / ")
    };
    format!("Route. Valid Initial Routes: {out}")
}

pub fn nav_body(sets: &[&ConstraintSet]) -> String {
    let codes = sorted_unique(sets.iter().filter_map(|set| set.nav.clone()));
    format!(
        "Navigation Performance. Required Performance: {}",
        join_or(&codes, "None Specified")
    )
}

/// Collapses the level bands of `sets` into the fewest covering intervals.
/// Unbounded ends are `i32::MIN` / `i32::MAX`.
pub fn merge_levels(sets: &[&ConstraintSet]) -> Vec<(i32, i32)> {
    let mut bands: Vec<(i32, i32)> = sets
        .iter()
        .map(|set| {
            (
                set.min_level().unwrap_or(i32::MIN),
                set.max_level().unwrap_or(i32::MAX),
            )
        })
        .collect();
    bands.sort();

    let mut merged: Vec<(i32, i32)> = Vec::with_capacity(bands.len());
    for (low, high) in bands {
        match merged.last_mut() {
            Some(current) if low <= current.1 => current.1 = current.1.max(high),
            _ => merged.push((low, high)),
        }
    }
    merged
}

/// "Min/Max Level: 100-200, 300+"
pub fn level_body(sets: &[&ConstraintSet]) -> String {
    let bands: Vec<String> = merge_levels(sets)
        .into_iter()
        .map(|band| match band {
            (i32::MIN, i32::MAX) => "Any Level".to_string(),
            (i32::MIN, high) => format!("{high}-"),
            (low, i32::MAX) => format!("{low}+"),
            (low, high) => format!("{low}-{high}"),
        })
        .collect();
    format!("Min/Max Level: {}", join_or(&bands, "Any Level"))
}

pub fn parity_body(sets: &[&ConstraintSet]) -> String {
    let mut even = false;
    let mut odd = false;
    for set in sets {
        match set.parity {
            Parity::Even => even = true,
            Parity::Odd => odd = true,
            Parity::Any => {
                even = true;
                odd = true;
            }
        }
    }
    let direction = match (even, odd) {
        (true, false) => "Even",
        (false, true) => "Odd",
        _ => "Any",
    };
    format!("Level Direction. Required Direction: {direction}")
}

pub fn suffix_body(sets: &[&ConstraintSet]) -> String {
    let suffixes = sorted_unique(sets.iter().flat_map(|set| set.suffixes()));
    format!(
        "Suffix. Valid Suffices: {}",
        join_or(&suffixes, "None Specified")
    )
}

/// "Restrictions. Valid Types: J, T; Valid Times: 0600-2200"
///
/// Alternatives are only worth showing once the flight has been turned away.
pub fn restriction_body(sets: &[&ConstraintSet], include_alternatives: bool) -> String {
    let entries: Vec<_> = sets.iter().flat_map(|set| set.restrictions.iter()).collect();
    if entries.is_empty() {
        return "Restrictions. Required: None".to_string();
    }

    let types = sorted_unique(
        entries
            .iter()
            .flat_map(|r| r.types.iter().chain(&r.engines).cloned()),
    );
    let times = sorted_unique(
        entries
            .iter()
            .filter_map(|r| r.window.as_ref().map(ToString::to_string)),
    );
    let alternatives = sorted_unique(entries.iter().flat_map(|r| r.alternatives.iter().cloned()));

    let mut out = format!(
        "Restrictions. Valid Types: {}; Valid Times: {}",
        join_or(&types, "Any"),
        join_or(&times, "Any")
    );
    if include_alternatives && !alternatives.is_empty() {
        out.push_str(&format!("; Alternatives: {}", alternatives.join(", ")));
    }
    out
}

/// Concise and verbose lines for a category that passed.
pub fn passed(name: &str, body: &str) -> (String, String) {
    (format!("Passed {name}."), format!("Passed {body}."))
}

/// Concise and verbose lines for a category that failed.
pub fn failed(body: &str, filed: &str) -> (String, String) {
    let concise = format!("Failed {body}.");
    let verbose = format!("{concise} Filed: {filed}.");
    (concise, verbose)
}
