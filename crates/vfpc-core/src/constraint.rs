// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::restriction::RestrictionSet;
use serde::{Deserialize, Serialize};

/// Required cruise level direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    Any,
    Even,
    Odd,
}

impl Parity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "EVEN" => Some(Parity::Even),
            "ODD" => Some(Parity::Odd),
            "ANY" | "" => Some(Parity::Any),
            _ => None,
        }
    }

    /// Above FL410 levels step by 4000 ft, so direction follows the
    /// 4000 ft cycle from FL410 instead of plain thousands.
    pub fn admits(self, rfl: i32) -> bool {
        let thousands = rfl / 1000;
        match self {
            Parity::Any => true,
            Parity::Even if rfl > 41000 => (thousands - 41).rem_euclid(4) == 2,
            Parity::Even => thousands.rem_euclid(2) == 0,
            Parity::Odd if rfl > 41000 => (thousands - 41).rem_euclid(4) == 0,
            Parity::Odd => thousands.rem_euclid(2) == 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LevelCheck {
    pub below_min: bool,
    pub above_max: bool,
}

impl LevelCheck {
    pub fn passed(&self) -> bool {
        !self.below_min && !self.above_max
    }
}

/// One alternative rule bundle of a procedure. Empty fields never reject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub dests: Vec<String>,
    pub nodests: Vec<String>,
    pub routes: Vec<String>,
    pub noroutes: Vec<String>,
    pub points: Vec<String>,
    pub nopoints: Vec<String>,
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub parity: Parity,
    /// Reserved. Parsed and reported but never enforced.
    pub nav: Option<String>,
    pub override_sid_wide: bool,
    pub restrictions: Vec<RestrictionSet>,
}

/// Destination entries shorter than an ICAO code (or ending in `*`) match as prefixes.
pub fn destination_matches(entry: &str, destination: &str) -> bool {
    let stem = entry.trim_end_matches('*');
    if stem.len() < 4 {
        destination.starts_with(stem)
    } else {
        stem == destination
    }
}

impl ConstraintSet {
    pub fn min_level(&self) -> Option<i32> {
        self.min.filter(|level| *level > 0)
    }

    pub fn max_level(&self) -> Option<i32> {
        self.max.filter(|level| *level > 0)
    }

    pub fn destination_ok(&self, destination: &str) -> bool {
        if self
            .nodests
            .iter()
            .any(|entry| destination_matches(entry, destination))
        {
            return false;
        }
        self.dests.is_empty()
            || self
                .dests
                .iter()
                .any(|entry| destination_matches(entry, destination))
    }

    pub fn route_ok(&self, route: &[String], waypoints: &[String]) -> bool {
        let has_point = |list: &[String]| {
            waypoints
                .iter()
                .any(|wp| list.iter().any(|p| p.eq_ignore_ascii_case(wp)))
        };

        let required_route = self.routes.is_empty()
            || self
                .routes
                .iter()
                .any(|alt| crate::route::starts_with(route, alt));
        let required_point = self.points.is_empty() || has_point(&self.points);
        let forbidden_route = !self.noroutes.is_empty()
            && self
                .noroutes
                .iter()
                .any(|alt| crate::route::starts_with(route, alt));
        let forbidden_point = !self.nopoints.is_empty() && has_point(&self.nopoints);

        required_route && required_point && !forbidden_route && !forbidden_point
    }

    pub fn nav_ok(&self, _capabilities: &str) -> bool {
        true
    }

    pub fn level_check(&self, rfl: i32) -> LevelCheck {
        let level = rfl / 100;
        LevelCheck {
            below_min: self.min_level().is_some_and(|min| level < min),
            above_max: self.max_level().is_some_and(|max| level > max),
        }
    }

    pub fn parity_ok(&self, rfl: i32) -> bool {
        self.parity.admits(rfl)
    }

    /// Suffixes named by this set's restriction entries, sorted and deduplicated.
    pub fn suffixes(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .restrictions
            .iter()
            .flat_map(|r| r.suffixes.iter().cloned())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn requests_override(&self) -> bool {
        self.override_sid_wide || self.restrictions.iter().any(|r| r.override_sid_wide)
    }
}
