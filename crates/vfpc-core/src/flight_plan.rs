// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlightRules {
    #[default]
    #[serde(rename = "I", alias = "IFR")]
    Ifr,
    #[serde(rename = "V", alias = "VFR")]
    Vfr,
}

/// A filed flight plan as handed over by the host. Read-only for the checker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlightPlan {
    pub callsign: String,
    pub origin: String,
    pub destination: String,
    /// Raw filed route, space delimited.
    pub route: String,
    /// Cleared departure procedure, e.g. "CPT2C".
    #[serde(default)]
    pub sid: String,
    /// Requested cruise level in feet.
    pub rfl: i32,
    /// Engine type code (P, T, J, E).
    #[serde(default)]
    pub engine_type: String,
    /// ICAO aircraft type designator.
    #[serde(default)]
    pub aircraft_type: String,
    /// Navigation capability letters from the equipment field.
    #[serde(default)]
    pub capabilities: String,
    /// Waypoints the host extracted from the route.
    #[serde(default)]
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub flight_rules: FlightRules,
}

impl FlightPlan {
    pub fn is_vfr(&self) -> bool {
        self.flight_rules == FlightRules::Vfr
    }

    pub fn origin_code(&self) -> String {
        self.origin.trim().to_uppercase()
    }

    pub fn destination_code(&self) -> String {
        self.destination.trim().to_uppercase()
    }

    /// Flight level in hundreds of feet.
    pub fn flight_level(&self) -> i32 {
        self.rfl / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_plan() {
        let json = r#"{
            "callsign": "BAW123",
            "origin": "egll",
            "destination": "EINN",
            "route": "CPT2C CPT Q41",
            "rfl": 24000
        }"#;
        let plan: FlightPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.origin_code(), "EGLL");
        assert_eq!(plan.flight_level(), 240);
        assert_eq!(plan.flight_rules, FlightRules::Ifr);
        assert!(plan.waypoints.is_empty());
    }

    #[test]
    fn test_vfr_rules() {
        let plan: FlightPlan = serde_json::from_str(
            r#"{"callsign":"GABCD","origin":"EGKA","destination":"EGKA","route":"","rfl":2000,"flight_rules":"V"}"#,
        )
        .unwrap();
        assert!(plan.is_vfr());
    }
}
