// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Short status text shown next to each aircraft.

use crate::flight_plan::FlightPlan;
use crate::result::{short_code, EvaluationResult};

/// Divisible by every possible count of failed checks (1 to 8).
pub const ROTATION_PERIOD: usize = 840;

pub fn tag_text(result: &EvaluationResult, plan: &FlightPlan, rotation: usize) -> &'static str {
    if plan.is_vfr() {
        "VFR"
    } else if result.passed {
        "OK!"
    } else {
        short_code(result, rotation)
    }
}

/// Drives the cycling of failure codes across display refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationCounter(usize);

impl RotationCounter {
    pub fn get(self) -> usize {
        self.0
    }

    pub fn tick(&mut self) -> usize {
        self.0 = (self.0 + 1) % ROTATION_PERIOD;
        self.0
    }
}
