// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Aircraft type, suffix and validity-window eligibility.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };
    pub const END_OF_DAY: TimeOfDay = TimeOfDay {
        hour: 23,
        minute: 59,
    };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parses "HHMM" (a "HH:MM" colon is tolerated).
    pub fn parse_hhmm(value: &str) -> Option<Self> {
        let digits: String = value.trim().chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let hour = digits[..2].parse().ok()?;
        let minute = digits[2..].parse().ok()?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour, self.minute)
    }
}

/// The evaluation clock: day of week (0 = Sunday) plus UTC time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTime {
    pub weekday: u8,
    pub time: TimeOfDay,
}

impl CurrentTime {
    pub fn new(weekday: u8, hour: u8, minute: u8) -> Option<Self> {
        if weekday > 6 {
            return None;
        }
        Some(Self {
            weekday,
            time: TimeOfDay::new(hour, minute)?,
        })
    }

    pub fn from_datetime<Tz: chrono::TimeZone>(at: &chrono::DateTime<Tz>) -> Self {
        Self {
            weekday: at.weekday().num_days_from_sunday() as u8,
            time: TimeOfDay {
                hour: at.hour() as u8,
                minute: at.minute() as u8,
            },
        }
    }

    pub fn now_utc() -> Self {
        Self::from_datetime(&chrono::Utc::now())
    }
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn weekday_name(day: u8) -> &'static str {
    WEEKDAYS.get(day as usize).copied().unwrap_or("???")
}

/// A validity window. Without days it recurs daily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_day: Option<u8>,
    pub end_day: Option<u8>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn daily(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            start_day: None,
            end_day: None,
            start,
            end,
        }
    }

    pub fn weekly(start_day: u8, start: TimeOfDay, end_day: u8, end: TimeOfDay) -> Self {
        Self {
            start_day: Some(start_day),
            end_day: Some(end_day),
            start,
            end,
        }
    }

    pub fn contains(&self, now: CurrentTime) -> bool {
        let t = now.time;
        match (self.start_day, self.end_day) {
            (Some(first), Some(last)) if first == last => self.start <= t && t <= self.end,
            (Some(first), Some(last)) if first < last => {
                let day = now.weekday;
                (first < day && day < last)
                    || (day == first && t >= self.start)
                    || (day == last && t <= self.end)
            }
            (Some(first), Some(last)) => {
                // Wraps over the end of the week.
                let day = now.weekday;
                day > first
                    || day < last
                    || (day == first && t >= self.start)
                    || (day == last && t <= self.end)
            }
            _ => {
                if self.start >= self.end {
                    t >= self.start || t <= self.end
                } else {
                    self.start <= t && t <= self.end
                }
            }
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start_day, self.end_day) {
            (Some(first), Some(last)) => write!(
                f,
                "{} {} - {} {}",
                weekday_name(first),
                self.start,
                weekday_name(last),
                self.end
            ),
            _ => write!(f, "{}-{}", self.start, self.end),
        }
    }
}

/// One eligibility rule attached to a procedure or a constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestrictionSet {
    /// Aircraft type designators or engine type codes.
    pub types: Vec<String>,
    /// Engine type codes the flight must also match.
    #[serde(default)]
    pub engines: Vec<String>,
    pub suffixes: Vec<String>,
    pub window: Option<TimeWindow>,
    pub override_sid_wide: bool,
    pub alternatives: Vec<String>,
}

/// Facts about the flight that restriction rules are checked against.
#[derive(Debug, Clone, Copy)]
pub struct RestrictionSubject<'a> {
    pub engine_type: &'a str,
    pub aircraft_type: &'a str,
    pub suffix: &'a str,
    pub now: CurrentTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestrictionVerdict {
    pub type_ok: bool,
    pub suffix_ok: bool,
    pub window_ok: bool,
}

impl RestrictionVerdict {
    pub fn passed(&self) -> bool {
        self.type_ok && self.suffix_ok && self.window_ok
    }
}

impl RestrictionSet {
    pub fn check(&self, subject: &RestrictionSubject<'_>) -> RestrictionVerdict {
        let type_ok = (self.types.is_empty()
            || self
                .types
                .iter()
                .any(|t| t == subject.engine_type || t == subject.aircraft_type))
            && (self.engines.is_empty() || self.engines.iter().any(|e| e == subject.engine_type));
        let suffix_ok =
            self.suffixes.is_empty() || self.suffixes.iter().any(|s| s == subject.suffix);
        let window_ok = self
            .window
            .as_ref()
            .map_or(true, |window| window.contains(subject.now));

        RestrictionVerdict {
            type_ok,
            suffix_ok,
            window_ok,
        }
    }
}

/// Outcome of a list of restriction entries, any one of which may admit the flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListVerdict {
    pub passed: bool,
    /// Some entry rejected the flight because of its suffix list.
    pub suffix_rejected: bool,
}

pub fn check_list(list: &[RestrictionSet], subject: &RestrictionSubject<'_>) -> ListVerdict {
    let mut verdict = ListVerdict {
        passed: list.is_empty(),
        suffix_rejected: false,
    };
    for entry in list {
        let result = entry.check(subject);
        if result.passed() {
            verdict.passed = true;
        } else if !result.suffix_ok {
            verdict.suffix_rejected = true;
        }
    }
    verdict
}
