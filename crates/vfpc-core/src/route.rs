// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("too many '/' characters in route item {token}")]
    TooManySeparators { token: String },
    #[error("invalid speed/level change in route item {token}")]
    InvalidSpeedLevel { token: String },
}

impl SyntaxError {
    pub fn token(&self) -> &str {
        match self {
            SyntaxError::TooManySeparators { token } | SyntaxError::InvalidSpeedLevel { token } => {
                token
            }
        }
    }
}

/// Speed + level group, e.g. N0450F350 or M082F390.
fn speed_level() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[NMK][0-9]{3,4}[AF][0-9]{3}$").expect("speed/level pattern is valid")
    })
}

pub fn is_speed_level(item: &str) -> bool {
    speed_level().is_match(item)
}

/// Splits a filed route into upper-cased waypoint/airway tokens.
///
/// Speed/level annotations after a `/` are stripped, `DCT` markers are
/// dropped, and a leading cruise speed/level group is removed.
pub fn tokenize(route: &str) -> Result<Vec<String>, SyntaxError> {
    let mut tokens = Vec::new();

    for raw in route.split_whitespace() {
        let item = raw.to_uppercase();
        let token = match item.matches('/').count() {
            0 => item,
            1 => strip_speed_level(&item)?,
            2 => {
                // Drop everything up to the first slash, then treat as a single annotation.
                let tail = item.split_once('/').map(|(_, rest)| rest).unwrap_or_default();
                strip_speed_level(tail).map_err(|_| SyntaxError::InvalidSpeedLevel {
                    token: item.clone(),
                })?
            }
            _ => return Err(SyntaxError::TooManySeparators { token: item }),
        };

        if !token.is_empty() && token != "DCT" {
            tokens.push(token);
        }
    }

    if tokens.first().is_some_and(|first| is_speed_level(first)) {
        tokens.remove(0);
    }

    Ok(tokens)
}

fn strip_speed_level(item: &str) -> Result<String, SyntaxError> {
    match item.split_once('/') {
        Some((waypoint, change)) if is_speed_level(change) => Ok(waypoint.to_string()),
        _ => Err(SyntaxError::InvalidSpeedLevel {
            token: item.to_string(),
        }),
    }
}

/// True when `prefix`'s whitespace-separated items open `route`.
pub fn starts_with(route: &[String], prefix: &str) -> bool {
    let wanted: Vec<String> = prefix.split_whitespace().map(str::to_uppercase).collect();
    !wanted.is_empty()
        && wanted.len() <= route.len()
        && wanted.iter().zip(route).all(|(want, have)| want == have)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_route() {
        let tokens = tokenize("cpt2c cpt q41 sam").unwrap();
        assert_eq!(tokens, vec!["CPT2C", "CPT", "Q41", "SAM"]);
    }

    #[test]
    fn test_dct_removed() {
        let tokens = tokenize("CPT DCT SAM DCT DCT GIBSO").unwrap();
        assert_eq!(tokens, vec!["CPT", "SAM", "GIBSO"]);
    }

    #[test]
    fn test_leading_speed_level_removed() {
        let tokens = tokenize("N0450F350 CPT2C CPT Q41").unwrap();
        assert_eq!(tokens, vec!["CPT2C", "CPT", "Q41"]);

        let tokens = tokenize("K0830F350 CPT").unwrap();
        assert_eq!(tokens, vec!["CPT"]);
    }

    #[test]
    fn test_inline_speed_level_stripped() {
        let tokens = tokenize("CPT/N0450F350 Q41 SAM/M082F390").unwrap();
        assert_eq!(tokens, vec!["CPT", "Q41", "SAM"]);
    }

    #[test]
    fn test_altitude_in_feet() {
        let tokens = tokenize("CPT/N0120A050").unwrap();
        assert_eq!(tokens, vec!["CPT"]);
    }

    #[test]
    fn test_invalid_annotation_fails() {
        let err = tokenize("CPT/XYZ Q41").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::InvalidSpeedLevel {
                token: "CPT/XYZ".to_string()
            }
        );
    }

    #[test]
    fn test_two_separators() {
        let tokens = tokenize("CPT/GIBSO/N0450F350 Q41").unwrap();
        assert_eq!(tokens, vec!["GIBSO", "Q41"]);

        let err = tokenize("CPT/GIBSO/BAD").unwrap_err();
        assert_eq!(err.token(), "CPT/GIBSO/BAD");
    }

    #[test]
    fn test_bare_annotation_leaves_no_token() {
        let tokens = tokenize("CPT /N0450F350 Q41 A//N0450F350 SAM").unwrap();
        assert_eq!(tokens, vec!["CPT", "Q41", "SAM"]);
    }

    #[test]
    fn test_three_separators_fail() {
        let err = tokenize("CPT Q41 A/B/C/D").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::TooManySeparators {
                token: "A/B/C/D".to_string()
            }
        );
    }

    #[test]
    fn test_empty_route() {
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_route_prefix() {
        let route: Vec<String> = ["Q41", "SAM", "L9"].iter().map(|s| s.to_string()).collect();
        assert!(starts_with(&route, "Q41"));
        assert!(starts_with(&route, "q41 sam"));
        assert!(!starts_with(&route, "SAM"));
        assert!(!starts_with(&route, "Q41 SAM L9 KENET"));
        assert!(!starts_with(&route, ""));
    }
}
