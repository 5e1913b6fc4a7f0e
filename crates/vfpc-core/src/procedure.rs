// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Procedure literal that carries no digits but is still a valid clearance (radar vectors).
pub const VECTORS: &str = "VCT";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcedureMatchError {
    #[error("no procedure set")]
    NoProcedure,
    #[error("route does not start from final procedure fix {fix}")]
    RouteNotFromFix { fix: String },
    #[error("procedure {procedure} not in database")]
    NotInDatabase { procedure: String },
}

/// Maps an airport specific procedure literal onto a defining fix and suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureAlias {
    pub airport: String,
    pub procedure: String,
    pub fix: String,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedProcedure {
    /// Cleared procedure, upper-cased with `#` removed.
    pub name: String,
    pub fix: String,
    pub suffix: String,
    /// Route tokens after the procedure references.
    pub route: Vec<String>,
}

/// Upper-cases the cleared procedure and removes `#` markers.
pub fn normalize_name(cleared: &str) -> String {
    cleared
        .trim()
        .chars()
        .filter(|c| *c != '#')
        .collect::<String>()
        .to_uppercase()
}

/// Normalises the cleared procedure and splits it at the first digit.
pub fn split_procedure(
    cleared: &str,
    alias: Option<&ProcedureAlias>,
) -> Result<(String, String, String), ProcedureMatchError> {
    let name = normalize_name(cleared);

    if name.is_empty() {
        return Err(ProcedureMatchError::NoProcedure);
    }

    if let Some(alias) = alias.filter(|alias| alias.procedure == name) {
        return Ok((name, alias.fix.clone(), alias.suffix.clone()));
    }

    let (fix, suffix) = match name.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => (name[..idx].to_string(), name[idx..].to_string()),
        None => (name.clone(), String::new()),
    };

    if suffix.is_empty() && fix != VECTORS {
        return Err(ProcedureMatchError::NoProcedure);
    }

    Ok((name, fix, suffix))
}

enum Shape {
    /// The fix itself.
    Fix,
    /// The procedure written out, e.g. CPT2C for fix CPT.
    Designator,
    Other,
}

fn digits_then_letters(rest: &str) -> bool {
    let letters = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    letters.len() < rest.len() && letters.chars().all(|c| c.is_ascii_alphabetic())
}

fn classify(token: &str, fix: &str) -> Shape {
    if token == fix {
        return Shape::Fix;
    }
    if let Some(rest) = token.strip_prefix(fix) {
        return if digits_then_letters(rest) {
            Shape::Designator
        } else {
            Shape::Other
        };
    }
    // Five letter fixes are shortened to four in six character designators (BOGNA1X -> BOGN1X).
    if fix.len() == 5 && token.len() == 6 && token.is_char_boundary(4) && fix.is_char_boundary(4) {
        let (head, rest) = token.split_at(4);
        if head == &fix[..4] && digits_then_letters(rest) {
            return Shape::Designator;
        }
    }
    Shape::Other
}

/// Strips leading procedure references from the route and checks that it
/// starts at the defining fix.
pub fn match_procedure(
    cleared: &str,
    route: &[String],
    alias: Option<&ProcedureAlias>,
) -> Result<MatchedProcedure, ProcedureMatchError> {
    let (name, fix, suffix) = split_procedure(cleared, alias)?;

    let mut consumed = 0;
    let mut found_fix = false;
    for token in route {
        match classify(token, &fix) {
            Shape::Fix => found_fix = true,
            Shape::Designator => {}
            Shape::Other => break,
        }
        consumed += 1;
    }

    if !found_fix {
        return Err(ProcedureMatchError::RouteNotFromFix { fix });
    }

    Ok(MatchedProcedure {
        name,
        fix,
        suffix,
        route: route[consumed..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_procedure() {
        let (name, fix, suffix) = split_procedure("cpt2c", None).unwrap();
        assert_eq!((name.as_str(), fix.as_str(), suffix.as_str()), ("CPT2C", "CPT", "2C"));

        let (_, fix, suffix) = split_procedure("#BOGNA1X#", None).unwrap();
        assert_eq!((fix.as_str(), suffix.as_str()), ("BOGNA", "1X"));
    }

    #[test]
    fn test_empty_or_digitless_procedure() {
        assert_eq!(split_procedure("", None), Err(ProcedureMatchError::NoProcedure));
        assert_eq!(split_procedure("##", None), Err(ProcedureMatchError::NoProcedure));
        assert_eq!(split_procedure("CPT", None), Err(ProcedureMatchError::NoProcedure));
        let (_, fix, suffix) = split_procedure("VCT", None).unwrap();
        assert_eq!((fix.as_str(), suffix.as_str()), ("VCT", ""));
    }

    #[test]
    fn test_alias_overrides_split() {
        let alias = ProcedureAlias {
            airport: "EGLC".to_string(),
            procedure: "ODUKU1H".to_string(),
            fix: "BPK".to_string(),
            suffix: "1H".to_string(),
        };
        let matched = match_procedure("ODUKU1H", &tokens(&["BPK", "Q295"]), Some(&alias)).unwrap();
        assert_eq!(matched.fix, "BPK");
        assert_eq!(matched.suffix, "1H");
        assert_eq!(matched.route, tokens(&["Q295"]));
    }

    #[test]
    fn test_strip_procedure_references() {
        let route = tokens(&["CPT2C", "CPT", "Q41", "SAM"]);
        let matched = match_procedure("CPT2C", &route, None).unwrap();
        assert_eq!(matched.route, tokens(&["Q41", "SAM"]));

        let matched = match_procedure("CPT2C", &tokens(&["CPT", "Q41"]), None).unwrap();
        assert_eq!(matched.route, tokens(&["Q41"]));
    }

    #[test]
    fn test_abbreviated_five_letter_fix() {
        let matched =
            match_procedure("BOGNA1X", &tokens(&["BOGN1X", "BOGNA", "L612"]), None).unwrap();
        assert_eq!(matched.route, tokens(&["L612"]));
    }

    #[test]
    fn test_route_must_start_at_fix() {
        let err = match_procedure("CPT2C", &tokens(&["CPT2C", "Q41", "CPT"]), None).unwrap_err();
        assert_eq!(
            err,
            ProcedureMatchError::RouteNotFromFix {
                fix: "CPT".to_string()
            }
        );

        let err = match_procedure("CPT2C", &tokens(&["SAM", "CPT"]), None).unwrap_err();
        assert!(matches!(err, ProcedureMatchError::RouteNotFromFix { .. }));

        let err = match_procedure("CPT2C", &[], None).unwrap_err();
        assert!(matches!(err, ProcedureMatchError::RouteNotFromFix { .. }));
    }

    #[test]
    fn test_malformed_designator_stops_consumption() {
        let err = match_procedure("CPT2C", &tokens(&["CPT2C3", "CPT"]), None).unwrap_err();
        assert!(matches!(err, ProcedureMatchError::RouteNotFromFix { .. }));
    }
}
