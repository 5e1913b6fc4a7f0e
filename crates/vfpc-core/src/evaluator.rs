// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Narrowing evaluation of a flight plan against its departure procedure.
//!
//! A procedure carries several alternative constraint sets. Six rounds run in
//! a fixed order and each round drops the sets the flight plan does not
//! satisfy. Evaluation stops at the first round that leaves nothing alive and
//! that round is reported as the failing category.

use crate::constraint::{ConstraintSet, LevelCheck};
use crate::flight_plan::FlightPlan;
use crate::procedure::{self, ProcedureMatchError};
use crate::registry::Registry;
use crate::report;
use crate::restriction::{self, CurrentTime, RestrictionSubject};
use crate::result::{Category, CheckOutcome, EvaluationResult};
use crate::route::{self, SyntaxError};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUnavailable {
    #[error("no procedure data loaded")]
    EmptyRegistry,
    #[error("airport {icao} not in database")]
    AirportNotFound { icao: String },
    #[error("airport {icao} has no procedures defined")]
    NoProceduresDefined { icao: String },
}

/// Failures that end an evaluation before any category round runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("route syntax: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("procedure: {0}")]
    ProcedureMatch(#[from] ProcedureMatchError),
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataUnavailable),
}

impl EvaluationError {
    /// Operator-facing and log-facing messages.
    pub fn messages(&self) -> (String, String) {
        let pair = |concise: &str, verbose: String| (concise.to_string(), verbose);
        match self {
            EvaluationError::Syntax(SyntaxError::TooManySeparators { token }) => pair(
                "Invalid Syntax - Too Many \"/\" Characters in One or More Waypoints",
                format!("Invalid Route Item: {token}"),
            ),
            EvaluationError::Syntax(SyntaxError::InvalidSpeedLevel { token }) => pair(
                "Invalid Speed/Level Change",
                format!("Invalid Route Item: {token}"),
            ),
            EvaluationError::ProcedureMatch(ProcedureMatchError::NoProcedure) => {
                pair("Invalid SID - None Set", "Invalid SID - None Set".to_string())
            }
            EvaluationError::ProcedureMatch(ProcedureMatchError::RouteNotFromFix { fix }) => pair(
                "Invalid SID - Route Not From Final SID Fix",
                format!("Invalid SID - Route must start at {fix}."),
            ),
            EvaluationError::ProcedureMatch(ProcedureMatchError::NotInDatabase { procedure }) => {
                pair(
                    "Invalid SID - SID Not Found",
                    format!("Invalid SID - {procedure} departure not in database."),
                )
            }
            EvaluationError::DataUnavailable(DataUnavailable::EmptyRegistry) => pair(
                "Invalid SID - No Procedure Data Loaded",
                "Invalid SID - No Procedure Data Loaded".to_string(),
            ),
            EvaluationError::DataUnavailable(DataUnavailable::AirportNotFound { icao }) => pair(
                "Invalid SID - Airport Not Found",
                format!("Invalid SID - {icao} not in database."),
            ),
            EvaluationError::DataUnavailable(DataUnavailable::NoProceduresDefined { icao }) => {
                pair(
                    "Invalid SID - None Defined",
                    format!("Invalid SID - {icao} exists in database but has no SIDs defined."),
                )
            }
        }
    }

    pub fn category(&self) -> Category {
        match self {
            EvaluationError::Syntax(_) => Category::Syntax,
            _ => Category::Procedure,
        }
    }
}

/// Everything a round predicate may look at.
#[derive(Debug, Clone)]
pub struct RoundContext<'a> {
    pub plan: &'a FlightPlan,
    pub destination: String,
    /// Route tokens left after the procedure references.
    pub route: &'a [String],
    pub waypoints: Vec<String>,
    pub suffix: &'a str,
    pub engine_type: String,
    pub aircraft_type: String,
    pub now: CurrentTime,
    /// Outcome of the procedure-wide restrictions, `None` when there are none.
    pub sid_wide: Option<bool>,
}

impl<'a> RoundContext<'a> {
    pub fn new(
        plan: &'a FlightPlan,
        route: &'a [String],
        suffix: &'a str,
        now: CurrentTime,
    ) -> Self {
        let waypoints = if plan.waypoints.is_empty() {
            route.to_vec()
        } else {
            plan.waypoints
                .iter()
                .map(|wp| wp.trim().to_uppercase())
                .collect()
        };
        Self {
            plan,
            destination: plan.destination_code(),
            route,
            waypoints,
            suffix,
            engine_type: plan.engine_type.trim().to_uppercase(),
            aircraft_type: plan.aircraft_type.trim().to_uppercase(),
            now,
            sid_wide: None,
        }
    }

    pub fn subject(&self) -> RestrictionSubject<'_> {
        RestrictionSubject {
            engine_type: &self.engine_type,
            aircraft_type: &self.aircraft_type,
            suffix: self.suffix,
            now: self.now,
        }
    }

    /// Whether the restrictions round has to look at `set`'s own entries.
    pub fn restrictions_mandatory(&self, set: &ConstraintSet) -> bool {
        self.sid_wide != Some(true) || set.requests_override()
    }
}

struct Round {
    category: Category,
    check: fn(&ConstraintSet, &RoundContext<'_>) -> bool,
    render: fn(&[&ConstraintSet], bool) -> String,
    filed: fn(&RoundContext<'_>) -> String,
}

fn check_destination(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    set.destination_ok(&ctx.destination)
}

fn check_route(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    set.route_ok(ctx.route, &ctx.waypoints)
}

fn check_nav(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    set.nav_ok(&ctx.plan.capabilities)
}

fn check_level(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    set.level_check(ctx.plan.rfl).passed()
}

fn check_parity(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    set.parity_ok(ctx.plan.rfl)
}

fn check_restrictions(set: &ConstraintSet, ctx: &RoundContext<'_>) -> bool {
    !ctx.restrictions_mandatory(set)
        || restriction::check_list(&set.restrictions, &ctx.subject()).passed
}

fn render_destination(sets: &[&ConstraintSet], _failed: bool) -> String {
    report::destination_body(sets)
}

fn render_route(sets: &[&ConstraintSet], _failed: bool) -> String {
    report::route_body(sets)
}

fn render_nav(sets: &[&ConstraintSet], _failed: bool) -> String {
    report::nav_body(sets)
}

fn render_level(sets: &[&ConstraintSet], _failed: bool) -> String {
    report::level_body(sets)
}

fn render_parity(sets: &[&ConstraintSet], _failed: bool) -> String {
    report::parity_body(sets)
}

fn render_restrictions(sets: &[&ConstraintSet], failed: bool) -> String {
    report::restriction_body(sets, failed)
}

fn filed_destination(ctx: &RoundContext<'_>) -> String {
    ctx.destination.clone()
}

fn filed_route(ctx: &RoundContext<'_>) -> String {
    if ctx.route.is_empty() {
        "None".to_string()
    } else {
        ctx.route.join(" ")
    }
}

fn filed_nav(ctx: &RoundContext<'_>) -> String {
    match ctx.plan.capabilities.trim() {
        "" => "None".to_string(),
        caps => caps.to_uppercase(),
    }
}

fn filed_level(ctx: &RoundContext<'_>) -> String {
    format!("FL{}", ctx.plan.flight_level())
}

fn filed_restrictions(ctx: &RoundContext<'_>) -> String {
    format!(
        "{} ({}) at {} {}",
        ctx.aircraft_type,
        ctx.engine_type,
        restriction::weekday_name(ctx.now.weekday),
        ctx.now.time
    )
}

const ROUNDS: [Round; 6] = [
    Round {
        category: Category::Destination,
        check: check_destination,
        render: render_destination,
        filed: filed_destination,
    },
    Round {
        category: Category::Route,
        check: check_route,
        render: render_route,
        filed: filed_route,
    },
    Round {
        category: Category::NavPerformance,
        check: check_nav,
        render: render_nav,
        filed: filed_nav,
    },
    Round {
        category: Category::Level,
        check: check_level,
        render: render_level,
        filed: filed_level,
    },
    Round {
        category: Category::Parity,
        check: check_parity,
        render: render_parity,
        filed: filed_level,
    },
    Round {
        category: Category::Restrictions,
        check: check_restrictions,
        render: render_restrictions,
        filed: filed_restrictions,
    },
];

/// Candidate indices entering and leaving one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrace {
    pub category: Category,
    pub entering: Vec<usize>,
    pub surviving: Vec<usize>,
}

impl RoundTrace {
    pub fn failed(&self) -> bool {
        self.surviving.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NarrowingTrace {
    /// One entry per round that ran, in order.
    pub rounds: Vec<RoundTrace>,
    /// Rounds with at least one survivor.
    pub cleared: usize,
}

impl NarrowingTrace {
    pub fn passed(&self) -> bool {
        self.cleared == ROUNDS.len()
    }

    pub fn failed_round(&self) -> Option<&RoundTrace> {
        self.rounds.last().filter(|round| round.failed())
    }

    /// Sets alive after the last round that ran.
    pub fn survivors(&self) -> &[usize] {
        self.rounds
            .last()
            .map_or(&[][..], |round| round.surviving.as_slice())
    }
}

/// Runs the six rounds. Survivors of one round are the only candidates of the next.
pub fn narrow(constraints: &[ConstraintSet], ctx: &RoundContext<'_>) -> NarrowingTrace {
    let mut alive: Vec<usize> = (0..constraints.len()).collect();
    let mut trace = NarrowingTrace::default();

    for round in &ROUNDS {
        let surviving: Vec<usize> = alive
            .iter()
            .copied()
            .filter(|&idx| (round.check)(&constraints[idx], ctx))
            .collect();

        let eliminated = surviving.is_empty();
        trace.rounds.push(RoundTrace {
            category: round.category,
            entering: alive,
            surviving: surviving.clone(),
        });
        if eliminated {
            break;
        }
        trace.cleared += 1;
        alive = surviving;
    }

    trace
}

fn pick<'c>(constraints: &'c [ConstraintSet], indices: &[usize]) -> Vec<&'c ConstraintSet> {
    indices.iter().map(|&idx| &constraints[idx]).collect()
}

/// Checks `plan` against the procedure data in `registry` at time `now`.
///
/// Never fails: pre-categorical errors are folded into the result's
/// Syntax or Procedure check and into `EvaluationResult::error`.
pub fn evaluate(plan: &FlightPlan, registry: &Registry, now: CurrentTime) -> EvaluationResult {
    let mut result = EvaluationResult::new(&plan.callsign);

    if let Err(err) = run(plan, registry, now, &mut result) {
        let (concise, verbose) = err.messages();
        debug!("{} rejected — {}", plan.callsign, err);
        result
            .checks
            .insert(err.category(), CheckOutcome::failed(concise, verbose));
        result.passed = false;
        result.error = Some(err);
    }

    result
}

fn run(
    plan: &FlightPlan,
    registry: &Registry,
    now: CurrentTime,
    result: &mut EvaluationResult,
) -> Result<(), EvaluationError> {
    if registry.is_empty() {
        return Err(DataUnavailable::EmptyRegistry.into());
    }

    let tokens = route::tokenize(&plan.route)?;

    let origin = plan.origin_code();
    let airport = registry.find(&origin);
    let alias = airport.and_then(|entry| entry.alias(&procedure::normalize_name(&plan.sid)));
    let matched = procedure::match_procedure(&plan.sid, &tokens, alias)?;

    let airport = airport.ok_or_else(|| DataUnavailable::AirportNotFound {
        icao: origin.clone(),
    })?;
    if airport.procedures.is_none() {
        return Err(DataUnavailable::NoProceduresDefined { icao: origin }.into());
    }
    let record = airport
        .find(&matched.fix)
        .ok_or_else(|| ProcedureMatchError::NotInDatabase {
            procedure: matched.name.clone(),
        })?;

    result.procedure = Some(matched.name.clone());

    let mut ctx = RoundContext::new(plan, &matched.route, &matched.suffix, now);
    if !record.restrictions.is_empty() {
        let verdict = restriction::check_list(&record.restrictions, &ctx.subject());
        ctx.sid_wide = Some(verdict.passed);
    }

    let constraints = &record.constraints;
    let trace = narrow(constraints, &ctx);

    for (round, step) in ROUNDS.iter().zip(&trace.rounds) {
        let failed = step.failed();
        let shown = pick(constraints, if failed { &step.entering } else { &step.surviving });
        let body = (round.render)(&shown, failed);
        let (concise, verbose) = if failed {
            report::failed(&body, &(round.filed)(&ctx))
        } else {
            report::passed(round.category.name(), &body)
        };
        let outcome = if failed {
            CheckOutcome::failed(concise, verbose)
        } else {
            CheckOutcome::passed(concise, verbose)
        };
        result.checks.insert(round.category, outcome);

        if failed && round.category == Category::Level {
            result.level_failure = shown
                .iter()
                .map(|set| set.level_check(plan.rfl))
                .fold(LevelCheck::default(), |acc, check| LevelCheck {
                    below_min: acc.below_min || check.below_min,
                    above_max: acc.above_max || check.above_max,
                });
        }
    }

    if let Some(step) = trace.rounds.iter().find(|step| step.category == Category::Restrictions) {
        record_suffix(result, constraints, step, &ctx);
    }

    let final_indices: &[usize] = match trace.rounds.last() {
        Some(step) if step.failed() => &step.entering,
        Some(step) => &step.surviving,
        None => &[],
    };
    let final_sets = pick(constraints, final_indices);
    let suffix_line = report::suffix_body(&final_sets);
    result.checks.insert(
        Category::Procedure,
        CheckOutcome::passed(
            format!("Valid SID - {}.", matched.name),
            format!("Valid SID - {}. Contains Valid {}.", matched.name, suffix_line),
        ),
    );

    result.rounds_cleared = trace.cleared;
    result.passed = trace.passed();

    debug!(
        "{} evaluated — sid={} rounds_cleared={} passed={}",
        plan.callsign, matched.name, trace.cleared, result.passed
    );

    result.trace = Some(trace);
    Ok(())
}

fn record_suffix(
    result: &mut EvaluationResult,
    constraints: &[ConstraintSet],
    step: &RoundTrace,
    ctx: &RoundContext<'_>,
) {
    let subject = ctx.subject();
    let rejected = step.failed()
        && step.entering.iter().any(|&idx| {
            let set = &constraints[idx];
            ctx.restrictions_mandatory(set)
                && restriction::check_list(&set.restrictions, &subject).suffix_rejected
        });

    let shown = pick(
        constraints,
        if step.failed() { &step.entering } else { &step.surviving },
    );
    let body = report::suffix_body(&shown);
    let outcome = if rejected {
        let filed = if ctx.suffix.is_empty() { "None" } else { ctx.suffix };
        let (concise, verbose) = report::failed(&body, filed);
        CheckOutcome::failed(concise, verbose)
    } else {
        let (concise, verbose) = report::passed(Category::Suffix.name(), &body);
        CheckOutcome::passed(concise, verbose)
    };
    result.checks.insert(Category::Suffix, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CheckStatus;

    const DATA: &str = r#"[
        {"icao": "EGLL", "sids": [
            {"point": "CPT", "constraints": [
                {"dests": ["EINN"], "min": 100},
                {"dests": ["EG"], "nodests": ["EGLL"], "route": ["Q41"], "max": 240, "dir": "EVEN"}
            ]},
            {"point": "BPK", "restrictions": [{"types": ["J"]}], "constraints": [
                {"restrictions": [{"suffix": ["7G"]}]},
                {"override": true, "restrictions": [{"types": ["T"], "alt": ["DET2F"]}]}
            ]}
        ]},
        {"icao": "EGLC"}
    ]"#;

    fn registry() -> Registry {
        Registry::from_json(DATA).unwrap()
    }

    fn plan(sid: &str, route: &str, destination: &str, rfl: i32) -> FlightPlan {
        FlightPlan {
            callsign: "BAW1".to_string(),
            origin: "EGLL".to_string(),
            destination: destination.to_string(),
            route: route.to_string(),
            sid: sid.to_string(),
            rfl,
            engine_type: "J".to_string(),
            aircraft_type: "A320".to_string(),
            ..Default::default()
        }
    }

    fn monday_noon() -> CurrentTime {
        CurrentTime::new(1, 12, 0).unwrap()
    }

    #[test]
    fn test_passes_first_alternative() {
        let filed = plan("CPT2C", "CPT2C CPT L9", "EINN", 12000);
        let result = evaluate(&filed, &registry(), monday_noon());
        assert!(result.passed, "{}", result.summary(crate::result::Verbosity::Verbose));
        assert_eq!(result.rounds_cleared, 6);
        assert_eq!(result.procedure.as_deref(), Some("CPT2C"));
        assert_eq!(result.status(Category::Procedure), CheckStatus::Passed);
        assert_eq!(result.check(Category::Destination).unwrap().concise, "Passed Destination.");
    }

    #[test]
    fn test_second_alternative_narrows() {
        let filed = plan("CPT2C", "CPT Q41 SAM", "EGPH", 26000);
        let result = evaluate(&filed, &registry(), monday_noon());
        assert!(!result.passed);
        assert_eq!(result.status(Category::Route), CheckStatus::Passed);
        assert_eq!(result.status(Category::Level), CheckStatus::Failed);
        assert_eq!(result.status(Category::Parity), CheckStatus::NotEvaluated);
        assert!(result.level_failure.above_max);
        assert_eq!(result.failure_codes(), vec!["MAX"]);
        assert_eq!(
            result.check(Category::Level).unwrap().verbose,
            "Failed Min/Max Level: 240-. Filed: FL260."
        );
    }

    #[test]
    fn test_destination_failure_lists_alternatives() {
        let result = evaluate(&plan("CPT2C", "CPT Q41", "EGLL", 12000), &registry(), monday_noon());
        let dest = result.check(Category::Destination).unwrap();
        assert_eq!(dest.status, CheckStatus::Failed);
        assert_eq!(
            dest.concise,
            "Failed Destination. Valid Destinations: EINN, EG**, Not EGLL."
        );
        assert!(dest.verbose.ends_with("Filed: EGLL."));
        assert_eq!(result.rounds_cleared, 0);
        assert_eq!(result.status(Category::Route), CheckStatus::NotEvaluated);
    }

    #[test]
    fn test_parity_failure() {
        let result = evaluate(&plan("CPT2C", "CPT Q41", "EGPH", 23000), &registry(), monday_noon());
        assert_eq!(result.status(Category::Parity), CheckStatus::Failed);
        assert_eq!(result.failure_codes(), vec!["DIR"]);
    }

    #[test]
    fn test_sid_wide_pass_skips_constraint_restrictions() {
        // Jet passes the procedure-wide rule, so the suffix-only rule is not consulted.
        let jet = plan("BPK7G", "BPK Q295", "EHAM", 20000);
        let result = evaluate(&jet, &registry(), monday_noon());
        assert!(result.passed);

        let jet = plan("BPK6G", "BPK Q295", "EHAM", 20000);
        let result = evaluate(&jet, &registry(), monday_noon());
        assert!(result.passed);
    }

    #[test]
    fn test_sid_wide_failure_makes_restrictions_mandatory() {
        let mut turboprop = plan("BPK6G", "BPK Q295", "EHAM", 20000);
        turboprop.engine_type = "T".to_string();
        turboprop.aircraft_type = "DH8D".to_string();
        let result = evaluate(&turboprop, &registry(), monday_noon());
        // Second set overrides and admits turboprops.
        assert!(result.passed);

        let mut piston = turboprop.clone();
        piston.engine_type = "P".to_string();
        piston.aircraft_type = "PA28".to_string();
        let result = evaluate(&piston, &registry(), monday_noon());
        assert!(!result.passed);
        assert_eq!(result.status(Category::Restrictions), CheckStatus::Failed);
        assert_eq!(result.status(Category::Suffix), CheckStatus::Failed);
        assert_eq!(result.failure_codes(), vec!["SUF", "RST"]);
        assert!(result
            .check(Category::Restrictions)
            .unwrap()
            .concise
            .contains("Alternatives: DET2F"));
    }

    #[test]
    fn test_pre_categorical_failures() {
        let reg = registry();

        let result = evaluate(&plan("", "CPT Q41", "EINN", 12000), &reg, monday_noon());
        assert_eq!(
            result.error,
            Some(EvaluationError::ProcedureMatch(ProcedureMatchError::NoProcedure))
        );
        assert_eq!(result.check(Category::Procedure).unwrap().concise, "Invalid SID - None Set");

        let result = evaluate(&plan("DVR2J", "DVR L6", "EINN", 12000), &reg, monday_noon());
        assert_eq!(
            result.check(Category::Procedure).unwrap().verbose,
            "Invalid SID - DVR2J departure not in database."
        );

        let filed = plan("CPT2C", "CPT Q41/N0450F350/X", "EINN", 12000);
        let result = evaluate(&filed, &reg, monday_noon());
        assert!(matches!(result.error, Some(EvaluationError::Syntax(_))));
        assert_eq!(result.failure_codes(), vec!["CHK"]);

        let mut unknown = plan("CPT2C", "CPT Q41", "EINN", 12000);
        unknown.origin = "LFPG".to_string();
        let result = evaluate(&unknown, &reg, monday_noon());
        assert_eq!(
            result.check(Category::Procedure).unwrap().concise,
            "Invalid SID - Airport Not Found"
        );

        unknown.origin = "eglc".to_string();
        let result = evaluate(&unknown, &reg, monday_noon());
        assert_eq!(
            result.check(Category::Procedure).unwrap().verbose,
            "Invalid SID - EGLC exists in database but has no SIDs defined."
        );
    }

    #[test]
    fn test_narrowing_trace_is_monotonic() {
        let reg = registry();
        let record = reg.find("EGLL").unwrap().find("CPT").unwrap();
        let p = plan("CPT2C", "CPT Q41", "EGPH", 26000);
        let ctx = RoundContext::new(&p, &[], "2C", monday_noon());
        let trace = narrow(&record.constraints, &ctx);
        for pair in trace.rounds.windows(2) {
            assert_eq!(pair[0].surviving, pair[1].entering);
        }
        assert_eq!(trace.rounds[0].entering, vec![0, 1]);
        assert_eq!(trace.rounds[0].surviving, vec![1]);
    }
}
