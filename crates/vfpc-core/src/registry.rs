// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::{
    AirportConfig, ConfigDocument, ConfigError, ConstraintConfig, RestrictionConfig, SidConfig,
};
use crate::constraint::{ConstraintSet, Parity};
use crate::procedure::ProcedureAlias;
use crate::restriction::{RestrictionSet, TimeOfDay, TimeWindow};
use log::{debug, info, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcedureRecord {
    /// Defining fix, e.g. "CPT" for CPT2C.
    pub fix: String,
    /// Procedure-wide eligibility, checked once before the rounds.
    pub restrictions: Vec<RestrictionSet>,
    /// Alternatives in priority order.
    pub constraints: Vec<ConstraintSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AirportEntry {
    pub icao: String,
    /// `None` when the airport is known but carries no procedure list.
    pub procedures: Option<Vec<ProcedureRecord>>,
    pub aliases: Vec<ProcedureAlias>,
}

impl AirportEntry {
    /// Looks up a procedure by defining fix. A later duplicate wins.
    pub fn find(&self, fix: &str) -> Option<&ProcedureRecord> {
        self.procedures
            .as_ref()?
            .iter()
            .rev()
            .find(|record| record.fix == fix)
    }

    pub fn alias(&self, procedure: &str) -> Option<&ProcedureAlias> {
        self.aliases.iter().find(|alias| alias.procedure == procedure)
    }
}

/// Immutable airport -> procedures index. Replaced wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    airports: HashMap<String, AirportEntry>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(document: &ConfigDocument) -> Result<Self, ConfigError> {
        let mut airports = HashMap::with_capacity(document.airports.len());

        for airport in &document.airports {
            let entry = build_airport(airport)?;
            if airports.contains_key(&entry.icao) {
                warn!(
                    "Duplicate airport {} in procedure data; keeping the first record",
                    entry.icao
                );
                continue;
            }
            debug!(
                "Registered {} with {} procedures",
                entry.icao,
                entry.procedures.as_ref().map_or(0, Vec::len)
            );
            airports.insert(entry.icao.clone(), entry);
        }

        let registry = Self { airports };
        info!(
            "Procedure registry built — airports={} procedures={} constraint_sets={}",
            registry.len(),
            registry.procedure_count(),
            registry.constraint_count()
        );
        Ok(registry)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::build(&ConfigDocument::from_json(text)?)
    }

    /// Adds procedure aliases from outside the document. Aliases carried by
    /// the airport record itself take precedence.
    pub fn with_aliases(mut self, extra: &[ProcedureAlias]) -> Self {
        for alias in extra {
            let airport_code = alias.airport.trim().to_uppercase();
            let Some(entry) = self.airports.get_mut(&airport_code) else {
                debug!("Alias {} skipped — airport {} not loaded", alias.procedure, airport_code);
                continue;
            };
            let procedure = alias.procedure.trim().to_uppercase();
            if entry.alias(&procedure).is_none() {
                entry.aliases.push(ProcedureAlias {
                    airport: airport_code,
                    procedure,
                    fix: alias.fix.trim().to_uppercase(),
                    suffix: alias.suffix.trim().to_uppercase(),
                });
            }
        }
        self
    }

    /// Looks up an airport by its normalised (uppercase) code.
    pub fn find(&self, icao: &str) -> Option<&AirportEntry> {
        self.airports.get(icao)
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn procedure_count(&self) -> usize {
        self.airports
            .values()
            .map(|a| a.procedures.as_ref().map_or(0, Vec::len))
            .sum()
    }

    pub fn constraint_count(&self) -> usize {
        self.airports
            .values()
            .flat_map(|a| a.procedures.iter().flatten())
            .map(|p| p.constraints.len())
            .sum()
    }
}

fn upper_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn build_airport(config: &AirportConfig) -> Result<AirportEntry, ConfigError> {
    let icao = config.icao.trim().to_uppercase();

    let procedures = match &config.sids {
        Some(sids) => Some(
            sids.iter()
                .map(|sid| build_procedure(&icao, sid))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let aliases = config
        .aliases
        .iter()
        .map(|alias| ProcedureAlias {
            airport: icao.clone(),
            procedure: alias.sid.trim().to_uppercase(),
            fix: alias.point.trim().to_uppercase(),
            suffix: alias.suffix.trim().to_uppercase(),
        })
        .collect();

    Ok(AirportEntry {
        icao,
        procedures,
        aliases,
    })
}

fn build_procedure(icao: &str, sid: &SidConfig) -> Result<ProcedureRecord, ConfigError> {
    let fix = sid.point.trim().to_uppercase();
    let ctx = Location { airport: icao, fix: &fix };

    let restrictions = sid
        .restrictions
        .iter()
        .map(|r| build_restriction(&ctx, r))
        .collect::<Result<Vec<_>, _>>()?;

    let mut constraints = sid
        .constraints
        .iter()
        .map(|c| build_constraint(&ctx, c))
        .collect::<Result<Vec<_>, _>>()?;

    // A procedure without rule bundles behaves as one bundle with no rules.
    if constraints.is_empty() {
        constraints.push(ConstraintSet::default());
    }

    Ok(ProcedureRecord {
        fix,
        restrictions,
        constraints,
    })
}

struct Location<'a> {
    airport: &'a str,
    fix: &'a str,
}

impl Location<'_> {
    fn invalid_window(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidWindow {
            airport: self.airport.to_string(),
            fix: self.fix.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_time(
        &self,
        value: Option<&str>,
        default: TimeOfDay,
    ) -> Result<TimeOfDay, ConfigError> {
        match value {
            None => Ok(default),
            Some(text) => TimeOfDay::parse_hhmm(text).ok_or_else(|| ConfigError::InvalidTime {
                airport: self.airport.to_string(),
                fix: self.fix.to_string(),
                value: text.to_string(),
            }),
        }
    }
}

fn build_constraint(
    ctx: &Location<'_>,
    config: &ConstraintConfig,
) -> Result<ConstraintSet, ConfigError> {
    let parity = match config.dir.as_deref() {
        None => Parity::Any,
        Some(value) => Parity::parse(value).ok_or_else(|| ConfigError::InvalidParity {
            airport: ctx.airport.to_string(),
            fix: ctx.fix.to_string(),
            value: value.to_string(),
        })?,
    };

    let mut restrictions = config
        .restrictions
        .iter()
        .map(|r| build_restriction(ctx, r))
        .collect::<Result<Vec<_>, _>>()?;

    // Engine rules of the older format bind every entry and ignore the procedure-wide list.
    let engines = config
        .eng
        .as_ref()
        .map(|eng| upper_all(&eng.to_vec()))
        .unwrap_or_default();
    if !engines.is_empty() {
        if restrictions.is_empty() {
            restrictions.push(RestrictionSet::default());
        }
        for entry in &mut restrictions {
            entry.engines = engines.clone();
            entry.override_sid_wide = true;
        }
    }

    Ok(ConstraintSet {
        dests: upper_all(&config.dests),
        nodests: upper_all(&config.nodests),
        routes: upper_all(&config.route),
        noroutes: upper_all(&config.noroute),
        points: upper_all(&config.points),
        nopoints: upper_all(&config.nopoints),
        min: config.min,
        max: config.max,
        parity,
        nav: config
            .nav
            .as_deref()
            .map(str::trim)
            .filter(|nav| !nav.is_empty())
            .map(str::to_uppercase),
        override_sid_wide: config.override_sid_wide,
        restrictions,
    })
}

fn build_restriction(
    ctx: &Location<'_>,
    config: &RestrictionConfig,
) -> Result<RestrictionSet, ConfigError> {
    let window = match (&config.start, &config.end) {
        (None, None) => None,
        (start, end) => {
            let start_day = start.as_ref().and_then(|b| b.date);
            let end_day = end.as_ref().and_then(|b| b.date);
            if start_day.is_some() != end_day.is_some() {
                return Err(ctx.invalid_window("start and end must both name a day or neither"));
            }
            if start_day.into_iter().chain(end_day).any(|day| day > 6) {
                return Err(ctx.invalid_window("day of week must be 0-6"));
            }
            let start_time = ctx.parse_time(
                start.as_ref().and_then(|b| b.time.as_deref()),
                TimeOfDay::MIDNIGHT,
            )?;
            let end_time = ctx.parse_time(
                end.as_ref().and_then(|b| b.time.as_deref()),
                TimeOfDay::END_OF_DAY,
            )?;
            Some(TimeWindow {
                start_day,
                end_day,
                start: start_time,
                end: end_time,
            })
        }
    };

    Ok(RestrictionSet {
        types: upper_all(&config.types),
        engines: Vec::new(),
        suffixes: upper_all(&config.suffix),
        window,
        override_sid_wide: config.override_sid_wide,
        alternatives: upper_all(&config.alt),
    })
}
