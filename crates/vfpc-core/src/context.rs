// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Shared application state: settings plus the swappable registry snapshot.

use crate::config::ConfigError;
use crate::evaluator;
use crate::flight_plan::FlightPlan;
use crate::loader;
use crate::registry::Registry;
use crate::restriction::CurrentTime;
use crate::result::{EvaluationResult, Verbosity};
use crate::settings::Settings;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;

pub struct AppContext {
    settings: Settings,
    registry: RwLock<Arc<Registry>>,
    /// Token of the most recently issued reload.
    issued: AtomicU64,
    debug: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl AppContext {
    /// Starts with an empty registry. Call `reload_now` or `spawn_reload` to populate it.
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, Registry::empty())
    }

    pub fn with_registry(settings: Settings, registry: Registry) -> Self {
        let debug = settings.debug;
        Self {
            settings,
            registry: RwLock::new(Arc::new(registry)),
            issued: AtomicU64::new(0),
            debug: AtomicBool::new(debug),
            last_error: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Current registry. Holders keep seeing it even after a reload swaps it out.
    pub fn snapshot(&self) -> Arc<Registry> {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Issues a reload token. Only the latest token may publish a result.
    pub fn begin_reload(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes the outcome of reload `token`. Returns whether the snapshot changed.
    pub fn finish_reload(&self, token: u64, outcome: Result<Registry, ConfigError>) -> bool {
        let registry = match outcome {
            Ok(registry) => registry,
            Err(err) => {
                self.record_failure(token, &err);
                return false;
            }
        };

        let mut current = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let latest = self.issued.load(Ordering::SeqCst);
        if token != latest {
            debug!("Discarding stale reload — token={} latest={}", token, latest);
            return false;
        }

        info!(
            "Procedure data reloaded — token={} airports={} procedures={}",
            token,
            registry.len(),
            registry.procedure_count()
        );
        *current = Arc::new(registry);
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
        true
    }

    fn record_failure(&self, token: u64, err: &ConfigError) {
        warn!(
            "Procedure reload failed; keeping previous data — token={} source={} error={}",
            token, self.settings.source, err
        );
        if token == self.issued.load(Ordering::SeqCst) {
            *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());
        }
    }

    /// Loads on the calling thread. Returns `Ok(false)` when a newer reload superseded this one.
    pub fn reload_now(&self) -> Result<bool, ConfigError> {
        let token = self.begin_reload();
        info!("Reloading procedure data — source={}", self.settings.source);
        match loader::load_registry(&self.settings) {
            Ok(registry) => Ok(self.finish_reload(token, Ok(registry))),
            Err(err) => {
                self.record_failure(token, &err);
                Err(err)
            }
        }
    }

    /// Loads on a background thread. The handle yields whether the result was applied.
    pub fn spawn_reload(self: &Arc<Self>) -> JoinHandle<bool> {
        let token = self.begin_reload();
        let context = Arc::clone(self);
        info!(
            "Reloading procedure data in background — token={} source={}",
            token, self.settings.source
        );
        std::thread::spawn(move || {
            let outcome = loader::load_registry(&context.settings);
            context.finish_reload(token, outcome)
        })
    }

    pub fn evaluate(&self, plan: &FlightPlan, now: CurrentTime) -> EvaluationResult {
        let registry = self.snapshot();
        let result = evaluator::evaluate(plan, &registry, now);
        if self.debug() {
            info!("{}: {}", plan.callsign, result.summary(Verbosity::Verbose));
        }
        result
    }

    /// Evaluates a whole traffic sample against one snapshot.
    pub fn evaluate_batch(&self, plans: &[FlightPlan], now: CurrentTime) -> Vec<EvaluationResult> {
        let registry = self.snapshot();
        let debug = self.debug();
        plans
            .par_iter()
            .map(|plan| {
                let result = evaluator::evaluate(plan, &registry, now);
                if debug {
                    info!("{}: {}", plan.callsign, result.summary(Verbosity::Verbose));
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(icao: &str) -> Registry {
        Registry::from_json(&format!(r#"[{{"icao": "{icao}", "sids": [{{"point": "CPT"}}]}}]"#))
            .unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let context = AppContext::new(Settings::default());
        assert!(context.snapshot().is_empty());
        assert!(context.last_error().is_none());
    }

    #[test]
    fn test_latest_token_wins() {
        let context = AppContext::new(Settings::default());
        let older = context.begin_reload();
        let newer = context.begin_reload();

        assert!(context.finish_reload(newer, Ok(registry("EGLL"))));
        assert!(!context.finish_reload(older, Ok(registry("EGKK"))));

        let snapshot = context.snapshot();
        assert!(snapshot.find("EGLL").is_some());
        assert!(snapshot.find("EGKK").is_none());
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let context = AppContext::with_registry(Settings::default(), registry("EGLL"));
        let token = context.begin_reload();
        let err = ConfigError::InvalidParity {
            airport: "EGLL".into(),
            fix: "CPT".into(),
            value: "UP".into(),
        };
        assert!(!context.finish_reload(token, Err(err)));
        assert!(context.snapshot().find("EGLL").is_some());
        assert!(context.last_error().unwrap().contains("UP"));
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let context = AppContext::with_registry(Settings::default(), registry("EGLL"));
        let held = context.snapshot();
        let token = context.begin_reload();
        context.finish_reload(token, Ok(registry("EGKK")));
        assert!(held.find("EGLL").is_some());
        assert!(context.snapshot().find("EGKK").is_some());
    }
}
