// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::fs;
use std::path::{Path, PathBuf};
use vfpc_core::restriction::{weekday_name, TimeOfDay};
use vfpc_core::{
    tag_text, AppContext, ConfigSource, CurrentTime, FlightPlan, Settings, Verbosity,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Procedure data: an http(s) URL or a path to a JSON file
    #[arg(short, long, env = "VFPC_CONFIG")]
    config: Option<String>,

    /// Log the verbose result of every check
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single flight plan (JSON file)
    Check {
        plan: PathBuf,
        /// Evaluation time as "<day> <HHMM>" in UTC, e.g. "Mon 1430" or "1 1430"
        #[arg(long)]
        at: Option<String>,
    },
    /// Check a JSON array of flight plans and print one tag per aircraft
    Batch {
        plans: PathBuf,
        #[arg(long)]
        at: Option<String>,
        /// Which failure code to show when several checks failed
        #[arg(long, default_value_t = 0)]
        rotation: usize,
    },
    /// Load the procedure data and report what it contains
    Validate,
    /// Show the effective settings
    Settings {
        /// Persist them to the settings file
        #[arg(long)]
        save: bool,
    },
}

fn parse_at(value: &str) -> Result<CurrentTime> {
    let (day, time) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("Expected \"<day> <HHMM>\", got '{}'", value))?;

    let weekday = match day.parse::<u8>() {
        Ok(number) => number,
        Err(_) => (0..7)
            .find(|d| weekday_name(*d).eq_ignore_ascii_case(day.get(..3).unwrap_or(day)))
            .ok_or_else(|| anyhow!("Unknown day '{}'", day))?,
    };
    let time = TimeOfDay::parse_hhmm(time).ok_or_else(|| anyhow!("Invalid time '{}'", time))?;

    CurrentTime::new(weekday, time.hour, time.minute)
        .ok_or_else(|| anyhow!("Day must be 0-6 (Sunday = 0), got {}", weekday))
}

fn current_time(at: Option<&str>) -> Result<CurrentTime> {
    match at {
        Some(value) => parse_at(value),
        None => Ok(CurrentTime::now_utc()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_context(settings: Settings) -> Result<AppContext> {
    let context = AppContext::new(settings);
    context.reload_now().with_context(|| {
        format!(
            "Failed to load procedure data from {}",
            context.settings().source
        )
    })?;
    Ok(context)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let settings_path = Settings::default_path();
    let mut settings = Settings::load(&settings_path)?;
    if let Some(source) = &cli.config {
        settings.source = ConfigSource::parse(source);
    }
    if cli.debug {
        settings.debug = true;
    }

    match &cli.command {
        Commands::Check { plan, at } => {
            let now = current_time(at.as_deref())?;
            let plan: FlightPlan = read_json(plan)?;
            if plan.is_vfr() {
                println!("{} VFR - not checked", plan.callsign);
                return Ok(());
            }

            let context = load_context(settings)?;
            let result = context.evaluate(&plan, now);
            println!("{}", result.summary(Verbosity::Concise));
            println!("{} {}", plan.callsign, tag_text(&result, &plan, 0));
        }
        Commands::Batch {
            plans,
            at,
            rotation,
        } => {
            let now = current_time(at.as_deref())?;
            let plans: Vec<FlightPlan> = read_json(plans)?;
            let context = load_context(settings)?;

            let results = context.evaluate_batch(&plans, now);
            for (plan, result) in plans.iter().zip(&results) {
                println!("{:<10} {}", plan.callsign, tag_text(result, plan, *rotation));
            }
            let passed = results.iter().filter(|r| r.passed).count();
            println!("{} of {} flight plans passed", passed, results.len());
        }
        Commands::Validate => {
            let context = load_context(settings)?;
            let registry = context.snapshot();
            println!("Source:          {}", context.settings().source);
            println!("Airports:        {}", registry.len());
            println!("Procedures:      {}", registry.procedure_count());
            println!("Constraint sets: {}", registry.constraint_count());
        }
        Commands::Settings { save } => {
            println!(
                "{}",
                serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?
            );
            if *save {
                settings.save(&settings_path)?;
                println!("Saved to {}", settings_path.display());
            }
        }
    }

    Ok(())
}
