//! Headless engine binary for the Courier simulation.
//!
//! Wires the scenario files, the configuration, and a scripted command
//! source into a single session and plays it to the end.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `courier-config.yaml` (or `$COURIER_CONFIG`)
//! 3. Load the city map, job feed, and weather
//! 4. Apply the map's goal and time-limit overrides
//! 5. Build the session and load the command script
//! 6. Replay the script, then tick until the run ends
//! 7. Log the result and append it to the run history

mod error;
mod history;
mod scenario;
mod script;

use std::path::PathBuf;

use chrono::Utc;
use courier_core::{Session, SimulationConfig, log_run_end};
use courier_types::RunRecord;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::history::RunHistory;
use crate::scenario::Scenario;
use crate::script::{ScriptedCommands, replay};

/// Config file used when `COURIER_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "courier-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step, the replay, or the
/// history write fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("courier-engine starting");

    // 2. Load configuration.
    let mut config = load_config()?;
    info!(
        time_limit_secs = config.run.time_limit_secs,
        money_goal = %config.run.money_goal,
        exhaustion_policy = ?config.run.exhaustion_policy,
        ttl_secs = config.jobs.ttl_secs,
        "Configuration loaded"
    );

    // 3-4. Load the scenario and let the map override the run limits.
    let scenario = Scenario::load(&config).map_err(EngineError::from)?;
    scenario.overrides.apply(&mut config);

    // 5. Build the session and the command source.
    let mut script =
        ScriptedCommands::load(&config.data.script_path).map_err(EngineError::from)?;
    let history = RunHistory::new(config.data.history_path.clone());
    let mut session = Session::new(config, scenario.grid, scenario.jobs, scenario.bursts)
        .map_err(EngineError::from)?;

    // 6. Play the run.
    let report = replay(&mut session, &mut script)?;
    info!(
        applied = report.applied,
        rejected = report.rejected,
        idle_ticks = report.idle_ticks,
        unplayed = script.remaining(),
        "Replay complete"
    );

    // 7. Log and record the result.
    let summary = session.summary();
    log_run_end(report.outcome, &summary);

    let record = RunRecord::new(report.outcome, summary, Utc::now());
    history.append(&record).map_err(EngineError::from)?;
    let runs = history.load().map_err(EngineError::from)?;
    let best_money = runs.iter().map(|run| run.summary.money).max();
    info!(
        path = %history.path().display(),
        runs = runs.len(),
        best_money = ?best_money,
        "courier-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads `$COURIER_CONFIG` if set, otherwise `courier-config.yaml` in the
/// current working directory. A missing file yields the defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var_os("COURIER_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok(config)
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
