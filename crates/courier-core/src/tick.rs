//! The tick pipeline that drives simulated time.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- advance elapsed time by `dt` (capped at the limit).
//! 2. **Weather** -- step the burst sequencer by the same `dt`.
//! 3. **Releases** -- pending jobs whose release time has come become
//!    available.
//! 4. **Expirations** -- available jobs older than the TTL expire.
//! 5. **Recovery** -- an exhausted courier regains stamina.
//! 6. **Termination** -- check goal, time limit, and job exhaustion.
//!
//! Commands never run inside a tick, so termination is always evaluated
//! on a consistent state. Given the same initial state and the same
//! sequence of ticks and commands, the pipeline produces the same result.

use std::collections::BTreeSet;

use courier_dispatch::{JobRegistry, verify_conservation};
use courier_rider::{ExhaustionChange, PositionHistory, passive_recover};
use courier_types::{JobId, Outcome, PlayerState, WeatherReading};
use courier_world::{CityGrid, WeatherSequencer, WeatherTransition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;

/// Everything a run mutates, owned in one place.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Validated configuration.
    pub config: SimulationConfig,
    /// The city map.
    pub grid: CityGrid,
    /// Weather bursts.
    pub weather: WeatherSequencer,
    /// All jobs.
    pub registry: JobRegistry,
    /// The courier.
    pub player: PlayerState,
    /// Elapsed time and limits.
    pub clock: SimulationClock,
    /// Previous positions for undo.
    pub undo: PositionHistory,
    /// Every job id the run started with.
    pub job_ids: BTreeSet<JobId>,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Elapsed time after the tick.
    pub elapsed_secs: f64,
    /// Weather in effect after the tick.
    pub weather: WeatherReading,
    /// Burst change, if any.
    pub weather_transition: Option<WeatherTransition>,
    /// Jobs that became available, in release order.
    pub released: Vec<JobId>,
    /// Jobs that expired.
    pub expired: Vec<JobId>,
    /// Exhaustion change from passive recovery.
    pub exhaustion: Option<ExhaustionChange>,
    /// `false` if the job conservation audit failed.
    pub conserved: bool,
    /// Set if the run ended on this tick.
    pub outcome: Option<Outcome>,
}

/// Execute one tick of `dt` seconds.
///
/// # Errors
///
/// Returns [`ClockError::InvalidDuration`] if `dt` is negative or not
/// finite. Nothing is mutated in that case.
pub fn run_tick(state: &mut SimulationState, dt: f64) -> Result<TickReport, ClockError> {
    // --- Phase 1: Clock ---
    let before = state.clock.elapsed_secs();
    let elapsed = state.clock.advance(dt)?;
    let step = elapsed - before;
    state.player.elapsed_time = elapsed;

    // --- Phase 2: Weather ---
    let weather_transition = state.weather.advance(step);
    if let Some(WeatherTransition::Advanced { index, reading }) = weather_transition {
        info!(
            index,
            condition = %reading.condition,
            intensity = reading.intensity,
            elapsed,
            "Weather changed"
        );
    }

    // --- Phase 3: Releases ---
    let released = state.registry.tick_releases(elapsed);

    // --- Phase 4: Expirations ---
    let expired = state
        .registry
        .tick_expirations(elapsed, state.config.jobs.ttl_secs);

    // --- Phase 5: Recovery ---
    let exhaustion = passive_recover(&mut state.player, step, &state.config.rider.stamina);

    // --- Phase 6: Termination ---
    let conserved = verify_conservation(&state.job_ids, &state.registry).is_balanced();
    let outcome = state
        .clock
        .check_termination(state.player.money, &state.registry);
    if let Some(outcome) = outcome {
        info!(?outcome, elapsed, money = %state.player.money, "Run finished");
    }

    debug!(
        elapsed,
        released = released.len(),
        expired = expired.len(),
        stamina = state.player.stamina,
        "Tick complete"
    );

    Ok(TickReport {
        elapsed_secs: elapsed,
        weather: state.weather.current(),
        weather_transition,
        released,
        expired,
        exhaustion,
        conserved,
        outcome,
    })
}
