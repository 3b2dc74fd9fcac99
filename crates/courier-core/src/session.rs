//! The simulation session: the only way to change a run.
//!
//! A [`Session`] owns the grid, weather, jobs, courier, and clock. Callers
//! submit [`Command`]s and read [`SessionSnapshot`]s; nothing outside the
//! session holds a mutable reference to its state.
//!
//! Every command is applied immediately and exactly once. A rejected
//! command leaves the session exactly as it was. Once the run has ended,
//! every command is rejected with [`CommandError::RunFinished`].

use std::collections::BTreeSet;

use courier_dispatch::{DeliveryResult, DispatchError, JobRegistry};
use courier_rider::{
    DeliveryEffect, PositionHistory, RiderError, StepContext, StepResult, apply_step, new_player,
    on_delivery, undo_step,
};
use courier_types::{
    Command, Direction, Job, JobId, Outcome, PlayerState, Position, Summary, WeatherBurst,
    WeatherReading,
};
use courier_world::{CityGrid, WeatherSequencer, WorldError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::evaluator::summarize;
use crate::tick::{SimulationState, TickReport, run_tick};

/// Fatal problems building a session. The session refuses to start
/// rather than simulate inconsistent data.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration values are out of range.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Map or weather data is inconsistent.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The job feed is inconsistent.
    #[error("dispatch error: {source}")]
    Dispatch {
        /// The underlying dispatch error.
        #[from]
        source: DispatchError,
    },

    /// Anything else that makes the inputs unusable together.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong.
        reason: String,
    },
}

/// Why a single command was rejected. The session is unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The courier could not move or undo.
    #[error("movement rejected: {source}")]
    Rider {
        /// The underlying rejection.
        #[from]
        source: RiderError,
    },

    /// The tick duration was unusable.
    #[error("tick rejected: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The run has already ended.
    #[error("run already finished: {outcome:?}")]
    RunFinished {
        /// How the run ended.
        outcome: Outcome,
    },
}

/// What an accepted command did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The courier moved one tile.
    Moved {
        /// Details of the step.
        step: StepResult,
    },
    /// The courier went back to its previous position.
    Undone {
        /// Position before the undo.
        from: Position,
        /// Position after the undo.
        to: Position,
    },
    /// A job was picked up.
    Accepted {
        /// The job now carried.
        job_id: JobId,
    },
    /// No job qualified, or one is already carried.
    NoJobAccepted,
    /// The carried job was delivered.
    Delivered {
        /// Registry side of the delivery.
        delivery: DeliveryResult,
        /// Effect on the courier.
        effect: DeliveryEffect,
    },
    /// Nothing is carried, or the courier is not at the dropoff.
    NotAtDropoff,
    /// Simulated time advanced.
    Ticked {
        /// What happened during the tick.
        report: TickReport,
    },
}

/// A read-only view of the session for renderers and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The courier.
    pub player: PlayerState,
    /// Weather in effect.
    pub weather: WeatherReading,
    /// Index of the current weather burst.
    pub weather_index: usize,
    /// Seconds left in the current burst.
    pub weather_remaining_secs: f64,
    /// The carried job, if any.
    pub carried: Option<Job>,
    /// Available jobs in release order.
    pub available: Vec<Job>,
    /// Ids of available jobs within pickup range.
    pub in_reach: Vec<JobId>,
    /// Seconds left before the time limit.
    pub remaining_secs: f64,
    /// Money needed to win.
    pub money_goal: Decimal,
    /// Positions available to undo.
    pub undo_depth: usize,
    /// Set once the run has ended.
    pub outcome: Option<Outcome>,
}

/// One courier run.
#[derive(Debug, Clone)]
pub struct Session {
    state: SimulationState,
    outcome: Option<Outcome>,
}

impl Session {
    /// Build a session from already-parsed inputs.
    ///
    /// Jobs whose release time is zero are available immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the configuration is out of range, a
    /// burst is malformed, job ids repeat, a job field is negative or not
    /// finite, a pickup or dropoff lies outside the grid, or no usable
    /// start tile exists.
    pub fn new(
        config: SimulationConfig,
        grid: CityGrid,
        jobs: Vec<Job>,
        bursts: Vec<WeatherBurst>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        for job in &jobs {
            for (label, position) in [("pickup", job.pickup), ("dropoff", job.dropoff)] {
                if !grid.contains(position) {
                    return Err(SessionError::InvalidConfiguration {
                        reason: format!("job {} has {label} {position} outside the grid", job.id),
                    });
                }
            }
        }
        let job_ids: BTreeSet<JobId> = jobs.iter().map(|j| j.id.clone()).collect();
        let mut registry = JobRegistry::new(jobs)?;
        let weather = WeatherSequencer::new(bursts)?;

        let start = resolve_start(&config, &grid)?;
        let player = new_player(start, &config.rider);
        let clock = SimulationClock::new(&config.run);
        let undo = PositionHistory::new(config.undo.capacity);

        let released = registry.tick_releases(0.0);
        info!(
            width = grid.width(),
            height = grid.height(),
            jobs = registry.len(),
            released = released.len(),
            bursts = weather.bursts().len(),
            %start,
            "Session started"
        );

        Ok(Self {
            state: SimulationState {
                config,
                grid,
                weather,
                registry,
                player,
                clock,
                undo,
                job_ids,
            },
            outcome: None,
        })
    }

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the command was rejected; the session is
    /// unchanged.
    pub fn submit(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        if let Some(outcome) = self.outcome {
            return Err(CommandError::RunFinished { outcome });
        }
        debug!(?command, "Command received");

        match command {
            Command::Move { direction } => self.move_courier(direction),
            Command::AcceptNearestJob => Ok(self.accept_nearest_job()),
            Command::DeliverIfAtDropoff => Ok(self.deliver_if_at_dropoff()),
            Command::UndoLastMove => self.undo_last_move(),
            Command::Tick { dt } => self.tick(dt),
        }
    }

    fn move_courier(&mut self, direction: Direction) -> Result<CommandOutcome, CommandError> {
        let state = &mut self.state;
        let ctx = StepContext {
            grid: &state.grid,
            weather: state.weather.current(),
            carried_weight: state.registry.carried().map_or(0.0, |job| job.weight),
        };
        let step = apply_step(&mut state.player, direction, &ctx, &state.config.rider)?;
        state.undo.push(step.from);
        Ok(CommandOutcome::Moved { step })
    }

    fn accept_nearest_job(&mut self) -> CommandOutcome {
        let state = &mut self.state;
        state
            .registry
            .accept_nearest(
                state.player.position,
                state.config.jobs.pickup_radius,
                state.clock.elapsed_secs(),
            )
            .map_or(CommandOutcome::NoJobAccepted, |job_id| {
                CommandOutcome::Accepted { job_id }
            })
    }

    fn deliver_if_at_dropoff(&mut self) -> CommandOutcome {
        let state = &mut self.state;
        let Some(delivery) = state.registry.deliver_if_at_dropoff(
            state.player.position,
            state.clock.elapsed_secs(),
            state.config.jobs.dropoff_radius,
            state.config.jobs.ttl_secs,
        ) else {
            return CommandOutcome::NotAtDropoff;
        };
        let effect = on_delivery(
            &mut state.player,
            delivery.payout,
            delivery.on_time,
            &state.config.rider,
        );
        CommandOutcome::Delivered { delivery, effect }
    }

    fn undo_last_move(&mut self) -> Result<CommandOutcome, CommandError> {
        let state = &mut self.state;
        let (from, to) = undo_step(&mut state.player, &mut state.undo)?;
        debug!(%from, %to, "Move undone");
        Ok(CommandOutcome::Undone { from, to })
    }

    fn tick(&mut self, dt: f64) -> Result<CommandOutcome, CommandError> {
        let report = run_tick(&mut self.state, dt)?;
        if report.outcome.is_some() {
            self.outcome = report.outcome;
        }
        Ok(CommandOutcome::Ticked { report })
    }

    /// A read-only copy of what a renderer needs.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = &self.state;
        let in_reach = state
            .registry
            .available_near(state.player.position, state.config.jobs.pickup_radius)
            .into_iter()
            .map(|job| job.id.clone())
            .collect();
        SessionSnapshot {
            player: state.player.clone(),
            weather: state.weather.current(),
            weather_index: state.weather.index(),
            weather_remaining_secs: state.weather.remaining_secs(),
            carried: state.registry.carried().cloned(),
            available: state.registry.available().cloned().collect(),
            in_reach,
            remaining_secs: state.clock.remaining_secs(),
            money_goal: state.clock.money_goal(),
            undo_depth: state.undo.len(),
            outcome: self.outcome,
        }
    }

    /// Figures for the run so far (final once [`outcome`](Self::outcome)
    /// is set).
    pub fn summary(&self) -> Summary {
        summarize(&self.state.player, &self.state.registry)
    }

    /// How the run ended, if it has.
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The courier.
    pub const fn player(&self) -> &PlayerState {
        &self.state.player
    }

    /// All jobs.
    pub const fn registry(&self) -> &JobRegistry {
        &self.state.registry
    }

    /// The city map.
    pub const fn grid(&self) -> &CityGrid {
        &self.state.grid
    }

    /// The configuration the session runs with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.state.config
    }

    /// Every job id the run started with.
    pub const fn job_ids(&self) -> &BTreeSet<JobId> {
        &self.state.job_ids
    }

    /// Seconds since the run started.
    pub const fn elapsed_secs(&self) -> f64 {
        self.state.clock.elapsed_secs()
    }
}

fn resolve_start(config: &SimulationConfig, grid: &CityGrid) -> Result<Position, SessionError> {
    let start = match config.run.start {
        Some(start) => start,
        None => grid
            .first_passable()
            .ok_or_else(|| SessionError::InvalidConfiguration {
                reason: "the grid has no passable tile to start on".to_owned(),
            })?,
    };
    if grid.is_blocked(start)? {
        return Err(SessionError::InvalidConfiguration {
            reason: format!("start tile {start} is blocked"),
        });
    }
    Ok(start)
}
