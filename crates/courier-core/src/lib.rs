//! Simulation clock, tick pipeline, session, and run evaluation for the
//! Courier simulation.
//!
//! This crate ties the grid, weather, job registry, and courier model into
//! a single deterministic, tick-driven run. External callers drive it by
//! submitting commands to a [`Session`] and reading snapshots back.
//!
//! # Modules
//!
//! - [`clock`] -- Elapsed time, time limit, and termination rules.
//! - [`config`] -- Configuration loading from `courier-config.yaml` into
//!   strongly-typed structs.
//! - [`evaluator`] -- End-of-run summary and verdict.
//! - [`session`] -- The [`Session`] object: commands in, snapshots out.
//! - [`tick`] -- The per-tick pipeline ([`run_tick`](tick::run_tick)).

pub mod clock;
pub mod config;
pub mod evaluator;
pub mod session;
pub mod tick;

// Re-export primary types at crate root.
pub use clock::{ClockError, SimulationClock};
pub use config::{ConfigError, ExhaustionPolicy, SimulationConfig};
pub use evaluator::{RunVerdict, log_run_end, summarize};
pub use session::{CommandError, CommandOutcome, Session, SessionError, SessionSnapshot};
pub use tick::{SimulationState, TickReport, run_tick};
