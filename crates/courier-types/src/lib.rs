//! Shared type definitions for the Courier simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the Courier workspace. Every other crate consumes these types; none of
//! them define their own copies of positions, jobs, or weather.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier wrappers (`JobId`, `RunId`)
//! - [`enums`] -- Tiles, weather conditions, directions, lifecycle states, outcomes
//! - [`structs`] -- Positions, legend entries, jobs, bursts, player state, summaries
//! - [`commands`] -- Commands accepted by a simulation session

pub mod commands;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::Command;
pub use enums::{Direction, JobState, Outcome, Tile, WeatherCondition};
pub use ids::{JobId, RunId};
pub use structs::{
    Deadline, Job, LegendEntry, PlayerState, Position, RunRecord, Summary, WeatherBurst,
    WeatherReading,
};
