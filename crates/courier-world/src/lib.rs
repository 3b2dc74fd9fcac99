//! Geography and environment for the Courier simulation.
//!
//! This crate models the static city and the weather over it. Neither
//! knows about jobs or the courier.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid and weather validation.
//! - [`grid`] -- [`CityGrid`]: the immutable tile matrix plus legend, with
//!   bounds-checked tile queries and building-block grouping.
//! - [`weather`] -- [`WeatherSequencer`]: steps through an ordered list of
//!   bursts by elapsed time and pins on the last one.
//! - [`forecast`] -- Seeded Markov generation of a burst list from a
//!   condition transition table.

pub mod error;
pub mod forecast;
pub mod grid;
pub mod weather;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use forecast::{ForecastModel, ForecastParams, fallback_bursts, generate_bursts};
pub use grid::{BuildingBlock, CityGrid};
pub use weather::{PINNED_REMAINING_SECS, WeatherSequencer, WeatherTransition};
