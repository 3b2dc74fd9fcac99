//! Core entity structs for the Courier simulation.
//!
//! These are plain data: validation lives with the component that owns
//! each value (grid, registry, resource model), not here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Direction, Outcome, WeatherCondition};
use crate::ids::{JobId, RunId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A tile coordinate. `x` is the column, `y` the row.
///
/// Serialized as an `[x, y]` pair, the shape used by the job feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// The neighbouring position one step in `direction`.
    ///
    /// Returns `None` only if the coordinate would overflow `i32`.
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(p: Position) -> Self {
        (p.x, p.y)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Map legend
// ---------------------------------------------------------------------------

/// Legend entry describing how a tile kind behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Display name ("calle", "edificio", ...).
    pub name: String,
    /// Surface speed weight. `None` means the default of `1.0`.
    #[serde(default)]
    pub surface_weight: Option<f64>,
    /// Whether the tile cannot be entered.
    #[serde(default)]
    pub blocked: bool,
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// When a job is due.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deadline {
    /// Due `ttl` seconds after release (the configured job TTL).
    #[default]
    Ttl,
    /// Due at an absolute elapsed time, in seconds since run start.
    At(f64),
}

/// A delivery job as supplied by the job feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier.
    pub id: JobId,
    /// Tile the parcel is collected from.
    pub pickup: Position,
    /// Tile the parcel is delivered to.
    pub dropoff: Position,
    /// Parcel weight (kg), non-negative.
    #[serde(default)]
    pub weight: f64,
    /// Money paid on delivery, non-negative.
    #[serde(default)]
    pub payout: Decimal,
    /// Higher priority jobs are accepted first.
    #[serde(default)]
    pub priority: i32,
    /// Due time.
    #[serde(default)]
    pub deadline: Deadline,
    /// Elapsed seconds after which the job becomes available.
    #[serde(default)]
    pub release_time: f64,
}

impl Job {
    /// The elapsed time at which this job is due.
    pub fn due_at(&self, ttl_secs: f64) -> f64 {
        match self.deadline {
            Deadline::Ttl => self.release_time + ttl_secs,
            Deadline::At(at) => at,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// A single weather condition lasting a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherBurst {
    /// Condition for the whole burst.
    pub condition: WeatherCondition,
    /// Strength in `[0, 1]`.
    pub intensity: f64,
    /// Burst length in seconds, strictly positive.
    pub duration_sec: f64,
}

/// The weather currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Current condition.
    pub condition: WeatherCondition,
    /// Current intensity in `[0, 1]`.
    pub intensity: f64,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self {
            condition: WeatherCondition::Clear,
            intensity: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Mutable courier state.
///
/// Owned by the simulation session and only changed through the resource
/// model; everything outside the session sees copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current tile.
    pub position: Position,
    /// Stamina in `[0, 100]`.
    pub stamina: f64,
    /// Reputation, clamped to the configured range.
    pub reputation: f64,
    /// Money earned, never negative.
    pub money: Decimal,
    /// Set when stamina hits zero, cleared once it recovers past the
    /// recovery threshold.
    pub exhausted: bool,
    /// Seconds since the run started.
    pub elapsed_time: f64,
}

// ---------------------------------------------------------------------------
// End of run
// ---------------------------------------------------------------------------

/// Final figures of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Money at the end of the run.
    pub money: Decimal,
    /// Reputation at the end of the run.
    pub reputation: f64,
    /// Jobs delivered (on time or late).
    pub completed_count: u32,
    /// Jobs that expired before pickup.
    pub failed_count: u32,
    /// Delivered jobs that missed their deadline.
    pub late_count: u32,
    /// Seconds the run lasted.
    pub elapsed_secs: f64,
}

/// One entry of the append-only run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Wall-clock time the run finished.
    pub finished_at: DateTime<Utc>,
    /// Why the run ended.
    pub outcome: Outcome,
    /// Final figures.
    #[serde(flatten)]
    pub summary: Summary,
}

impl RunRecord {
    /// Build a record for a run that finished at `finished_at`.
    pub fn new(outcome: Outcome, summary: Summary, finished_at: DateTime<Utc>) -> Self {
        Self {
            run_id: RunId::new(),
            finished_at,
            outcome,
            summary,
        }
    }
}
