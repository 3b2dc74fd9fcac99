//! Enumeration types for the Courier simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Map tiles
// ---------------------------------------------------------------------------

/// The kind of a single map tile.
///
/// Serialized using the single-letter codes of the city map feed. Whether a
/// tile is traversable and how fast it is to cross is decided by the map
/// legend, not by the variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Street (`C`, "calle").
    #[serde(rename = "C")]
    Street,
    /// Building (`B`).
    #[serde(rename = "B")]
    Building,
    /// Park (`P`).
    #[serde(rename = "P")]
    Park,
}

impl Tile {
    /// Return the legend code for this tile kind.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Street => "C",
            Self::Building => "B",
            Self::Park => "P",
        }
    }

    /// Parse a legend code into a tile kind.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(Self::Street),
            "B" => Some(Self::Building),
            "P" => Some(Self::Park),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Weather condition of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// No weather effects.
    Clear,
    /// Overcast, marginal effect.
    Clouds,
    /// Rain; the feed also reports a light variant.
    #[serde(alias = "rain_light")]
    Rain,
    /// Storm, the slowest condition.
    Storm,
    /// Fog.
    Fog,
    /// Wind.
    Wind,
    /// Heat, drains stamina faster.
    Heat,
    /// Cold.
    Cold,
}

impl WeatherCondition {
    /// Every condition, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Clear,
        Self::Clouds,
        Self::Rain,
        Self::Storm,
        Self::Fog,
        Self::Wind,
        Self::Heat,
        Self::Cold,
    ];

    /// Lowercase name, matching the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Clouds => "clouds",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Fog => "fog",
            Self::Wind => "wind",
            Self::Heat => "heat",
            Self::Cold => "cold",
        }
    }
}

impl core::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// One of the four grid directions.
///
/// `Up` decreases `y`: row 0 is the top row of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Towards column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Direction {
    /// Return the `(dx, dy)` step for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Job lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
///
/// `Pending -> Available -> Carried -> Delivered`, or
/// `Available -> Expired` when the time-to-live runs out before pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Release time not yet reached.
    Pending,
    /// Released and waiting for pickup.
    Available,
    /// Picked up and in transit. At most one job is carried at a time.
    Carried,
    /// Dropped off. Terminal.
    Delivered,
    /// Timed out while available. Terminal.
    Expired,
}

impl JobState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Available,
        Self::Carried,
        Self::Delivered,
        Self::Expired,
    ];

    /// Returns `true` for `Delivered` and `Expired`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Expired)
    }
}

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Money reached the goal. The only winning outcome.
    GoalReached,
    /// Elapsed time reached the limit.
    TimeUp,
    /// No job is left to work on, per the configured exhaustion policy.
    JobsExhausted,
}

impl Outcome {
    /// Returns `true` if this outcome counts as a win.
    pub const fn is_win(self) -> bool {
        matches!(self, Self::GoalReached)
    }
}
