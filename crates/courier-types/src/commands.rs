//! Commands accepted by a simulation session.
//!
//! A rendering or input layer never touches session state directly; it
//! submits one of these and reads back a snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::Direction;

/// A single command for the simulation session.
///
/// Serialized with an internal `command` tag so scripted runs can be
/// written as JSON lists, e.g. `{"command": "move", "direction": "up"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Step one tile.
    Move {
        /// Direction of the step.
        direction: Direction,
    },
    /// Pick up the best available job near the courier.
    AcceptNearestJob,
    /// Drop off the carried job if the courier is next to its dropoff.
    DeliverIfAtDropoff,
    /// Return to the previous position. Stamina and jobs are not rolled back.
    UndoLastMove,
    /// Advance simulated time.
    Tick {
        /// Seconds to advance.
        dt: f64,
    },
}
