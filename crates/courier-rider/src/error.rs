//! Error types for the `courier-rider` crate.
//!
//! Every variant is a local, recoverable rejection: the courier's state is
//! exactly what it was before the call.

use courier_types::Position;

/// Errors that can occur when moving the courier or validating its tuning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiderError {
    /// The destination cannot be entered.
    #[error("cannot enter {position} (outside grid: {outside_grid})")]
    Blocked {
        /// The destination that was refused.
        position: Position,
        /// `true` if the destination lies outside the grid rather than on a
        /// blocked tile.
        outside_grid: bool,
    },

    /// Computed speed is too low to move.
    #[error("courier stalled: speed {speed} is at or below the stall threshold")]
    Stalled {
        /// The speed that was computed for the step.
        speed: f64,
    },

    /// Undo was requested with an empty position history.
    #[error("no previous position to return to")]
    NothingToUndo,

    /// A tuning value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl RiderError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
