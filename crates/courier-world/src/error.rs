//! Error types for the `courier-world` crate.

use courier_types::Position;

/// Errors that can occur during grid and weather operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// A coordinate lies outside `[0, width) x [0, height)`.
    #[error("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        position: Position,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// Map or weather data is inconsistent and cannot be simulated.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl WorldError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
