//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, replay, and history persistence.

use crate::history::HistoryError;
use crate::scenario::ScenarioError;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: courier_core::ConfigError,
    },

    /// A map, job, weather, or script file could not be used.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying scenario error.
        #[from]
        source: ScenarioError,
    },

    /// The loaded inputs do not form a valid session.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: courier_core::SessionError,
    },

    /// A command the engine issued itself was rejected.
    #[error("command error: {source}")]
    Command {
        /// The underlying command error.
        #[from]
        source: courier_core::CommandError,
    },

    /// The run history could not be written or read.
    #[error("history error: {source}")]
    History {
        /// The underlying history error.
        #[from]
        source: HistoryError,
    },
}
