//! End-of-run evaluation.
//!
//! Pure functions of the final state. Writing the result anywhere is the
//! caller's business.

use courier_dispatch::JobRegistry;
use courier_types::{JobState, Outcome, PlayerState, Summary};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Whether a finished run counts as a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunVerdict {
    /// The money goal was reached.
    Won,
    /// Time ran out or the jobs did.
    Lost,
}

impl From<Outcome> for RunVerdict {
    fn from(outcome: Outcome) -> Self {
        if outcome.is_win() { Self::Won } else { Self::Lost }
    }
}

/// Final figures for `player` and `registry`.
///
/// `completed_count` counts every delivery, late ones included;
/// `failed_count` counts jobs that expired before pickup.
pub fn summarize(player: &PlayerState, registry: &JobRegistry) -> Summary {
    Summary {
        money: player.money,
        reputation: player.reputation,
        completed_count: count_u32(registry.count(JobState::Delivered)),
        failed_count: count_u32(registry.count(JobState::Expired)),
        late_count: count_u32(registry.late_count()),
        elapsed_secs: player.elapsed_time,
    }
}

/// Log the end of a run.
pub fn log_run_end(outcome: Outcome, summary: &Summary) {
    info!(
        ?outcome,
        verdict = ?RunVerdict::from(outcome),
        money = %summary.money,
        reputation = summary.reputation,
        completed = summary.completed_count,
        failed = summary.failed_count,
        late = summary.late_count,
        elapsed_secs = summary.elapsed_secs,
        "Run ended"
    );
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
