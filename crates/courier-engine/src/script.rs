//! Command sources and the replay loop.
//!
//! A [`CommandSource`] decides what the courier does next, given a
//! snapshot. The engine ships a scripted source that replays a JSON list
//! of commands; once a source is spent the loop keeps ticking the clock
//! until the run ends, which the time limit guarantees.

use std::collections::VecDeque;
use std::path::Path;

use courier_core::{CommandError, CommandOutcome, Session, SessionSnapshot};
use courier_types::{Command, Outcome};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::scenario::ScenarioError;

/// Seconds per tick once the command source is spent.
pub const IDLE_TICK_SECS: f64 = 1.0;

/// Decides the courier's next command.
pub trait CommandSource {
    /// The next command, or `None` once the source has nothing left.
    fn next_command(&mut self, snapshot: &SessionSnapshot) -> Option<Command>;
}

/// Replays a fixed list of commands in order, ignoring the snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommands {
    commands: VecDeque<Command>,
}

impl ScriptedCommands {
    /// Create a source from `commands`.
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    /// Load a JSON command list from `path`. A missing file is an empty
    /// script.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        if !path.exists() {
            info!(path = %path.display(), "Script file not found, running idle");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let commands: Vec<Command> =
            serde_json::from_str(&text).map_err(|source| ScenarioError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), commands = commands.len(), "Script loaded");
        Ok(Self::new(commands))
    }

    /// Commands not yet replayed.
    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn next_command(&mut self, _snapshot: &SessionSnapshot) -> Option<Command> {
        self.commands.pop_front()
    }
}

/// Tally of a finished replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayReport {
    /// Commands from the source that the session accepted.
    pub applied: usize,
    /// Commands from the source that the session rejected.
    pub rejected: usize,
    /// Idle ticks issued after the source was spent.
    pub idle_ticks: usize,
    /// How the run ended.
    pub outcome: Outcome,
}

/// Drive `session` with `source` until the run ends.
///
/// Rejected commands are logged and skipped; they leave the session
/// unchanged.
///
/// # Errors
///
/// Returns [`EngineError::Command`] if an idle tick is rejected.
pub fn replay(
    session: &mut Session,
    source: &mut impl CommandSource,
) -> Result<ReplayReport, EngineError> {
    let mut applied: usize = 0;
    let mut rejected: usize = 0;
    let mut idle_ticks: usize = 0;
    let mut spent = false;

    loop {
        if let Some(outcome) = session.outcome() {
            info!(applied, rejected, idle_ticks, ?outcome, "Replay finished");
            return Ok(ReplayReport {
                applied,
                rejected,
                idle_ticks,
                outcome,
            });
        }

        let next = if spent {
            None
        } else {
            source.next_command(&session.snapshot())
        };
        let Some(command) = next else {
            spent = true;
            session.submit(Command::Tick { dt: IDLE_TICK_SECS })?;
            idle_ticks = idle_ticks.saturating_add(1);
            continue;
        };

        match session.submit(command) {
            Ok(outcome) => {
                applied = applied.saturating_add(1);
                log_outcome(&outcome);
            }
            Err(CommandError::RunFinished { .. }) => {}
            Err(e) => {
                rejected = rejected.saturating_add(1);
                warn!(?command, error = %e, "Command rejected");
            }
        }
    }
}

fn log_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Accepted { job_id } => info!(job = %job_id, "Job accepted"),
        CommandOutcome::Delivered { delivery, effect } => info!(
            job = %delivery.job_id,
            payout = %effect.payout,
            on_time = delivery.on_time,
            "Job delivered"
        ),
        CommandOutcome::Ticked { report } if !report.conserved => {
            warn!(elapsed = report.elapsed_secs, "Job conservation audit failed");
        }
        other => debug!(?other, "Command applied"),
    }
}
