//! Bounded history of previous courier positions.
//!
//! Only positions are remembered. Undoing a step does not give back the
//! stamina it cost and does not touch any job.

use std::collections::VecDeque;

use courier_types::{PlayerState, Position};
use serde::{Deserialize, Serialize};

use crate::error::RiderError;

/// Fixed-capacity stack of positions; the oldest entry is dropped first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHistory {
    capacity: usize,
    entries: VecDeque<Position>,
}

impl PositionHistory {
    /// An empty history holding at most `capacity` positions. A capacity
    /// of zero disables undo.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Remember `position`, discarding the oldest entry if full.
    pub fn push(&mut self, position: Position) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(position);
    }

    /// Take the most recent position.
    pub fn pop(&mut self) -> Option<Position> {
        self.entries.pop_back()
    }

    /// The most recent position, without removing it.
    pub fn peek(&self) -> Option<Position> {
        self.entries.back().copied()
    }

    /// Number of remembered positions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is nothing to undo.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of positions kept.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Put `player` back on the most recent position in `history`.
///
/// Returns `(from, to)`. Only the position changes.
///
/// # Errors
///
/// Returns [`RiderError::NothingToUndo`] if `history` is empty; `player`
/// is left as it was.
pub fn undo_step(
    player: &mut PlayerState,
    history: &mut PositionHistory,
) -> Result<(Position, Position), RiderError> {
    let to = history.pop().ok_or(RiderError::NothingToUndo)?;
    let from = player.position;
    player.position = to;
    Ok((from, to))
}
