//! Simulation clock and termination rules.
//!
//! The clock is the single source of truth for elapsed time. Time only
//! moves forward, in non-negative finite steps, and never past the
//! configured limit.
//!
//! Termination is checked in a fixed order so that a tick satisfying
//! several conditions always reports the same one:
//!
//! 1. money reached the goal: [`Outcome::GoalReached`]
//! 2. elapsed time reached the limit: [`Outcome::TimeUp`]
//! 3. the job feed is exhausted under the configured
//!    [`ExhaustionPolicy`]: [`Outcome::JobsExhausted`]

use courier_dispatch::JobRegistry;
use courier_types::Outcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ExhaustionPolicy, RunConfig};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// A tick duration was negative or not finite.
    #[error("invalid tick duration {dt}: must be finite and non-negative")]
    InvalidDuration {
        /// The rejected duration.
        dt: f64,
    },
}

/// Elapsed time and the limits that end a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Seconds since the run started.
    elapsed_secs: f64,
    /// Elapsed time at which the run ends.
    time_limit_secs: f64,
    /// Money that wins the run.
    money_goal: Decimal,
    /// Whether running out of jobs ends the run.
    policy: ExhaustionPolicy,
}

impl SimulationClock {
    /// A clock at zero with the limits from `config`.
    pub const fn new(config: &RunConfig) -> Self {
        Self {
            elapsed_secs: 0.0,
            time_limit_secs: config.time_limit_secs,
            money_goal: config.money_goal,
            policy: config.exhaustion_policy,
        }
    }

    /// Advance by `dt` seconds, stopping at the time limit.
    ///
    /// Returns the new elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDuration`] if `dt` is negative or not
    /// finite; the clock is unchanged.
    pub fn advance(&mut self, dt: f64) -> Result<f64, ClockError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(ClockError::InvalidDuration { dt });
        }
        self.elapsed_secs = (self.elapsed_secs + dt).min(self.time_limit_secs);
        Ok(self.elapsed_secs)
    }

    /// Decide whether the run is over.
    pub fn check_termination(&self, money: Decimal, registry: &JobRegistry) -> Option<Outcome> {
        if money >= self.money_goal {
            return Some(Outcome::GoalReached);
        }
        if self.elapsed_secs >= self.time_limit_secs {
            return Some(Outcome::TimeUp);
        }
        let exhausted = match self.policy {
            ExhaustionPolicy::Disabled => false,
            ExhaustionPolicy::AllTerminal => registry.all_terminal(),
            ExhaustionPolicy::NoActiveJobs => registry.none_active(),
        };
        exhausted.then_some(Outcome::JobsExhausted)
    }

    /// Seconds since the run started.
    pub const fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Seconds left before the time limit.
    pub fn remaining_secs(&self) -> f64 {
        (self.time_limit_secs - self.elapsed_secs).max(0.0)
    }

    /// The time limit.
    pub const fn time_limit_secs(&self) -> f64 {
        self.time_limit_secs
    }

    /// The money goal.
    pub const fn money_goal(&self) -> Decimal {
        self.money_goal
    }

    /// The job exhaustion policy.
    pub const fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use courier_types::{Deadline, Job, JobId, Position};
    use rust_decimal_macros::dec;

    use super::*;

    fn run_config(policy: ExhaustionPolicy) -> RunConfig {
        RunConfig {
            time_limit_secs: 100.0,
            money_goal: dec!(50),
            exhaustion_policy: policy,
            start: None,
        }
    }

    fn registry(release_time: f64) -> JobRegistry {
        JobRegistry::new(vec![Job {
            id: JobId::new("j"),
            pickup: Position::new(0, 0),
            dropoff: Position::new(1, 1),
            weight: 0.0,
            payout: dec!(10),
            priority: 0,
            deadline: Deadline::Ttl,
            release_time,
        }])
        .unwrap()
    }

    #[test]
    fn advance_accumulates_and_stops_at_limit() {
        let mut clock = SimulationClock::new(&run_config(ExhaustionPolicy::Disabled));
        assert_eq!(clock.advance(40.0).unwrap(), 40.0);
        assert_eq!(clock.advance(0.0).unwrap(), 40.0);
        assert_eq!(clock.advance(500.0).unwrap(), 100.0);
        assert_eq!(clock.remaining_secs(), 0.0);
    }

    #[test]
    fn invalid_durations_are_rejected() {
        let mut clock = SimulationClock::new(&run_config(ExhaustionPolicy::Disabled));
        assert!(clock.advance(-1.0).is_err());
        assert!(clock.advance(f64::NAN).is_err());
        assert!(clock.advance(f64::INFINITY).is_err());
        assert_eq!(clock.elapsed_secs(), 0.0);
    }

    #[test]
    fn goal_beats_time_up() {
        let mut clock = SimulationClock::new(&run_config(ExhaustionPolicy::Disabled));
        let _ = clock.advance(100.0);
        let reg = registry(0.0);
        assert_eq!(clock.check_termination(dec!(50), &reg), Some(Outcome::GoalReached));
        assert_eq!(clock.check_termination(dec!(49), &reg), Some(Outcome::TimeUp));
    }

    #[test]
    fn pending_jobs_block_all_terminal_policy() {
        let clock = SimulationClock::new(&run_config(ExhaustionPolicy::AllTerminal));
        let reg = registry(30.0);
        assert_eq!(clock.check_termination(dec!(0), &reg), None);
    }

    #[test]
    fn pending_jobs_do_not_block_no_active_policy() {
        let clock = SimulationClock::new(&run_config(ExhaustionPolicy::NoActiveJobs));
        let reg = registry(30.0);
        assert_eq!(
            clock.check_termination(dec!(0), &reg),
            Some(Outcome::JobsExhausted)
        );
    }

    #[test]
    fn all_terminal_fires_once_every_job_expired() {
        let clock = SimulationClock::new(&run_config(ExhaustionPolicy::AllTerminal));
        let mut reg = registry(0.0);
        reg.tick_releases(0.0);
        assert_eq!(clock.check_termination(dec!(0), &reg), None);
        let _ = reg.tick_expirations(400.0, 300.0);
        assert_eq!(
            clock.check_termination(dec!(0), &reg),
            Some(Outcome::JobsExhausted)
        );
    }

    #[test]
    fn disabled_policy_ignores_jobs() {
        let clock = SimulationClock::new(&run_config(ExhaustionPolicy::Disabled));
        let reg = JobRegistry::new(Vec::new()).unwrap();
        assert_eq!(clock.check_termination(dec!(0), &reg), None);
    }
}
