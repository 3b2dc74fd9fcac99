//! Invariants checked over long, seeded random command sequences.
//!
//! Each run replays a few thousand commands against a small city with
//! buildings, a handful of jobs, and weather that changes. After every
//! command the job conservation law, the single-carried-job rule, the
//! stamina bounds, and the exhaustion hysteresis must hold.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

mod common;

use courier_core::{CommandError, Session, SimulationConfig};
use courier_dispatch::verify_conservation;
use courier_types::{Command, Direction, Job, JobState, WeatherBurst, WeatherCondition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal_macros::dec;

use common::{grid, job};

const COMMANDS_PER_RUN: usize = 3_000;

fn city() -> Vec<&'static str> {
    vec![
        "CCCCCCCC",
        "CBBCCPPC",
        "CBBCCPPC",
        "CCCCCCCC",
        "CCBBCCBC",
        "CCBBCCBC",
        "PPCCCCCC",
        "PPCCCCCC",
    ]
}

fn jobs() -> Vec<Job> {
    vec![
        job("a", (0, 0), (7, 7), 3.0, dec!(40), 0.0),
        job("b", (3, 3), (0, 6), 12.0, dec!(55), 0.0),
        job("c", (7, 0), (4, 3), 0.5, dec!(20), 30.0),
        job("d", (4, 7), (0, 0), 25.0, dec!(90), 60.0),
        job("e", (0, 3), (7, 3), 1.0, dec!(15), 120.0),
        job("f", (5, 3), (3, 0), 6.0, dec!(35), 200.0),
        job("g", (0, 7), (7, 0), 8.0, dec!(60), 400.0),
    ]
}

fn weather() -> Vec<WeatherBurst> {
    vec![
        WeatherBurst {
            condition: WeatherCondition::Clear,
            intensity: 0.2,
            duration_sec: 60.0,
        },
        WeatherBurst {
            condition: WeatherCondition::Rain,
            intensity: 0.6,
            duration_sec: 75.0,
        },
        WeatherBurst {
            condition: WeatherCondition::Heat,
            intensity: 0.9,
            duration_sec: 90.0,
        },
        WeatherBurst {
            condition: WeatherCondition::Storm,
            intensity: 1.0,
            duration_sec: 60.0,
        },
    ]
}

/// A config where stamina runs out quickly so exhaustion is exercised.
fn tiring_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.rider.stamina.step_cost = 12.0;
    config.run.money_goal = dec!(100000);
    config.jobs.pickup_radius = 2;
    config
}

fn random_commands(seed: u64) -> Vec<Command> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..COMMANDS_PER_RUN)
        .map(|_| match rng.random_range(0..100_u32) {
            0..=54 => Command::Move {
                direction: match rng.random_range(0..4_u32) {
                    0 => Direction::Up,
                    1 => Direction::Down,
                    2 => Direction::Left,
                    _ => Direction::Right,
                },
            },
            55..=64 => Command::AcceptNearestJob,
            65..=74 => Command::DeliverIfAtDropoff,
            75..=79 => Command::UndoLastMove,
            _ => Command::Tick {
                dt: f64::from(rng.random_range(0..=40_u32)) / 10.0,
            },
        })
        .collect()
}

fn new_session() -> Session {
    Session::new(tiring_config(), grid(&city()), jobs(), weather()).unwrap()
}

/// Replay `commands`, checking invariants after each one. Returns the
/// session once the commands run out or the run ends.
fn replay_checked(commands: &[Command]) -> Session {
    let mut session = new_session();
    let threshold = session.config().rider.stamina.recovery_threshold;
    let mut expect_exhausted = false;

    for command in commands {
        match session.submit(*command) {
            Ok(_) | Err(CommandError::Rider { .. }) => {}
            Err(CommandError::RunFinished { .. }) => break,
            Err(other) => panic!("unexpected rejection {other}"),
        }

        assert!(
            verify_conservation(session.job_ids(), session.registry()).is_balanced(),
            "conservation violated after {command:?}"
        );
        assert!(session.registry().count(JobState::Carried) <= 1);

        let player = session.player();
        assert!((0.0..=100.0).contains(&player.stamina));

        if player.stamina <= 0.0 {
            expect_exhausted = true;
        } else if expect_exhausted && player.stamina > threshold {
            expect_exhausted = false;
        }
        assert_eq!(
            player.exhausted, expect_exhausted,
            "exhaustion flag wrong at stamina {} after {command:?}",
            player.stamina
        );
    }
    session
}

#[test]
fn invariants_hold_over_random_runs() {
    for seed in 0..8 {
        let session = replay_checked(&random_commands(seed));
        let summary = session.summary();
        let total = session.registry().len();
        let accounted = usize::try_from(summary.completed_count + summary.failed_count).unwrap();
        assert!(accounted <= total);
    }
}

#[test]
fn exhaustion_actually_happens() {
    // Walk back and forth until stamina is gone.
    let mut session = new_session();
    let mut exhausted_seen = false;
    for i in 0..200 {
        let direction = if i % 2 == 0 {
            Direction::Right
        } else {
            Direction::Left
        };
        let _ = session.submit(Command::Move { direction });
        if session.player().exhausted {
            exhausted_seen = true;
            break;
        }
    }
    assert!(exhausted_seen);
    assert_eq!(session.player().stamina, 0.0);

    // Moving is refused until stamina recovers past the threshold.
    assert!(session
        .submit(Command::Move {
            direction: Direction::Down
        })
        .is_err());
    session.submit(Command::Tick { dt: 7.0 }).unwrap();
    assert!(session.player().exhausted);
    session.submit(Command::Tick { dt: 1.0 }).unwrap();
    assert!(!session.player().exhausted);
}

#[test]
fn identical_inputs_give_identical_results() {
    let commands = random_commands(1234);
    let first = replay_checked(&commands);
    let second = replay_checked(&commands);
    assert_eq!(first.summary(), second.summary());
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.outcome(), second.outcome());
}
