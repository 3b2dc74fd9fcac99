//! End-to-end scenarios driven through the public `Session` surface.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

mod common;

use courier_core::{CommandError, CommandOutcome, ExhaustionPolicy, Session, SimulationConfig};
use courier_rider::RiderError;
use courier_types::{
    Command, Direction, JobId, JobState, Outcome, Position, WeatherBurst, WeatherCondition,
};
use rust_decimal_macros::dec;

use common::{grid, job, street_grid};

fn config_starting_at(x: i32, y: i32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.run.start = Some(Position::new(x, y));
    config
}

fn step(session: &mut Session, direction: Direction, times: usize) {
    for _ in 0..times {
        session.submit(Command::Move { direction }).unwrap();
    }
}

fn single_job_session() -> Session {
    Session::new(
        config_starting_at(2, 2),
        street_grid(10, 10),
        vec![job("J1", (2, 2), (5, 5), 2.0, dec!(10), 0.0)],
        Vec::new(),
    )
    .unwrap()
}

#[test]
fn on_time_delivery_pays_and_raises_reputation() {
    let mut s = single_job_session();
    let reputation_before = s.player().reputation;

    assert_eq!(
        s.submit(Command::AcceptNearestJob).unwrap(),
        CommandOutcome::Accepted {
            job_id: JobId::new("J1")
        }
    );
    step(&mut s, Direction::Right, 3);
    step(&mut s, Direction::Down, 3);
    assert_eq!(s.player().position, Position::new(5, 5));
    s.submit(Command::Tick { dt: 120.0 }).unwrap();

    let delivered = s.submit(Command::DeliverIfAtDropoff).unwrap();
    let CommandOutcome::Delivered { delivery, .. } = delivered else {
        panic!("expected a delivery, got {delivered:?}");
    };
    assert!(delivery.on_time);
    assert_eq!(s.player().money, dec!(10));
    assert!(s.player().reputation > reputation_before);
    assert_eq!(s.registry().state_of(&JobId::new("J1")), Some(JobState::Delivered));
}

#[test]
fn late_delivery_still_succeeds_but_costs_reputation() {
    let mut s = single_job_session();
    let reputation_before = s.player().reputation;

    s.submit(Command::AcceptNearestJob).unwrap();
    step(&mut s, Direction::Right, 3);
    step(&mut s, Direction::Down, 3);
    s.submit(Command::Tick { dt: 301.0 }).unwrap();

    // Carried jobs are never expired by the tick.
    assert_eq!(s.registry().state_of(&JobId::new("J1")), Some(JobState::Carried));

    let delivered = s.submit(Command::DeliverIfAtDropoff).unwrap();
    let CommandOutcome::Delivered { delivery, .. } = delivered else {
        panic!("expected a delivery, got {delivered:?}");
    };
    assert!(!delivery.on_time);
    assert_eq!(s.player().money, dec!(10));
    assert!(s.player().reputation < reputation_before);
    assert_eq!(s.summary().late_count, 1);
}

#[test]
fn single_storm_burst_stays_pinned() {
    let mut s = Session::new(
        SimulationConfig::default(),
        street_grid(4, 4),
        Vec::new(),
        vec![WeatherBurst {
            condition: WeatherCondition::Storm,
            intensity: 1.0,
            duration_sec: 60.0,
        }],
    )
    .unwrap();
    // The empty job feed ends the run on this tick; the weather still moves.
    assert!(s.submit(Command::Tick { dt: 120.0 }).is_ok());

    let snapshot = s.snapshot();
    assert_eq!(snapshot.weather.condition, WeatherCondition::Storm);
    assert_eq!(snapshot.weather.intensity, 1.0);
    assert_eq!(snapshot.weather_index, 0);
}

#[test]
fn moving_into_a_blocked_tile_is_rejected() {
    let mut s = Session::new(
        config_starting_at(0, 0),
        grid(&["CB", "CC"]),
        Vec::new(),
        Vec::new(),
    )
    .unwrap();
    let result = s.submit(Command::Move {
        direction: Direction::Right,
    });
    assert_eq!(
        result,
        Err(CommandError::Rider {
            source: RiderError::Blocked {
                position: Position::new(1, 0),
                outside_grid: false
            }
        })
    );
    assert_eq!(s.player().position, Position::new(0, 0));
}

#[test]
fn unclaimed_job_expires_after_ttl() {
    let mut s = Session::new(
        config_starting_at(0, 0),
        street_grid(5, 5),
        vec![
            job("stale", (4, 4), (0, 0), 0.0, dec!(5), 0.0),
            job("later", (4, 4), (0, 0), 0.0, dec!(5), 1_000.0),
        ],
        Vec::new(),
    )
    .unwrap();
    s.submit(Command::Tick { dt: 300.0 }).unwrap();
    assert_eq!(s.registry().state_of(&JobId::new("stale")), Some(JobState::Available));
    let CommandOutcome::Ticked { report } = s.submit(Command::Tick { dt: 1.0 }).unwrap() else {
        panic!("expected a tick report");
    };
    assert_eq!(report.expired, vec![JobId::new("stale")]);
    assert_eq!(s.summary().failed_count, 1);
    // The pending job keeps the run alive under the default policy.
    assert_eq!(s.outcome(), None);
}

#[test]
fn pending_release_happens_on_the_tick_it_is_due() {
    let mut s = Session::new(
        config_starting_at(0, 0),
        street_grid(3, 3),
        vec![job("soon", (0, 0), (2, 2), 0.0, dec!(5), 10.0)],
        Vec::new(),
    )
    .unwrap();
    assert_eq!(s.submit(Command::AcceptNearestJob).unwrap(), CommandOutcome::NoJobAccepted);
    let CommandOutcome::Ticked { report } = s.submit(Command::Tick { dt: 10.0 }).unwrap() else {
        panic!("expected a tick report");
    };
    assert_eq!(report.released, vec![JobId::new("soon")]);
    assert!(matches!(
        s.submit(Command::AcceptNearestJob).unwrap(),
        CommandOutcome::Accepted { .. }
    ));
}

#[test]
fn reaching_the_goal_wins_on_the_next_tick() {
    let mut config = config_starting_at(0, 0);
    config.run.money_goal = dec!(25);
    let mut s = Session::new(
        config,
        street_grid(3, 3),
        vec![
            job("big", (0, 0), (1, 1), 0.0, dec!(30), 0.0),
            job("other", (2, 2), (0, 0), 0.0, dec!(5), 0.0),
        ],
        Vec::new(),
    )
    .unwrap();
    s.submit(Command::AcceptNearestJob).unwrap();
    s.submit(Command::DeliverIfAtDropoff).unwrap();
    assert_eq!(s.outcome(), None);

    let CommandOutcome::Ticked { report } = s.submit(Command::Tick { dt: 0.1 }).unwrap() else {
        panic!("expected a tick report");
    };
    assert_eq!(report.outcome, Some(Outcome::GoalReached));
    assert!(s.outcome().unwrap().is_win());
}

#[test]
fn exhaustion_policies_differ_on_pending_jobs() {
    let jobs = || vec![job("future", (0, 0), (1, 1), 0.0, dec!(5), 500.0)];

    let mut all_terminal = config_starting_at(0, 0);
    all_terminal.run.exhaustion_policy = ExhaustionPolicy::AllTerminal;
    let mut s = Session::new(all_terminal, street_grid(2, 2), jobs(), Vec::new()).unwrap();
    s.submit(Command::Tick { dt: 1.0 }).unwrap();
    assert_eq!(s.outcome(), None);

    let mut no_active = config_starting_at(0, 0);
    no_active.run.exhaustion_policy = ExhaustionPolicy::NoActiveJobs;
    let mut s = Session::new(no_active, street_grid(2, 2), jobs(), Vec::new()).unwrap();
    s.submit(Command::Tick { dt: 1.0 }).unwrap();
    assert_eq!(s.outcome(), Some(Outcome::JobsExhausted));
}

#[test]
fn heavy_parcel_slows_the_courier() {
    let mut s = Session::new(
        config_starting_at(0, 0),
        street_grid(4, 1),
        vec![job("anvil", (0, 0), (3, 0), 100.0, dec!(5), 0.0)],
        Vec::new(),
    )
    .unwrap();
    let CommandOutcome::Moved { step: light } = s
        .submit(Command::Move {
            direction: Direction::Right,
        })
        .unwrap()
    else {
        panic!("expected a move");
    };
    s.submit(Command::UndoLastMove).unwrap();
    s.submit(Command::AcceptNearestJob).unwrap();
    let CommandOutcome::Moved { step: heavy } = s
        .submit(Command::Move {
            direction: Direction::Right,
        })
        .unwrap()
    else {
        panic!("expected a move");
    };
    assert!(heavy.speed < light.speed);
    assert!(heavy.stamina_cost > light.stamina_cost);
}
