//! Scenario loading: city map, job feed, and weather from JSON files.
//!
//! Every file may contain the bare object or the same object wrapped once
//! in a `{"data": ...}` envelope, the shape the city feeds publish. The
//! envelope is removed here and nowhere else.
//!
//! The weather file may hold a burst report (`{"bursts": [...]}`), a bare
//! burst list, or a forecast model to generate bursts from. A missing or
//! unreadable weather file degrades to the fallback clear spell; a broken
//! map or job feed is fatal.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use courier_core::SimulationConfig;
use courier_types::{Deadline, Job, JobId, Position, WeatherBurst};
use courier_world::{CityGrid, ForecastModel, fallback_bursts, generate_bursts};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

/// Failures reading scenario input files.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Map fields that override the run configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MapOverrides {
    /// Money goal for this city.
    #[serde(default)]
    pub goal: Option<Decimal>,
    /// Time limit for this city, in seconds.
    #[serde(default)]
    pub max_time: Option<f64>,
}

impl MapOverrides {
    /// Write the overrides into `config`.
    pub fn apply(self, config: &mut SimulationConfig) {
        if let Some(goal) = self.goal {
            info!(%goal, "Map overrides money goal");
            config.run.money_goal = goal;
        }
        if let Some(max_time) = self.max_time {
            info!(max_time, "Map overrides time limit");
            config.run.time_limit_secs = max_time;
        }
    }
}

/// Everything a session needs besides configuration.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// The city map.
    pub grid: CityGrid,
    /// Goal and time limit carried by the map.
    pub overrides: MapOverrides,
    /// The job feed, deadlines already in elapsed seconds.
    pub jobs: Vec<Job>,
    /// Weather bursts to play.
    pub bursts: Vec<WeatherBurst>,
}

impl Scenario {
    /// Load the files named in `config.data`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if the map or job file is missing or
    /// malformed.
    pub fn load(config: &SimulationConfig) -> Result<Self, ScenarioError> {
        let data = &config.data;

        let map_text = read(&data.map_path)?;
        let (grid, overrides) = parse_map(&map_text).map_err(|source| ScenarioError::Parse {
            path: data.map_path.clone(),
            source,
        })?;

        let jobs_text = read(&data.jobs_path)?;
        let jobs = parse_jobs(&jobs_text, data.run_started_at).map_err(|source| {
            ScenarioError::Parse {
                path: data.jobs_path.clone(),
                source,
            }
        })?;

        let bursts = load_weather(&data.weather_path, config);

        info!(
            width = grid.width(),
            height = grid.height(),
            jobs = jobs.len(),
            bursts = bursts.len(),
            "Scenario loaded"
        );
        Ok(Self {
            grid,
            overrides,
            jobs,
            bursts,
        })
    }
}

fn read(path: &Path) -> Result<String, ScenarioError> {
    std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove one `{"data": ...}` envelope if present.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
        other => other,
    }
}

/// Parse a city map and its overrides.
pub fn parse_map(text: &str) -> Result<(CityGrid, MapOverrides), serde_json::Error> {
    let value = unwrap_envelope(serde_json::from_str(text)?);
    let overrides = MapOverrides::deserialize(&value)?;
    let grid = CityGrid::deserialize(value)?;
    Ok((grid, overrides))
}

/// A job as the feed publishes it.
#[derive(Debug, Deserialize)]
struct FeedJob {
    id: JobId,
    pickup: Position,
    dropoff: Position,
    #[serde(default)]
    weight: f64,
    #[serde(default)]
    payout: Decimal,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    deadline: Option<FeedDeadline>,
    #[serde(default)]
    release_time: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedDeadline {
    Elapsed(f64),
    Timestamp(DateTime<Utc>),
}

/// Parse the job feed.
///
/// Timestamp deadlines become elapsed seconds since `run_started_at`;
/// without a start time they fall back to the TTL deadline. A deadline
/// before the start is due immediately.
pub fn parse_jobs(
    text: &str,
    run_started_at: Option<DateTime<Utc>>,
) -> Result<Vec<Job>, serde_json::Error> {
    let value = unwrap_envelope(serde_json::from_str(text)?);
    let feed = Vec::<FeedJob>::deserialize(value)?;
    Ok(feed
        .into_iter()
        .map(|job| {
            let deadline = resolve_deadline(&job.id, job.deadline, run_started_at);
            Job {
                id: job.id,
                pickup: job.pickup,
                dropoff: job.dropoff,
                weight: job.weight,
                payout: job.payout,
                priority: job.priority,
                deadline,
                release_time: job.release_time,
            }
        })
        .collect())
}

fn resolve_deadline(
    id: &JobId,
    deadline: Option<FeedDeadline>,
    run_started_at: Option<DateTime<Utc>>,
) -> Deadline {
    match (deadline, run_started_at) {
        (None, _) => Deadline::Ttl,
        (Some(FeedDeadline::Elapsed(secs)), _) => Deadline::At(secs),
        (Some(FeedDeadline::Timestamp(at)), Some(start)) => {
            Deadline::At((at - start).to_std().map_or(0.0, |elapsed| elapsed.as_secs_f64()))
        }
        (Some(FeedDeadline::Timestamp(at)), None) => {
            warn!(job = %id, %at, "No run start time configured, using TTL deadline");
            Deadline::Ttl
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeatherFeed {
    Report { bursts: Vec<WeatherBurst> },
    Bursts(Vec<WeatherBurst>),
    Model(ForecastModel),
}

/// Parse a weather file into bursts.
pub fn parse_weather(
    text: &str,
    config: &SimulationConfig,
) -> Result<Vec<WeatherBurst>, serde_json::Error> {
    let value = unwrap_envelope(serde_json::from_str(text)?);
    let bursts = match WeatherFeed::deserialize(value)? {
        WeatherFeed::Report { bursts } | WeatherFeed::Bursts(bursts) if !bursts.is_empty() => {
            bursts
        }
        WeatherFeed::Report { .. } | WeatherFeed::Bursts(_) => {
            warn!("Weather report has no bursts, using fallback weather");
            fallback_bursts()
        }
        WeatherFeed::Model(model) => {
            info!(
                seed = config.forecast.seed,
                initial = %model.initial,
                "Generating weather from forecast model"
            );
            generate_bursts(&model, &config.forecast.params, config.forecast.seed)
        }
    };
    Ok(bursts)
}

fn load_weather(path: &Path, config: &SimulationConfig) -> Vec<WeatherBurst> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Weather file unavailable, using fallback weather"
            );
            return fallback_bursts();
        }
    };
    parse_weather(&text, config).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Weather file invalid, using fallback weather");
        fallback_bursts()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use courier_types::{Tile, WeatherCondition};
    use courier_world::forecast::FALLBACK_DURATION_SECS;
    use rust_decimal_macros::dec;

    use super::*;

    const MAP: &str = r#"{
        "version": "1.0",
        "data": {
            "width": 3,
            "height": 2,
            "tiles": [["C", "B", "C"], ["P", "C", "C"]],
            "legend": {
                "C": {"name": "calle", "surface_weight": 1.0},
                "B": {"name": "edificio", "blocked": true},
                "P": {"name": "parque", "surface_weight": 0.95}
            },
            "goal": 3000,
            "max_time": 600
        }
    }"#;

    #[test]
    fn map_envelope_is_removed() {
        let (grid, overrides) = parse_map(MAP).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.tile_at(Position::new(1, 0)).unwrap(), Tile::Building);
        assert!(grid.is_blocked(Position::new(1, 0)).unwrap());
        assert_eq!(overrides.goal, Some(dec!(3000)));
        assert_eq!(overrides.max_time, Some(600.0));
    }

    #[test]
    fn bare_map_parses_without_overrides() {
        let bare = r#"{
            "width": 1, "height": 1, "tiles": [["C"]],
            "legend": {"C": {"name": "calle"}}
        }"#;
        let (grid, overrides) = parse_map(bare).unwrap();
        assert_eq!(grid.surface_weight(Position::new(0, 0)).unwrap(), 1.0);
        assert_eq!(overrides, MapOverrides::default());
    }

    #[test]
    fn inconsistent_map_is_rejected() {
        let ragged = r#"{
            "width": 2, "height": 1, "tiles": [["C"]],
            "legend": {"C": {"name": "calle"}}
        }"#;
        assert!(parse_map(ragged).is_err());
    }

    #[test]
    fn overrides_replace_goal_and_time_limit() {
        let mut config = SimulationConfig::default();
        MapOverrides {
            goal: Some(dec!(250)),
            max_time: Some(120.0),
        }
        .apply(&mut config);
        assert_eq!(config.run.money_goal, dec!(250));
        assert_eq!(config.run.time_limit_secs, 120.0);
    }

    const JOBS: &str = r#"{"data": [
        {"id": "REQ-1", "pickup": [1, 2], "dropoff": [3, 4], "payout": 120.5,
         "deadline": "2025-09-01T12:10:00Z", "weight": 2, "priority": 1, "release_time": 0},
        {"id": "REQ-2", "pickup": [0, 0], "dropoff": [1, 1], "payout": 80,
         "deadline": 45.5, "weight": 1, "priority": 0, "release_time": 15},
        {"id": "REQ-3", "pickup": [0, 0], "dropoff": [1, 1], "payout": 10}
    ]}"#;

    #[test]
    fn timestamp_deadlines_become_elapsed_seconds() {
        let start = "2025-09-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let jobs = parse_jobs(JOBS, Some(start)).unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].deadline, Deadline::At(600.0));
        assert_eq!(jobs[0].payout, dec!(120.5));
        assert_eq!(jobs[0].pickup, Position::new(1, 2));
        assert_eq!(jobs[1].deadline, Deadline::At(45.5));
        assert_eq!(jobs[1].release_time, 15.0);
        assert_eq!(jobs[2].deadline, Deadline::Ttl);
    }

    #[test]
    fn timestamp_deadlines_need_a_start_time() {
        let jobs = parse_jobs(JOBS, None).unwrap();
        assert_eq!(jobs[0].deadline, Deadline::Ttl);
        assert_eq!(jobs[1].deadline, Deadline::At(45.5));
    }

    #[test]
    fn deadline_before_start_is_due_immediately() {
        let start = "2025-09-01T13:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let jobs = parse_jobs(JOBS, Some(start)).unwrap();
        assert_eq!(jobs[0].deadline, Deadline::At(0.0));
    }

    #[test]
    fn weather_report_bursts_are_used_as_is() {
        let report = r#"{"data": {"city": "TigerCity", "bursts": [
            {"duration_sec": 60, "condition": "rain_light", "intensity": 0.4},
            {"duration_sec": 90, "condition": "storm", "intensity": 1.0}
        ]}}"#;
        let bursts = parse_weather(report, &SimulationConfig::default()).unwrap();
        assert_eq!(bursts.len(), 2);
        assert_eq!(bursts[0].condition, WeatherCondition::Rain);
        assert_eq!(bursts[1].duration_sec, 90.0);
    }

    #[test]
    fn forecast_model_generates_seeded_bursts() {
        let model = r#"{
            "conditions": ["clear", "clouds", "rain"],
            "transition": {"clear": {"clouds": 0.7, "rain": 0.3}},
            "initial": {"condition": "clear"}
        }"#;
        let config = SimulationConfig::default();
        let first = parse_weather(model, &config).unwrap();
        let second = parse_weather(model, &config).unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].condition, WeatherCondition::Clear);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_report_falls_back_to_clear() {
        let bursts = parse_weather(r#"{"bursts": []}"#, &SimulationConfig::default()).unwrap();
        assert_eq!(bursts, fallback_bursts());
        assert_eq!(bursts[0].duration_sec, FALLBACK_DURATION_SECS);
    }

    #[test]
    fn missing_weather_file_falls_back_to_clear() {
        let path = std::env::temp_dir().join("courier-no-such-weather.json");
        let bursts = load_weather(&path, &SimulationConfig::default());
        assert_eq!(bursts, fallback_bursts());
    }

    #[test]
    fn bundled_sample_scenario_loads() {
        let config = SimulationConfig::parse(include_str!("../../../courier-config.yaml")).unwrap();
        let (grid, overrides) = parse_map(include_str!("../../../data/map.json")).unwrap();
        let jobs = parse_jobs(
            include_str!("../../../data/jobs.json"),
            config.data.run_started_at,
        )
        .unwrap();
        let bursts = parse_weather(include_str!("../../../data/weather.json"), &config).unwrap();

        assert_eq!((grid.width(), grid.height()), (8, 6));
        assert_eq!(overrides.goal, Some(dec!(150)));
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].deadline, Deadline::At(300.0));
        assert_eq!(jobs[2].deadline, Deadline::Ttl);
        assert_eq!(bursts.len(), 5);
        assert!(jobs.iter().all(|job| grid.contains(job.pickup) && grid.contains(job.dropoff)));
    }
}
