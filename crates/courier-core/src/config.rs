//! Configuration loading and typed config structures for the Courier
//! simulation.
//!
//! The canonical configuration lives in `courier-config.yaml`. Every
//! field has a default, so an empty file (or no file) yields the standard
//! game. The movement, stamina, and reputation sections are owned by
//! `courier-rider` and flattened in here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use courier_rider::RiderConfig;
use courier_types::Position;
use courier_world::ForecastParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run limits and termination policy.
    #[serde(default)]
    pub run: RunConfig,

    /// Job timing and interaction radii.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Speed, stamina, and reputation tuning.
    #[serde(flatten)]
    pub rider: RiderConfig,

    /// Position history.
    #[serde(default)]
    pub undo: UndoConfig,

    /// Weather generation when the feed has no explicit bursts.
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Input and output files for the headless engine.
    #[serde(default)]
    pub data: DataConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.run.time_limit_secs.is_finite() || self.run.time_limit_secs <= 0.0 {
            return Err(invalid("run.time_limit_secs must be a positive number"));
        }
        if self.run.money_goal.is_sign_negative() && !self.run.money_goal.is_zero() {
            return Err(invalid("run.money_goal must not be negative"));
        }
        if !self.jobs.ttl_secs.is_finite() || self.jobs.ttl_secs <= 0.0 {
            return Err(invalid("jobs.ttl_secs must be a positive number"));
        }
        self.rider.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// What to do when the job feed runs dry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Never end the run because of jobs; only time or money can.
    Disabled,
    /// End once every job is delivered or expired. Pending jobs keep the
    /// run going.
    #[default]
    AllTerminal,
    /// End once no job is available or carried, even if some are still
    /// pending release.
    NoActiveJobs,
}

/// Run limits and termination policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Elapsed-time limit in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,

    /// Money needed to win.
    #[serde(default = "default_money_goal")]
    pub money_goal: Decimal,

    /// Whether running out of jobs ends the run.
    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,

    /// Starting tile. Defaults to the first passable tile in row-major
    /// order.
    #[serde(default)]
    pub start: Option<Position>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            money_goal: default_money_goal(),
            exhaustion_policy: ExhaustionPolicy::default(),
            start: None,
        }
    }
}

const fn default_time_limit_secs() -> f64 {
    900.0
}

fn default_money_goal() -> Decimal {
    Decimal::from(1500)
}

/// Job timing and interaction radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Seconds an available job waits before expiring; also the default
    /// delivery window.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: f64,

    /// Chebyshev radius for picking a job up.
    #[serde(default = "default_radius")]
    pub pickup_radius: u32,

    /// Chebyshev radius for dropping a job off.
    #[serde(default = "default_radius")]
    pub dropoff_radius: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            pickup_radius: default_radius(),
            dropoff_radius: default_radius(),
        }
    }
}

const fn default_ttl_secs() -> f64 {
    300.0
}

const fn default_radius() -> u32 {
    1
}

/// Position history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoConfig {
    /// Positions kept for undo. Zero disables undo.
    #[serde(default = "default_undo_capacity")]
    pub capacity: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            capacity: default_undo_capacity(),
        }
    }
}

const fn default_undo_capacity() -> usize {
    16
}

/// Weather generation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Seed for the forecast generator.
    #[serde(default)]
    pub seed: u64,

    /// Burst count, duration, and intensity ranges.
    #[serde(flatten)]
    pub params: ForecastParams,
}

/// Input and output files for the headless engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// City map (JSON).
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,

    /// Job feed (JSON).
    #[serde(default = "default_jobs_path")]
    pub jobs_path: PathBuf,

    /// Weather bursts or forecast model (JSON).
    #[serde(default = "default_weather_path")]
    pub weather_path: PathBuf,

    /// Scripted commands to replay (JSON list).
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Append-only run history (JSON lines).
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Wall-clock start of the run, used to convert absolute job
    /// deadlines into elapsed seconds.
    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
            jobs_path: default_jobs_path(),
            weather_path: default_weather_path(),
            script_path: default_script_path(),
            history_path: default_history_path(),
            run_started_at: None,
        }
    }
}

fn default_map_path() -> PathBuf {
    PathBuf::from("data/map.json")
}

fn default_jobs_path() -> PathBuf {
    PathBuf::from("data/jobs.json")
}

fn default_weather_path() -> PathBuf {
    PathBuf::from("data/weather.json")
}

fn default_script_path() -> PathBuf {
    PathBuf::from("data/script.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/history.jsonl")
}
