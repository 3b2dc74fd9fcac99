//! Tunable tables for courier movement, stamina, and reputation.
//!
//! These structs mirror the `movement`, `stamina`, and `reputation`
//! sections of `courier-config.yaml`. Every field has a default, so a
//! config file only needs to list what it changes. Per-condition values
//! live in a [`WeatherTable`] rather than being scattered across call
//! sites.

use courier_types::WeatherCondition;
use serde::{Deserialize, Serialize};

use crate::error::RiderError;

// ---------------------------------------------------------------------------
// Per-condition tables
// ---------------------------------------------------------------------------

/// One value per weather condition.
///
/// When given in YAML, all eight conditions must be listed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherTable {
    /// Clear sky.
    pub clear: f64,
    /// Overcast.
    pub clouds: f64,
    /// Rain.
    pub rain: f64,
    /// Storm.
    pub storm: f64,
    /// Fog.
    pub fog: f64,
    /// Wind.
    pub wind: f64,
    /// Heat.
    pub heat: f64,
    /// Cold.
    pub cold: f64,
}

impl WeatherTable {
    /// Speed multipliers: the slower the weather, the lower the value.
    pub const fn speed_defaults() -> Self {
        Self {
            clear: 1.0,
            clouds: 1.0,
            rain: 0.90,
            storm: 0.80,
            fog: 1.0,
            wind: 1.0,
            heat: 0.85,
            cold: 1.0,
        }
    }

    /// Extra stamina per tile at intensity `1.0`.
    pub const fn wear_defaults() -> Self {
        Self {
            clear: 0.0,
            clouds: 0.0,
            rain: 0.1,
            storm: 0.3,
            fog: 0.0,
            wind: 0.1,
            heat: 0.2,
            cold: 0.05,
        }
    }

    /// The value for `condition`.
    pub const fn get(&self, condition: WeatherCondition) -> f64 {
        match condition {
            WeatherCondition::Clear => self.clear,
            WeatherCondition::Clouds => self.clouds,
            WeatherCondition::Rain => self.rain,
            WeatherCondition::Storm => self.storm,
            WeatherCondition::Fog => self.fog,
            WeatherCondition::Wind => self.wind,
            WeatherCondition::Heat => self.heat,
            WeatherCondition::Cold => self.cold,
        }
    }

    fn validate_non_negative(&self, table: &str) -> Result<(), RiderError> {
        for condition in WeatherCondition::ALL {
            let value = self.get(condition);
            if !value.is_finite() || value < 0.0 {
                return Err(RiderError::invalid(format!(
                    "{table}.{condition} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Stamina multiplier bands.
///
/// | Stamina | Multiplier |
/// |---------|------------|
/// | `>= high_threshold` | `high` |
/// | `>= mid_threshold` | `mid` |
/// | `> 0` | `low` |
/// | `0` | `empty` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaBands {
    /// Stamina at or above which the courier moves at full pace.
    pub high_threshold: f64,
    /// Multiplier in the high band.
    pub high: f64,
    /// Stamina at or above which the middle band applies.
    pub mid_threshold: f64,
    /// Multiplier in the middle band.
    pub mid: f64,
    /// Multiplier for any stamina above zero but below `mid_threshold`.
    pub low: f64,
    /// Multiplier at zero stamina.
    pub empty: f64,
}

impl Default for StaminaBands {
    fn default() -> Self {
        Self {
            high_threshold: 60.0,
            high: 1.0,
            mid_threshold: 10.0,
            mid: 0.8,
            low: 0.5,
            empty: 0.0,
        }
    }
}

impl StaminaBands {
    /// Multiplier for the given stamina.
    pub fn multiplier(&self, stamina: f64) -> f64 {
        if stamina >= self.high_threshold {
            self.high
        } else if stamina >= self.mid_threshold {
            self.mid
        } else if stamina > 0.0 {
            self.low
        } else {
            self.empty
        }
    }

    fn validate(&self) -> Result<(), RiderError> {
        let values = [self.high, self.mid, self.low, self.empty];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RiderError::invalid(
                "stamina band multipliers must be finite and non-negative",
            ));
        }
        // Speed must not rise as stamina falls.
        if !(self.high >= self.mid && self.mid >= self.low && self.low >= self.empty) {
            return Err(RiderError::invalid(
                "stamina band multipliers must not increase as stamina falls",
            ));
        }
        if !(self.high_threshold >= self.mid_threshold && self.mid_threshold >= 0.0) {
            return Err(RiderError::invalid(
                "stamina band thresholds must satisfy high >= mid >= 0",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Speed formula parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Tiles per second before any multiplier.
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,

    /// Speed lost per kilogram carried.
    #[serde(default = "default_weight_coeff")]
    pub weight_coeff: f64,

    /// Lowest weight multiplier, however heavy the parcel.
    #[serde(default = "default_weight_floor")]
    pub weight_floor: f64,

    /// Per-condition speed multiplier.
    #[serde(default = "WeatherTable::speed_defaults")]
    pub weather_speed: WeatherTable,

    /// Stamina multiplier bands.
    #[serde(default)]
    pub stamina_bands: StaminaBands,

    /// Reputation at or above which the speed bonus applies.
    #[serde(default = "default_reputation_bonus_threshold")]
    pub reputation_bonus_threshold: f64,

    /// Speed multiplier for excellent reputation.
    #[serde(default = "default_reputation_bonus")]
    pub reputation_bonus: f64,

    /// Speeds at or below this stall the step.
    #[serde(default = "default_stall_speed")]
    pub stall_speed: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            weight_coeff: default_weight_coeff(),
            weight_floor: default_weight_floor(),
            weather_speed: WeatherTable::speed_defaults(),
            stamina_bands: StaminaBands::default(),
            reputation_bonus_threshold: default_reputation_bonus_threshold(),
            reputation_bonus: default_reputation_bonus(),
            stall_speed: default_stall_speed(),
        }
    }
}

const fn default_base_speed() -> f64 {
    3.0
}

const fn default_weight_coeff() -> f64 {
    0.03
}

const fn default_weight_floor() -> f64 {
    0.5
}

const fn default_reputation_bonus_threshold() -> f64 {
    90.0
}

const fn default_reputation_bonus() -> f64 {
    1.03
}

const fn default_stall_speed() -> f64 {
    0.01
}

/// Stamina drain and recovery parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaConfig {
    /// Stamina per tile at a speed of one tile per second.
    #[serde(default = "default_step_cost")]
    pub step_cost: f64,

    /// Extra stamina per tile, scaled by weather intensity.
    #[serde(default = "WeatherTable::wear_defaults")]
    pub weather_wear: WeatherTable,

    /// Exhaustion clears once stamina rises strictly above this.
    #[serde(default = "default_recovery_threshold")]
    pub recovery_threshold: f64,

    /// Stamina regained per second while exhausted.
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,

    /// Stamina restored by each delivery.
    #[serde(default = "default_delivery_bonus")]
    pub delivery_bonus: f64,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            step_cost: default_step_cost(),
            weather_wear: WeatherTable::wear_defaults(),
            recovery_threshold: default_recovery_threshold(),
            recovery_rate: default_recovery_rate(),
            delivery_bonus: default_delivery_bonus(),
        }
    }
}

const fn default_step_cost() -> f64 {
    1.2
}

const fn default_recovery_threshold() -> f64 {
    30.0
}

const fn default_recovery_rate() -> f64 {
    4.0
}

const fn default_delivery_bonus() -> f64 {
    5.0
}

/// Reputation bounds and delivery adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Reputation at the start of a run.
    #[serde(default = "default_initial_reputation")]
    pub initial: f64,

    /// Lower bound.
    #[serde(default)]
    pub min: f64,

    /// Upper bound.
    #[serde(default = "default_max_reputation")]
    pub max: f64,

    /// Gain for an on-time delivery.
    #[serde(default = "default_on_time_gain")]
    pub on_time_gain: f64,

    /// Loss for a late delivery.
    #[serde(default = "default_late_penalty")]
    pub late_penalty: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_reputation(),
            min: 0.0,
            max: default_max_reputation(),
            on_time_gain: default_on_time_gain(),
            late_penalty: default_late_penalty(),
        }
    }
}

const fn default_initial_reputation() -> f64 {
    70.0
}

const fn default_max_reputation() -> f64 {
    100.0
}

const fn default_on_time_gain() -> f64 {
    3.0
}

const fn default_late_penalty() -> f64 {
    8.0
}

/// Everything the resource model needs, bundled for the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderConfig {
    /// Speed formula.
    #[serde(default)]
    pub movement: MovementConfig,
    /// Stamina drain and recovery.
    #[serde(default)]
    pub stamina: StaminaConfig,
    /// Reputation bounds.
    #[serde(default)]
    pub reputation: ReputationConfig,
}

impl RiderConfig {
    /// Check every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`RiderError::InvalidConfiguration`] naming the first bad
    /// value.
    pub fn validate(&self) -> Result<(), RiderError> {
        let m = &self.movement;
        finite_non_negative("movement.base_speed", m.base_speed)?;
        finite_non_negative("movement.weight_coeff", m.weight_coeff)?;
        finite_non_negative("movement.weight_floor", m.weight_floor)?;
        finite_non_negative("movement.reputation_bonus", m.reputation_bonus)?;
        finite_non_negative("movement.stall_speed", m.stall_speed)?;
        if !m.reputation_bonus_threshold.is_finite() {
            return Err(RiderError::invalid(
                "movement.reputation_bonus_threshold must be finite",
            ));
        }
        if m.weight_floor > 1.0 {
            return Err(RiderError::invalid("movement.weight_floor must not exceed 1"));
        }
        m.weather_speed.validate_non_negative("movement.weather_speed")?;
        m.stamina_bands.validate()?;

        let s = &self.stamina;
        finite_non_negative("stamina.step_cost", s.step_cost)?;
        finite_non_negative("stamina.recovery_rate", s.recovery_rate)?;
        finite_non_negative("stamina.delivery_bonus", s.delivery_bonus)?;
        finite_non_negative("stamina.recovery_threshold", s.recovery_threshold)?;
        if s.recovery_threshold >= crate::vitals::MAX_STAMINA {
            return Err(RiderError::invalid(
                "stamina.recovery_threshold must be below the stamina maximum",
            ));
        }
        s.weather_wear.validate_non_negative("stamina.weather_wear")?;

        let r = &self.reputation;
        for (name, value) in [
            ("reputation.initial", r.initial),
            ("reputation.min", r.min),
            ("reputation.max", r.max),
        ] {
            if !value.is_finite() {
                return Err(RiderError::invalid(format!("{name} must be finite")));
            }
        }
        finite_non_negative("reputation.on_time_gain", r.on_time_gain)?;
        finite_non_negative("reputation.late_penalty", r.late_penalty)?;
        if r.late_penalty <= r.on_time_gain {
            return Err(RiderError::invalid(
                "reputation.late_penalty must exceed reputation.on_time_gain",
            ));
        }
        if r.min > r.max {
            return Err(RiderError::invalid("reputation.min must not exceed reputation.max"));
        }
        if r.initial < r.min || r.initial > r.max {
            return Err(RiderError::invalid(
                "reputation.initial must lie within [reputation.min, reputation.max]",
            ));
        }
        Ok(())
    }
}

fn finite_non_negative(name: &str, value: f64) -> Result<(), RiderError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RiderError::invalid(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}
