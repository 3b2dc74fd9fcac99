//! The courier speed formula.
//!
//! ```text
//! speed = base_speed
//!       * weather_speed[condition]
//!       * max(weight_floor, 1 - weight_coeff * carried_weight)
//!       * surface_weight
//!       * stamina_band(stamina)
//!       * (reputation_bonus if reputation >= threshold else 1)
//! ```
//!
//! For a fixed tile and weather the result never increases as carried
//! weight rises or as stamina falls. Weather intensity does not affect
//! speed; it only scales stamina wear.

use courier_types::WeatherReading;

use crate::config::MovementConfig;

/// Everything the speed formula reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedInputs {
    /// Surface weight of the destination tile.
    pub surface_weight: f64,
    /// Weight of the carried parcel, `0.0` if none.
    pub carried_weight: f64,
    /// Weather in effect.
    pub weather: WeatherReading,
    /// Current stamina.
    pub stamina: f64,
    /// Current reputation.
    pub reputation: f64,
}

/// Tiles per second for the given inputs. Never negative or NaN.
pub fn compute_speed(config: &MovementConfig, inputs: &SpeedInputs) -> f64 {
    let weather = config.weather_speed.get(inputs.weather.condition);
    let weight = weight_multiplier(config, inputs.carried_weight);
    let stamina = config.stamina_bands.multiplier(inputs.stamina);
    let reputation = if inputs.reputation >= config.reputation_bonus_threshold {
        config.reputation_bonus
    } else {
        1.0
    };

    let speed = config.base_speed * weather * weight * inputs.surface_weight * stamina * reputation;
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        0.0
    }
}

/// `max(weight_floor, 1 - weight_coeff * weight)`; negative weights count
/// as zero.
fn weight_multiplier(config: &MovementConfig, carried_weight: f64) -> f64 {
    let weight = carried_weight.max(0.0);
    (1.0 - config.weight_coeff * weight).max(config.weight_floor)
}
