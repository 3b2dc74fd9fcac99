//! Weather forecast generation from a condition transition table.
//!
//! Some weather feeds publish a Markov model (`conditions`, `transition`,
//! `initial`) instead of a ready-made burst list. This module turns such a
//! model into bursts:
//!
//! 1. The first burst uses the `initial` condition.
//! 2. Each burst lasts a whole number of seconds drawn from
//!    `[min_duration_secs, max_duration_secs]` and has an intensity drawn
//!    from `[min_intensity, max_intensity]`, rounded to two decimals.
//! 3. The next condition is drawn by transition weight among successors
//!    not used yet in this forecast; if none remain, uniformly among all
//!    conditions.
//!
//! Generation is seeded, so the same model and seed always yield the same
//! bursts. A model with no conditions degrades to [`fallback_bursts`].

use std::collections::{BTreeMap, BTreeSet};

use courier_types::{WeatherBurst, WeatherCondition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Duration of the single burst used when no forecast can be built.
pub const FALLBACK_DURATION_SECS: f64 = 9999.0;

/// Intensity of the fallback burst.
pub const FALLBACK_INTENSITY: f64 = 0.1;

/// A Markov weather model as published by the weather feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    /// Conditions the city can experience.
    pub conditions: Vec<WeatherCondition>,
    /// Successor weights: `transition[from][to]`.
    #[serde(default)]
    pub transition: BTreeMap<WeatherCondition, BTreeMap<WeatherCondition, f64>>,
    /// Condition of the first burst. Accepts either `"clear"` or the
    /// feed's nested `{"condition": "clear"}` form.
    #[serde(deserialize_with = "deserialize_initial")]
    pub initial: WeatherCondition,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InitialRepr {
    Bare(WeatherCondition),
    Nested { condition: WeatherCondition },
}

fn deserialize_initial<'de, D>(deserializer: D) -> Result<WeatherCondition, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match InitialRepr::deserialize(deserializer)? {
        InitialRepr::Bare(condition) | InitialRepr::Nested { condition } => condition,
    })
}

/// Shape of the generated bursts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// Number of bursts to generate.
    pub burst_count: u32,
    /// Shortest burst, seconds.
    pub min_duration_secs: u32,
    /// Longest burst, seconds.
    pub max_duration_secs: u32,
    /// Weakest intensity.
    pub min_intensity: f64,
    /// Strongest intensity.
    pub max_intensity: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            burst_count: 5,
            min_duration_secs: 60,
            max_duration_secs: 90,
            min_intensity: 0.1,
            max_intensity: 1.0,
        }
    }
}

/// The burst list used when no usable forecast exists: one long, mild
/// clear spell.
pub fn fallback_bursts() -> Vec<WeatherBurst> {
    vec![WeatherBurst {
        condition: WeatherCondition::Clear,
        intensity: FALLBACK_INTENSITY,
        duration_sec: FALLBACK_DURATION_SECS,
    }]
}

/// Generate a burst list from `model`.
pub fn generate_bursts(
    model: &ForecastModel,
    params: &ForecastParams,
    seed: u64,
) -> Vec<WeatherBurst> {
    if model.conditions.is_empty() || params.burst_count == 0 {
        warn!("Forecast model has no conditions, using fallback weather");
        return fallback_bursts();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let (min_d, max_d) = ordered(params.min_duration_secs, params.max_duration_secs);
    let (min_i, max_i) = if params.min_intensity <= params.max_intensity {
        (params.min_intensity, params.max_intensity)
    } else {
        (params.max_intensity, params.min_intensity)
    };
    let min_i = min_i.clamp(0.0, 1.0);
    let max_i = max_i.clamp(0.0, 1.0);

    let mut bursts = Vec::new();
    let mut used: BTreeSet<WeatherCondition> = BTreeSet::new();
    let mut current = model.initial;

    for _ in 0..params.burst_count {
        let duration: u32 = rng.random_range(min_d..=max_d);
        let raw_intensity: f64 = if max_i > min_i {
            rng.random_range(min_i..=max_i)
        } else {
            min_i
        };
        bursts.push(WeatherBurst {
            condition: current,
            intensity: round_to_hundredths(raw_intensity),
            duration_sec: f64::from(duration.max(1)),
        });
        used.insert(current);

        current = next_condition(model, current, &used, &mut rng);
    }

    bursts
}

/// Pick the successor of `from`, avoiding conditions already used.
fn next_condition(
    model: &ForecastModel,
    from: WeatherCondition,
    used: &BTreeSet<WeatherCondition>,
    rng: &mut StdRng,
) -> WeatherCondition {
    let candidates: Vec<(WeatherCondition, f64)> = model
        .transition
        .get(&from)
        .map(|successors| {
            successors
                .iter()
                .filter(|(c, w)| !used.contains(*c) && w.is_finite() && **w > 0.0)
                .map(|(c, w)| (*c, *w))
                .collect()
        })
        .unwrap_or_default();

    let total: f64 = candidates.iter().map(|(_, w)| *w).sum();
    if total > 0.0 {
        let roll: f64 = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for (condition, weight) in &candidates {
            cumulative += weight;
            if roll < cumulative {
                return *condition;
            }
        }
        if let Some((condition, _)) = candidates.last() {
            return *condition;
        }
    }

    let pick = rng.random_range(0..model.conditions.len());
    model.conditions.get(pick).copied().unwrap_or(from)
}

const fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
