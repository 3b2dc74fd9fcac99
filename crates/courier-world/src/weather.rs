//! Weather burst sequencer.
//!
//! The sequencer walks an ordered list of [`WeatherBurst`]s as simulated
//! time passes. When the last burst runs out it stays on that burst with a
//! very large remaining time instead of wrapping around or failing, so the
//! final condition persists for the rest of the run.
//!
//! # States
//!
//! - `index in 0..N` with `remaining > 0`: burst `index` is in effect.
//! - pinned: `index == N - 1`, remaining reset to [`PINNED_REMAINING_SECS`].
//! - empty list: [`WeatherSequencer::current`] is permanently `clear / 0.0`.
//!
//! [`advance`](WeatherSequencer::advance) never fails; bad input was
//! rejected when the sequencer was built.

use courier_types::{WeatherBurst, WeatherReading};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Remaining time assigned once the final burst is pinned.
pub const PINNED_REMAINING_SECS: f64 = 1.0e12;

/// A change of burst caused by [`WeatherSequencer::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeatherTransition {
    /// Moved on to the burst at `index`.
    Advanced {
        /// New burst index.
        index: usize,
        /// Weather now in effect.
        reading: WeatherReading,
    },
    /// The final burst ran out and is now pinned.
    Pinned {
        /// Index of the final burst.
        index: usize,
    },
}

/// Steps through weather bursts by elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSequencer {
    bursts: Vec<WeatherBurst>,
    index: usize,
    remaining_secs: f64,
    pinned: bool,
}

impl WeatherSequencer {
    /// Build a sequencer starting on the first burst.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfiguration`] if a burst has a
    /// non-positive or non-finite duration, or an intensity outside `[0, 1]`.
    pub fn new(bursts: Vec<WeatherBurst>) -> Result<Self, WorldError> {
        for (i, burst) in bursts.iter().enumerate() {
            if !burst.duration_sec.is_finite() || burst.duration_sec <= 0.0 {
                return Err(WorldError::invalid(format!(
                    "burst {i} has invalid duration {}",
                    burst.duration_sec
                )));
            }
            if !(0.0..=1.0).contains(&burst.intensity) {
                return Err(WorldError::invalid(format!(
                    "burst {i} has intensity {} outside [0, 1]",
                    burst.intensity
                )));
            }
        }

        let remaining_secs = bursts.first().map_or(PINNED_REMAINING_SECS, |b| b.duration_sec);
        Ok(Self {
            pinned: bursts.is_empty(),
            bursts,
            index: 0,
            remaining_secs,
        })
    }

    /// Consume `dt` seconds of weather.
    ///
    /// When the current burst runs out the sequencer moves to the next one
    /// with that burst's full duration (leftover time is not carried over),
    /// or pins on the final burst. Non-finite or negative `dt` is treated
    /// as zero.
    pub fn advance(&mut self, dt: f64) -> Option<WeatherTransition> {
        if self.bursts.is_empty() {
            return None;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.remaining_secs -= dt;
        if self.remaining_secs > 0.0 {
            return None;
        }

        let next = self.index.saturating_add(1);
        if let Some(burst) = self.bursts.get(next) {
            self.index = next;
            self.remaining_secs = burst.duration_sec;
            let reading = self.current();
            debug!(
                index = next,
                condition = %reading.condition,
                intensity = reading.intensity,
                "Weather burst started"
            );
            return Some(WeatherTransition::Advanced {
                index: next,
                reading,
            });
        }

        self.remaining_secs = PINNED_REMAINING_SECS;
        if self.pinned {
            return None;
        }
        self.pinned = true;
        debug!(index = self.index, "Final weather burst pinned");
        Some(WeatherTransition::Pinned { index: self.index })
    }

    /// The weather currently in effect.
    pub fn current(&self) -> WeatherReading {
        self.bursts
            .get(self.index)
            .map_or_else(WeatherReading::default, |burst| WeatherReading {
                condition: burst.condition,
                intensity: burst.intensity,
            })
    }

    /// Index of the current burst. Always `0` for an empty list.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Seconds left in the current burst.
    pub const fn remaining_secs(&self) -> f64 {
        self.remaining_secs
    }

    /// Returns `true` once the sequence is exhausted (or was empty).
    pub const fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// The full burst list.
    pub fn bursts(&self) -> &[WeatherBurst] {
        &self.bursts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use courier_types::WeatherCondition;

    use super::*;

    fn burst(condition: WeatherCondition, intensity: f64, duration_sec: f64) -> WeatherBurst {
        WeatherBurst {
            condition,
            intensity,
            duration_sec,
        }
    }

    #[test]
    fn starts_on_first_burst() {
        let seq = WeatherSequencer::new(vec![
            burst(WeatherCondition::Rain, 0.4, 60.0),
            burst(WeatherCondition::Clear, 0.0, 60.0),
        ])
        .unwrap();
        assert_eq!(seq.index(), 0);
        assert_eq!(seq.current().condition, WeatherCondition::Rain);
        assert_eq!(seq.remaining_secs(), 60.0);
    }

    #[test]
    fn advances_when_burst_runs_out() {
        let mut seq = WeatherSequencer::new(vec![
            burst(WeatherCondition::Rain, 0.4, 60.0),
            burst(WeatherCondition::Fog, 0.7, 30.0),
        ])
        .unwrap();
        assert_eq!(seq.advance(59.0), None);
        assert_eq!(seq.current().condition, WeatherCondition::Rain);

        let transition = seq.advance(1.0);
        assert!(matches!(
            transition,
            Some(WeatherTransition::Advanced { index: 1, .. })
        ));
        assert_eq!(seq.current().condition, WeatherCondition::Fog);
        assert_eq!(seq.remaining_secs(), 30.0);
    }

    #[test]
    fn single_storm_stays_pinned() {
        let mut seq =
            WeatherSequencer::new(vec![burst(WeatherCondition::Storm, 1.0, 60.0)]).unwrap();
        let transition = seq.advance(120.0);
        assert_eq!(transition, Some(WeatherTransition::Pinned { index: 0 }));
        assert_eq!(seq.index(), 0);
        assert!(seq.is_pinned());
        assert_eq!(seq.current().condition, WeatherCondition::Storm);
        assert_eq!(seq.current().intensity, 1.0);

        // Further time changes nothing and reports no new transition.
        for _ in 0..100 {
            assert_eq!(seq.advance(1_000.0), None);
        }
        assert_eq!(seq.current().condition, WeatherCondition::Storm);
    }

    #[test]
    fn large_step_moves_one_burst_at_a_time() {
        let mut seq = WeatherSequencer::new(vec![
            burst(WeatherCondition::Clear, 0.0, 10.0),
            burst(WeatherCondition::Wind, 0.5, 10.0),
            burst(WeatherCondition::Cold, 0.5, 10.0),
        ])
        .unwrap();
        let _ = seq.advance(500.0);
        assert_eq!(seq.index(), 1);
        assert_eq!(seq.remaining_secs(), 10.0);
    }

    #[test]
    fn empty_sequence_is_clear_forever() {
        let mut seq = WeatherSequencer::new(Vec::new()).unwrap();
        assert_eq!(seq.advance(10_000.0), None);
        let reading = seq.current();
        assert_eq!(reading.condition, WeatherCondition::Clear);
        assert_eq!(reading.intensity, 0.0);
        assert!(seq.is_pinned());
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let mut seq =
            WeatherSequencer::new(vec![burst(WeatherCondition::Heat, 0.3, 5.0)]).unwrap();
        assert_eq!(seq.advance(f64::NAN), None);
        assert_eq!(seq.advance(-3.0), None);
        assert_eq!(seq.remaining_secs(), 5.0);
    }

    #[test]
    fn rejects_zero_duration() {
        let result = WeatherSequencer::new(vec![burst(WeatherCondition::Rain, 0.5, 0.0)]);
        assert!(matches!(
            result,
            Err(WorldError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_intensity_above_one() {
        let result = WeatherSequencer::new(vec![burst(WeatherCondition::Rain, 1.5, 10.0)]);
        assert!(result.is_err());
    }
}
