//! Applying a single step to the courier.
//!
//! A step is all-or-nothing. Everything is computed first; the player is
//! only mutated once the step is known to succeed.
//!
//! # Order of checks
//!
//! 1. Destination off the grid: [`RiderError::Blocked`] with
//!    `outside_grid = true`.
//! 2. Destination tile blocked: [`RiderError::Blocked`].
//! 3. Courier exhausted, or speed at or below `stall_speed`:
//!    [`RiderError::Stalled`].
//! 4. Move, then deduct `step_cost / speed + wear * intensity` stamina.

use courier_types::{Direction, PlayerState, Position, WeatherReading};
use courier_world::CityGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RiderConfig;
use crate::error::RiderError;
use crate::speed::{SpeedInputs, compute_speed};
use crate::vitals::{ExhaustionChange, spend_stamina};

/// The world around a step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// The city map.
    pub grid: &'a CityGrid,
    /// Weather in effect.
    pub weather: WeatherReading,
    /// Weight of the carried parcel, `0.0` if none.
    pub carried_weight: f64,
}

/// Outcome of a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Where the courier was.
    pub from: Position,
    /// Where the courier is now.
    pub to: Position,
    /// Speed the step was taken at, tiles per second.
    pub speed: f64,
    /// Stamina deducted, before clamping.
    pub stamina_cost: f64,
    /// How long the step takes at this speed, for animation.
    pub step_secs: f64,
    /// Exhaustion change caused by the step.
    pub exhaustion: Option<ExhaustionChange>,
}

/// Move the courier one tile in `direction`.
///
/// # Errors
///
/// Returns [`RiderError::Blocked`] or [`RiderError::Stalled`]; the player is
/// left untouched in both cases.
pub fn apply_step(
    player: &mut PlayerState,
    direction: Direction,
    ctx: &StepContext<'_>,
    config: &RiderConfig,
) -> Result<StepResult, RiderError> {
    let from = player.position;
    let to = from
        .step(direction)
        .filter(|p| ctx.grid.contains(*p))
        .ok_or_else(|| RiderError::Blocked {
            position: offset(from, direction),
            outside_grid: true,
        })?;

    let blocked = ctx.grid.is_blocked(to).map_err(|_err| RiderError::Blocked {
        position: to,
        outside_grid: true,
    })?;
    if blocked {
        return Err(RiderError::Blocked {
            position: to,
            outside_grid: false,
        });
    }

    if player.exhausted {
        debug!(position = %from, "Step refused: courier exhausted");
        return Err(RiderError::Stalled { speed: 0.0 });
    }

    let surface_weight = ctx.grid.surface_weight(to).map_err(|_err| RiderError::Blocked {
        position: to,
        outside_grid: true,
    })?;
    let speed = compute_speed(
        &config.movement,
        &SpeedInputs {
            surface_weight,
            carried_weight: ctx.carried_weight,
            weather: ctx.weather,
            stamina: player.stamina,
            reputation: player.reputation,
        },
    );
    if speed <= config.movement.stall_speed {
        debug!(position = %from, speed, "Step refused: courier stalled");
        return Err(RiderError::Stalled { speed });
    }

    let wear = config.stamina.weather_wear.get(ctx.weather.condition) * ctx.weather.intensity;
    let stamina_cost = config.stamina.step_cost / speed + wear;

    player.position = to;
    let exhaustion = spend_stamina(player, stamina_cost, &config.stamina);
    debug!(%from, %to, speed, stamina = player.stamina, "Courier moved");

    Ok(StepResult {
        from,
        to,
        speed,
        stamina_cost,
        step_secs: 1.0 / speed,
        exhaustion,
    })
}

/// Best-effort destination for error reporting when the step overflows.
fn offset(from: Position, direction: Direction) -> Position {
    let (dx, dy) = direction.delta();
    Position::new(from.x.saturating_add(dx), from.y.saturating_add(dy))
}
