//! Stamina, exhaustion, and delivery rewards.
//!
//! Stamina always stays in `[MIN_STAMINA, MAX_STAMINA]`. Exhaustion uses
//! hysteresis:
//!
//! - it is set the moment stamina reaches `0`;
//! - it is cleared only once stamina rises strictly above
//!   `recovery_threshold`.
//!
//! Stamina between the two thresholds leaves the flag as it was. The rule
//! is applied after every stamina change, whatever caused it.

use courier_types::{PlayerState, Position};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ReputationConfig, RiderConfig, StaminaConfig};

/// Lowest possible stamina.
pub const MIN_STAMINA: f64 = 0.0;

/// Highest possible stamina; every courier starts here.
pub const MAX_STAMINA: f64 = 100.0;

/// A change of the exhaustion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustionChange {
    /// Stamina hit zero.
    Exhausted,
    /// Stamina recovered past the recovery threshold.
    Recovered,
}

/// What a delivery did to the courier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEffect {
    /// Money added.
    pub payout: Decimal,
    /// Signed change in reputation after clamping.
    pub reputation_delta: f64,
    /// Stamina actually restored after clamping.
    pub stamina_restored: f64,
    /// Exhaustion change caused by the restored stamina.
    pub exhaustion: Option<ExhaustionChange>,
}

/// A fresh courier at `position`: full stamina, initial reputation, no
/// money.
pub fn new_player(position: Position, config: &RiderConfig) -> PlayerState {
    PlayerState {
        position,
        stamina: MAX_STAMINA,
        reputation: config.reputation.initial,
        money: Decimal::ZERO,
        exhausted: false,
        elapsed_time: 0.0,
    }
}

/// Deduct `cost` stamina and update the exhaustion flag.
pub fn spend_stamina(
    player: &mut PlayerState,
    cost: f64,
    config: &StaminaConfig,
) -> Option<ExhaustionChange> {
    let cost = if cost.is_finite() { cost.max(0.0) } else { 0.0 };
    player.stamina -= cost;
    settle_exhaustion(player, config)
}

/// Regain stamina at `recovery_rate` per second, but only while exhausted.
///
/// A courier who is not exhausted gains nothing here. Non-finite or
/// negative `dt` is ignored.
pub fn passive_recover(
    player: &mut PlayerState,
    dt: f64,
    config: &StaminaConfig,
) -> Option<ExhaustionChange> {
    if !player.exhausted || !dt.is_finite() || dt <= 0.0 {
        return None;
    }
    player.stamina += config.recovery_rate * dt;
    settle_exhaustion(player, config)
}

/// Credit a delivery: add the payout, adjust reputation, restore stamina.
///
/// An on-time delivery raises reputation by `on_time_gain`; a late one
/// lowers it by `late_penalty`. Reputation is clamped to its bounds and
/// money never decreases.
pub fn on_delivery(
    player: &mut PlayerState,
    payout: Decimal,
    on_time: bool,
    config: &RiderConfig,
) -> DeliveryEffect {
    let payout = payout.max(Decimal::ZERO);
    player.money = player.money.saturating_add(payout);

    let before = player.reputation;
    let delta = if on_time {
        config.reputation.on_time_gain
    } else {
        -config.reputation.late_penalty
    };
    player.reputation = clamp_reputation(before + delta, &config.reputation);

    let stamina_before = player.stamina;
    player.stamina += config.stamina.delivery_bonus;
    let exhaustion = settle_exhaustion(player, &config.stamina);

    DeliveryEffect {
        payout,
        reputation_delta: player.reputation - before,
        stamina_restored: player.stamina - stamina_before,
        exhaustion,
    }
}

fn clamp_reputation(value: f64, config: &ReputationConfig) -> f64 {
    value.clamp(config.min, config.max)
}

/// Clamp stamina and apply the exhaustion hysteresis rule.
fn settle_exhaustion(player: &mut PlayerState, config: &StaminaConfig) -> Option<ExhaustionChange> {
    player.stamina = if player.stamina.is_nan() {
        MIN_STAMINA
    } else {
        player.stamina.clamp(MIN_STAMINA, MAX_STAMINA)
    };

    if !player.exhausted && player.stamina <= MIN_STAMINA {
        player.exhausted = true;
        info!(position = %player.position, "Courier exhausted");
        return Some(ExhaustionChange::Exhausted);
    }
    if player.exhausted && player.stamina > config.recovery_threshold {
        player.exhausted = false;
        info!(stamina = player.stamina, "Courier recovered from exhaustion");
        return Some(ExhaustionChange::Recovered);
    }
    None
}
