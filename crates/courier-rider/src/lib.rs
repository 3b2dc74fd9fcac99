//! Courier state, movement, and resource mechanics for the Courier simulation.
//!
//! This crate is the logic layer for the courier: everything that changes
//! position, stamina, reputation, or money without touching I/O. It sits
//! between `courier-types`/`courier-world` (data and map) and
//! `courier-core` (which owns the session and drives ticks).
//!
//! # Modules
//!
//! - [`config`] -- Tunable tables for speed, stamina, and reputation ([`RiderConfig`])
//! - [`error`] -- Per-step rejections ([`RiderError`])
//! - [`movement`] -- Applying a single step ([`apply_step`], [`StepResult`])
//! - [`speed`] -- The speed formula ([`compute_speed`])
//! - [`undo`] -- Bounded position history ([`PositionHistory`], [`undo_step`])
//! - [`vitals`] -- Stamina, exhaustion hysteresis, and delivery rewards

pub mod config;
pub mod error;
pub mod movement;
pub mod speed;
pub mod undo;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use config::{
    MovementConfig, ReputationConfig, RiderConfig, StaminaBands, StaminaConfig, WeatherTable,
};
pub use error::RiderError;
pub use movement::{StepContext, StepResult, apply_step};
pub use speed::{SpeedInputs, compute_speed};
pub use undo::{PositionHistory, undo_step};
pub use vitals::{
    DeliveryEffect, ExhaustionChange, MAX_STAMINA, MIN_STAMINA, new_player, on_delivery,
    passive_recover, spend_stamina,
};
