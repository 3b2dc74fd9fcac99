//! Job registry and lifecycle accounting for the Courier simulation.
//!
//! Every job in a run is owned by one [`JobRegistry`]. All lifecycle
//! transitions go through it, so "each job is in exactly one state" is a
//! property of a single data structure rather than of several lists kept
//! in sync by hand.
//!
//! # Lifecycle
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | Pending | Available | [`JobRegistry::tick_releases`], release time reached |
//! | Available | Expired | [`JobRegistry::tick_expirations`], age exceeds TTL |
//! | Available | Carried | [`JobRegistry::accept_nearest`], courier next to pickup |
//! | Carried | Delivered | [`JobRegistry::deliver_if_at_dropoff`], courier next to dropoff |
//!
//! A carried job never expires; it can only be delivered (possibly late).
//!
//! # Conservation
//!
//! For every tick, the union of job ids over all five states equals the
//! original job set, with no duplicates and at most one carried job. The
//! [`conservation`] module checks this against the registry's internal
//! indices.
//!
//! # Modules
//!
//! - [`registry`] -- The [`JobRegistry`] and its transition/query methods.
//! - [`conservation`] -- Conservation audit ([`ConservationResult`]).
//! - [`error`] -- Construction errors ([`DispatchError`]).

pub mod conservation;
pub mod error;
pub mod registry;

// Re-export primary types at crate root.
pub use conservation::{ConservationResult, JobAnomaly, verify_conservation};
pub use error::DispatchError;
pub use registry::{DeliveryResult, JobRecord, JobRegistry};
