//! Shared snapshot model for the Tidewatch world-state API.
//!
//! These types are what the collector builds and what the HTTP API
//! serializes. They flow downstream to `TypeScript` via `ts-rs` for map
//! clients.
//!
//! # Modules
//!
//! - [`vector`] -- [`Vector3`] world coordinate
//! - [`snapshot`] -- [`Snapshot`] and the player, time, point of interest
//!   and mobile object records it aggregates

pub mod snapshot;
pub mod vector;

pub use snapshot::{
    DEFAULT_BEACON_LABEL, DEFAULT_SIGNAL_LABEL, MobileObject, PlayerState, PointOfInterest,
    Snapshot, TimeState, UNKNOWN_BIOME,
};
pub use vector::Vector3;
