//! Query Service for Tidewatch.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`GET /api/ping`** -- liveness probe, always `200 { status, version }`
//! - **`GET /api/state`** -- the latest world snapshot, or `503` with an
//!   `{ error, message }` body while the world is not ready or nothing
//!   has been collected yet
//!
//! # Architecture
//!
//! Handlers read through a [`SnapshotProvider`], normally the
//! collector's handle. Each request performs one readiness load and one
//! store read; neither waits on the sampling context. The server has an
//! explicit [`QueryService::start`] / [`QueryService::stop`] lifecycle.
//!
//! [`SnapshotProvider`]: tidewatch_core::collector::SnapshotProvider

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{QueryService, ServerConfig, ServerError};
pub use state::AppState;
