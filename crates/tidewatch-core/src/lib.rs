//! World source contract, snapshot store, and rate-limited collector
//! for Tidewatch.
//!
//! Data flows one way: the [`WorldSource`] is polled by the
//! [`SnapshotCollector`] on the sampling context, which publishes each
//! finished [`Snapshot`] into a [`SnapshotStore`]. The serving context
//! reads the store through a [`CollectorHandle`] and never touches the
//! source.
//!
//! # Modules
//!
//! - [`collector`] -- Throttled sampling, per-category failure isolation,
//!   and the [`SnapshotProvider`] read contract.
//! - [`config`] -- Configuration loading from `tidewatch.yaml` into
//!   strongly-typed structs.
//! - [`source`] -- The [`WorldSource`] trait and its error types.
//! - [`store`] -- The single-slot, single-writer [`SnapshotStore`].
//!
//! [`WorldSource`]: source::WorldSource
//! [`SnapshotCollector`]: collector::SnapshotCollector
//! [`CollectorHandle`]: collector::CollectorHandle
//! [`SnapshotProvider`]: collector::SnapshotProvider
//! [`SnapshotStore`]: store::SnapshotStore
//! [`Snapshot`]: tidewatch_types::Snapshot

pub mod collector;
pub mod config;
pub mod source;
pub mod store;
