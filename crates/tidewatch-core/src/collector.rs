//! Rate-limited snapshot collector.
//!
//! The [`SnapshotCollector`] owns the [`WorldSource`] and decides when
//! to sample it. A host driver calls [`SnapshotCollector::tick`] every
//! frame from one serialized context; the collector throttles those
//! calls to at most one sampling cycle per refresh interval, builds a
//! complete [`Snapshot`] off to the side and then publishes it to the
//! [`SnapshotStore`] in a single replace.
//!
//! The serving side never sees the source. It reads through a
//! [`CollectorHandle`], which exposes the store and the readiness that
//! was observed on the most recent sampling cycle.
//!
//! # Failure isolation
//!
//! Each category is read independently. A failed player or time read
//! leaves that sub-state absent; a failed enumeration leaves that list
//! empty. Failures are logged at `warn` and reported in the
//! [`CycleReport`], never propagated out of `tick`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tidewatch_types::Snapshot;
use tracing::{debug, info, warn};

use crate::source::{SourceCategory, SourceError, WorldSource};
use crate::store::SnapshotStore;

/// Errors that can occur when constructing a collector.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// The refresh interval is not a positive, finite number of seconds.
    #[error("invalid refresh interval: {value} (must be finite and > 0)")]
    InvalidInterval {
        /// The rejected value in seconds.
        value: f64,
    },
}

/// Read-side view of the collector's published state.
///
/// Implemented by [`CollectorHandle`]; the API layer depends on this
/// trait so tests can substitute their own provider.
pub trait SnapshotProvider: Send + Sync {
    /// Readiness of the world source as last observed by the collector.
    fn is_ready(&self) -> bool;

    /// The most recently published snapshot, if any.
    fn current_snapshot(&self) -> Option<Arc<Snapshot>>;
}

/// Cloneable, thread-safe read handle onto a collector.
#[derive(Debug, Clone)]
pub struct CollectorHandle {
    store: Arc<SnapshotStore>,
    source_ready: Arc<AtomicBool>,
}

impl CollectorHandle {
    /// The underlying store.
    pub const fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }
}

impl SnapshotProvider for CollectorHandle {
    fn is_ready(&self) -> bool {
        self.source_ready.load(Ordering::Acquire)
    }

    fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.read()
    }
}

/// Summary of one completed sampling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Epoch-second timestamp stamped on the published snapshot.
    pub timestamp: i64,
    /// Whether player state was present.
    pub has_player: bool,
    /// Whether time state was present.
    pub has_time: bool,
    /// Number of points of interest published.
    pub points_of_interest: usize,
    /// Number of mobile objects published.
    pub mobile_objects: usize,
    /// Categories that failed and were degraded this cycle.
    pub degraded: Vec<SourceCategory>,
}

/// What a call to [`SnapshotCollector::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Called before the refresh interval elapsed; nothing happened.
    Throttled,
    /// The source was not ready; the store now holds no snapshot.
    SourceNotReady,
    /// A new snapshot was built and published.
    Published(CycleReport),
}

/// Samples a [`WorldSource`] at a bounded rate and publishes snapshots.
pub struct SnapshotCollector<S> {
    source: S,
    refresh_interval: f64,
    last_sampled: Option<f64>,
    last_timestamp: Option<i64>,
    store: Arc<SnapshotStore>,
    source_ready: Arc<AtomicBool>,
    cycles: u64,
}

impl<S: WorldSource> SnapshotCollector<S> {
    /// Create a collector with its own empty store.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidInterval`] if
    /// `refresh_interval_secs` is not finite or not positive.
    pub fn new(source: S, refresh_interval_secs: f64) -> Result<Self, CollectorError> {
        Self::with_store(source, refresh_interval_secs, Arc::new(SnapshotStore::new()))
    }

    /// Create a collector that publishes into an existing store.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidInterval`] if
    /// `refresh_interval_secs` is not finite or not positive.
    pub fn with_store(
        source: S,
        refresh_interval_secs: f64,
        store: Arc<SnapshotStore>,
    ) -> Result<Self, CollectorError> {
        if !refresh_interval_secs.is_finite() || refresh_interval_secs <= 0.0 {
            return Err(CollectorError::InvalidInterval {
                value: refresh_interval_secs,
            });
        }
        Ok(Self {
            source,
            refresh_interval: refresh_interval_secs,
            last_sampled: None,
            last_timestamp: None,
            store,
            source_ready: Arc::new(AtomicBool::new(false)),
            cycles: 0,
        })
    }

    /// Advance the collector to `now_secs` (a monotonic host clock).
    ///
    /// Returns [`TickOutcome::Throttled`] without touching the source if
    /// less than the refresh interval has passed since the last cycle.
    /// Otherwise runs one cycle and records `now_secs` as the last
    /// sample time, whether or not the source was ready.
    pub fn tick(&mut self, now_secs: f64) -> TickOutcome {
        if !now_secs.is_finite() {
            debug!(now_secs, "Ignoring tick with non-finite clock value");
            return TickOutcome::Throttled;
        }

        if let Some(last) = self.last_sampled
            && now_secs - last < self.refresh_interval
        {
            return TickOutcome::Throttled;
        }

        self.last_sampled = Some(now_secs);
        self.cycles = self.cycles.saturating_add(1);
        self.sample()
    }

    /// Run one sampling cycle unconditionally.
    fn sample(&mut self) -> TickOutcome {
        if !self.source.is_ready() {
            let was_ready = self.source_ready.swap(false, Ordering::AcqRel);
            self.store.clear();
            if was_ready {
                info!("World source no longer ready, snapshot cleared");
            }
            return TickOutcome::SourceNotReady;
        }

        let mut degraded = Vec::new();

        let player = settle(SourceCategory::Player, self.source.player_state(), &mut degraded)
            .flatten();
        let time =
            settle(SourceCategory::Time, self.source.time_state(), &mut degraded).flatten();
        let points_of_interest = settle(
            SourceCategory::PointsOfInterest,
            self.source.points_of_interest(),
            &mut degraded,
        )
        .unwrap_or_default();
        let mobile_objects = settle(
            SourceCategory::MobileObjects,
            self.source.mobile_objects(),
            &mut degraded,
        )
        .unwrap_or_default();

        let snapshot = Snapshot::new(
            self.stamp(chrono::Utc::now().timestamp()),
            player,
            time,
            points_of_interest,
            mobile_objects,
        );

        let report = CycleReport {
            timestamp: snapshot.timestamp,
            has_player: snapshot.player.is_some(),
            has_time: snapshot.time.is_some(),
            points_of_interest: snapshot.points_of_interest.len(),
            mobile_objects: snapshot.mobile_objects.len(),
            degraded,
        };

        self.store.publish(Some(snapshot));
        let was_ready = self.source_ready.swap(true, Ordering::AcqRel);
        if !was_ready {
            info!("World source ready, publishing snapshots");
        }

        debug!(
            timestamp = report.timestamp,
            points_of_interest = report.points_of_interest,
            mobile_objects = report.mobile_objects,
            degraded = report.degraded.len(),
            "Snapshot published"
        );

        TickOutcome::Published(report)
    }

    /// Clamp a wall-clock reading so published timestamps never go
    /// backwards, even if the system clock is stepped back.
    fn stamp(&mut self, wall_secs: i64) -> i64 {
        let timestamp = self
            .last_timestamp
            .map_or(wall_secs, |last| wall_secs.max(last));
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    /// Whether the world source is ready right now.
    ///
    /// Calls into the source, so only use this from the sampling
    /// context. The serving side should use [`CollectorHandle`].
    pub fn is_ready(&self) -> bool {
        self.source.is_ready()
    }

    /// The most recently published snapshot, if any.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.read()
    }

    /// A thread-safe read handle for the serving side.
    pub fn handle(&self) -> CollectorHandle {
        CollectorHandle {
            store: Arc::clone(&self.store),
            source_ready: Arc::clone(&self.source_ready),
        }
    }

    /// Configured minimum seconds between sampling cycles.
    pub const fn refresh_interval(&self) -> f64 {
        self.refresh_interval
    }

    /// Number of sampling cycles run so far (throttled ticks excluded).
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Borrow the world source.
    pub const fn source(&self) -> &S {
        &self.source
    }
}

/// Turn a category result into a value, recording and logging failures.
fn settle<T>(
    category: SourceCategory,
    result: Result<T, SourceError>,
    degraded: &mut Vec<SourceCategory>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%category, error = %e, "World source read failed, degrading category");
            degraded.push(category);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tidewatch_types::{
        MobileObject, PlayerState, PointOfInterest, TimeState, Vector3,
    };

    use super::*;

    /// A scripted source whose readiness and failures can be toggled.
    struct ScriptedSource {
        ready: Cell<bool>,
        fail: Vec<SourceCategory>,
        reads: Cell<u32>,
    }

    impl ScriptedSource {
        fn ready() -> Self {
            Self {
                ready: Cell::new(true),
                fail: Vec::new(),
                reads: Cell::new(0),
            }
        }

        fn failing(categories: &[SourceCategory]) -> Self {
            Self {
                fail: categories.to_vec(),
                ..Self::ready()
            }
        }

        fn check(&self, category: SourceCategory) -> Result<(), SourceError> {
            if self.fail.contains(&category) {
                Err(SourceError::read(category, "scripted failure"))
            } else {
                Ok(())
            }
        }
    }

    impl WorldSource for ScriptedSource {
        fn is_ready(&self) -> bool {
            self.ready.get()
        }

        fn player_state(&self) -> Result<Option<PlayerState>, SourceError> {
            self.reads.set(self.reads.get().saturating_add(1));
            self.check(SourceCategory::Player)?;
            Ok(Some(PlayerState::new(
                Vector3::new(10.0, -5.0, 20.0),
                90.0,
                5.0,
                Some("kelp_forest".to_owned()),
            )))
        }

        fn time_state(&self) -> Result<Option<TimeState>, SourceError> {
            self.check(SourceCategory::Time)?;
            Ok(Some(TimeState {
                day_night_value: 3.25,
                is_day: true,
            }))
        }

        fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, SourceError> {
            self.check(SourceCategory::PointsOfInterest)?;
            Ok(vec![
                PointOfInterest::beacon(0, None, Vector3::new(1.0, 2.0, 3.0), 0, true),
                PointOfInterest::signal(1, None, Vector3::new(4.0, 5.0, 6.0), 2, true),
            ])
        }

        fn mobile_objects(&self) -> Result<Vec<MobileObject>, SourceError> {
            self.check(SourceCategory::MobileObjects)?;
            Ok(vec![MobileObject::vehicle(0, "Seamoth", None, Vector3::ZERO)])
        }
    }

    fn published(outcome: &TickOutcome) -> Option<&CycleReport> {
        match outcome {
            TickOutcome::Published(report) => Some(report),
            _ => None,
        }
    }

    #[test]
    fn rejects_invalid_intervals() {
        assert!(SnapshotCollector::new(ScriptedSource::ready(), 0.0).is_err());
        assert!(SnapshotCollector::new(ScriptedSource::ready(), -1.0).is_err());
        assert!(SnapshotCollector::new(ScriptedSource::ready(), f64::NAN).is_err());
        assert!(SnapshotCollector::new(ScriptedSource::ready(), f64::INFINITY).is_err());
        assert!(SnapshotCollector::new(ScriptedSource::ready(), 0.25).is_ok());
    }

    #[test]
    fn ticks_within_interval_sample_once() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;

        assert!(published(&collector.tick(10.0)).is_some());
        assert_eq!(collector.tick(10.5), TickOutcome::Throttled);
        assert_eq!(collector.tick(10.999), TickOutcome::Throttled);

        assert_eq!(collector.cycles(), 1);
        assert_eq!(collector.source().reads.get(), 1);
        Ok(())
    }

    #[test]
    fn tick_after_full_interval_samples_again() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;

        assert!(published(&collector.tick(10.0)).is_some());
        assert!(published(&collector.tick(11.0)).is_some());

        assert_eq!(collector.cycles(), 2);
        assert_eq!(collector.source().reads.get(), 2);
        Ok(())
    }

    #[test]
    fn handle_exposes_the_collector_store() -> Result<(), CollectorError> {
        let store = Arc::new(SnapshotStore::new());
        let mut collector =
            SnapshotCollector::with_store(ScriptedSource::ready(), 1.0, Arc::clone(&store))?;
        let handle = collector.handle();
        assert!(Arc::ptr_eq(handle.store(), &store));

        collector.tick(0.0);
        assert!(handle.store().has_snapshot());
        Ok(())
    }

    #[test]
    fn stamps_never_go_backwards() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        assert_eq!(collector.stamp(1_000), 1_000);
        assert_eq!(collector.stamp(990), 1_000);
        assert_eq!(collector.stamp(1_005), 1_005);
        Ok(())
    }

    #[test]
    fn published_timestamp_survives_a_clock_step_back() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        let ahead = chrono::Utc::now().timestamp().saturating_add(3_600);
        collector.last_timestamp = Some(ahead);

        let outcome = collector.tick(0.0);
        assert_eq!(published(&outcome).map(|r| r.timestamp), Some(ahead));
        assert_eq!(collector.current_snapshot().map(|s| s.timestamp), Some(ahead));
        Ok(())
    }

    #[test]
    fn non_finite_clock_is_ignored() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        assert_eq!(collector.tick(f64::NAN), TickOutcome::Throttled);
        assert_eq!(collector.cycles(), 0);
        assert!(published(&collector.tick(0.0)).is_some());
        Ok(())
    }

    #[test]
    fn not_ready_source_clears_store_and_still_throttles() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        let handle = collector.handle();

        assert!(published(&collector.tick(0.0)).is_some());
        assert!(handle.is_ready());
        assert!(handle.current_snapshot().is_some());

        collector.source().ready.set(false);
        assert!(!collector.is_ready());
        assert_eq!(collector.tick(1.0), TickOutcome::SourceNotReady);
        assert!(!handle.is_ready());
        assert!(handle.current_snapshot().is_none());
        assert!(collector.current_snapshot().is_none());

        // The not-ready cycle still counts for throttling.
        collector.source().ready.set(true);
        assert_eq!(collector.tick(1.5), TickOutcome::Throttled);
        assert!(published(&collector.tick(2.0)).is_some());
        assert!(handle.is_ready());
        Ok(())
    }

    #[test]
    fn handle_is_not_ready_before_first_cycle() -> Result<(), CollectorError> {
        let collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        let handle = collector.handle();
        assert!(!handle.is_ready());
        assert!(handle.current_snapshot().is_none());
        Ok(())
    }

    #[test]
    fn published_snapshot_carries_source_data() -> Result<(), CollectorError> {
        let mut collector = SnapshotCollector::new(ScriptedSource::ready(), 1.0)?;
        let outcome = collector.tick(0.0);
        let report = published(&outcome).cloned();

        let snapshot = collector.current_snapshot();
        let snapshot = snapshot.as_deref();
        let player = snapshot.and_then(|s| s.player.as_ref());
        assert_eq!(player.map(|p| p.position), Some(Vector3::new(10.0, -5.0, 20.0)));
        assert_eq!(player.map(|p| p.biome.as_str()), Some("kelp_forest"));
        assert_eq!(snapshot.map(|s| s.points_of_interest.len()), Some(2));
        assert_eq!(snapshot.map(|s| s.mobile_objects.len()), Some(1));
        assert_eq!(report.as_ref().map(|r| r.timestamp), snapshot.map(|s| s.timestamp));
        assert_eq!(report.map(|r| r.degraded), Some(Vec::new()));
        Ok(())
    }

    #[test]
    fn failed_points_of_interest_degrade_only_that_list() -> Result<(), CollectorError> {
        let source = ScriptedSource::failing(&[SourceCategory::PointsOfInterest]);
        let mut collector = SnapshotCollector::new(source, 1.0)?;

        let outcome = collector.tick(0.0);
        let report = published(&outcome);
        assert_eq!(
            report.map(|r| r.degraded.clone()),
            Some(vec![SourceCategory::PointsOfInterest])
        );

        let snapshot = collector.current_snapshot();
        let snapshot = snapshot.as_deref();
        assert_eq!(snapshot.map(|s| s.points_of_interest.is_empty()), Some(true));
        assert_eq!(snapshot.map(|s| s.mobile_objects.len()), Some(1));
        assert!(snapshot.is_some_and(|s| s.player.is_some()));
        assert!(snapshot.is_some_and(|s| s.time.is_some()));
        Ok(())
    }

    #[test]
    fn failed_player_and_time_are_absent_not_fatal() -> Result<(), CollectorError> {
        let source = ScriptedSource::failing(&[SourceCategory::Player, SourceCategory::Time]);
        let mut collector = SnapshotCollector::new(source, 1.0)?;

        let outcome = collector.tick(0.0);
        let report = published(&outcome);
        assert!(report.is_some_and(|r| !r.has_player && !r.has_time));
        assert!(report.is_some_and(|r| r.points_of_interest == 2 && r.mobile_objects == 1));

        let snapshot = collector.current_snapshot();
        assert!(snapshot.as_deref().is_some_and(|s| s.player.is_none() && s.time.is_none()));
        Ok(())
    }

    #[test]
    fn every_category_failing_still_publishes() -> Result<(), CollectorError> {
        let source = ScriptedSource::failing(&[
            SourceCategory::Player,
            SourceCategory::Time,
            SourceCategory::PointsOfInterest,
            SourceCategory::MobileObjects,
        ]);
        let mut collector = SnapshotCollector::new(source, 1.0)?;

        let outcome = collector.tick(0.0);
        assert_eq!(published(&outcome).map(|r| r.degraded.len()), Some(4));
        assert!(collector.current_snapshot().is_some_and(|s| s.is_empty()));
        Ok(())
    }

    #[test]
    fn shared_store_sees_collector_output() -> Result<(), CollectorError> {
        let store = Arc::new(SnapshotStore::new());
        let mut collector =
            SnapshotCollector::with_store(ScriptedSource::ready(), 0.5, Arc::clone(&store))?;
        assert!((collector.refresh_interval() - 0.5).abs() < f64::EPSILON);

        collector.tick(0.0);
        assert!(store.has_snapshot());
        assert!(Arc::ptr_eq(collector.handle().store(), &store));
        Ok(())
    }
}
