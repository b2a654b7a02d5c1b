//! Frame driver for the snapshot collector.
//!
//! The driver is the sampling context: a single loop that calls
//! [`SnapshotCollector::tick`] once per frame with a monotonic clock,
//! the way a game engine's per-frame update hook would. The collector
//! does its own throttling, so the frame rate only bounds how late a
//! sample can be.

use std::future::Future;
use std::time::Duration;

use tidewatch_core::collector::{SnapshotCollector, TickOutcome};
use tidewatch_core::source::WorldSource;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Totals for one driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Frames driven.
    pub frames: u64,
    /// Cycles that published a snapshot.
    pub published: u64,
    /// Cycles that found the source not ready.
    pub not_ready: u64,
}

/// Drive `collector` every `frame_interval` until `shutdown` resolves.
///
/// The collector is borrowed for the whole run, so nothing else can
/// tick it concurrently.
pub async fn run_driver<S, F>(
    collector: &mut SnapshotCollector<S>,
    frame_interval: Duration,
    shutdown: F,
) -> DriverStats
where
    S: WorldSource,
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = DriverStats::default();

    tokio::pin!(shutdown);

    info!(
        frame_interval_ms = frame_interval.as_millis(),
        refresh_interval_secs = collector.refresh_interval(),
        "Driver starting"
    );

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = frames.tick() => {
                stats.frames = stats.frames.saturating_add(1);
                match collector.tick(started.elapsed().as_secs_f64()) {
                    TickOutcome::Throttled => {}
                    TickOutcome::SourceNotReady => {
                        stats.not_ready = stats.not_ready.saturating_add(1);
                        debug!("World source not ready");
                    }
                    TickOutcome::Published(_) => {
                        stats.published = stats.published.saturating_add(1);
                    }
                }
            }
        }
    }

    info!(
        frames = stats.frames,
        published = stats.published,
        not_ready = stats.not_ready,
        "Driver stopped"
    );
    stats
}
