//! World source trait and a trivial implementation.
//!
//! The [`WorldSource`] is the system of record for the player, the day
//! night cycle, points of interest and mobile objects. It is owned by
//! the collector and only ever touched from the sampling context, so
//! implementations need not be `Send` or `Sync`.
//!
//! Each category is read through its own method returning its own
//! `Result`. A failure in one category never hides the others: the
//! collector degrades the failed category and keeps going.

use std::fmt;

use tidewatch_types::{MobileObject, PlayerState, PointOfInterest, TimeState};

/// One independently-read slice of world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceCategory {
    /// The player avatar.
    Player,
    /// The day/night cycle.
    Time,
    /// Beacons and signals.
    PointsOfInterest,
    /// Vehicles.
    MobileObjects,
}

impl SourceCategory {
    /// Stable lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Time => "time",
            Self::PointsOfInterest => "points_of_interest",
            Self::MobileObjects => "mobile_objects",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a world source may report for a single category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Enumerating or reading the category failed.
    #[error("failed to read {category}: {message}")]
    Read {
        /// The category that failed.
        category: SourceCategory,
        /// Description from the underlying engine.
        message: String,
    },

    /// The subsystem backing the category does not exist right now.
    #[error("{category} subsystem unavailable")]
    Unavailable {
        /// The category that is unavailable.
        category: SourceCategory,
    },
}

impl SourceError {
    /// Shorthand for a [`SourceError::Read`].
    pub fn read(category: SourceCategory, message: impl Into<String>) -> Self {
        Self::Read {
            category,
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    pub const fn category(&self) -> SourceCategory {
        match self {
            Self::Read { category, .. } | Self::Unavailable { category } => *category,
        }
    }
}

/// A live world that can be sampled.
///
/// Implementations belong to the host integration (a game mod, an
/// emulator, a simulation). They are polled by
/// [`SnapshotCollector::tick`](crate::collector::SnapshotCollector::tick)
/// at most once per refresh interval.
pub trait WorldSource {
    /// Whether the world is loaded and the player exists.
    fn is_ready(&self) -> bool;

    /// Current player state, or `None` if the player is not present.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the player could not be read.
    fn player_state(&self) -> Result<Option<PlayerState>, SourceError>;

    /// Current day/night state, or `None` if there is no cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the cycle could not be read.
    fn time_state(&self) -> Result<Option<TimeState>, SourceError>;

    /// All points of interest, in a stable order for this call.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if enumeration failed.
    fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, SourceError>;

    /// All mobile objects, in a stable order for this call.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if enumeration failed.
    fn mobile_objects(&self) -> Result<Vec<MobileObject>, SourceError>;
}

impl<T: WorldSource + ?Sized> WorldSource for Box<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn player_state(&self) -> Result<Option<PlayerState>, SourceError> {
        (**self).player_state()
    }

    fn time_state(&self) -> Result<Option<TimeState>, SourceError> {
        (**self).time_state()
    }

    fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, SourceError> {
        (**self).points_of_interest()
    }

    fn mobile_objects(&self) -> Result<Vec<MobileObject>, SourceError> {
        (**self).mobile_objects()
    }
}

/// A source that is never ready.
///
/// Useful as a placeholder before the host world has been wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotReadySource;

impl NotReadySource {
    /// Create a new never-ready source.
    pub const fn new() -> Self {
        Self
    }
}

impl WorldSource for NotReadySource {
    fn is_ready(&self) -> bool {
        false
    }

    fn player_state(&self) -> Result<Option<PlayerState>, SourceError> {
        Err(SourceError::Unavailable {
            category: SourceCategory::Player,
        })
    }

    fn time_state(&self) -> Result<Option<TimeState>, SourceError> {
        Err(SourceError::Unavailable {
            category: SourceCategory::Time,
        })
    }

    fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, SourceError> {
        Ok(Vec::new())
    }

    fn mobile_objects(&self) -> Result<Vec<MobileObject>, SourceError> {
        Ok(Vec::new())
    }
}
