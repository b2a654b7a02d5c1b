//! Point-in-time world snapshot and its component records.
//!
//! A [`Snapshot`] is built once by the collector and never mutated
//! afterwards. Publishing new state means building a new snapshot and
//! replacing the old one wholesale.
//!
//! Identifiers on [`PointOfInterest`] and [`MobileObject`] are local to
//! the snapshot that carries them. The same entity may receive a
//! different id in the next snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::vector::Vector3;

/// Biome reported when the source cannot resolve one.
pub const UNKNOWN_BIOME: &str = "unknown";

/// Label used for player-placed beacons that carry no custom label.
pub const DEFAULT_BEACON_LABEL: &str = "Beacon";

/// Label used for signals that carry no custom label.
pub const DEFAULT_SIGNAL_LABEL: &str = "Signal";

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// Where the player avatar is and what surrounds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerState {
    /// World position.
    pub position: Vector3,
    /// Heading in degrees. Conceptually `[0, 360)`, not clamped here.
    pub heading: f32,
    /// Depth below the surface. Non-negative by source convention.
    pub depth: f32,
    /// Biome name, or [`UNKNOWN_BIOME`].
    pub biome: String,
}

impl PlayerState {
    /// Build a player state, substituting [`UNKNOWN_BIOME`] when the
    /// source could not resolve a biome.
    pub fn new(position: Vector3, heading: f32, depth: f32, biome: Option<String>) -> Self {
        let biome = biome
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_BIOME.to_owned());
        Self {
            position,
            heading,
            depth,
            biome,
        }
    }

    /// Whether the biome could not be resolved.
    pub fn biome_unknown(&self) -> bool {
        self.biome == UNKNOWN_BIOME
    }
}

// ---------------------------------------------------------------------------
// TimeState
// ---------------------------------------------------------------------------

/// Day/night cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TimeState {
    /// Cycling phase value reported by the source.
    pub day_night_value: f32,
    /// True while it is daytime.
    pub is_day: bool,
}

// ---------------------------------------------------------------------------
// PointOfInterest
// ---------------------------------------------------------------------------

/// A labelled marker visible to the player (beacon or signal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PointOfInterest {
    /// Snapshot-local identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// World position.
    pub position: Vector3,
    /// Palette index. Meaning is defined by the client.
    pub color_index: u32,
    /// Whether the source shows this marker on the HUD.
    pub visible: bool,
}

impl PointOfInterest {
    /// A player-placed beacon with id `beacon_<index>`.
    pub fn beacon(
        index: usize,
        label: Option<String>,
        position: Vector3,
        color_index: u32,
        visible: bool,
    ) -> Self {
        Self {
            id: format!("beacon_{index}"),
            label: label_or(label, DEFAULT_BEACON_LABEL),
            position,
            color_index,
            visible,
        }
    }

    /// A world signal (story marker, lifepod, ...) with id `signal_<index>`.
    pub fn signal(
        index: usize,
        label: Option<String>,
        position: Vector3,
        color_index: u32,
        visible: bool,
    ) -> Self {
        Self {
            id: format!("signal_{index}"),
            label: label_or(label, DEFAULT_SIGNAL_LABEL),
            position,
            color_index,
            visible,
        }
    }
}

fn label_or(label: Option<String>, fallback: &str) -> String {
    label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

// ---------------------------------------------------------------------------
// MobileObject
// ---------------------------------------------------------------------------

/// A vehicle-like entity the player can own or pilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MobileObject {
    /// Snapshot-local identifier.
    pub id: String,
    /// Category tag, e.g. `"Seamoth"`.
    pub kind: String,
    /// Custom name, or `kind` when the source has none.
    pub name: String,
    /// World position.
    pub position: Vector3,
}

impl MobileObject {
    /// Build a mobile object, falling back to `kind` for the name.
    pub fn new(id: String, kind: String, name: Option<String>, position: Vector3) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| kind.clone());
        Self {
            id,
            kind,
            name,
            position,
        }
    }

    /// Build a vehicle with id `vehicle_<index>`.
    pub fn vehicle(index: usize, kind: &str, name: Option<String>, position: Vector3) -> Self {
        Self::new(format!("vehicle_{index}"), kind.to_owned(), name, position)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One immutable sample of world state.
///
/// `player` and `time` are absent when the source could not produce
/// them on the cycle that built this snapshot. The entity lists are
/// empty, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Collection time, epoch seconds.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Player state.
    pub player: Option<PlayerState>,
    /// Day/night state.
    pub time: Option<TimeState>,
    /// Beacons and signals, in source order.
    pub points_of_interest: Vec<PointOfInterest>,
    /// Vehicles, in source order.
    pub mobile_objects: Vec<MobileObject>,
}

impl Snapshot {
    /// Assemble a snapshot from its parts.
    pub const fn new(
        timestamp: i64,
        player: Option<PlayerState>,
        time: Option<TimeState>,
        points_of_interest: Vec<PointOfInterest>,
        mobile_objects: Vec<MobileObject>,
    ) -> Self {
        Self {
            timestamp,
            player,
            time,
            points_of_interest,
            mobile_objects,
        }
    }

    /// True when the snapshot carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.player.is_none()
            && self.time.is_none()
            && self.points_of_interest.is_empty()
            && self.mobile_objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_biome_falls_back_to_unknown() {
        let p = PlayerState::new(Vector3::ZERO, 0.0, 0.0, None);
        assert_eq!(p.biome, UNKNOWN_BIOME);
        assert!(p.biome_unknown());

        let p = PlayerState::new(Vector3::ZERO, 0.0, 0.0, Some("  ".to_owned()));
        assert!(p.biome_unknown());

        let p = PlayerState::new(Vector3::ZERO, 0.0, 0.0, Some("kelp_forest".to_owned()));
        assert_eq!(p.biome, "kelp_forest");
    }

    #[test]
    fn mobile_object_name_falls_back_to_kind() {
        let m = MobileObject::vehicle(0, "Seamoth", None, Vector3::ZERO);
        assert_eq!(m.id, "vehicle_0");
        assert_eq!(m.name, "Seamoth");

        let m = MobileObject::vehicle(3, "Cyclops", Some("Hermit".to_owned()), Vector3::ZERO);
        assert_eq!(m.id, "vehicle_3");
        assert_eq!(m.name, "Hermit");
    }

    #[test]
    fn points_of_interest_get_prefixed_ids_and_default_labels() {
        let b = PointOfInterest::beacon(0, None, Vector3::ZERO, 2, true);
        assert_eq!(b.id, "beacon_0");
        assert_eq!(b.label, DEFAULT_BEACON_LABEL);

        let s = PointOfInterest::signal(1, Some("Lifepod 6".to_owned()), Vector3::ZERO, 0, true);
        assert_eq!(s.id, "signal_1");
        assert_eq!(s.label, "Lifepod 6");
    }

    #[test]
    fn snapshot_serializes_camel_case_fields() {
        let snapshot = Snapshot::new(
            1_700_000_000,
            Some(PlayerState::new(
                Vector3::new(10.0, -5.0, 20.0),
                90.0,
                5.0,
                Some("kelp_forest".to_owned()),
            )),
            Some(TimeState {
                day_night_value: 12.5,
                is_day: true,
            }),
            vec![PointOfInterest::beacon(0, None, Vector3::ZERO, 1, false)],
            vec![MobileObject::vehicle(0, "Seamoth", None, Vector3::ZERO)],
        );

        let json = serde_json::to_value(&snapshot).unwrap_or_default();
        assert_eq!(json["timestamp"], 1_700_000_000_i64);
        assert_eq!(json["player"]["biome"], "kelp_forest");
        assert_eq!(json["time"]["isDay"], true);
        assert_eq!(json["time"]["dayNightValue"], 12.5);
        assert_eq!(json["pointsOfInterest"][0]["colorIndex"], 1);
        assert_eq!(json["pointsOfInterest"][0]["visible"], false);
        assert_eq!(json["mobileObjects"][0]["kind"], "Seamoth");
    }

    #[test]
    fn absent_sub_states_serialize_as_null() {
        let snapshot = Snapshot::new(0, None, None, Vec::new(), Vec::new());
        assert!(snapshot.is_empty());

        let json = serde_json::to_value(&snapshot).unwrap_or_default();
        assert!(json["player"].is_null());
        assert!(json["time"].is_null());
        assert_eq!(json["pointsOfInterest"], serde_json::json!([]));
        assert_eq!(json["mobileObjects"], serde_json::json!([]));
    }
}
