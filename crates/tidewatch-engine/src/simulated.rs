//! A self-contained simulated world used as the engine's world source.
//!
//! Stands in for a real game integration: the world reports "not
//! ready" during a warm-up period (the main menu), then a player swims
//! a slow loop around a reef while the day/night cycle advances.
//! Beacon, signal and vehicle placement is derived from a seed so runs
//! are reproducible.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tidewatch_core::source::{SourceError, WorldSource};
use tidewatch_types::{MobileObject, PlayerState, PointOfInterest, TimeState, Vector3};

/// Radius of the player's loop, in metres.
const LOOP_RADIUS: f64 = 60.0;

/// Seconds for one full loop.
const LOOP_PERIOD_SECS: f64 = 120.0;

/// Depth at which the shallows give way to kelp.
const KELP_DEPTH: f64 = 12.0;

/// Settings for the simulated world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulatedWorldConfig {
    /// Seed for entity placement.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Seconds the world stays "in the menu" before becoming ready.
    #[serde(default = "default_warmup_secs")]
    pub warmup_secs: f64,

    /// Length of one day/night cycle in seconds.
    #[serde(default = "default_day_length_secs")]
    pub day_length_secs: f64,

    /// Number of player-placed beacons.
    #[serde(default = "default_beacons")]
    pub beacons: usize,

    /// Number of world signals (some start hidden).
    #[serde(default = "default_signals")]
    pub signals: usize,
}

impl Default for SimulatedWorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            warmup_secs: default_warmup_secs(),
            day_length_secs: default_day_length_secs(),
            beacons: default_beacons(),
            signals: default_signals(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_warmup_secs() -> f64 {
    3.0
}

const fn default_day_length_secs() -> f64 {
    1200.0
}

const fn default_beacons() -> usize {
    4
}

const fn default_signals() -> usize {
    3
}

/// A fixed marker placed at world creation.
#[derive(Debug, Clone)]
struct Marker {
    label: Option<String>,
    position: Vector3,
    color_index: u32,
    visible: bool,
}

/// Seed-placed world with a moving player.
#[derive(Debug)]
pub struct SimulatedWorld {
    started: Instant,
    warmup: Duration,
    day_length_secs: f64,
    beacons: Vec<Marker>,
    signals: Vec<Marker>,
    cyclops_position: Vector3,
}

impl SimulatedWorld {
    /// Create a world whose clock starts now.
    pub fn new(config: &SimulatedWorldConfig) -> Self {
        Self::started_at(config, Instant::now())
    }

    /// Create a world whose clock started at `started`.
    pub fn started_at(config: &SimulatedWorldConfig, started: Instant) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let beacons = (0..config.beacons)
            .map(|i| Marker {
                label: (i % 2 == 0).then(|| format!("Outpost {}", i.saturating_add(1))),
                position: random_position(&mut rng),
                color_index: rng.random_range(0..8),
                visible: true,
            })
            .collect();

        let signals = (0..config.signals)
            .map(|i| Marker {
                label: Some(format!("Lifepod {}", i.saturating_add(2))),
                position: random_position(&mut rng),
                color_index: 0,
                // Every third signal has not been discovered yet.
                visible: i % 3 != 2,
            })
            .collect();

        let cyclops_position = random_position(&mut rng);

        Self {
            started,
            warmup: Duration::try_from_secs_f64(config.warmup_secs).unwrap_or(Duration::ZERO),
            day_length_secs: config.day_length_secs.max(1.0),
            beacons,
            signals,
            cyclops_position,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Seconds since the world became ready.
    fn world_secs(&self) -> f64 {
        self.elapsed().saturating_sub(self.warmup).as_secs_f64()
    }

    /// Player pose at world time `t`.
    #[allow(clippy::cast_possible_truncation)]
    fn player_at(t: f64) -> (Vector3, f32, f32) {
        let angle = (t / LOOP_PERIOD_SECS) * TAU;
        let depth = 10.0 + 5.0 * (t / 20.0).sin();
        let position = Vector3::new(
            (LOOP_RADIUS * angle.cos()) as f32,
            (-depth) as f32,
            (LOOP_RADIUS * angle.sin()) as f32,
        );
        // Tangent of a counter-clockwise loop, as a compass bearing.
        let heading = compass_heading(angle.to_degrees() + 90.0);
        (position, heading, depth as f32)
    }
}

/// Wrap `degrees` into `[0, 360)` at single precision.
///
/// Values just under 360 round up to `360.0f32` in the cast, so the
/// wrap is applied again after it.
#[allow(clippy::cast_possible_truncation)]
fn compass_heading(degrees: f64) -> f32 {
    (degrees.rem_euclid(360.0) as f32).rem_euclid(360.0)
}

fn random_position(rng: &mut StdRng) -> Vector3 {
    Vector3::new(
        rng.random_range(-400.0..400.0),
        rng.random_range(-250.0..-5.0),
        rng.random_range(-400.0..400.0),
    )
}

impl WorldSource for SimulatedWorld {
    fn is_ready(&self) -> bool {
        self.elapsed() >= self.warmup
    }

    fn player_state(&self) -> Result<Option<PlayerState>, SourceError> {
        let (position, heading, depth) = Self::player_at(self.world_secs());
        let biome = if f64::from(depth) < KELP_DEPTH {
            "safe_shallows"
        } else {
            "kelp_forest"
        };
        Ok(Some(PlayerState::new(
            position,
            heading,
            depth,
            Some(biome.to_owned()),
        )))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn time_state(&self) -> Result<Option<TimeState>, SourceError> {
        let days = self.world_secs() / self.day_length_secs;
        Ok(Some(TimeState {
            day_night_value: days as f32,
            is_day: days.fract() < 0.5,
        }))
    }

    fn points_of_interest(&self) -> Result<Vec<PointOfInterest>, SourceError> {
        let mut index = 0_usize;
        let mut out = Vec::with_capacity(self.beacons.len().saturating_add(self.signals.len()));

        for marker in &self.beacons {
            out.push(PointOfInterest::beacon(
                index,
                marker.label.clone(),
                marker.position,
                marker.color_index,
                marker.visible,
            ));
            index = index.saturating_add(1);
        }

        // Undiscovered signals are not reported.
        for marker in self.signals.iter().filter(|m| m.visible) {
            out.push(PointOfInterest::signal(
                index,
                marker.label.clone(),
                marker.position,
                marker.color_index,
                marker.visible,
            ));
            index = index.saturating_add(1);
        }

        Ok(out)
    }

    fn mobile_objects(&self) -> Result<Vec<MobileObject>, SourceError> {
        // The Seamoth trails the player by a few seconds.
        let (seamoth, _, _) = Self::player_at((self.world_secs() - 4.0).max(0.0));
        let (exosuit, _, _) = Self::player_at(LOOP_PERIOD_SECS / 2.0);

        Ok(vec![
            MobileObject::vehicle(0, "Seamoth", None, seamoth),
            MobileObject::vehicle(1, "Exosuit", Some(String::new()), exosuit),
            MobileObject::vehicle(2, "Cyclops", Some("Hermit".to_owned()), self.cyclops_position),
        ])
    }
}
