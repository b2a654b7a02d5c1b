//! Three-component world coordinate.
//!
//! Axis meaning follows the source engine: `x` is east/west, `y` is
//! vertical (negative below the surface) and `z` is north/south.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An immutable position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vector3 {
    /// East/west component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
    /// North/south component.
    pub z: f32,
}

impl Vector3 {
    /// The world origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}
