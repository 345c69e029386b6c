//! Common types used across the Echo exporter
//!
//! This module provides shared value types for transforms and colors.

use serde::{Deserialize, Serialize};

/// 3D vector (position, euler rotation, scale)
///
/// Serialized as a plain `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Apply `f` to each component
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

/// Linear RGBA color, nominally in the 0-1 range
///
/// Serialized as a plain `[r, g, b, a]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Multiply every channel, alpha included, by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a * factor)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f64; 4]> for Rgba {
    fn from([r, g, b, a]: [f64; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f64; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

/// Linear RGB color used by lights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f64; 3]> for Rgb {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [f64; 3] {
    fn from(c: Rgb) -> Self {
        c.to_array()
    }
}

/// Object transform as reported by the host scene
///
/// Rotation is XYZ euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Uniform scale factor; only the X component is honored
    pub fn uniform_scale(&self) -> f64 {
        self.scale.x
    }

    /// Rotation in whole degrees, rounded to nearest
    pub fn rotation_degrees(&self) -> [i64; 3] {
        [
            round_degrees(self.rotation.x),
            round_degrees(self.rotation.y),
            round_degrees(self.rotation.z),
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert an angle in radians to the nearest whole degree
pub fn round_degrees(radians: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to zero
    (radians * 180.0 / std::f64::consts::PI).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation_degrees() {
        let transform = Transform {
            rotation: Vec3::new(PI / 2.0, 0.0, PI),
            ..Transform::IDENTITY
        };

        assert_eq!(transform.rotation_degrees(), [90, 0, 180]);
    }

    #[test]
    fn test_round_degrees_negative() {
        assert_eq!(round_degrees(-PI / 4.0), -45);
        assert_eq!(round_degrees(-0.001), 0);
    }

    #[test]
    fn test_uniform_scale_uses_first_component() {
        let transform = Transform {
            scale: Vec3::new(2.0, 3.0, 4.0),
            ..Transform::IDENTITY
        };

        assert_eq!(transform.uniform_scale(), 2.0);
    }

    #[test]
    fn test_rgba_scaled() {
        let color = Rgba::WHITE.scaled(2.0);
        assert_eq!(color, Rgba::new(2.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn test_vec3_serde_as_array() {
        let transform: Transform = serde_json::from_str(r#"{"position": [1, 2, 3]}"#).unwrap();

        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::ONE);
    }

    proptest! {
        #[test]
        fn prop_whole_degrees_survive(deg in -720i64..720) {
            let radians = deg as f64 * PI / 180.0;
            prop_assert_eq!(round_degrees(radians), deg);
        }
    }
}
