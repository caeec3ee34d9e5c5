//! 2D vector math
//!
//! Vectors are `glam::Vec2` in cartesian form. `Polar` is the magnitude/angle
//! view used whenever gameplay code wants to set a speed or a heading without
//! touching the other component. All helpers are pure.
//!
//! Conversions follow `x = cos(angle) * magnitude`, `y = sin(angle) * magnitude`
//! and `angle = atan2(y, x)`, so the zero vector has angle 0.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A vector in polar form (angle in radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    pub magnitude: f32,
    pub angle: f32,
}

impl Polar {
    pub fn new(magnitude: f32, angle: f32) -> Self {
        Self { magnitude, angle }
    }

    /// Convert to cartesian form
    #[inline]
    pub fn to_cartesian(self) -> Vec2 {
        Vec2::new(self.angle.cos() * self.magnitude, self.angle.sin() * self.magnitude)
    }

    /// Same angle, new magnitude
    #[inline]
    pub fn with_magnitude(self, magnitude: f32) -> Self {
        Self { magnitude, ..self }
    }
}

impl From<Vec2> for Polar {
    fn from(v: Vec2) -> Self {
        Self {
            magnitude: v.length(),
            angle: v.y.atan2(v.x),
        }
    }
}

impl From<Polar> for Vec2 {
    fn from(p: Polar) -> Self {
        p.to_cartesian()
    }
}

/// Polar-flavoured helpers on `Vec2`
pub trait VectorExt {
    /// Length of the vector (always >= 0)
    fn magnitude(self) -> f32;
    /// Heading in radians, `atan2(y, x)`
    fn heading(self) -> f32;
    fn to_polar(self) -> Polar;
    /// Rescale to `magnitude`, keeping the heading.
    ///
    /// The zero vector has heading 0, so it becomes `(magnitude, 0)`.
    fn with_magnitude(self, magnitude: f32) -> Vec2;
    /// Unit vector with the same heading (`(1, 0)` for the zero vector)
    fn unit(self) -> Vec2;
}

impl VectorExt for Vec2 {
    #[inline]
    fn magnitude(self) -> f32 {
        self.length()
    }

    #[inline]
    fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    #[inline]
    fn to_polar(self) -> Polar {
        Polar::from(self)
    }

    #[inline]
    fn with_magnitude(self, magnitude: f32) -> Vec2 {
        self.to_polar().with_magnitude(magnitude).to_cartesian()
    }

    #[inline]
    fn unit(self) -> Vec2 {
        self.with_magnitude(1.0)
    }
}

/// Reflect `v` about the unit `normal`: v' = v - 2(n·v)n
#[inline]
pub fn reflect(normal: Vec2, v: Vec2) -> Vec2 {
    v - 2.0 * normal.dot(v) * normal
}

/// Distance between two positions
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).magnitude()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Polar::new(r, theta).to_cartesian()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn test_zero_vector_heading() {
        assert_eq!(Vec2::ZERO.heading(), 0.0);
        let v = Vec2::ZERO.with_magnitude(3.0);
        assert!((v - Vec2::new(3.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_with_magnitude_keeps_heading() {
        let v = Vec2::new(3.0, 4.0);
        let scaled = v.with_magnitude(10.0);
        assert!((scaled - Vec2::new(6.0, 8.0)).length() < 1e-4);
        assert!((scaled.heading() - v.heading()).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_off_wall() {
        // Moving right, hits a wall whose normal points left
        let reflected = reflect(Vec2::new(-1.0, 0.0), Vec2::new(5.0, 2.0));
        assert!((reflected - Vec2::new(-5.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn test_operations_do_not_mutate() {
        let a = Vec2::new(1.0, 2.0);
        let b = a.with_magnitude(7.0);
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_distance() {
        assert!((distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_polar_round_trip(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let v = Vec2::new(x, y);
            let back = v.to_polar().to_cartesian();
            prop_assert!((back - v).length() <= 1e-3 * (1.0 + v.length()));
        }

        #[test]
        fn prop_double_reflection_is_identity(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            angle in -PI..PI,
        ) {
            let normal = polar_to_cartesian(1.0, angle);
            let v = Vec2::new(x, y);
            let twice = reflect(normal, reflect(normal, v));
            prop_assert!((twice - v).length() <= 1e-3 * (1.0 + v.length()));
        }

        #[test]
        fn prop_magnitude_non_negative(x in -1e4f32..1e4, y in -1e4f32..1e4) {
            prop_assert!(Vec2::new(x, y).magnitude() >= 0.0);
        }
    }
}
