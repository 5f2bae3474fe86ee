//! # 2D vector primitive
//!
//! All positions and spline derivatives are `nalgebra` 2-vectors. Units are
//! inches unless noted otherwise.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D point or vector in inches.
pub type Vec2 = Vector2<f64>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Extra operations on [`Vec2`] used when working with spline controls.
pub trait Vec2Ext {
    /// Build a vector from a direction (radians from +ve x) and a length.
    fn from_polar(theta_rad: f64, radius: f64) -> Self;

    /// Squared euclidian distance to another point.
    fn distance_to_squared(&self, other: &Self) -> f64;

    /// Euclidian distance to another point.
    fn distance_to(&self, other: &Self) -> f64;

    /// Angle of the vector from the +ve x axis, in the range [-pi, pi].
    fn direction(&self) -> f64;

    /// Length of the vector.
    fn magnitude(&self) -> f64;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Vec2Ext for Vec2 {
    fn from_polar(theta_rad: f64, radius: f64) -> Self {
        Vec2::new(theta_rad.cos() * radius, theta_rad.sin() * radius)
    }

    fn distance_to_squared(&self, other: &Self) -> f64 {
        (self - other).norm_squared()
    }

    fn distance_to(&self, other: &Self) -> f64 {
        self.distance_to_squared(other).sqrt()
    }

    fn direction(&self) -> f64 {
        self.y.atan2(self.x)
    }

    fn magnitude(&self) -> f64 {
        self.norm()
    }
}
