//! Drivetrain constraints used when profiling a trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Units: meters/second^2
pub const GRAVITATIONAL_ACCEL_MS2: f64 = 9.81;

pub const KG_PER_LB: f64 = 0.453592;

pub const INCHES_PER_METER: f64 = 39.3701;

pub const METERS_PER_INCH: f64 = 0.0254;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Physical limits of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConstraints {
    /// Free speed of the drivetrain at the wheels.
    ///
    /// Units: revolutions/minute
    pub drivetrain_rpm: f64,

    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Maximum acceleration of each wheel along the ground.
    ///
    /// Units: inches/second^2
    pub max_wheel_accel_ins2: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Units: pounds
    pub mass_lb: f64,

    /// Coefficient of friction between the wheels and the ground.
    pub friction_coefficient: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryConstraints {
    /// The ground speed of a wheel spinning at the drivetrain's free speed.
    ///
    /// Units: inches/second
    pub fn max_wheel_speed(&self) -> f64 {
        (self.drivetrain_rpm * std::f64::consts::PI * self.wheel_diameter_in) / 60.0
    }

    /// Units: kilograms
    pub fn mass_kg(&self) -> f64 {
        self.mass_lb * KG_PER_LB
    }

    /// Speed above which the drivetrain would slide when following the given
    /// (unsigned) curvature.
    ///
    /// Units: 1/inches -> inches/second
    pub fn friction_max_speed(&self, curvature_abs: f64) -> f64 {
        if curvature_abs == 0.0 {
            return std::f64::INFINITY;
        }

        INCHES_PER_METER
            * ((self.friction_coefficient * self.mass_kg() * GRAVITATIONAL_ACCEL_MS2)
                / (curvature_abs * INCHES_PER_METER))
                .sqrt()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn constraints() -> TrajectoryConstraints {
        TrajectoryConstraints {
            drivetrain_rpm: 300.0,
            wheel_diameter_in: 3.25,
            max_wheel_accel_ins2: 200.0,
            track_width_in: 12.0,
            mass_lb: 15.0,
            friction_coefficient: 0.8,
        }
    }

    #[test]
    fn test_max_wheel_speed() {
        let c = constraints();
        assert!((c.max_wheel_speed() - 300.0 * std::f64::consts::PI * 3.25 / 60.0).abs() < 1e-12);
        assert!((c.mass_kg() - 6.80388).abs() < 1e-9);
    }

    #[test]
    fn test_friction_max_speed() {
        let c = constraints();
        assert!(c.friction_max_speed(0.0).is_infinite());

        // Tighter turns are slower
        assert!(c.friction_max_speed(0.1) < c.friction_max_speed(0.01));

        // Quadrupling the curvature halves the speed
        let ratio = c.friction_max_speed(0.01) / c.friction_max_speed(0.04);
        assert!((ratio - 2.0).abs() < 1e-9);
    }
}
