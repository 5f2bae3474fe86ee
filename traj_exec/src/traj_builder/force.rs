//! Empirical wheel force envelope
//!
//! Not used by [`TrajBuilder`](super::TrajBuilder), which limits wheel
//! acceleration directly. Kept for force based limiting of the drivetrain.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::constraints::METERS_PER_INCH;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Cap on the motor torque term of the envelope.
const TORQUE_CAP: f64 = 2.1;

/// Slope of the torque term against the fraction of free speed.
const TORQUE_SLOPE: f64 = -3.275;

/// Stall intercept of the torque term.
const TORQUE_INTERCEPT: f64 = 3.965;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Maximum force one wheel can apply to the ground while moving at the given
/// ground speed.
///
/// Units: inches/second, revolutions/minute, inches -> newtons
pub fn wheel_max_force(wheel_velocity: f64, wheel_max_rpm: f64, wheel_diameter: f64) -> f64 {
    let wheel_radius_in = wheel_diameter / 2.0;
    let wheel_rotational_velocity_rads = wheel_velocity / wheel_radius_in;

    let fraction_of_max_speed = (wheel_rotational_velocity_rads
        * (60.0 / (2.0 * std::f64::consts::PI)))
        / wheel_max_rpm;

    let wheel_radius_m = wheel_radius_in * METERS_PER_INCH;

    ((100.0 / wheel_max_rpm)
        * TORQUE_CAP.min(TORQUE_SLOPE * fraction_of_max_speed + TORQUE_INTERCEPT))
        / wheel_radius_m
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wheel_max_force() {
        let rpm = 300.0;
        let dia = 3.25;
        let radius_m = dia / 2.0 * METERS_PER_INCH;
        let free_speed = rpm * std::f64::consts::PI * dia / 60.0;

        // Torque capped at low speed
        let stall = wheel_max_force(0.0, rpm, dia);
        assert!((stall - (100.0 / rpm) * 2.1 / radius_m).abs() < 1e-9);
        assert!((wheel_max_force(0.3 * free_speed, rpm, dia) - stall).abs() < 1e-9);

        // Falls off linearly towards free speed
        let at_free = wheel_max_force(free_speed, rpm, dia);
        assert!((at_free - (100.0 / rpm) * 0.69 / radius_m).abs() < 1e-9);

        let mut last = stall;
        for i in 1..=10 {
            let f = wheel_max_force(free_speed * i as f64 / 10.0, rpm, dia);
            assert!(f <= last + 1e-12);
            last = f;
        }
    }
}
