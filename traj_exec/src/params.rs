//! Parameters structure for trajectory generation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::path::{ControlLockMode, Path, PolarLock, SpeedZone, Vec2Lock, Waypoint};
use crate::traj_builder::TrajectoryConstraints;
use crate::vec2::Vec2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory generation executable.
#[derive(Debug, Clone, Deserialize)]
pub struct TrajGenParams {
    /// Spatial sampling density of the path.
    ///
    /// Units: 1/inches
    pub points_per_inch: f64,

    /// Number of narrowing layers run by the optimiser for each waypoint.
    pub optimise_layers: usize,

    /// Period at which the optimised trajectory is replayed through the
    /// simulation.
    ///
    /// Units: seconds
    pub playback_period_s: f64,

    pub constraints: TrajectoryConstraints,

    pub waypoints: Vec<WaypointParams>,

    #[serde(default)]
    pub speed_zones: Vec<SpeedZone>,
}

/// A waypoint as written in a parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct WaypointParams {
    /// Units: inches
    pub position: [f64; 2],

    pub derivative: [f64; 2],

    #[serde(default)]
    pub derivative_2: [f64; 2],

    #[serde(default)]
    pub position_lock: Vec2Lock,

    /// Explicit derivative domains, takes precedence over
    /// `derivative_lock_mode`
    #[serde(default)]
    pub derivative_lock: Option<PolarLock>,

    #[serde(default)]
    pub derivative_lock_mode: Option<ControlLockMode>,

    /// Explicit second derivative domains, takes precedence over
    /// `derivative_2_lock_mode`
    #[serde(default)]
    pub derivative_2_lock: Option<PolarLock>,

    #[serde(default)]
    pub derivative_2_lock_mode: Option<ControlLockMode>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajGenParams {
    /// Build the path described by these parameters, including speed zones.
    pub fn build_path(&self) -> Path {
        let mut path = Path::new();
        path.append_waypoints(self.waypoints.iter().map(Waypoint::from));
        path.append_speed_callbacks(self.speed_zones.iter().map(|z| z.into_callback()));
        path
    }
}

impl From<&WaypointParams> for Waypoint {
    fn from(p: &WaypointParams) -> Self {
        let polar_lock = |lock: Option<PolarLock>, mode: Option<ControlLockMode>| {
            lock.or_else(|| mode.map(PolarLock::from_mode))
                .unwrap_or_default()
        };

        Waypoint::new(
            Vec2::new(p.position[0], p.position[1]),
            Vec2::new(p.derivative[0], p.derivative[1]),
            Vec2::new(p.derivative_2[0], p.derivative_2[1]),
        )
        .with_position_lock(p.position_lock)
        .with_derivative_lock(polar_lock(p.derivative_lock, p.derivative_lock_mode))
        .with_derivative_2_lock(polar_lock(p.derivative_2_lock, p.derivative_2_lock_mode))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::optimiser::VariableDomain;

    const PARAMS: &str = r#"
        points_per_inch = 3.0
        optimise_layers = 4
        playback_period_s = 0.01

        [constraints]
        drivetrain_rpm = 300.0
        wheel_diameter_in = 3.25
        max_wheel_accel_ins2 = 200.0
        track_width_in = 12.0
        mass_lb = 15.0
        friction_coefficient = 0.8

        [[waypoints]]
        position = [0.0, 0.0]
        derivative = [48.0, 0.0]

        [[waypoints]]
        position = [48.0, 24.0]
        derivative = [0.0, 48.0]
        derivative_lock_mode = "DirectionLocked"

        [waypoints.position_lock.y]
        range_min = 12.0
        range_max = 36.0
        per_layer = 4
        tolerance = 0.5

        [[waypoints]]
        position = [96.0, 24.0]
        derivative = [48.0, 0.0]
        derivative_lock_mode = "Unlocked"

        [waypoints.derivative_lock.magnitude]
        range_min = 20.0
        range_max = 60.0
        per_layer = 3
        tolerance = 2.0

        [[speed_zones]]
        centre = [48.0, 24.0]
        radius = 6.0
        max_speed = 20.0
    "#;

    #[test]
    fn test_load_params() {
        let params: TrajGenParams = util::params::from_str(PARAMS).unwrap();

        assert_eq!(params.optimise_layers, 4);
        assert_eq!(params.constraints.track_width_in, 12.0);
        assert_eq!(params.waypoints.len(), 3);
        assert_eq!(params.speed_zones.len(), 1);

        let path = params.build_path();
        let wps = path.waypoints();

        // No locks given
        assert_eq!(wps[0].derivative_lock, PolarLock::default());
        assert_eq!(wps[0].derivative_2, Vec2::zeros());

        // Lock mode shorthand
        assert_eq!(
            wps[1].derivative_lock,
            PolarLock::from_mode(ControlLockMode::DirectionLocked)
        );
        assert_eq!(
            wps[1].position_lock.y,
            Some(VariableDomain::new(12.0, 36.0, 4, 0.5))
        );
        assert!(wps[1].position_lock.x.is_none());

        // Explicit lock overrides the mode
        assert!(wps[2].derivative_lock.direction.is_none());
        assert_eq!(
            wps[2].derivative_lock.magnitude,
            Some(VariableDomain::new(20.0, 60.0, 3, 2.0))
        );

        assert_eq!(path.max_speed_at(&Vec2::new(48.0, 26.0)), 20.0);
    }
}
