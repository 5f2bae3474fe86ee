//! # Waypoints
//!
//! A waypoint is one control of the path's spline, along with the locks which
//! define how the optimiser may move it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::optimiser::VariableDomain;
use crate::spline::SplineControl;
use crate::vec2::{Vec2, Vec2Ext};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of optimiser variables describing a waypoint.
pub const NUM_WAYPOINT_VARS: usize = 6;

/// Index of each waypoint variable in an optimiser assignment.
pub mod var {
    pub const POSITION_X: usize = 0;
    pub const POSITION_Y: usize = 1;
    pub const DERIVATIVE_DIR: usize = 2;
    pub const DERIVATIVE_MAG: usize = 3;
    pub const DERIVATIVE_2_DIR: usize = 4;
    pub const DERIVATIVE_2_MAG: usize = 5;
}

/// Default maximum derivative magnitude used by [`default_polar_lock`].
pub const DEFAULT_MAX_MAGNITUDE: f64 = 120.0;

/// Default minimum derivative magnitude used by [`default_polar_lock`].
pub const DEFAULT_MIN_MAGNITUDE: f64 = 10.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Optimiser domains for a cartesian vector. A missing axis does not move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2Lock {
    #[serde(default)]
    pub x: Option<VariableDomain>,
    #[serde(default)]
    pub y: Option<VariableDomain>,
}

/// Optimiser domains for a vector in polar form. A missing component does
/// not move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarLock {
    /// Units: radians
    #[serde(default)]
    pub direction: Option<VariableDomain>,

    #[serde(default)]
    pub magnitude: Option<VariableDomain>,
}

/// A control of the path's spline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Units: inches
    pub position: Vec2,

    /// First derivative of the spline at this waypoint (the tangent handle).
    pub derivative: Vec2,

    /// Second derivative of the spline at this waypoint.
    pub derivative_2: Vec2,

    pub position_lock: Vec2Lock,
    pub derivative_lock: PolarLock,
    pub derivative_2_lock: PolarLock,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Shorthand for how free a polar control is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLockMode {
    /// Both direction and magnitude may be optimised
    Unlocked,

    /// Only the magnitude may be optimised
    DirectionLocked,

    /// Neither component moves
    Locked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Create a waypoint with no locks, i.e. one the optimiser will not move.
    pub fn new(position: Vec2, derivative: Vec2, derivative_2: Vec2) -> Self {
        Self {
            position,
            derivative,
            derivative_2,
            position_lock: Vec2Lock::default(),
            derivative_lock: PolarLock::default(),
            derivative_2_lock: PolarLock::default(),
        }
    }

    pub fn with_position_lock(mut self, lock: Vec2Lock) -> Self {
        self.position_lock = lock;
        self
    }

    pub fn with_derivative_lock(mut self, lock: PolarLock) -> Self {
        self.derivative_lock = lock;
        self
    }

    pub fn with_derivative_2_lock(mut self, lock: PolarLock) -> Self {
        self.derivative_2_lock = lock;
        self
    }

    /// The optimiser domains for this waypoint, indexed by [`var`].
    ///
    /// Variables without a lock get a single point domain at their current
    /// value.
    pub fn optimiser_domains(&self) -> [VariableDomain; NUM_WAYPOINT_VARS] {
        let or_fixed = |lock: Option<VariableDomain>, value: f64| {
            lock.unwrap_or_else(|| VariableDomain::fixed(value))
        };

        [
            or_fixed(self.position_lock.x, self.position.x),
            or_fixed(self.position_lock.y, self.position.y),
            or_fixed(self.derivative_lock.direction, self.derivative.direction()),
            or_fixed(self.derivative_lock.magnitude, self.derivative.magnitude()),
            or_fixed(self.derivative_2_lock.direction, self.derivative_2.direction()),
            or_fixed(self.derivative_2_lock.magnitude, self.derivative_2.magnitude()),
        ]
    }

    /// Overwrite the controls from an optimiser assignment, indexed by
    /// [`var`].
    pub fn apply(&mut self, values: &[f64; NUM_WAYPOINT_VARS]) {
        self.position = Vec2::new(values[var::POSITION_X], values[var::POSITION_Y]);
        self.derivative =
            Vec2::from_polar(values[var::DERIVATIVE_DIR], values[var::DERIVATIVE_MAG]);
        self.derivative_2 =
            Vec2::from_polar(values[var::DERIVATIVE_2_DIR], values[var::DERIVATIVE_2_MAG]);
    }
}

impl SplineControl for Waypoint {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn derivative(&self) -> Vec2 {
        self.derivative
    }

    fn derivative_2(&self) -> Vec2 {
        self.derivative_2
    }
}

impl PolarLock {
    /// Build the default lock for the given mode, see [`default_polar_lock`].
    pub fn from_mode(mode: ControlLockMode) -> Self {
        default_polar_lock(mode, DEFAULT_MAX_MAGNITUDE, DEFAULT_MIN_MAGNITUDE)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Default search domains for a polar control in the given mode.
///
/// The magnitude searches `[min_magnitude, max_magnitude]` unless locked, the
/// direction searches the full circle only when unlocked.
pub fn default_polar_lock(
    mode: ControlLockMode,
    max_magnitude: f64,
    min_magnitude: f64,
) -> PolarLock {
    let mut lock = PolarLock::default();

    if mode != ControlLockMode::Locked {
        lock.magnitude = Some(VariableDomain::new(min_magnitude, max_magnitude, 6, 5.0));
    }

    if mode == ControlLockMode::Unlocked {
        lock.direction = Some(VariableDomain::new(0.0, TAU, 8, PI / 64.0));
    }

    lock
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unlocked_domains_are_fixed() {
        let wp = Waypoint::new(
            Vec2::new(3.0, 4.0),
            Vec2::new(0.0, 24.0),
            Vec2::new(-5.0, 0.0),
        );

        let domains = wp.optimiser_domains();
        assert_eq!(domains[var::POSITION_X], VariableDomain::fixed(3.0));
        assert_eq!(domains[var::POSITION_Y], VariableDomain::fixed(4.0));
        assert!((domains[var::DERIVATIVE_DIR].range_min - PI / 2.0).abs() < 1e-12);
        assert!((domains[var::DERIVATIVE_MAG].range_max - 24.0).abs() < 1e-12);
        assert!((domains[var::DERIVATIVE_2_DIR].range_min - PI).abs() < 1e-12);
        assert!((domains[var::DERIVATIVE_2_MAG].range_min - 5.0).abs() < 1e-12);

        for d in domains.iter() {
            assert_eq!(d.per_layer, 1);
        }
    }

    #[test]
    fn test_apply_round_trip() {
        let mut wp = Waypoint::new(
            Vec2::new(3.0, 4.0),
            Vec2::new(10.0, -24.0),
            Vec2::new(-5.0, 2.0),
        );
        let original = wp.clone();

        let values = [
            wp.position.x,
            wp.position.y,
            wp.derivative.direction(),
            wp.derivative.magnitude(),
            wp.derivative_2.direction(),
            wp.derivative_2.magnitude(),
        ];
        wp.apply(&values);

        assert!((wp.position - original.position).norm() < 1e-12);
        assert!((wp.derivative - original.derivative).norm() < 1e-12);
        assert!((wp.derivative_2 - original.derivative_2).norm() < 1e-12);
    }

    #[test]
    fn test_lock_overrides_default() {
        let lock = Vec2Lock {
            x: Some(VariableDomain::new(-2.0, 2.0, 3, 0.5)),
            y: None,
        };
        let wp = Waypoint::new(Vec2::zeros(), Vec2::new(1.0, 0.0), Vec2::zeros())
            .with_position_lock(lock);

        let domains = wp.optimiser_domains();
        assert_eq!(domains[var::POSITION_X], VariableDomain::new(-2.0, 2.0, 3, 0.5));
        assert_eq!(domains[var::POSITION_Y], VariableDomain::fixed(0.0));
    }

    #[test]
    fn test_default_polar_lock() {
        let unlocked = PolarLock::from_mode(ControlLockMode::Unlocked);
        assert_eq!(
            unlocked.magnitude,
            Some(VariableDomain::new(10.0, 120.0, 6, 5.0))
        );
        assert_eq!(
            unlocked.direction,
            Some(VariableDomain::new(0.0, TAU, 8, PI / 64.0))
        );

        let dir_locked = default_polar_lock(ControlLockMode::DirectionLocked, 60.0, 20.0);
        assert_eq!(dir_locked.direction, None);
        assert_eq!(
            dir_locked.magnitude,
            Some(VariableDomain::new(20.0, 60.0, 6, 5.0))
        );

        assert_eq!(PolarLock::from_mode(ControlLockMode::Locked), PolarLock::default());
    }
}
