//! # Trajectory
//!
//! A trajectory is the timed sequence of poses produced by the
//! [`TrajBuilder`](crate::traj_builder::TrajBuilder). It is read-only once
//! built and can be sampled at any time within its span.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{get_ang_dist, lerp};

use crate::vec2::Vec2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sample along the path, before any velocity profiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathInstant {
    /// Position of the sample
    ///
    /// Units: inches
    pub position: Vec2,

    /// Signed curvature, positive when turning anticlockwise
    ///
    /// Units: 1/inches
    pub curvature: f64,

    /// Heading of the path tangent from the +ve x axis
    ///
    /// Units: radians
    pub heading: f64,
}

/// A profiled sample along the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPose {
    /// Units: inches
    pub position: Vec2,

    /// Units: 1/inches
    pub curvature: f64,

    /// Units: radians
    pub heading: f64,

    /// Units: inches/second
    pub left_drive_velocity: f64,

    /// Units: inches/second
    pub right_drive_velocity: f64,

    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time: f64,
}

/// A timed sequence of poses, with strictly increasing time.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    states: Vec<TrajectoryPose>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("Attempted to create a trajectory with no states")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryPose {
    /// Build a pose at the given path instant whose velocities and time are
    /// not yet known. Unknown values are set to infinity.
    pub fn unprofiled(instant: &PathInstant) -> Self {
        Self {
            position: instant.position,
            curvature: instant.curvature,
            heading: instant.heading,
            left_drive_velocity: std::f64::INFINITY,
            right_drive_velocity: std::f64::INFINITY,
            time: std::f64::INFINITY,
        }
    }

    /// Velocity of the centre of the drivetrain.
    pub fn centre_velocity(&self) -> f64 {
        (self.left_drive_velocity + self.right_drive_velocity) / 2.0
    }
}

impl From<TrajectoryPose> for PathInstant {
    fn from(pose: TrajectoryPose) -> Self {
        Self {
            position: pose.position,
            curvature: pose.curvature,
            heading: pose.heading,
        }
    }
}

impl Trajectory {
    /// Wrap an already profiled sequence of poses.
    pub fn new(states: Vec<TrajectoryPose>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }

        Ok(Self { states })
    }

    pub fn states(&self) -> &[TrajectoryPose] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Time of the last pose in the trajectory.
    pub fn total_time(&self) -> f64 {
        // Construction guarantees at least one state
        self.states.last().map(|s| s.time).unwrap_or(std::f64::NAN)
    }

    /// Get the interpolated state of the trajectory at the given time.
    ///
    /// If `time` is before the first state or after the last `None` is
    /// returned.
    pub fn get_state(&self, time: f64) -> Option<TrajectoryPose> {
        let first = self.states.first()?;
        if time < first.time || time.is_nan() {
            return None;
        }

        for pair in self.states.windows(2) {
            let (last_state, state) = (&pair[0], &pair[1]);

            if state.time > time {
                let t = (time - last_state.time) / (state.time - last_state.time);

                return Some(TrajectoryPose {
                    position: Vec2::new(
                        lerp(last_state.position.x, state.position.x, t),
                        lerp(last_state.position.y, state.position.y, t),
                    ),
                    curvature: lerp(last_state.curvature, state.curvature, t),
                    heading: last_state.heading
                        + t * get_ang_dist(last_state.heading, state.heading),
                    left_drive_velocity: lerp(
                        last_state.left_drive_velocity,
                        state.left_drive_velocity,
                        t,
                    ),
                    right_drive_velocity: lerp(
                        last_state.right_drive_velocity,
                        state.right_drive_velocity,
                        t,
                    ),
                    time,
                });
            }
        }

        // Exactly at the end of the trajectory
        match self.states.last() {
            Some(last) if last.time == time => Some(*last),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
