//! # Differential drive simulation
//!
//! Open-loop dead reckoning of a differential drive vehicle, used to replay a
//! trajectory's wheel velocities and check where they actually lead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::trajectory::{Trajectory, TrajectoryPose};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Turn radius used when the radius is not finite.
///
/// Units: inches
const MAX_TURN_RADIUS_IN: f64 = 1e7;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffDriveSim {
    /// Units: inches
    pub x: f64,

    /// Units: inches
    pub y: f64,

    /// Heading from the +ve x axis
    ///
    /// Units: radians
    pub theta: f64,

    /// Units: inches
    pub track_width: f64,
}

/// The simulated pose at some point during playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimPose {
    /// Units: inches
    pub x: f64,

    /// Units: inches
    pub y: f64,

    /// Units: radians
    pub theta: f64,

    /// Units: seconds
    pub time: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiffDriveSim {
    pub fn new(x: f64, y: f64, theta: f64, track_width: f64) -> Self {
        Self {
            x,
            y,
            theta,
            track_width,
        }
    }

    /// Place the vehicle at the position and heading of a trajectory pose.
    pub fn at_pose(pose: &TrajectoryPose, track_width: f64) -> Self {
        Self::new(pose.position.x, pose.position.y, pose.heading, track_width)
    }

    /// Drive the wheels at constant velocities for `dt` seconds.
    ///
    /// The vehicle follows an arc, turning anticlockwise when the left wheel
    /// is faster than the right.
    pub fn step(&mut self, left_velocity: f64, right_velocity: f64, dt: f64) {
        // Displacement in the vehicle frame, x to the left and y forward
        let (local_dx, local_dy, dtheta) = if left_velocity != right_velocity {
            let rot_vel = (left_velocity - right_velocity) / self.track_width;

            let mut radius = (left_velocity + right_velocity) / (2.0 * rot_vel);
            if !radius.is_finite() {
                radius = MAX_TURN_RADIUS_IN;
            }

            let dtheta = rot_vel * dt;
            (radius - radius * dtheta.cos(), radius * dtheta.sin(), dtheta)
        } else {
            (0.0, left_velocity * dt, 0.0)
        };

        let (sin, cos) = self.theta.sin_cos();
        self.x += -local_dx * sin + local_dy * cos;
        self.y += local_dx * cos + local_dy * sin;
        self.theta += dtheta;
    }

    /// Replay the wheel velocities of `trajectory` sampled every `period_s`
    /// seconds, returning every visited pose including the initial one.
    pub fn play(&mut self, trajectory: &Trajectory, period_s: f64) -> Vec<SimPose> {
        let mut poses = vec![self.pose(0.0)];

        if !(period_s > 0.0) {
            return poses;
        }

        let mut time = 0.0;
        while let Some(state) = trajectory.get_state(time) {
            self.step(
                state.left_drive_velocity,
                state.right_drive_velocity,
                period_s,
            );
            time += period_s;
            poses.push(self.pose(time));
        }

        poses
    }

    pub fn pose(&self, time: f64) -> SimPose {
        SimPose {
            x: self.x,
            y: self.y,
            theta: self.theta,
            time,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
