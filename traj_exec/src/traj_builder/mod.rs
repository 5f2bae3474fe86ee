//! # Trajectory builder
//!
//! Converts a geometric [`Path`] into a timed [`Trajectory`] by profiling the
//! wheel velocities along the discretised path.
//!
//! The path is discretised at a fixed spatial step, and the wheel velocities
//! at each sample are found in three sweeps:
//!
//! 1. Forward: accelerate from rest as hard as the wheel acceleration limit
//!    allows, subject to the free speed of the wheels, the friction limit of
//!    the path's curvature and any speed zones on the path.
//! 2. Backward: the same limits applied from the end of the path, so every
//!    sample can decelerate to rest at the end.
//! 3. Reconciliation: samples lowered by the backward pass may leave their
//!    successors accelerating too hard, those are re-limited. The timestamps
//!    are integrated in the same sweep.
//!
//! A path whose heading changes faster than its curvature can explain (a
//! cusp) can't be profiled and results in [`TrajBuildError::Cusp`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod constraints;
mod force;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::maths::{get_ang_dist, sign};

use crate::path::{Path, PathError};
use crate::trajectory::{Trajectory, TrajectoryError, TrajectoryPose};

pub use constraints::*;
pub use force::wheel_max_force;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Curvature used in place of an exactly zero average curvature.
///
/// Units: 1/inches
const CURVATURE_FLOOR: f64 = 1e-8;

/// Heading change between samples which is always allowed, regardless of
/// curvature.
///
/// Units: radians
const CUSP_MIN_HEADING_CHANGE_RAD: f64 = 0.01;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Builds trajectories for a drivetrain with the given constraints.
#[derive(Debug, Clone, Copy)]
pub struct TrajBuilder {
    constraints: TrajectoryConstraints,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajBuildError {
    #[error("Could not discretise the path: {0}")]
    Path(#[from] PathError),

    /// Both ends of the path are at rest, so without a sample between them
    /// the vehicle never moves.
    #[error("The discretised path contains {0} sample(s), at least 3 are required")]
    NotEnoughSamples(usize),

    /// The path reverses direction (or near enough) at the given sample.
    #[error(
        "Cusp at sample {index}: heading changes by {heading_change_rad} rad, limit is \
         {limit_rad} rad"
    )]
    Cusp {
        index: usize,
        heading_change_rad: f64,
        limit_rad: f64,
    },

    #[error("Could not create the trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajBuilder {
    pub fn new(constraints: TrajectoryConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &TrajectoryConstraints {
        &self.constraints
    }

    /// Build the trajectory following `path`, sampled every
    /// `1/points_per_inch` inches.
    ///
    /// The trajectory starts and ends at rest. A path shorter than about
    /// one sample spacing has no sample between its ends and is rejected.
    pub fn build(&self, path: &Path, points_per_inch: f64) -> Result<Trajectory, TrajBuildError> {
        let mut poses: Vec<TrajectoryPose> = path
            .discretize(points_per_inch)?
            .iter()
            .map(TrajectoryPose::unprofiled)
            .collect();

        let num_poses = poses.len();
        if num_poses < 3 {
            return Err(TrajBuildError::NotEnoughSamples(num_poses));
        }

        let displacement = 1.0 / points_per_inch;

        // Start and end at rest
        poses[0].left_drive_velocity = 0.0;
        poses[0].right_drive_velocity = 0.0;
        poses[0].time = 0.0;
        poses[num_poses - 1].left_drive_velocity = 0.0;
        poses[num_poses - 1].right_drive_velocity = 0.0;

        // ---- FORWARD PASS ----

        for i in 1..num_poses - 1 {
            let previous = poses[i - 1];

            let heading_change_rad = get_ang_dist(previous.heading, poses[i].heading).abs();
            let limit_rad = (2.0 * previous.curvature.abs() * displacement)
                .max(CUSP_MIN_HEADING_CHANGE_RAD);

            if heading_change_rad > limit_rad {
                trace!(
                    "Aborting build, cusp at sample {} ({} > {})",
                    i,
                    heading_change_rad,
                    limit_rad
                );
                return Err(TrajBuildError::Cusp {
                    index: i,
                    heading_change_rad,
                    limit_rad,
                });
            }

            self.limit_pose(path, &previous, &mut poses[i], displacement);
        }

        // ---- BACKWARD PASS ----

        for i in (1..num_poses - 1).rev() {
            let previous = poses[i + 1];
            self.limit_pose(path, &previous, &mut poses[i], displacement);
        }

        // ---- RECONCILIATION ----

        let max_delta_v_sqr = 2.0 * self.constraints.max_wheel_accel_ins2 * displacement;

        for i in 1..num_poses {
            let previous = poses[i - 1];
            let next = &mut poses[i];

            let left_accel_exceeds = next.left_drive_velocity.powi(2)
                > previous.left_drive_velocity.powi(2) + max_delta_v_sqr;
            let right_accel_exceeds = next.right_drive_velocity.powi(2)
                > previous.right_drive_velocity.powi(2) + max_delta_v_sqr;

            if left_accel_exceeds || right_accel_exceeds {
                self.limit_pose(path, &previous, next, displacement);
            }

            let avg_velocity = (previous.centre_velocity() + next.centre_velocity()) / 2.0;
            next.time = previous.time + displacement / avg_velocity.abs();
        }

        Ok(Trajectory::new(poses)?)
    }

    /// Lower the wheel velocities of `next` to what is reachable from
    /// `previous`, and to any speed zone at `next`.
    fn limit_pose(
        &self,
        path: &Path,
        previous: &TrajectoryPose,
        next: &mut TrajectoryPose,
        displacement: f64,
    ) {
        let max_speed = path.max_speed_at(&next.position);
        let (left, right) = self.velocity_max(previous, next, displacement, max_speed);

        next.left_drive_velocity = left;
        next.right_drive_velocity = right;
    }

    /// The maximum `(left, right)` wheel velocities at `next` given the
    /// velocities at `previous`.
    fn velocity_max(
        &self,
        previous: &TrajectoryPose,
        next: &TrajectoryPose,
        displacement: f64,
        max_speed: f64,
    ) -> (f64, f64) {
        let c = &self.constraints;

        let mut curvature_avg = (previous.curvature + next.curvature) / 2.0;
        if curvature_avg == 0.0 || curvature_avg.is_nan() {
            curvature_avg = CURVATURE_FLOOR;
        }

        let max_wheel_speed = c.max_wheel_speed();

        // Ratio of each wheel's speed to the centre speed
        let left_conversion = 1.0 + curvature_avg * (c.track_width_in / 2.0);
        let right_conversion = 1.0 - curvature_avg * (c.track_width_in / 2.0);

        let max_left_velocity = wheel_velocity_max(
            previous.left_drive_velocity,
            displacement * left_conversion,
            max_wheel_speed,
            c.max_wheel_accel_ins2,
        );
        let max_right_velocity = wheel_velocity_max(
            previous.right_drive_velocity,
            displacement * right_conversion,
            max_wheel_speed,
            c.max_wheel_accel_ins2,
        );

        // A wheel whose limit points the other way to its motion doesn't
        // constrain the centre speed
        let centre_limit = |wheel_max: f64, conversion: f64| {
            let v = wheel_max / conversion;
            if v > 0.0 {
                v
            } else {
                std::f64::INFINITY
            }
        };

        let centre_velocity = next
            .centre_velocity()
            .min(centre_limit(max_left_velocity, left_conversion))
            .min(centre_limit(max_right_velocity, right_conversion))
            .min(c.friction_max_speed(curvature_avg.abs()))
            .min(max_speed);

        (
            centre_velocity * left_conversion,
            centre_velocity * right_conversion,
        )
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Fastest a wheel can be moving after travelling `wheel_displacement` from
/// `previous_velocity`, signed by the direction of travel.
fn wheel_velocity_max(
    previous_velocity: f64,
    wheel_displacement: f64,
    max_wheel_speed: f64,
    max_wheel_accel: f64,
) -> f64 {
    if previous_velocity < max_wheel_speed {
        sign(wheel_displacement)
            * max_wheel_speed.min(
                (previous_velocity.powi(2) + 2.0 * max_wheel_accel * wheel_displacement.abs())
                    .sqrt(),
            )
    } else {
        max_wheel_speed
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
