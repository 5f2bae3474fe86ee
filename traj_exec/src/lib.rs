//! # Trajectory generation library.
//!
//! Plans time-optimal trajectories for a differential drive vehicle. A path
//! is described by a chain of quintic Hermite spline waypoints, which is
//! discretised and velocity profiled against the drivetrain's physical
//! limits. The waypoints can then be tuned by a layered grid search to
//! minimise the time taken to drive the path.
//!
//! All lengths are in inches, velocities in inches/second, accelerations in
//! inches/second^2 and angles in radians.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// 2D vector type and polar helpers
pub mod vec2;

/// Quintic Hermite spline evaluation
pub mod spline;

/// Waypoints, speed zones and discretisation of the spline path
pub mod path;

/// Velocity profiling of a path into a timed trajectory
pub mod traj_builder;

/// Timed trajectory and playback
pub mod trajectory;

/// Layered grid search optimiser
pub mod optimiser;

/// Open-loop differential drive simulation
pub mod sim;

/// Parameters for the generation executable
pub mod params;
