//! # Path
//!
//! A path is a chain of quintic Hermite spline segments joining an ordered
//! list of [`Waypoint`]s, along with any speed limits which apply along it.
//!
//! The path can be discretised into evenly spaced [`PathInstant`]s for
//! profiling, and each waypoint's controls can be tuned by the optimiser to
//! minimise the time taken to drive the path.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod speed_zone;
mod waypoint;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use std::fmt;

use crate::optimiser::{self, OptimiserError};
use crate::spline::{self, SplineControl, SplineSample};
use crate::traj_builder::{TrajBuilder, TrajectoryConstraints};
use crate::trajectory::{PathInstant, Trajectory};
use crate::vec2::{Vec2, Vec2Ext};

pub use speed_zone::*;
pub use waypoint::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fractional error in the distance between samples above which a step is
/// refined.
const SPACING_TOLERANCE: f64 = 0.01;

/// Number of bisections used when refining a step.
const MAX_STEP_BISECTIONS: usize = 40;

/// Parameter values closer than this to the end of a segment are treated as
/// the end of the segment.
const PARAM_END_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct Path {
    waypoints: Vec<Waypoint>,

    speed_callbacks: Vec<SpeedCallback>,

    /// Trajectory of the neighbourhood of the most recently optimised
    /// waypoint
    last_trajectory: Option<Trajectory>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("A path needs at least 2 waypoints, found {0}")]
    NotEnoughWaypoints(usize),

    #[error("No waypoint at index {0}")]
    InvalidWaypointIndex(usize),

    #[error("Points per inch must be positive and finite, got {0}")]
    InvalidPointsPerInch(f64),

    #[error("Could not optimise waypoint {index}: {source}")]
    Optimiser {
        index: usize,
        source: OptimiserError,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn append_waypoints<I: IntoIterator<Item = Waypoint>>(&mut self, waypoints: I) {
        self.waypoints.extend(waypoints);
    }

    /// Add a speed limit to the path, see [`Path::max_speed_at`].
    pub fn append_speed_callback(&mut self, callback: SpeedCallback) {
        self.speed_callbacks.push(callback);
    }

    pub fn append_speed_callbacks<I: IntoIterator<Item = SpeedCallback>>(
        &mut self,
        callbacks: I,
    ) {
        self.speed_callbacks.extend(callbacks);
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Mutable access to a single waypoint.
    pub fn waypoint_mut(&mut self, index: usize) -> Result<&mut Waypoint, PathError> {
        self.waypoints
            .get_mut(index)
            .ok_or(PathError::InvalidWaypointIndex(index))
    }

    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    /// The trajectory built for the last waypoint tuned by
    /// [`Path::optimise`], if any.
    pub fn last_trajectory(&self) -> Option<&Trajectory> {
        self.last_trajectory.as_ref()
    }

    /// The speed limit at `position`, the lowest of all speed callbacks.
    ///
    /// Units: inches/second, infinite if the path has no speed callbacks.
    pub fn max_speed_at(&self, position: &Vec2) -> f64 {
        self.speed_callbacks
            .iter()
            .map(|cb| cb(position))
            .fold(std::f64::INFINITY, f64::min)
    }

    /// Sample the path every `1/points_per_inch` inches.
    ///
    /// The first and last samples are the positions of the first and last
    /// waypoints. The step before each waypoint may be shorter than the
    /// nominal spacing.
    ///
    /// Where the spline's derivative is zero the tangent is undefined. Such
    /// samples have zero curvature and take their heading from the nearest
    /// following sample, or the nearest preceding one at the end of the path.
    pub fn discretize(&self, points_per_inch: f64) -> Result<Vec<PathInstant>, PathError> {
        if !points_per_inch.is_finite() || points_per_inch <= 0.0 {
            return Err(PathError::InvalidPointsPerInch(points_per_inch));
        }

        if self.waypoints.len() < 2 {
            return Err(PathError::NotEnoughWaypoints(self.waypoints.len()));
        }

        let spacing = 1.0 / points_per_inch;
        let mut instants = Vec::new();
        let mut headings = Vec::new();

        for pair in self.waypoints.windows(2) {
            let (initial, final_) = (&pair[0], &pair[1]);
            let mut t = 0.0;

            // The end of each segment is the start of the next, so it is only
            // sampled on the last one
            while 1.0 - t > PARAM_END_EPSILON {
                let sample = spline::sample(t, initial, final_);
                let (instant, heading) = path_instant(&sample);
                instants.push(instant);
                headings.push(heading);

                t = next_param(t, &sample, initial, final_, spacing);
            }
        }

        // Indexing is safe as there are at least 2 waypoints
        let n = self.waypoints.len();
        let end = spline::sample(1.0, &self.waypoints[n - 2], &self.waypoints[n - 1]);
        let (instant, heading) = path_instant(&end);
        instants.push(instant);
        headings.push(heading);

        fill_headings(&mut instants, &headings);

        Ok(instants)
    }

    /// Tune every waypoint in turn to minimise the time taken to drive the
    /// path.
    ///
    /// Each waypoint is tuned against its immediate neighbours only, which
    /// are not moved while it is tuned. The variables searched are given by
    /// the waypoint's locks, see [`Waypoint::optimiser_domains`].
    pub fn optimise(
        &mut self,
        layers: usize,
        constraints: &TrajectoryConstraints,
        points_per_inch: f64,
    ) -> Result<(), PathError> {
        if !points_per_inch.is_finite() || points_per_inch <= 0.0 {
            return Err(PathError::InvalidPointsPerInch(points_per_inch));
        }

        let num_waypoints = self.waypoints.len();
        if num_waypoints < 2 {
            return Err(PathError::NotEnoughWaypoints(num_waypoints));
        }

        let builder = TrajBuilder::new(*constraints);

        for index in 0..num_waypoints {
            let domains = self.waypoints[index].optimiser_domains();

            if domains.iter().all(|d| d.range_min == d.range_max) {
                trace!("Waypoint {} has no free variables, skipping", index);
                continue;
            }

            // Neighbourhood of the waypoint, including all speed limits
            let first = index.saturating_sub(1);
            let last = (index + 1).min(num_waypoints - 1);
            let local_index = index - first;

            let mut local = Path {
                waypoints: self.waypoints[first..=last].to_vec(),
                speed_callbacks: self.speed_callbacks.clone(),
                last_trajectory: None,
            };

            let mut num_evals = 0usize;
            let mut loss = |values: &[f64; NUM_WAYPOINT_VARS]| {
                num_evals += 1;
                local.waypoints[local_index].apply(values);

                match builder.build(&local, points_per_inch) {
                    Ok(traj) if !traj.total_time().is_nan() => traj.total_time(),
                    _ => std::f64::INFINITY,
                }
            };

            let result = optimiser::layered_search(layers, &mut loss, &domains)
                .map_err(|source| PathError::Optimiser { index, source })?;

            debug!(
                "Waypoint {} searched with {} trajectory builds",
                index, num_evals
            );

            if !result.score.is_finite() {
                warn!(
                    "No feasible trajectory found around waypoint {}, leaving it unchanged",
                    index
                );
                continue;
            }

            self.waypoints[index].apply(&result.values);
            local.waypoints[local_index] = self.waypoints[index].clone();

            info!(
                "Waypoint {} optimised: local time {:.3} s, position ({:.2}, {:.2})",
                index, result.score, self.waypoints[index].position.x,
                self.waypoints[index].position.y
            );

            self.last_trajectory = builder.build(&local, points_per_inch).ok();
        }

        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("waypoints", &self.waypoints)
            .field("num_speed_callbacks", &self.speed_callbacks.len())
            .field("last_trajectory", &self.last_trajectory)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The path instant at a sample, and the sample's heading if it is defined.
fn path_instant(sample: &SplineSample) -> (PathInstant, Option<f64>) {
    match sample.curvature() {
        Some(curvature) => (
            PathInstant {
                position: sample.position,
                curvature,
                heading: sample.heading(),
            },
            Some(sample.heading()),
        ),
        None => (
            PathInstant {
                position: sample.position,
                curvature: 0.0,
                heading: 0.0,
            },
            None,
        ),
    }
}

/// Parameter of the next sample after `t`, about `spacing` inches further
/// along the segment, or 1 if the end of the segment is closer than that.
///
/// The first guess assumes constant speed from `sample`. If that lands too
/// far from the spacing the step is doubled until it passes the spacing and
/// then bisected.
fn next_param<C: SplineControl>(
    t: f64,
    sample: &SplineSample,
    initial: &C,
    final_: &C,
    spacing: f64,
) -> f64 {
    let chord = |p: f64| spline::lerp_hermite(p, initial, final_).distance_to(&sample.position);

    let speed = sample.derivative.norm();
    let mut lo = t;
    let mut hi = if speed > std::f64::EPSILON {
        (t + spacing / speed).min(1.0)
    } else {
        1.0
    };

    while hi < 1.0 && chord(hi) < spacing * (1.0 - SPACING_TOLERANCE) {
        lo = hi;
        hi = (t + 2.0 * (hi - t)).min(1.0);
    }

    if chord(hi) <= spacing * (1.0 + SPACING_TOLERANCE) {
        return hi;
    }

    for _ in 0..MAX_STEP_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if chord(mid) > spacing {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    // Always beyond `t`, so the walk progresses
    hi
}

/// Set the heading of every sample whose heading is undefined, preferring
/// the nearest defined heading after it.
fn fill_headings(instants: &mut [PathInstant], headings: &[Option<f64>]) {
    let mut following = vec![None; headings.len()];
    let mut next = None;
    for (i, heading) in headings.iter().enumerate().rev() {
        if heading.is_some() {
            next = *heading;
        }
        following[i] = next;
    }

    let mut previous = None;
    for (i, (instant, heading)) in instants.iter_mut().zip(headings.iter()).enumerate() {
        match heading {
            Some(h) => previous = Some(*h),
            None => instant.heading = following[i].or(previous).unwrap_or(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
