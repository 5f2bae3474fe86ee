//! # Speed limit zones

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::vec2::{Vec2, Vec2Ext};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A function giving the maximum allowed drivetrain speed at a position.
///
/// Units: inches -> inches/second
pub type SpeedCallback = Arc<dyn Fn(&Vec2) -> f64 + Send + Sync>;

/// A circular zone in which the drivetrain speed is limited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedZone {
    /// Centre of the zone
    ///
    /// Units: inches
    pub centre: [f64; 2],

    /// Units: inches
    pub radius: f64,

    /// Speed limit inside the zone
    ///
    /// Units: inches/second
    pub max_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedZone {
    /// The speed limit this zone imposes at `position`, infinite outside the
    /// zone.
    pub fn max_speed_at(&self, position: &Vec2) -> f64 {
        let centre = Vec2::new(self.centre[0], self.centre[1]);

        if position.distance_to_squared(&centre) <= self.radius * self.radius {
            self.max_speed
        } else {
            std::f64::INFINITY
        }
    }

    pub fn into_callback(self) -> SpeedCallback {
        Arc::new(move |position: &Vec2| self.max_speed_at(position))
    }
}
