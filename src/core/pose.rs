//! 2D pose type for robot position and orientation.
//!
//! X-forward, Y-left, counter-clockwise positive rotation.

use serde::{Deserialize, Serialize};

use crate::utils::normalize_angle;

use super::point::WorldPoint;

/// A 2D pose representing position and heading.
///
/// - Position: (x, y) in meters
/// - Theta: heading angle in radians, CCW from the X-axis, kept in [-π, π]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters.
    pub x: f32,
    /// Y position in meters.
    pub y: f32,
    /// Heading angle in radians.
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose; the heading is normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Get the position as a WorldPoint.
    #[inline]
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Point at a forward/left offset in this pose's frame, in world coordinates.
    #[inline]
    pub fn offset(&self, forward: f32, left: f32) -> WorldPoint {
        let (sin, cos) = self.theta.sin_cos();
        WorldPoint::new(
            self.x + forward * cos - left * sin,
            self.y + forward * sin + left * cos,
        )
    }
}
