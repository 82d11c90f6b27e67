//! Frontier records and scoring.
//!
//! A frontier is a candidate next-exploration target at the visible edge of
//! the scanned region. Frontiers are retained across scans and re-scored
//! against the current pose; the lowest score wins.

use std::f32::consts::PI;

use crate::config::FrontierWeights;
use crate::core::{GridCoord, WorldPoint};

/// A candidate exploration target.
#[derive(Clone, Debug)]
pub struct Frontier {
    /// Cell index of the frontier.
    pub cell: GridCoord,
    /// World position of the frontier.
    pub position: WorldPoint,
    /// Occupancy cost at the frontier cell.
    pub occupancy: f32,
    /// Angular deviation from the robot heading (radians, absolute).
    pub heading_diff: f32,
    /// Euclidean distance from the robot (meters).
    pub distance: f32,
    /// Unknown cells in the local neighborhood window.
    pub unexplored: usize,
    /// Whether the frontier is visible from the robot through the wall grid.
    pub visible: bool,
}

impl Frontier {
    /// Scalar score; lower is better.
    ///
    /// Combines the occupancy cost, an exploration-gain term (grows as the
    /// neighborhood fills up), the piecewise distance cost, the heading
    /// deviation, and a flat penalty for frontiers the robot cannot
    /// currently see.
    pub fn score(
        &self,
        weights: &FrontierWeights,
        distance_threshold: f32,
        neighborhood: usize,
    ) -> f32 {
        let explored_fraction =
            1.0 - (self.unexplored as f32 / neighborhood.max(1) as f32).min(1.0);
        let hidden = if self.visible {
            0.0
        } else {
            weights.hidden_penalty
        };

        weights.occupancy * self.occupancy
            + weights.gain * explored_fraction
            + weights.distance * distance_cost(self.distance, distance_threshold)
            + weights.heading * self.heading_diff / (4.0 * PI)
            + hidden
    }
}

/// Distance cost curve: highest for close, already-approached cells, zero at
/// the threshold, and rising back toward one far beyond it.
pub fn distance_cost(distance: f32, threshold: f32) -> f32 {
    if distance < threshold {
        1.0 - gaussian(distance, threshold, threshold)
    } else {
        1.0 - (-(distance - threshold) * threshold).exp()
    }
}

fn gaussian(x: f32, mean: f32, var: f32) -> f32 {
    let diff = (x - mean) / var;
    (-diff * diff / 2.0).exp()
}
