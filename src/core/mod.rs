//! Core geometry types shared by the grids, the exploration engine and the
//! path planner.

mod point;
mod pose;

pub use point::{GridCoord, WorldPoint};
pub use pose::Pose2D;
