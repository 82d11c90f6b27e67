//! # MazeNav
//!
//! Navigation core for a differential-drive robot in a discretized 2D maze.
//!
//! The crate builds a smoothed occupancy model from wall geometry, selects
//! frontier exploration targets, and plans kinematically feasible
//! trajectories:
//!
//! - **Grid store**: a clearance-inflated, Gaussian-smoothed occupancy grid
//!   plus a thin binary wall grid for line-of-sight ray casts, built once
//!   from discretized wall points
//! - **Occupancy queries**: total occupancy lookups (out of bounds reads as
//!   occupied) and flood-fill distances cached per target cell
//! - **Frontier exploration**: field-of-view sweeps over a mutable coverage
//!   grid with a retained, re-scored frontier set
//! - **Path search**: satisficing best-first search over constant-curvature
//!   motion primitives with a straight-line shortcut fast path
//! - **Trajectory partitioning**: parent-chain decomposition into evenly
//!   sized waypoints with line/arc segment classification
//!
//! All operations go through [`service::NavService`], either directly or via
//! its single-writer request loop.

pub mod config;
pub mod core;
pub mod error;
pub mod exploration;
pub mod grid;
pub mod planning;
pub mod service;
pub mod stream;
pub mod utils;
pub mod walls;

pub use crate::config::NavConfig;
pub use crate::core::{GridCoord, Pose2D, WorldPoint};
pub use crate::error::{NavError, Result};
pub use crate::service::NavService;
