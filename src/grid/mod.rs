//! Grid construction and queries.
//!
//! This module provides:
//! - The grid store: smoothed occupancy grid and binary wall grid
//! - Flood-fill distance maps with per-target caching

mod distance;
mod store;

pub use distance::{DistanceCache, DistanceMap};
pub use store::{GridLayer, GridStore};
