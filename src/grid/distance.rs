//! Grid-restricted distance lookups.
//!
//! Distances are computed by a breadth-first flood fill propagated outward
//! from the target cell over the wall grid (4-connected, explicit queue),
//! so they follow reachable corridors instead of cutting through walls.
//! Propagated maps are cached per target cell and reused for every
//! heuristic query of one search.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::core::{GridCoord, WorldPoint};
use crate::error::{NavError, Result};

use super::store::{GridLayer, GridStore};

/// Flood-fill distance map from one target cell.
#[derive(Clone, Debug)]
pub struct DistanceMap {
    width: usize,
    height: usize,
    /// Step counts from the target; -1 marks unreached cells.
    steps: Vec<i32>,
}

impl DistanceMap {
    /// Propagate step counts outward from `target`.
    ///
    /// Fails when the target lies outside the grid or on a wall cell; the
    /// caller is expected to fall back to Euclidean distance.
    pub fn propagate(store: &GridStore, target: GridCoord) -> Result<Self> {
        if !store.in_bounds(target) {
            return Err(NavError::Distance(format!(
                "target cell ({}, {}) is outside the grid",
                target.x, target.y
            )));
        }
        if store.cell_blocked(target, GridLayer::Wall) {
            return Err(NavError::Distance(format!(
                "target cell ({}, {}) is a wall cell",
                target.x, target.y
            )));
        }

        let width = store.width();
        let height = store.height();
        let mut steps = vec![-1i32; width * height];
        let mut queue = VecDeque::new();

        steps[target.y as usize * width + target.x as usize] = 0;
        queue.push_back(target);

        while let Some(current) = queue.pop_front() {
            let current_steps = steps[current.y as usize * width + current.x as usize];

            for neighbor in current.neighbors_4() {
                if !store.in_bounds(neighbor)
                    || store.cell_blocked(neighbor, GridLayer::Wall)
                {
                    continue;
                }
                let idx = neighbor.y as usize * width + neighbor.x as usize;
                if steps[idx] < 0 {
                    steps[idx] = current_steps + 1;
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(Self {
            width,
            height,
            steps,
        })
    }

    /// Step count from the target to `cell`, if the fill reached it.
    pub fn steps_at(&self, cell: GridCoord) -> Option<i32> {
        if cell.x < 0
            || cell.y < 0
            || cell.x as usize >= self.width
            || cell.y as usize >= self.height
        {
            return None;
        }
        let steps = self.steps[cell.y as usize * self.width + cell.x as usize];
        (steps >= 0).then_some(steps)
    }
}

/// Per-target cache of distance maps.
///
/// Failed propagations are cached too, so a blocked target is diagnosed
/// once instead of re-flooding the grid on every heuristic query.
#[derive(Debug, Default)]
pub struct DistanceCache {
    maps: HashMap<GridCoord, Option<DistanceMap>>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid-restricted distance in meters from `from` to `to`.
    pub fn distance(
        &mut self,
        store: &GridStore,
        from: WorldPoint,
        to: WorldPoint,
    ) -> Result<f32> {
        let target = store.world_to_cell(to);

        if !self.maps.contains_key(&target) {
            let map = match DistanceMap::propagate(store, target) {
                Ok(map) => Some(map),
                Err(e) => {
                    debug!("Distance propagation failed: {}", e);
                    None
                }
            };
            self.maps.insert(target, map);
        }

        let map = self.maps[&target].as_ref().ok_or_else(|| {
            NavError::Distance(format!(
                "no distance map for target cell ({}, {})",
                target.x, target.y
            ))
        })?;

        let from_cell = store.world_to_cell(from);
        let steps = map.steps_at(from_cell).ok_or_else(|| {
            NavError::Distance(format!(
                "cell ({}, {}) was not reached by the flood fill",
                from_cell.x, from_cell.y
            ))
        })?;

        Ok(steps as f32 * store.square_size())
    }

    /// Drop all cached maps (called at the start of each search).
    pub fn clear(&mut self) {
        self.maps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::walls::{discretize, WallSegment};

    fn corridor_store() -> GridStore {
        // Horizontal corridor between two walls, open interior
        let segments = [
            WallSegment::new(0.0, 0.0, 2.0, 0.0),
            WallSegment::new(0.0, 1.0, 2.0, 1.0),
        ];
        let points = discretize(&segments, 0.05);
        GridStore::build(&GridConfig::default(), &points).unwrap()
    }

    #[test]
    fn test_straight_distance_matches_euclidean() {
        let store = corridor_store();
        let mut cache = DistanceCache::new();

        let from = WorldPoint::new(0.2, 0.5);
        let to = WorldPoint::new(1.8, 0.5);
        let distance = cache.distance(&store, from, to).unwrap();

        // Same row, so the grid distance is the straight distance up to
        // cell quantization
        assert!((distance - 1.6).abs() < 0.05, "distance {}", distance);
    }

    #[test]
    fn test_blocked_target_is_error() {
        let store = corridor_store();
        let mut cache = DistanceCache::new();

        let from = WorldPoint::new(0.5, 0.5);
        let on_wall = WorldPoint::new(1.0, 0.0);
        assert!(cache.distance(&store, from, on_wall).is_err());

        let outside = WorldPoint::new(-1.0, 0.5);
        assert!(cache.distance(&store, from, outside).is_err());
    }

    #[test]
    fn test_unreached_cell_is_error() {
        let store = corridor_store();
        let mut cache = DistanceCache::new();

        // Query from inside the bottom wall band: the fill never enters walls
        let from = WorldPoint::new(1.0, 0.01);
        let to = WorldPoint::new(1.0, 0.5);
        assert!(cache.distance(&store, from, to).is_err());
    }

    #[test]
    fn test_cache_reuses_propagation() {
        let store = corridor_store();
        let mut cache = DistanceCache::new();

        let to = WorldPoint::new(1.5, 0.5);
        let a = cache
            .distance(&store, WorldPoint::new(0.3, 0.5), to)
            .unwrap();
        let b = cache
            .distance(&store, WorldPoint::new(0.3, 0.5), to)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.maps.len(), 1);
    }
}
