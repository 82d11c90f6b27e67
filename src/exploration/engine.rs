//! Frontier exploration engine.
//!
//! Owns the mutable exploration coverage grid and the retained frontier
//! set. Each `explore` request runs to completion as a fixed phase
//! sequence: update the retained frontiers against the new pose, sweep the
//! field of view, publish the coverage grid.

use tracing::debug;

use crate::config::ExplorationConfig;
use crate::core::{GridCoord, Pose2D, WorldPoint};
use crate::grid::GridStore;
use crate::stream::{FramePublisher, GridFrame, NavFrame};
use crate::utils::heading_diff;

use super::frontier::Frontier;

/// Coverage states of the exploration grid.
pub const UNKNOWN: i8 = 0;
pub const EXPLORED: i8 = 1;
pub const CLAIMED: i8 = -1;

/// Frontier exploration engine.
pub struct ExplorationEngine {
    config: ExplorationConfig,
    width: usize,
    height: usize,
    square_size: f32,
    /// Exploration coverage grid: 0 unknown, 1 explored, -1 claimed.
    coverage: Vec<i8>,
    /// Frontiers retained across scans.
    frontiers: Vec<Frontier>,
    publisher: Option<FramePublisher>,
}

impl ExplorationEngine {
    /// Create an engine sized to the grid store.
    pub fn new(
        store: &GridStore,
        config: ExplorationConfig,
        publisher: Option<FramePublisher>,
    ) -> Self {
        Self {
            config,
            width: store.width(),
            height: store.height(),
            square_size: store.square_size(),
            coverage: vec![UNKNOWN; store.width() * store.height()],
            frontiers: Vec::new(),
            publisher,
        }
    }

    /// Run one scan-and-update cycle from the given pose.
    pub fn explore(&mut self, store: &GridStore, pose: Pose2D) {
        self.update_existing(store, pose);
        self.scan_field_of_view(store, pose);

        // A scan can overrun a retained frontier's cell; those leave the set
        // before the request completes
        let coverage = &self.coverage;
        let width = self.width;
        self.frontiers
            .retain(|f| coverage[f.cell.y as usize * width + f.cell.x as usize] != EXPLORED);

        self.publish();
    }

    /// Lowest-score frontier over the full retained set, or `None` when
    /// exploration is complete.
    pub fn best_frontier(&self) -> Option<&Frontier> {
        let neighborhood = self.neighborhood_area();
        self.frontiers.iter().min_by(|a, b| {
            let sa = a.score(&self.config.weights, self.config.window_height, neighborhood);
            let sb = b.score(&self.config.weights, self.config.window_height, neighborhood);
            sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// All retained frontiers.
    pub fn frontiers(&self) -> &[Frontier] {
        &self.frontiers
    }

    /// Coverage state of a cell; out-of-bounds reads as explored.
    pub fn coverage_at(&self, cell: GridCoord) -> i8 {
        if !self.in_bounds(cell) {
            return EXPLORED;
        }
        self.coverage[cell.y as usize * self.width + cell.x as usize]
    }

    /// Whether the retained frontier set is empty.
    pub fn exploration_done(&self) -> bool {
        self.frontiers.is_empty()
    }

    /// Re-evaluate every retained frontier against the new pose.
    ///
    /// Frontiers whose cell has been explored or whose neighborhood lost
    /// too much unknown space are dropped; survivors get fresh distance,
    /// heading deviation and visibility. Removal filters into a new list so
    /// no element is skipped.
    fn update_existing(&mut self, store: &GridStore, pose: Pose2D) {
        let robot = pose.position();
        let before = self.frontiers.len();

        let mut retained = Vec::with_capacity(before);
        for mut frontier in std::mem::take(&mut self.frontiers) {
            if self.coverage_at(frontier.cell) == EXPLORED {
                continue;
            }
            let unexplored = self.count_unexplored(frontier.cell);
            if unexplored < self.config.unexplored_threshold {
                continue;
            }

            frontier.unexplored = unexplored;
            frontier.distance = robot.distance(&frontier.position);
            frontier.heading_diff = heading_diff(pose.theta, robot.angle_to(&frontier.position));
            frontier.visible = store.ray_clear(robot, frontier.position);
            retained.push(frontier);
        }

        if retained.len() < before {
            debug!("Dropped {} stale frontiers", before - retained.len());
        }
        self.frontiers = retained;
    }

    /// Sweep the field-of-view fan ahead of the pose.
    ///
    /// Visible interior cells are marked explored; visible cells in the
    /// edge band become frontier candidates when they sit in free space
    /// over a sufficiently unknown neighborhood. Cells behind walls stay
    /// unresolved.
    fn scan_field_of_view(&mut self, store: &GridStore, pose: Pose2D) {
        let step = self.square_size / 2.0;
        let robot = pose.position();
        let spread_tan = (self.config.angular_spread / 2.0).tan();
        let n_forward = (self.config.window_height / step).ceil() as i32;
        let mut created = 0usize;

        for j in 0..=n_forward {
            let forward = j as f32 * step;
            let half_width = (forward * spread_tan).min(self.config.window_width / 2.0);
            let n_lateral = (half_width / step).floor() as i32;

            for l in -n_lateral..=n_lateral {
                let lateral = l as f32 * step;
                let point = pose.offset(forward, lateral);
                let cell = self.cell_of(point);

                if !self.in_bounds(cell) || self.coverage_at(cell) == EXPLORED {
                    continue;
                }

                let distance = robot.distance(&point);
                if distance > self.config.min_scan_distance && !store.ray_clear(robot, point) {
                    // Blocked by a wall: leave unresolved
                    continue;
                }

                let on_edge = distance > self.config.min_scan_distance
                    && (self.config.window_height - forward <= self.config.edge_band
                        || half_width - lateral.abs() <= self.config.edge_band);

                if on_edge {
                    if self.coverage_at(cell) == UNKNOWN && self.try_claim_frontier(
                        store,
                        pose,
                        cell,
                        point,
                        distance,
                    ) {
                        created += 1;
                    }
                } else {
                    self.set_coverage(cell, EXPLORED);
                }
            }
        }

        if created > 0 {
            debug!(
                "Scan created {} frontiers ({} retained total)",
                created,
                self.frontiers.len()
            );
        }
    }

    /// Claim an edge-of-view cell as a frontier if it qualifies.
    fn try_claim_frontier(
        &mut self,
        store: &GridStore,
        pose: Pose2D,
        cell: GridCoord,
        point: WorldPoint,
        distance: f32,
    ) -> bool {
        let occupancy = store.occupancy_at(point.x, point.y);
        if occupancy >= self.config.free_space_threshold {
            return false;
        }

        let unexplored = self.count_unexplored(cell);
        if unexplored < self.config.unexplored_threshold {
            return false;
        }

        let robot = pose.position();
        self.frontiers.push(Frontier {
            cell,
            position: point,
            occupancy,
            heading_diff: heading_diff(pose.theta, robot.angle_to(&point)),
            distance,
            unexplored,
            visible: true,
        });
        self.set_coverage(cell, CLAIMED);
        true
    }

    /// Publish the coverage grid for visualization.
    fn publish(&self) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(NavFrame::ExplorationGrid(GridFrame {
                width: self.width,
                height: self.height,
                cells: self.coverage.iter().map(|&c| c as f32).collect(),
            }));
        }
    }

    /// Unknown cells in the window around `cell`.
    fn count_unexplored(&self, cell: GridCoord) -> usize {
        let r = self.config.frontier_window;
        let mut count = 0;
        for dy in -r..r {
            for dx in -r..r {
                let probe = GridCoord::new(cell.x + dx, cell.y + dy);
                if self.in_bounds(probe) && self.coverage_at(probe) == UNKNOWN {
                    count += 1;
                }
            }
        }
        count
    }

    fn neighborhood_area(&self) -> usize {
        let side = (2 * self.config.frontier_window).max(1) as usize;
        side * side
    }

    #[inline]
    fn cell_of(&self, point: WorldPoint) -> GridCoord {
        GridCoord::new(
            (point.x / self.square_size).floor() as i32,
            (point.y / self.square_size).floor() as i32,
        )
    }

    #[inline]
    fn in_bounds(&self, cell: GridCoord) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    fn set_coverage(&mut self, cell: GridCoord, state: i8) {
        if self.in_bounds(cell) {
            self.coverage[cell.y as usize * self.width + cell.x as usize] = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExplorationConfig, GridConfig};
    use crate::walls::{discretize, WallSegment};
    use std::f32::consts::FRAC_PI_2;

    fn open_room_store() -> GridStore {
        // 2x2m room bounded by walls
        let segments = [
            WallSegment::new(0.0, 0.0, 2.0, 0.0),
            WallSegment::new(2.0, 0.0, 2.0, 2.0),
            WallSegment::new(2.0, 2.0, 0.0, 2.0),
            WallSegment::new(0.0, 2.0, 0.0, 0.0),
        ];
        let points = discretize(&segments, 0.05);
        GridStore::build(&GridConfig::default(), &points).unwrap()
    }

    #[test]
    fn test_scan_marks_explored_and_creates_frontiers() {
        let store = open_room_store();
        let mut engine =
            ExplorationEngine::new(&store, ExplorationConfig::default(), None);

        let pose = Pose2D::new(1.0, 0.7, FRAC_PI_2);
        engine.explore(&store, pose);

        // A swath of cells ahead of the robot is explored
        let explored = (0..store.height() as i32)
            .flat_map(|y| (0..store.width() as i32).map(move |x| GridCoord::new(x, y)))
            .filter(|&c| engine.coverage_at(c) == EXPLORED)
            .count();
        assert!(explored > 50, "only {} cells explored", explored);

        // Frontier candidates appeared at the field-of-view edge
        assert!(!engine.exploration_done());
        assert!(engine.frontiers().iter().all(|f| f.visible));
    }

    #[test]
    fn test_frontier_set_monotonicity() {
        let store = open_room_store();
        let mut engine =
            ExplorationEngine::new(&store, ExplorationConfig::default(), None);

        // Sweep forward so earlier frontier cells get overrun by later scans
        for i in 0..8 {
            let pose = Pose2D::new(1.0, 0.3 + i as f32 * 0.1, FRAC_PI_2);
            engine.explore(&store, pose);
            for frontier in engine.frontiers() {
                assert_ne!(
                    engine.coverage_at(frontier.cell),
                    EXPLORED,
                    "explored cell still in retained frontier set"
                );
            }
        }
    }

    #[test]
    fn test_best_frontier_prefers_lowest_score() {
        let store = open_room_store();
        let mut engine =
            ExplorationEngine::new(&store, ExplorationConfig::default(), None);

        let pose = Pose2D::new(1.0, 0.7, FRAC_PI_2);
        engine.explore(&store, pose);

        if let Some(best) = engine.best_frontier() {
            let neighborhood = engine.neighborhood_area();
            let best_score = best.score(
                &engine.config.weights,
                engine.config.window_height,
                neighborhood,
            );
            for frontier in engine.frontiers() {
                let score = frontier.score(
                    &engine.config.weights,
                    engine.config.window_height,
                    neighborhood,
                );
                assert!(best_score <= score);
            }
        }
    }

    #[test]
    fn test_fresh_engine_is_done() {
        let store = open_room_store();
        let engine = ExplorationEngine::new(&store, ExplorationConfig::default(), None);
        assert!(engine.exploration_done());
        assert!(engine.best_frontier().is_none());
    }
}
