//! Navigation service façade and request loop.
//!
//! `NavService` owns all mutable navigation state (grids, distance cache,
//! exploration engine) and exposes the five externally callable operations.
//! The `serve` loop processes one request to completion at a time, so every
//! request holds exclusive access to the mutable state for its duration; no
//! two scans or plans ever interleave.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::NavConfig;
use crate::core::{Pose2D, WorldPoint};
use crate::error::Result;
use crate::exploration::ExplorationEngine;
use crate::grid::{DistanceCache, GridStore};
use crate::planning::{partition, PathSearch, Trajectory, TrajectoryPoint, TrajectorySegment};
use crate::stream::{FramePublisher, GridFrame, NavFrame};

/// Response to an occupancy query.
#[derive(Clone, Copy, Debug)]
pub struct IsOccupiedResponse {
    /// Occupancy in [0, 1]; 1.0 outside the grid.
    pub occupancy: f32,
}

/// Response to a distance query.
#[derive(Clone, Copy, Debug)]
pub struct DistanceToResponse {
    /// Grid-restricted distance, or straight-line distance on fallback.
    pub distance: f32,
}

/// Response to an exploration scan request.
#[derive(Clone, Copy, Debug)]
pub struct ExploreResponse {
    pub success: bool,
    /// Best frontier position, when requested.
    pub frontier: Option<WorldPoint>,
}

/// Response to a frontier query.
#[derive(Clone, Copy, Debug)]
pub struct GetFrontierResponse {
    pub frontier_pose: Option<WorldPoint>,
    /// True when the retained frontier set is empty.
    pub exploration_done: bool,
    pub success: bool,
}

/// Response to a path planning request.
#[derive(Clone, Debug)]
pub struct PlanPathResponse {
    /// Partitioned waypoints in forward order.
    pub trajectory: Vec<TrajectoryPoint>,
    /// Line/arc segments between consecutive waypoints.
    pub path: Vec<TrajectorySegment>,
    /// Pose at the end of the trajectory.
    pub destination_pose: Option<Pose2D>,
    pub success: bool,
}

impl PlanPathResponse {
    fn failure() -> Self {
        Self {
            trajectory: Vec::new(),
            path: Vec::new(),
            destination_pose: None,
            success: false,
        }
    }
}

/// One navigation request with its reply channel.
#[derive(Debug)]
pub enum NavRequest {
    IsOccupied {
        x: f32,
        y: f32,
        reply: Sender<IsOccupiedResponse>,
    },
    DistanceTo {
        from: WorldPoint,
        to: WorldPoint,
        reply: Sender<DistanceToResponse>,
    },
    Explore {
        pose: Pose2D,
        get_frontier: bool,
        reply: Sender<ExploreResponse>,
    },
    GetFrontier {
        reply: Sender<GetFrontierResponse>,
    },
    PlanPath {
        robot_pose: Pose2D,
        destination: WorldPoint,
        exploring: bool,
        reply: Sender<PlanPathResponse>,
    },
}

/// The navigation core behind the request/response surface.
pub struct NavService {
    config: NavConfig,
    store: GridStore,
    distance: DistanceCache,
    engine: ExplorationEngine,
    publisher: Option<FramePublisher>,
}

impl NavService {
    /// Build the service from wall points.
    ///
    /// Grid construction happens here, so no query can observe an unbuilt
    /// store; callers block until wall points exist before constructing.
    pub fn new(
        config: NavConfig,
        wall_points: &[WorldPoint],
        publisher: Option<FramePublisher>,
    ) -> Result<Self> {
        let store = GridStore::build(&config.grid, wall_points)?;
        let engine =
            ExplorationEngine::new(&store, config.exploration.clone(), publisher.clone());

        let service = Self {
            config,
            store,
            distance: DistanceCache::new(),
            engine,
            publisher,
        };
        service.publish_grids();
        Ok(service)
    }

    /// The grid store (read-only after build).
    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// The exploration engine.
    pub fn engine(&self) -> &ExplorationEngine {
        &self.engine
    }

    /// Occupancy at a continuous coordinate; total over all inputs.
    pub fn is_occupied(&self, x: f32, y: f32) -> IsOccupiedResponse {
        IsOccupiedResponse {
            occupancy: self.store.occupancy_at(x, y),
        }
    }

    /// Grid-restricted shortest distance, falling back to straight-line
    /// distance when the flood fill fails.
    pub fn distance_to(&mut self, from: WorldPoint, to: WorldPoint) -> DistanceToResponse {
        let distance = match self.distance.distance(&self.store, from, to) {
            Ok(d) => d,
            Err(e) => {
                debug!("Falling back to Euclidean distance: {}", e);
                from.distance(&to)
            }
        };
        DistanceToResponse { distance }
    }

    /// Run one scan-and-update cycle from the given pose.
    pub fn explore(&mut self, pose: Pose2D, get_frontier: bool) -> ExploreResponse {
        self.engine.explore(&self.store, pose);
        let frontier = if get_frontier {
            self.engine.best_frontier().map(|f| f.position)
        } else {
            None
        };
        ExploreResponse {
            success: true,
            frontier,
        }
    }

    /// Best frontier over the retained set, or exploration-complete.
    pub fn get_frontier(&self) -> GetFrontierResponse {
        match self.engine.best_frontier() {
            Some(frontier) => GetFrontierResponse {
                frontier_pose: Some(frontier.position),
                exploration_done: false,
                success: true,
            },
            None => GetFrontierResponse {
                frontier_pose: None,
                exploration_done: true,
                success: true,
            },
        }
    }

    /// Plan a trajectory from the robot pose to the destination.
    pub fn plan_path(
        &mut self,
        robot_pose: Pose2D,
        destination: WorldPoint,
        exploring: bool,
    ) -> PlanPathResponse {
        // The distance cache is per search: heuristic lookups for one goal
        // are shared, stale goals are not
        self.distance.clear();

        let mut search = PathSearch::new(
            &self.store,
            &mut self.distance,
            &self.config.planner,
            exploring,
            self.publisher.as_ref(),
        );

        let outcome = match search.search(robot_pose, destination) {
            Some(outcome) => outcome,
            None => {
                warn!(
                    "No path from ({:.2}, {:.2}) to ({:.2}, {:.2})",
                    robot_pose.x, robot_pose.y, destination.x, destination.y
                );
                return PlanPathResponse::failure();
            }
        };

        let Trajectory {
            waypoints,
            segments,
            destination: destination_pose,
        } = partition(
            &outcome,
            &self.config.trajectory,
            self.config.planner.steering_resolution,
        );

        if let Some(publisher) = &self.publisher {
            publisher.publish(NavFrame::Trajectory(waypoints.clone()));
        }

        info!(
            "Planned {} waypoints to ({:.2}, {:.2}){}",
            waypoints.len(),
            destination.x,
            destination.y,
            if outcome.via_shortcut {
                " via shortcut"
            } else {
                ""
            }
        );

        PlanPathResponse {
            trajectory: waypoints,
            path: segments,
            destination_pose: Some(destination_pose),
            success: true,
        }
    }

    /// Process requests to completion, one at a time, until the channel
    /// disconnects. Replies to dropped requesters are discarded.
    pub fn serve(&mut self, requests: Receiver<NavRequest>) {
        info!("Navigation service loop started");
        for request in requests {
            match request {
                NavRequest::IsOccupied { x, y, reply } => {
                    let _ = reply.send(self.is_occupied(x, y));
                }
                NavRequest::DistanceTo { from, to, reply } => {
                    let _ = reply.send(self.distance_to(from, to));
                }
                NavRequest::Explore {
                    pose,
                    get_frontier,
                    reply,
                } => {
                    let _ = reply.send(self.explore(pose, get_frontier));
                }
                NavRequest::GetFrontier { reply } => {
                    let _ = reply.send(self.get_frontier());
                }
                NavRequest::PlanPath {
                    robot_pose,
                    destination,
                    exploring,
                    reply,
                } => {
                    let _ = reply.send(self.plan_path(robot_pose, destination, exploring));
                }
            }
        }
        info!("Navigation service loop exited");
    }

    /// Publish the static grids once after build.
    fn publish_grids(&self) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(NavFrame::OccupancyGrid(GridFrame {
                width: self.store.width(),
                height: self.store.height(),
                cells: self.store.occupancy_cells().to_vec(),
            }));
            publisher.publish(NavFrame::WallGrid(GridFrame {
                width: self.store.width(),
                height: self.store.height(),
                cells: self
                    .store
                    .wall_cells()
                    .iter()
                    .map(|&w| if w { 1.0 } else { 0.0 })
                    .collect(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walls::{discretize, WallSegment};

    fn room_service() -> NavService {
        let segments = [
            WallSegment::new(0.0, 0.0, 2.0, 0.0),
            WallSegment::new(2.0, 0.0, 2.0, 2.0),
            WallSegment::new(2.0, 2.0, 0.0, 2.0),
            WallSegment::new(0.0, 2.0, 0.0, 0.0),
        ];
        let points = discretize(&segments, 0.05);
        NavService::new(NavConfig::default(), &points, None).unwrap()
    }

    #[test]
    fn test_is_occupied_is_total() {
        let service = room_service();
        for (x, y) in [(1.0, 1.0), (-5.0, 1.0), (1.0, 99.0), (0.0, 0.0)] {
            let response = service.is_occupied(x, y);
            assert!((0.0..=1.0).contains(&response.occupancy));
        }
        assert_eq!(service.is_occupied(-5.0, 1.0).occupancy, 1.0);
    }

    #[test]
    fn test_distance_to_falls_back_to_euclidean() {
        let mut service = room_service();
        let from = WorldPoint::new(0.5, 0.5);
        let outside = WorldPoint::new(-3.5, 3.5);
        let response = service.distance_to(from, outside);
        assert!((response.distance - from.distance(&outside)).abs() < 1e-4);
    }

    #[test]
    fn test_get_frontier_before_any_scan() {
        let service = room_service();
        let response = service.get_frontier();
        assert!(response.success);
        assert!(response.exploration_done);
        assert!(response.frontier_pose.is_none());
    }

    #[test]
    fn test_explore_then_frontier() {
        let mut service = room_service();
        let response = service.explore(
            Pose2D::new(1.0, 0.7, std::f32::consts::FRAC_PI_2),
            true,
        );
        assert!(response.success);
        assert!(response.frontier.is_some());

        let frontier = service.get_frontier();
        assert!(!frontier.exploration_done);
        assert_eq!(frontier.frontier_pose, response.frontier);
    }

    #[test]
    fn test_serve_loop_round_trip() {
        use crossbeam_channel::{bounded, unbounded};

        let mut service = room_service();
        let (tx, rx) = unbounded();

        let handle = std::thread::spawn(move || {
            service.serve(rx);
            service
        });

        let (reply_tx, reply_rx) = bounded(1);
        tx.send(NavRequest::IsOccupied {
            x: -1.0,
            y: 0.0,
            reply: reply_tx,
        })
        .unwrap();
        let response = reply_rx.recv().unwrap();
        assert_eq!(response.occupancy, 1.0);

        drop(tx);
        handle.join().unwrap();
    }
}
