//! End-to-end scenarios through the navigation service.

use std::f32::consts::FRAC_PI_2;

use maze_nav::config::NavConfig;
use maze_nav::core::{Pose2D, WorldPoint};
use maze_nav::service::NavService;
use maze_nav::walls::{discretize, WallSegment};

fn room_points(side: f32) -> Vec<WorldPoint> {
    let segments = [
        WallSegment::new(0.0, 0.0, side, 0.0),
        WallSegment::new(side, 0.0, side, side),
        WallSegment::new(side, side, 0.0, side),
        WallSegment::new(0.0, side, 0.0, 0.0),
    ];
    discretize(&segments, 0.05)
}

#[test]
fn test_shortcut_plan_on_empty_grid() {
    // 2x2m grid with no walls in the way: a single far-corner point fixes
    // the extents
    let points = vec![WorldPoint::new(2.0, 2.0)];
    let mut service = NavService::new(NavConfig::default(), &points, None).unwrap();

    let start = Pose2D::new(0.0, 0.0, 0.0);
    let destination = WorldPoint::new(1.0, 1.0);
    let plan = service.plan_path(start, destination, false);

    assert!(plan.success);

    // The clear straight line is taken whole: one waypoint, one segment
    assert_eq!(plan.trajectory.len(), 1);
    assert_eq!(plan.path.len(), 1);

    let waypoint = &plan.trajectory[0];
    assert!(waypoint.pose.position().distance(&destination) < 0.02);
    assert!((waypoint.distance - 2.0f32.sqrt()).abs() < 0.02);
    assert!((waypoint.speed - 0.15).abs() < 1e-6);

    let segment = &plan.path[0];
    assert_eq!(segment.start.position(), start.position());
    assert_eq!(segment.end, waypoint.pose);

    let destination_pose = plan.destination_pose.unwrap();
    assert_eq!(destination_pose, waypoint.pose);
}

#[test]
fn test_plan_fails_for_enclosed_goal() {
    let mut segments = vec![
        WallSegment::new(0.0, 0.0, 2.0, 0.0),
        WallSegment::new(2.0, 0.0, 2.0, 2.0),
        WallSegment::new(2.0, 2.0, 0.0, 2.0),
        WallSegment::new(0.0, 2.0, 0.0, 0.0),
    ];
    // Seal the goal inside a box
    segments.extend([
        WallSegment::new(0.8, 0.8, 1.2, 0.8),
        WallSegment::new(1.2, 0.8, 1.2, 1.2),
        WallSegment::new(1.2, 1.2, 0.8, 1.2),
        WallSegment::new(0.8, 1.2, 0.8, 0.8),
    ]);
    let points = discretize(&segments, 0.05);

    let mut config = NavConfig::default();
    config.planner.max_expansions = 300;
    let mut service = NavService::new(config, &points, None).unwrap();

    let plan = service.plan_path(
        Pose2D::new(0.4, 0.4, 0.0),
        WorldPoint::new(1.0, 1.0),
        false,
    );

    assert!(!plan.success);
    assert!(plan.trajectory.is_empty());
    assert!(plan.path.is_empty());
    assert!(plan.destination_pose.is_none());
}

#[test]
fn test_explore_then_plan_to_frontier() {
    let points = room_points(2.0);
    let mut service = NavService::new(NavConfig::default(), &points, None).unwrap();

    let pose = Pose2D::new(1.0, 0.7, FRAC_PI_2);
    let explore = service.explore(pose, true);
    assert!(explore.success);
    let target = explore.frontier.expect("open room should yield a frontier");

    let plan = service.plan_path(pose, target, true);
    assert!(plan.success);

    let destination = plan.destination_pose.unwrap();
    assert!(destination.position().distance(&target) < 0.2);
}

#[test]
fn test_frontier_monotonicity_through_service() {
    let points = room_points(2.0);
    let mut service = NavService::new(NavConfig::default(), &points, None).unwrap();

    for i in 0..8 {
        let pose = Pose2D::new(1.0, 0.3 + i as f32 * 0.1, FRAC_PI_2);
        service.explore(pose, false);

        for frontier in service.engine().frontiers() {
            assert_ne!(service.engine().coverage_at(frontier.cell), 1);
        }
    }
}

#[test]
fn test_distance_queries_match_on_straight_corridor() {
    let segments = [
        WallSegment::new(0.0, 0.0, 2.0, 0.0),
        WallSegment::new(0.0, 1.0, 2.0, 1.0),
    ];
    let points = discretize(&segments, 0.05);
    let mut service = NavService::new(NavConfig::default(), &points, None).unwrap();

    let from = WorldPoint::new(0.3, 0.5);
    let to = WorldPoint::new(1.7, 0.5);
    let response = service.distance_to(from, to);
    assert!((response.distance - 1.4).abs() < 0.05);
}
