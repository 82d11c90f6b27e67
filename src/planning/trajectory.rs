//! Trajectory partitioning.
//!
//! Converts a search outcome's parent chain into a forward-walkable
//! trajectory: every expanded primitive's polyline is split into evenly
//! sized chunks so downstream consumers get regular waypoints, and each
//! boundary between consecutive waypoints is classified as a line or an
//! arc with its curvature radius.

use crate::config::TrajectoryConfig;
use crate::core::Pose2D;
use crate::utils::normalize_angle;

use super::search::SearchOutcome;

/// Heading changes below this count as straight motion.
const LINE_EPSILON: f32 = 1e-6;

/// One waypoint of the partitioned trajectory.
#[derive(Clone, Debug)]
pub struct TrajectoryPoint {
    /// Pose at the end of this partition.
    pub pose: Pose2D,
    /// Target speed, reduced with steering-envelope usage (m/s).
    pub speed: f32,
    /// Distance covered by this partition (meters).
    pub distance: f32,
}

/// One segment between consecutive waypoints.
#[derive(Clone, Debug)]
pub struct TrajectorySegment {
    pub start: Pose2D,
    pub end: Pose2D,
    /// True when the heading does not change over the segment.
    pub is_line: bool,
    /// Signed curvature radius `chord / (2 sin(Δθ/2))`; 0 for lines.
    pub curve_radius: f32,
}

/// A partitioned, forward-ordered trajectory.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub waypoints: Vec<TrajectoryPoint>,
    pub segments: Vec<TrajectorySegment>,
    /// Pose at the end of the trajectory.
    pub destination: Pose2D,
}

/// Partition a search outcome into a trajectory.
///
/// The parent chain is walked from the goal node back to its start node and
/// reversed into forward order. Expanded primitives are split into
/// `max(polyline_len / partition_size, 1)` chunks; a synthesized shortcut
/// terminal node is appended whole.
pub fn partition(
    outcome: &SearchOutcome,
    config: &TrajectoryConfig,
    steering_resolution: f32,
) -> Trajectory {
    let mut chain = Vec::new();
    let mut current = Some(outcome.goal);
    while let Some(id) = current {
        chain.push(id);
        current = outcome.nodes[id].parent;
    }
    chain.reverse();

    let start_pose = outcome.nodes[chain[0]].pose;
    let mut waypoints = Vec::new();

    for &id in chain.iter().skip(1) {
        let node = &outcome.nodes[id];
        if node.path.is_empty() {
            continue;
        }

        let is_terminal_shortcut = outcome.via_shortcut && id == outcome.goal;
        let chunks = if is_terminal_shortcut {
            1
        } else {
            (node.path.len() / config.partition_size).max(1)
        };

        let usage = node.angular_velocity.abs() / steering_resolution;
        let speed = config.base_speed - config.speed_drop * usage;
        let share = node.arc_length / chunks as f32;
        let chunk_len = node.path.len() / chunks;

        for c in 0..chunks {
            let end_index = if c + 1 == chunks {
                node.path.len() - 1
            } else {
                (c + 1) * chunk_len - 1
            };
            waypoints.push(TrajectoryPoint {
                pose: node.path[end_index],
                speed,
                distance: share,
            });
        }
    }

    let mut segments = Vec::with_capacity(waypoints.len());
    let mut previous = start_pose;
    for waypoint in &waypoints {
        segments.push(make_segment(previous, waypoint.pose));
        previous = waypoint.pose;
    }

    let destination = waypoints.last().map(|w| w.pose).unwrap_or(start_pose);

    Trajectory {
        waypoints,
        segments,
        destination,
    }
}

/// Classify the segment between two poses as a line or an arc.
fn make_segment(start: Pose2D, end: Pose2D) -> TrajectorySegment {
    let delta = normalize_angle(end.theta - start.theta);

    if delta.abs() < LINE_EPSILON {
        TrajectorySegment {
            start,
            end,
            is_line: true,
            curve_radius: 0.0,
        }
    } else {
        let chord = start.position().distance(&end.position());
        TrajectorySegment {
            start,
            end,
            is_line: false,
            curve_radius: chord / (2.0 * (delta / 2.0).sin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::search::{SearchNode, SearchOutcome};

    fn straight_polyline(n: usize, step: f32) -> Vec<Pose2D> {
        (1..=n)
            .map(|i| Pose2D::new(i as f32 * step, 0.0, 0.0))
            .collect()
    }

    fn outcome_with_polyline(path: Vec<Pose2D>, via_shortcut: bool) -> SearchOutcome {
        let start = SearchNode {
            pose: Pose2D::new(0.0, 0.0, 0.0),
            angular_velocity: 0.0,
            path: vec![Pose2D::new(0.0, 0.0, 0.0)],
            arc_length: 0.0,
            cost_to_come: 0.0,
            cost_to_go: 1.0,
            parent: None,
        };
        let end_pose = *path.last().unwrap();
        let arc_length = path.len() as f32 * 0.05;
        let node = SearchNode {
            pose: end_pose,
            angular_velocity: 0.0,
            path,
            arc_length,
            cost_to_come: 0.0,
            cost_to_go: 0.0,
            parent: Some(0),
        };
        SearchOutcome {
            nodes: vec![start, node],
            goal: 1,
            via_shortcut,
        }
    }

    #[test]
    fn test_partition_count_scales_with_length() {
        let outcome = outcome_with_polyline(straight_polyline(150, 0.05), false);
        let trajectory = partition(&outcome, &TrajectoryConfig::default(), 1.0);
        // 150 samples / 15 per partition = 10 waypoints
        assert_eq!(trajectory.waypoints.len(), 10);

        let short = outcome_with_polyline(straight_polyline(4, 0.05), false);
        let trajectory = partition(&short, &TrajectoryConfig::default(), 1.0);
        assert_eq!(trajectory.waypoints.len(), 1);
    }

    #[test]
    fn test_partition_preserves_endpoints() {
        let path = straight_polyline(100, 0.05);
        let end_pose = *path.last().unwrap();
        let outcome = outcome_with_polyline(path, false);
        let trajectory = partition(&outcome, &TrajectoryConfig::default(), 1.0);

        let first = trajectory.segments.first().unwrap();
        assert_eq!(first.start, Pose2D::new(0.0, 0.0, 0.0));
        let last = trajectory.segments.last().unwrap();
        assert_eq!(last.end, end_pose);
        assert_eq!(trajectory.destination, end_pose);

        // Segments chain without gaps
        for pair in trajectory.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_shortcut_node_is_not_partitioned() {
        let outcome = outcome_with_polyline(straight_polyline(150, 0.05), true);
        let trajectory = partition(&outcome, &TrajectoryConfig::default(), 1.0);
        assert_eq!(trajectory.waypoints.len(), 1);
        let waypoint = &trajectory.waypoints[0];
        assert!((waypoint.distance - 150.0 * 0.05).abs() < 1e-4);
        assert!((waypoint.speed - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_zero_heading_change_is_line() {
        let segment = make_segment(
            Pose2D::new(0.0, 0.0, 0.5),
            Pose2D::new(1.0, 0.0, 0.5),
        );
        assert!(segment.is_line);
        assert_eq!(segment.curve_radius, 0.0);
    }

    #[test]
    fn test_curvature_radius_formula() {
        use std::f32::consts::FRAC_PI_2;

        // Quarter circle of radius 1: chord sqrt(2), heading change pi/2
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let end = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let segment = make_segment(start, end);

        assert!(!segment.is_line);
        let chord = 2.0f32.sqrt();
        let expected = chord / (2.0 * (FRAC_PI_2 / 2.0).sin());
        assert!((segment.curve_radius - expected).abs() < 1e-5);
        assert!((segment.curve_radius - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_negative_heading_change_signs_radius() {
        use std::f32::consts::FRAC_PI_2;

        let start = Pose2D::new(0.0, 0.0, 0.0);
        let end = Pose2D::new(1.0, -1.0, -FRAC_PI_2);
        let segment = make_segment(start, end);
        assert!(segment.curve_radius < 0.0);
    }

    #[test]
    fn test_speed_drops_with_steering_usage() {
        let mut outcome = outcome_with_polyline(straight_polyline(30, 0.05), false);
        outcome.nodes[1].angular_velocity = 2.0;
        let trajectory = partition(&outcome, &TrajectoryConfig::default(), 1.0);
        // usage = |2.0| / 1.0 -> speed = 0.15 - 0.05 * 2
        assert!((trajectory.waypoints[0].speed - 0.05).abs() < 1e-6);
    }
}
