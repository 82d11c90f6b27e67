//! Best-first path search over kinematic motion primitives.
//!
//! Nodes live in an arena and reference their parents by index, so the
//! parent chain is acyclic by construction. The priority queue orders by
//! `cost_to_come + cost_to_go / K` where K > 1 de-weights the heuristic,
//! trading optimality for speed: this is a satisficing planner.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::f32::consts::PI;

use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::core::{Pose2D, WorldPoint};
use crate::grid::{DistanceCache, GridStore};
use crate::stream::{FramePublisher, NavFrame};
use crate::utils::normalize_angle;

/// A state in the search space.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Pose reached by this node's motion primitive.
    pub pose: Pose2D,
    /// Constant angular velocity of the primitive that reached it.
    pub angular_velocity: f32,
    /// Integrated pose polyline along the primitive.
    pub path: Vec<Pose2D>,
    /// Length of the primitive in meters.
    pub arc_length: f32,
    /// Accumulated cost from the start.
    pub cost_to_come: f32,
    /// Heuristic cost to the goal.
    pub cost_to_go: f32,
    /// Arena index of the parent; start nodes have none.
    pub parent: Option<usize>,
}

/// Result of a successful search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Node arena; parent links index into it.
    pub nodes: Vec<SearchNode>,
    /// Arena index of the node that reached the goal.
    pub goal: usize,
    /// Whether the goal node is a synthesized straight shortcut segment.
    pub via_shortcut: bool,
}

/// Open-set entry: explicit comparator bound to the queue, ordered by
/// priority with the arena index as a deterministic tie-break.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    id: usize,
    priority: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.priority == other.priority
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap on priority; earlier ids win ties
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An integrated motion primitive.
struct Primitive {
    path: Vec<Pose2D>,
    end: Pose2D,
    arc_length: f32,
    cost: f32,
}

/// Best-first search engine.
pub struct PathSearch<'a> {
    store: &'a GridStore,
    distance: &'a mut DistanceCache,
    config: &'a PlannerConfig,
    exploring: bool,
    publisher: Option<&'a FramePublisher>,
}

impl<'a> PathSearch<'a> {
    pub fn new(
        store: &'a GridStore,
        distance: &'a mut DistanceCache,
        config: &'a PlannerConfig,
        exploring: bool,
        publisher: Option<&'a FramePublisher>,
    ) -> Self {
        Self {
            store,
            distance,
            config,
            exploring,
            publisher,
        }
    }

    /// Search for a path from `start` to `goal`.
    ///
    /// Returns `None` when the open set empties or the expansion budget is
    /// exceeded without reaching the goal; the failure is reported, never
    /// retried internally.
    pub fn search(&mut self, start: Pose2D, goal: WorldPoint) -> Option<SearchOutcome> {
        let mut nodes: Vec<SearchNode> = Vec::new();
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        let mut dead: HashSet<(u32, u32, u32)> = HashSet::new();
        let tolerance_sq = self.config.goal_tolerance * self.config.goal_tolerance;

        // Seed start nodes across a full rotation so the search is not
        // locked into the robot's instantaneous heading
        let heading_steps = (2.0 * PI / self.config.start_heading_step).round() as usize;
        for k in 0..heading_steps {
            let theta = start.theta - PI + k as f32 * self.config.start_heading_step;
            let pose = Pose2D::new(start.x, start.y, theta);
            let cost_to_go = self.heuristic(pose.position(), goal);
            let id = nodes.len();
            nodes.push(SearchNode {
                pose,
                angular_velocity: 0.0,
                path: vec![pose],
                arc_length: 0.0,
                cost_to_come: 0.0,
                cost_to_go,
                parent: None,
            });
            open.push(OpenEntry {
                id,
                priority: cost_to_go / self.config.heuristic_deweight,
            });
        }

        let steering_limit = if self.exploring {
            self.config.steering_limit_exploring
        } else {
            self.config.steering_limit
        };

        let mut expansions = 0usize;

        loop {
            let current = match open.peek() {
                Some(entry) => entry.id,
                None => {
                    warn!("Path search exhausted the open set without reaching the goal");
                    return None;
                }
            };

            // Dominant fast path: a clear straight line to the goal ends
            // the search immediately
            if let Some(mut direct) = self.shortcut(&nodes[current], goal) {
                direct.parent = Some(current);
                let goal_id = nodes.len();
                nodes.push(direct);
                debug!(
                    "Shortcut to goal after {} expansions, {} nodes",
                    expansions,
                    nodes.len()
                );
                return Some(SearchOutcome {
                    nodes,
                    goal: goal_id,
                    via_shortcut: true,
                });
            }

            if nodes[current].pose.position().distance_squared(&goal) < tolerance_sq {
                debug!(
                    "Goal reached after {} expansions, {} nodes",
                    expansions,
                    nodes.len()
                );
                return Some(SearchOutcome {
                    nodes,
                    goal: current,
                    via_shortcut: false,
                });
            }

            open.pop();
            dead.insert(pose_key(nodes[current].pose));

            expansions += 1;
            if expansions > self.config.max_expansions {
                warn!(
                    "Path search exceeded {} expansions without reaching the goal",
                    self.config.max_expansions
                );
                return None;
            }

            let parent_pose = nodes[current].pose;
            let parent_cost = nodes[current].cost_to_come;

            let mut angular_velocity = -steering_limit;
            while angular_velocity <= steering_limit + 1e-6 {
                if let Some(primitive) =
                    self.integrate_primitive(parent_pose, angular_velocity, goal, tolerance_sq)
                {
                    let key = pose_key(primitive.end);
                    if !dead.contains(&key) {
                        if let Some(publisher) = self.publisher {
                            publisher.publish(NavFrame::CandidatePath(
                                primitive.path.iter().map(|p| p.position()).collect(),
                            ));
                        }

                        let cost_to_go = self.heuristic(primitive.end.position(), goal);
                        let cost_to_come = parent_cost + primitive.cost;
                        let id = nodes.len();
                        nodes.push(SearchNode {
                            pose: primitive.end,
                            angular_velocity,
                            path: primitive.path,
                            arc_length: primitive.arc_length,
                            cost_to_come,
                            cost_to_go,
                            parent: Some(current),
                        });
                        open.push(OpenEntry {
                            id,
                            priority: cost_to_come + cost_to_go / self.config.heuristic_deweight,
                        });
                    }
                }
                angular_velocity += self.config.steering_resolution;
            }
        }
    }

    /// Heuristic cost to the goal: grid-restricted distance when the flood
    /// fill succeeds, else straight-line distance.
    fn heuristic(&mut self, from: WorldPoint, goal: WorldPoint) -> f32 {
        match self.distance.distance(self.store, from, goal) {
            Ok(d) => d,
            Err(_) => from.distance(&goal),
        }
    }

    /// Arc length and occupancy penalty for a steering choice.
    ///
    /// Primitives near zero curvature integrate the longest arc at the
    /// lowest penalty; the steering extremes get the shortest arc at full
    /// penalty.
    fn classify_steering(&self, angular_velocity: f32) -> (f32, f32) {
        let scale = if self.exploring {
            self.config.exploring_scale
        } else {
            1.0
        };
        let usage = angular_velocity.abs() / self.config.steering_resolution;

        if angular_velocity.abs() < 0.1 {
            (
                self.config.straight_penalty,
                self.config.straight_arc_length * scale,
            )
        } else if usage <= 2.0 + 1e-3 {
            (self.config.mid_penalty, self.config.mid_arc_length * scale)
        } else {
            (
                self.config.sharp_penalty,
                self.config.sharp_arc_length * scale,
            )
        }
    }

    /// Integrate one constant-curvature primitive forward at unit speed.
    ///
    /// Rejects the whole primitive on the first occupied sample (a failed
    /// or out-of-bounds occupancy lookup reads as occupied); truncates and
    /// accepts as soon as a sample lands within the goal tolerance.
    fn integrate_primitive(
        &self,
        from: Pose2D,
        angular_velocity: f32,
        goal: WorldPoint,
        tolerance_sq: f32,
    ) -> Option<Primitive> {
        let (penalty, arc_length) = self.classify_steering(angular_velocity);
        let dt = self.config.time_step;

        let mut x = from.x;
        let mut y = from.y;
        let mut theta = from.theta;
        let mut t = 0.0;
        let mut occupancy_integral = 0.0;
        let mut path = Vec::with_capacity((arc_length / dt) as usize + 1);

        while t < arc_length {
            x += theta.cos() * dt;
            y += theta.sin() * dt;
            theta += angular_velocity * dt;
            t += dt;

            let occupancy = self.store.occupancy_at(x, y);
            if occupancy >= 1.0 {
                return None;
            }
            occupancy_integral += occupancy * dt;
            path.push(Pose2D::new(x, y, theta));

            let dx = x - goal.x;
            let dy = y - goal.y;
            if dx * dx + dy * dy < tolerance_sq {
                break;
            }
        }

        let end = *path.last()?;
        Some(Primitive {
            path,
            end,
            arc_length: t,
            cost: occupancy_integral * penalty,
        })
    }

    /// Straight-line shortcut check and terminal segment synthesis.
    ///
    /// Samples the line from the node to the goal at a resolution
    /// proportional to distance; when every sample is unoccupied, the whole
    /// segment is integrated as a zero-curvature terminal node.
    fn shortcut(&self, node: &SearchNode, goal: WorldPoint) -> Option<SearchNode> {
        let from = node.pose.position();
        let dx = goal.x - from.x;
        let dy = goal.y - from.y;
        let span = dx.abs().max(dy.abs());
        let samples = (self.config.shortcut_samples_per_meter * span).floor() as i32;

        for i in 1..=samples {
            let f = i as f32 / samples as f32;
            if self.store.occupancy_at(from.x + dx * f, from.y + dy * f) >= 1.0 {
                return None;
            }
        }

        let length = (dx * dx + dy * dy).sqrt();
        let theta = normalize_angle(dy.atan2(dx));
        let dt = self.config.shortcut_time_step;

        let mut x = from.x;
        let mut y = from.y;
        let mut t = 0.0;
        let mut occupancy_integral = 0.0;
        let mut path = Vec::with_capacity((length / dt) as usize + 1);

        while t < length {
            x += theta.cos() * dt;
            y += theta.sin() * dt;
            t += dt;
            occupancy_integral += self.store.occupancy_at(x, y) * dt;
            path.push(Pose2D::new(x, y, theta));
        }
        if path.is_empty() {
            path.push(Pose2D::new(goal.x, goal.y, theta));
        }

        let end = *path.last()?;
        Some(SearchNode {
            pose: end,
            angular_velocity: 0.0,
            path,
            arc_length: length,
            cost_to_come: node.cost_to_come + occupancy_integral * self.config.shortcut_penalty,
            cost_to_go: 0.0,
            parent: None,
        })
    }
}

/// Exact-identity key for duplicate suppression.
#[inline]
fn pose_key(pose: Pose2D) -> (u32, u32, u32) {
    (pose.x.to_bits(), pose.y.to_bits(), pose.theta.to_bits())
}
