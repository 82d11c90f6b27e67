//! Configuration loading for MazeNav
//!
//! Every tunable constant of the navigation core lives here so that the
//! smoothing kernel, frontier score weights, steering envelope and the
//! heuristic de-weighting factor can be changed without touching code.

use crate::error::{NavError, Result};
use serde::Deserialize;
use std::f32::consts::PI;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize, Default)]
pub struct NavConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub exploration: ExplorationConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
}

/// Wall geometry source and session settings
#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    /// Path to the wall-list file (one segment per line: x1 y1 x2 y2)
    #[serde(default = "default_wall_file")]
    pub wall_file: String,

    /// Step length for discretizing wall segments into points (meters)
    #[serde(default = "default_discretization_step")]
    pub discretization_step: f32,

    /// Start pose used when driving an exploration session
    #[serde(default = "default_start_x")]
    pub start_x: f32,
    #[serde(default = "default_start_y")]
    pub start_y: f32,
    #[serde(default = "default_start_theta")]
    pub start_theta: f32,

    /// Maximum explore/plan cycles per session
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

/// Grid construction parameters
#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    /// Side length of a grid cell (meters)
    #[serde(default = "default_square_size")]
    pub square_size: f32,

    /// Minimum clearance radius around walls for the occupancy grid (meters)
    #[serde(default = "default_min_clearance")]
    pub min_clearance: f32,

    /// Wall inflation radius for the line-of-sight wall grid (meters)
    #[serde(default = "default_wall_thickness")]
    pub wall_thickness: f32,

    /// Gaussian smoothing kernel size in cells (forced odd)
    #[serde(default = "default_kernel_size")]
    pub smoothing_kernel_size: usize,

    /// Gaussian smoothing sigma in cells
    #[serde(default = "default_kernel_sigma")]
    pub smoothing_kernel_sigma: f32,
}

/// Frontier score weights (lower total score wins)
#[derive(Clone, Debug, Deserialize)]
pub struct FrontierWeights {
    /// Weight on the occupancy cost at the frontier cell
    #[serde(default = "default_occupancy_weight")]
    pub occupancy: f32,

    /// Weight on the explored fraction of the frontier neighborhood
    #[serde(default = "default_gain_weight")]
    pub gain: f32,

    /// Weight on the distance cost curve
    #[serde(default = "default_distance_weight")]
    pub distance: f32,

    /// Weight on the heading deviation term
    #[serde(default = "default_heading_weight")]
    pub heading: f32,

    /// Flat penalty added when the frontier is not visible from the robot
    #[serde(default = "default_hidden_penalty")]
    pub hidden_penalty: f32,
}

/// Field-of-view scanning and frontier selection parameters
#[derive(Clone, Debug, Deserialize)]
pub struct ExplorationConfig {
    /// Field-of-view width at full range (meters)
    #[serde(default = "default_window_width")]
    pub window_width: f32,

    /// Field-of-view forward range (meters)
    #[serde(default = "default_window_height")]
    pub window_height: f32,

    /// Angular spread of the scan fan (radians)
    #[serde(default = "default_angular_spread")]
    pub angular_spread: f32,

    /// Band at the field-of-view edge where frontier candidates form (meters)
    #[serde(default = "default_edge_band")]
    pub edge_band: f32,

    /// Minimum distance from the robot for frontier candidates (meters)
    #[serde(default = "default_min_scan_distance")]
    pub min_scan_distance: f32,

    /// Half-size of the unexplored-count window around a frontier (cells)
    #[serde(default = "default_frontier_window")]
    pub frontier_window: i32,

    /// Minimum unexplored cells in the window for a frontier to stay alive
    #[serde(default = "default_unexplored_threshold")]
    pub unexplored_threshold: usize,

    /// Occupancy below which a cell counts as free space
    #[serde(default = "default_free_space_threshold")]
    pub free_space_threshold: f32,

    #[serde(default)]
    pub weights: FrontierWeights,
}

/// Path search parameters
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    /// Integration time step for motion primitives (seconds, unit speed)
    #[serde(default = "default_time_step")]
    pub time_step: f32,

    /// Heuristic de-weighting constant K: priority = cost_to_come + cost_to_go / K
    #[serde(default = "default_heuristic_deweight")]
    pub heuristic_deweight: f32,

    /// Goal arrival tolerance radius (meters)
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f32,

    /// Angular velocity step between motion primitives (rad/s)
    #[serde(default = "default_steering_resolution")]
    pub steering_resolution: f32,

    /// Steering envelope limit while exploring (rad/s)
    #[serde(default = "default_steering_limit_exploring")]
    pub steering_limit_exploring: f32,

    /// Steering envelope limit otherwise (rad/s)
    #[serde(default = "default_steering_limit")]
    pub steering_limit: f32,

    /// Heading step between seeded start nodes (radians)
    #[serde(default = "default_start_heading_step")]
    pub start_heading_step: f32,

    /// Arc length and occupancy penalty for near-zero curvature primitives
    #[serde(default = "default_straight_arc_length")]
    pub straight_arc_length: f32,
    #[serde(default = "default_straight_penalty")]
    pub straight_penalty: f32,

    /// Arc length and penalty for moderate curvature primitives
    #[serde(default = "default_mid_arc_length")]
    pub mid_arc_length: f32,
    #[serde(default = "default_mid_penalty")]
    pub mid_penalty: f32,

    /// Arc length and penalty for primitives at the steering extremes
    #[serde(default = "default_sharp_arc_length")]
    pub sharp_arc_length: f32,
    #[serde(default = "default_sharp_penalty")]
    pub sharp_penalty: f32,

    /// Arc length scale applied while exploring
    #[serde(default = "default_exploring_scale")]
    pub exploring_scale: f32,

    /// Sampling density of the straight-line shortcut check (samples per meter)
    #[serde(default = "default_shortcut_samples_per_meter")]
    pub shortcut_samples_per_meter: f32,

    /// Integration time step for the synthesized shortcut segment (seconds)
    #[serde(default = "default_shortcut_time_step")]
    pub shortcut_time_step: f32,

    /// Occupancy penalty factor for the shortcut segment
    #[serde(default = "default_shortcut_penalty")]
    pub shortcut_penalty: f32,

    /// Maximum node expansions before giving up
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

/// Trajectory partitioning parameters
#[derive(Clone, Debug, Deserialize)]
pub struct TrajectoryConfig {
    /// Polyline samples per partition; a node polyline is split into
    /// max(len / partition_size, 1) chunks
    #[serde(default = "default_partition_size")]
    pub partition_size: usize,

    /// Waypoint speed for straight motion (m/s)
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,

    /// Speed reduction per unit of steering-envelope usage (m/s)
    #[serde(default = "default_speed_drop")]
    pub speed_drop: f32,
}

// Default value functions
fn default_wall_file() -> String {
    "maze_map.txt".to_string()
}
fn default_discretization_step() -> f32 {
    0.05
}
fn default_start_x() -> f32 {
    0.215
}
fn default_start_y() -> f32 {
    0.2
}
fn default_start_theta() -> f32 {
    PI / 2.0
}
fn default_max_cycles() -> usize {
    100
}

fn default_square_size() -> f32 {
    0.02
}
fn default_min_clearance() -> f32 {
    0.13
}
fn default_wall_thickness() -> f32 {
    0.03
}
fn default_kernel_size() -> usize {
    15
}
fn default_kernel_sigma() -> f32 {
    3.0
}

fn default_occupancy_weight() -> f32 {
    1.0
}
fn default_gain_weight() -> f32 {
    0.5
}
fn default_distance_weight() -> f32 {
    1.0
}
fn default_heading_weight() -> f32 {
    1.0
}
fn default_hidden_penalty() -> f32 {
    0.5
}

fn default_window_width() -> f32 {
    0.45
}
fn default_window_height() -> f32 {
    0.45
}
fn default_angular_spread() -> f32 {
    1.0
}
fn default_edge_band() -> f32 {
    0.04
}
fn default_min_scan_distance() -> f32 {
    0.1
}
fn default_frontier_window() -> i32 {
    4
}
fn default_unexplored_threshold() -> usize {
    20
}
fn default_free_space_threshold() -> f32 {
    0.6
}

fn default_time_step() -> f32 {
    0.05
}
fn default_heuristic_deweight() -> f32 {
    20.0
}
fn default_goal_tolerance() -> f32 {
    0.15
}
fn default_steering_resolution() -> f32 {
    PI / 2.0
}
fn default_steering_limit_exploring() -> f32 {
    PI / (8.0 * default_time_step())
}
fn default_steering_limit() -> f32 {
    PI / (10.0 * default_time_step())
}
fn default_start_heading_step() -> f32 {
    PI / 4.0
}
fn default_straight_arc_length() -> f32 {
    0.4
}
fn default_straight_penalty() -> f32 {
    0.3
}
fn default_mid_arc_length() -> f32 {
    0.3
}
fn default_mid_penalty() -> f32 {
    0.7
}
fn default_sharp_arc_length() -> f32 {
    0.25
}
fn default_sharp_penalty() -> f32 {
    1.0
}
fn default_exploring_scale() -> f32 {
    0.6
}
fn default_shortcut_samples_per_meter() -> f32 {
    200.0
}
fn default_shortcut_time_step() -> f32 {
    0.01
}
fn default_shortcut_penalty() -> f32 {
    0.4
}
fn default_max_expansions() -> usize {
    50_000
}

fn default_partition_size() -> usize {
    15
}
fn default_base_speed() -> f32 {
    0.15
}
fn default_speed_drop() -> f32 {
    0.05
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            wall_file: default_wall_file(),
            discretization_step: default_discretization_step(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            start_theta: default_start_theta(),
            max_cycles: default_max_cycles(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            square_size: default_square_size(),
            min_clearance: default_min_clearance(),
            wall_thickness: default_wall_thickness(),
            smoothing_kernel_size: default_kernel_size(),
            smoothing_kernel_sigma: default_kernel_sigma(),
        }
    }
}

impl Default for FrontierWeights {
    fn default() -> Self {
        Self {
            occupancy: default_occupancy_weight(),
            gain: default_gain_weight(),
            distance: default_distance_weight(),
            heading: default_heading_weight(),
            hidden_penalty: default_hidden_penalty(),
        }
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            angular_spread: default_angular_spread(),
            edge_band: default_edge_band(),
            min_scan_distance: default_min_scan_distance(),
            frontier_window: default_frontier_window(),
            unexplored_threshold: default_unexplored_threshold(),
            free_space_threshold: default_free_space_threshold(),
            weights: FrontierWeights::default(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            heuristic_deweight: default_heuristic_deweight(),
            goal_tolerance: default_goal_tolerance(),
            steering_resolution: default_steering_resolution(),
            steering_limit_exploring: default_steering_limit_exploring(),
            steering_limit: default_steering_limit(),
            start_heading_step: default_start_heading_step(),
            straight_arc_length: default_straight_arc_length(),
            straight_penalty: default_straight_penalty(),
            mid_arc_length: default_mid_arc_length(),
            mid_penalty: default_mid_penalty(),
            sharp_arc_length: default_sharp_arc_length(),
            sharp_penalty: default_sharp_penalty(),
            exploring_scale: default_exploring_scale(),
            shortcut_samples_per_meter: default_shortcut_samples_per_meter(),
            shortcut_time_step: default_shortcut_time_step(),
            shortcut_penalty: default_shortcut_penalty(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            partition_size: default_partition_size(),
            base_speed: default_base_speed(),
            speed_drop: default_speed_drop(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert!((config.grid.square_size - 0.02).abs() < 1e-6);
        assert_eq!(config.grid.smoothing_kernel_size, 15);
        assert!((config.planner.heuristic_deweight - 20.0).abs() < 1e-6);
        assert_eq!(config.trajectory.partition_size, 15);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml_str = r#"
            [grid]
            square_size = 0.05

            [planner]
            heuristic_deweight = 10.0
        "#;
        let config: NavConfig = toml::from_str(toml_str).unwrap();
        assert!((config.grid.square_size - 0.05).abs() < 1e-6);
        assert!((config.planner.heuristic_deweight - 10.0).abs() < 1e-6);
        // Untouched sections keep defaults
        assert!((config.exploration.window_width - 0.45).abs() < 1e-6);
        assert!((config.trajectory.base_speed - 0.15).abs() < 1e-6);
    }
}
