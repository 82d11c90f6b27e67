//! Grid store: smoothed occupancy grid and line-of-sight wall grid.
//!
//! Both grids are built once from discretized wall points and are immutable
//! afterwards. The occupancy grid carries a continuous cost in [0, 1] built
//! by radial inflation and Gaussian smoothing; the wall grid is a thin
//! binary inflation used only for ray casting.

use tracing::{debug, info, warn};

use crate::config::GridConfig;
use crate::core::{GridCoord, WorldPoint};
use crate::error::{NavError, Result};

/// Occupancy values below this snap to exactly 0.0 on queries.
const OCCUPANCY_SNAP: f32 = 1e-4;

/// Which grid a cell-state query addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridLayer {
    /// The smoothed, clearance-inflated occupancy grid.
    Occupancy,
    /// The thin binary wall grid used for line-of-sight checks.
    Wall,
}

/// Dense 2D cost grids over a shared cell indexing.
#[derive(Clone, Debug)]
pub struct GridStore {
    width: usize,
    height: usize,
    square_size: f32,
    /// Smoothed occupancy cost per cell, row-major, walls clamped to 1.0.
    occupancy: Vec<f32>,
    /// Clearance-inflated binary wall mask (pre-smoothing).
    inflated: Vec<bool>,
    /// Thin binary wall mask for ray casting.
    walls: Vec<bool>,
}

impl GridStore {
    /// Build both grids from wall points.
    ///
    /// Extents are computed from the bounding box of the points; the maze is
    /// assumed to live in the positive quadrant. Building is deterministic,
    /// so rebuilding from the same points yields the same grids.
    pub fn build(config: &GridConfig, points: &[WorldPoint]) -> Result<Self> {
        if points.is_empty() {
            return Err(NavError::WallGeometry(
                "cannot build grids from an empty wall point set".to_string(),
            ));
        }

        let square = config.square_size;
        if square <= 0.0 {
            return Err(NavError::Config(format!(
                "grid square size must be positive, got {}",
                square
            )));
        }

        let x_max = points.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let y_max = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        if x_max <= 0.0 || y_max <= 0.0 {
            return Err(NavError::WallGeometry(format!(
                "wall extents must be positive, got ({}, {})",
                x_max, y_max
            )));
        }

        let width = (x_max / square).ceil() as usize;
        let height = (y_max / square).ceil() as usize;
        debug!("Grid extents: {}x{} cells at {}m", width, height, square);

        let mut kernel_size = config.smoothing_kernel_size;
        if kernel_size % 2 == 0 {
            kernel_size += 1;
            warn!(
                "Entered kernel size is even number, changing to: {}",
                kernel_size
            );
        }

        let clearance_cells = (config.min_clearance / square).ceil() as i32;
        let wall_cells = (config.wall_thickness / square).ceil() as i32;

        let mut inflated = vec![false; width * height];
        let mut walls = vec![false; width * height];

        for point in points {
            let cell = GridCoord::new(
                (point.x / square).floor() as i32,
                (point.y / square).floor() as i32,
            );
            stamp_disc(&mut inflated, width, height, cell, clearance_cells);
            stamp_disc(&mut walls, width, height, cell, wall_cells);
        }

        // Smooth the binary inflated mask, normalize to [0, 1], then clamp
        // every binary wall cell back to exactly 1.0: smoothing must never
        // lower a true wall's occupancy.
        let binary: Vec<f32> = inflated.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        let mut occupancy = gaussian_smooth(
            &binary,
            width,
            height,
            kernel_size,
            config.smoothing_kernel_sigma,
        );
        normalize(&mut occupancy);
        for (value, &wall) in occupancy.iter_mut().zip(inflated.iter()) {
            if wall {
                *value = 1.0;
            }
        }

        info!(
            "Grids built: {}x{} cells, {} wall cells, {} inflated cells",
            width,
            height,
            walls.iter().filter(|&&w| w).count(),
            inflated.iter().filter(|&&w| w).count()
        );

        Ok(Self {
            width,
            height,
            square_size: square,
            occupancy,
            inflated,
            walls,
        })
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell side length in meters.
    #[inline]
    pub fn square_size(&self) -> f32 {
        self.square_size
    }

    /// Convert a continuous coordinate to its cell index.
    #[inline]
    pub fn world_to_cell(&self, point: WorldPoint) -> GridCoord {
        GridCoord::new(
            (point.x / self.square_size).floor() as i32,
            (point.y / self.square_size).floor() as i32,
        )
    }

    /// Center of a cell in world coordinates.
    #[inline]
    pub fn cell_to_world(&self, cell: GridCoord) -> WorldPoint {
        WorldPoint::new(
            (cell.x as f32 + 0.5) * self.square_size,
            (cell.y as f32 + 0.5) * self.square_size,
        )
    }

    /// Whether a cell index lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, cell: GridCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    #[inline]
    fn index(&self, cell: GridCoord) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    /// Occupancy cost at a continuous coordinate.
    ///
    /// Total over all inputs: anything outside the grid (including negative
    /// coordinates) is 1.0, and near-zero values snap to exactly 0.0.
    pub fn occupancy_at(&self, x: f32, y: f32) -> f32 {
        let cell = self.world_to_cell(WorldPoint::new(x, y));
        if !self.in_bounds(cell) {
            return 1.0;
        }
        let value = self.occupancy[self.index(cell)];
        if value < OCCUPANCY_SNAP {
            0.0
        } else {
            value
        }
    }

    /// Whether a cell is blocked in the given layer; out of bounds is blocked.
    pub fn cell_blocked(&self, cell: GridCoord, layer: GridLayer) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        match layer {
            GridLayer::Occupancy => self.occupancy[self.index(cell)] >= 1.0,
            GridLayer::Wall => self.walls[self.index(cell)],
        }
    }

    /// Whether a cell was part of the binary clearance-inflated wall mask.
    pub fn cell_inflated(&self, cell: GridCoord) -> bool {
        self.in_bounds(cell) && self.inflated[self.index(cell)]
    }

    /// Row-major occupancy values, for observability streams.
    pub fn occupancy_cells(&self) -> &[f32] {
        &self.occupancy
    }

    /// Row-major wall mask, for observability streams.
    pub fn wall_cells(&self) -> &[bool] {
        &self.walls
    }

    /// Cast a straight ray through the wall grid, sampled proportionally to
    /// the Chebyshev cell distance. Returns false when any sample lands on a
    /// wall cell.
    pub fn ray_clear(&self, from: WorldPoint, to: WorldPoint) -> bool {
        let from_cell = self.world_to_cell(from);
        let to_cell = self.world_to_cell(to);
        let n = from_cell.chebyshev_distance(&to_cell).max(1);

        let dx = (to.x - from.x) / n as f32;
        let dy = (to.y - from.y) / n as f32;
        let mut x = from.x;
        let mut y = from.y;

        for _ in 0..n {
            x += dx;
            y += dy;
            if self.cell_blocked(self.world_to_cell(WorldPoint::new(x, y)), GridLayer::Wall) {
                return false;
            }
        }

        true
    }
}

/// Mark every cell within `radius` cells of `center` (Euclidean disc).
fn stamp_disc(cells: &mut [bool], width: usize, height: usize, center: GridCoord, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let x = center.x + dx;
            let y = center.y + dy;
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                continue;
            }
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist <= radius as f32 {
                cells[y as usize * width + x as usize] = true;
            }
        }
    }
}

/// Separable Gaussian blur with replicated borders.
fn gaussian_smooth(
    grid: &[f32],
    width: usize,
    height: usize,
    kernel_size: usize,
    sigma: f32,
) -> Vec<f32> {
    let kernel = gaussian_kernel(kernel_size, sigma);
    let half = (kernel_size / 2) as i32;

    // Horizontal pass
    let mut horizontal = vec![0.0f32; grid.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (k, &weight) in kernel.iter().enumerate() {
                let sx = (x as i32 + k as i32 - half).clamp(0, width as i32 - 1) as usize;
                sum += grid[y * width + sx] * weight;
            }
            horizontal[y * width + x] = sum;
        }
    }

    // Vertical pass
    let mut smoothed = vec![0.0f32; grid.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (k, &weight) in kernel.iter().enumerate() {
                let sy = (y as i32 + k as i32 - half).clamp(0, height as i32 - 1) as usize;
                sum += horizontal[sy * width + x] * weight;
            }
            smoothed[y * width + x] = sum;
        }
    }

    smoothed
}

/// Normalized 1D Gaussian kernel.
fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let half = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= total;
    }
    kernel
}

/// Min-max normalize in place to [0, 1].
fn normalize(grid: &mut [f32]) {
    let min = grid.iter().copied().fold(f32::MAX, f32::min);
    let max = grid.iter().copied().fold(f32::MIN, f32::max);
    let range = max - min;
    if range <= f32::EPSILON {
        return;
    }
    for v in grid.iter_mut() {
        *v = (*v - min) / range;
    }
}
