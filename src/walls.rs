//! Wall geometry ingestion.
//!
//! Parses a maze wall-list file (one segment per line as `x1 y1 x2 y2`) and
//! discretizes the segments at a fixed step length into the wall points the
//! grid store is built from. Malformed lines are skipped with a diagnostic;
//! they never abort ingestion.

use std::path::Path;

use tracing::{info, warn};

use crate::core::WorldPoint;
use crate::error::{NavError, Result};

/// A single wall segment between two corner points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSegment {
    pub start: WorldPoint,
    pub end: WorldPoint,
}

impl WallSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            start: WorldPoint::new(x1, y1),
            end: WorldPoint::new(x2, y2),
        }
    }

    /// Segment length in meters.
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// Parse wall segments from the text of a wall-list file.
///
/// Lines starting with `#` are comments. A line that does not contain four
/// parseable coordinates is skipped with a warning.
pub fn parse_wall_segments(text: &str) -> Vec<WallSegment> {
    let mut segments = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let coords: Vec<f32> = trimmed
            .split_whitespace()
            .map_while(|tok| tok.parse::<f32>().ok())
            .collect();

        if coords.len() < 4 {
            warn!("Segment error. Skipping line: {}", trimmed);
            continue;
        }

        segments.push(WallSegment::new(coords[0], coords[1], coords[2], coords[3]));
    }

    segments
}

/// Load wall segments from a file.
pub fn load_wall_file(path: &Path) -> Result<Vec<WallSegment>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        NavError::WallGeometry(format!("Could not read wall file {:?}: {}", path, e))
    })?;

    let segments = parse_wall_segments(&text);
    if segments.is_empty() {
        return Err(NavError::WallGeometry(format!(
            "No wall segments found in {:?}",
            path
        )));
    }

    info!("Loaded {} wall segments from {:?}", segments.len(), path);
    Ok(segments)
}

/// Discretize wall segments into points at a fixed step length.
///
/// Each segment yields `floor(length / step) + 2` points including both
/// endpoints, so even a zero-length segment contributes its corner.
pub fn discretize(segments: &[WallSegment], step: f32) -> Vec<WorldPoint> {
    let mut points = Vec::new();

    for segment in segments {
        let n_step = (segment.length() / step).floor() as i32 + 1;
        let x_step = (segment.end.x - segment.start.x) / n_step as f32;
        let y_step = (segment.end.y - segment.start.y) / n_step as f32;

        for i in 0..=n_step {
            points.push(WorldPoint::new(
                segment.start.x + i as f32 * x_step,
                segment.start.y + i as f32 * y_step,
            ));
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "# maze walls\n0 0 1 0\nbad line here\n1 0 1 1\n0.5 garbage\n";
        let segments = parse_wall_segments(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], WallSegment::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(segments[1], WallSegment::new(1.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_discretize_includes_endpoints() {
        let segments = [WallSegment::new(0.0, 0.0, 1.0, 0.0)];
        let points = discretize(&segments, 0.05);

        // floor(1.0 / 0.05) + 1 = 21 intervals, 22 points
        assert_eq!(points.len(), 22);
        assert_eq!(points[0], WorldPoint::new(0.0, 0.0));
        let last = points.last().unwrap();
        assert!((last.x - 1.0).abs() < 1e-5);
        assert!(last.y.abs() < 1e-5);
    }

    #[test]
    fn test_discretize_zero_length_segment() {
        let segments = [WallSegment::new(0.3, 0.3, 0.3, 0.3)];
        let points = discretize(&segments, 0.05);
        assert!(!points.is_empty());
        assert_eq!(points[0], WorldPoint::new(0.3, 0.3));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_wall_file(Path::new("/nonexistent/walls.txt"));
        assert!(result.is_err());
    }
}
