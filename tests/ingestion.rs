//! Wall geometry ingestion against real files.

use std::io::Write;

use maze_nav::walls::{discretize, load_wall_file, parse_wall_segments};

#[test]
fn test_load_wall_file_skips_malformed_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# the maze").unwrap();
    writeln!(file, "0.0 0.0 2.0 0.0").unwrap();
    writeln!(file, "this line is broken").unwrap();
    writeln!(file, "2.0 0.0 2.0 2.0").unwrap();
    writeln!(file, "1.0 2.0").unwrap();
    file.flush().unwrap();

    let segments = load_wall_file(file.path()).unwrap();
    assert_eq!(segments.len(), 2);
}

#[test]
fn test_empty_wall_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# only comments in here").unwrap();
    file.flush().unwrap();

    assert!(load_wall_file(file.path()).is_err());
}

#[test]
fn test_discretized_points_lie_on_segments() {
    let segments = parse_wall_segments("0.0 0.0 1.0 1.0\n");
    let points = discretize(&segments, 0.05);

    for point in &points {
        // Points of a diagonal segment satisfy y = x
        assert!((point.x - point.y).abs() < 1e-5);
        assert!((0.0..=1.0).contains(&point.x));
    }
}
