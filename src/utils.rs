//! Shared utility functions

use std::f32::consts::PI;

/// Normalize angle to [-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Absolute difference between two headings, accounting for wraparound.
#[inline]
pub fn heading_diff(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) + PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_heading_diff_wraparound() {
        // -179° to +179° is a 2° difference, not 358°
        let a = 179.0_f32.to_radians();
        let b = -179.0_f32.to_radians();
        assert!((heading_diff(a, b) - 2.0_f32.to_radians()).abs() < 1e-4);
    }
}
