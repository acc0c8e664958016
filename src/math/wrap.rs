//! Toroidal wrapping of instance offsets around a moving window

use crate::core::types::Vec3;

/// Wrap `value` into `[min, min + size)`.
///
/// Floored modulo, like GLSL `mod`, so negative inputs wrap the same way.
pub fn wrap(value: f32, min: f32, size: f32) -> f32 {
    let wrapped = (value - min).rem_euclid(size) + min;
    // rem_euclid can round up to exactly `size` for tiny negative remainders
    if wrapped >= min + size { min } else { wrapped }
}

/// Wrap the XZ components of `p` into the square window centered on
/// `center` with half-size `half_range`. Y is left untouched.
pub fn wrap_xz(p: Vec3, center: Vec3, half_range: f32) -> Vec3 {
    let size = half_range * 2.0;
    Vec3::new(
        wrap(p.x, center.x - half_range, size),
        p.y,
        wrap(p.z, center.z - half_range, size),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_window_untouched() {
        let p = Vec3::new(0.5, 3.0, -1.5);
        let w = wrap_xz(p, Vec3::ZERO, 2.0);
        assert!((w - p).length() < 1e-6);
    }

    #[test]
    fn test_wraps_across_window() {
        let w = wrap_xz(Vec3::new(2.5, 0.0, -2.5), Vec3::ZERO, 2.0);
        assert!((w.x - -1.5).abs() < 1e-5);
        assert!((w.z - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_idempotent() {
        let center = Vec3::new(13.7, 0.0, -42.1);
        for i in 0..200 {
            let f = i as f32 * 0.731 - 70.0;
            let p = Vec3::new(f, f * 0.5, -f * 1.3);
            let once = wrap_xz(p, center, 2.0);
            let twice = wrap_xz(once, center, 2.0);
            assert!((once - twice).length() < 1e-4, "{once} vs {twice}");
            assert!(once.x >= center.x - 2.0 && once.x < center.x + 2.0);
            assert!(once.z >= center.z - 2.0 && once.z < center.z + 2.0);
        }
    }

    #[test]
    fn test_window_follows_center() {
        let p = Vec3::new(0.0, 0.0, 0.0);
        let w = wrap_xz(p, Vec3::new(10.0, 0.0, 10.0), 2.0);
        assert!((w.x - 8.0).abs() < 1e-5);
        assert!((w.z - 8.0).abs() < 1e-5);
    }
}
