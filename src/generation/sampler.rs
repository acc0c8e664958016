//! Surface samplers producing blade anchor points.
//!
//! Output order is the id assignment used by every downstream stage, so
//! every sampler here is deterministic and returns exactly `count` points.

use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3};

/// Golden ratio conjugate, 1/phi
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Golden angle in radians, pi * (3 - sqrt 5)
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Surface blades are distributed over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Surface {
    /// Square patch of side `size` centered on the origin in the XZ plane
    Plane { size: f32 },
    /// Sphere centered on the origin
    Sphere { radius: f32 },
}

impl Default for Surface {
    fn default() -> Self {
        Surface::Plane { size: 4.0 }
    }
}

impl Surface {
    /// Direction a blade at `p` should grow away from the surface.
    pub fn outward(&self, p: Vec3) -> Vec3 {
        match self {
            Surface::Plane { .. } => Vec3::Y,
            Surface::Sphere { .. } => p.normalize_or_zero(),
        }
    }

    /// Half-size of the square window used for tiling wrap, if the
    /// surface tiles at all.
    pub fn tile_half_range(&self) -> Option<f32> {
        match self {
            Surface::Plane { size } => Some(size * 0.5),
            Surface::Sphere { .. } => None,
        }
    }
}

/// How points are laid out over the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPattern {
    /// Quasi-uniform Fibonacci lattice
    #[default]
    Fibonacci,
    /// Regular grid of cells, row-major
    Grid,
}

/// Grid dimensions (columns, rows) holding at least `count` cells.
pub fn grid_dims(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    (cols, rows)
}

/// Size of one grid cell on a planar surface, if applicable.
pub fn grid_cell_size(surface: &Surface, count: usize) -> Option<Vec2> {
    match surface {
        Surface::Plane { size } => {
            let (cols, rows) = grid_dims(count);
            (cols > 0).then(|| Vec2::new(size / cols as f32, size / rows as f32))
        }
        Surface::Sphere { .. } => None,
    }
}

/// Sample `count` points on `surface` using `pattern`.
pub fn sample(surface: &Surface, pattern: SamplingPattern, count: usize) -> Vec<Vec3> {
    match (surface, pattern) {
        (Surface::Plane { size }, SamplingPattern::Fibonacci) => fibonacci_plane(count, *size),
        (Surface::Plane { size }, SamplingPattern::Grid) => grid_plane(count, *size),
        (Surface::Sphere { radius }, SamplingPattern::Fibonacci) => fibonacci_sphere(count, *radius),
        (Surface::Sphere { radius }, SamplingPattern::Grid) => grid_sphere(count, *radius),
    }
}

/// Fibonacci lattice over the square `[-size/2, size/2]^2` at `y = 0`.
pub fn fibonacci_plane(count: usize, size: f32) -> Vec<Vec3> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let u = (i as f64 * INV_PHI).fract();
            let v = (i as f64 + 0.5) / n;
            Vec3::new(
                ((u - 0.5) * size as f64) as f32,
                0.0,
                ((v - 0.5) * size as f64) as f32,
            )
        })
        .collect()
}

/// Golden-angle spiral over a sphere of `radius`.
pub fn fibonacci_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = i as f64 * GOLDEN_ANGLE;
            Vec3::new(
                (theta.cos() * r) as f32,
                y as f32,
                (theta.sin() * r) as f32,
            ) * radius
        })
        .collect()
}

/// Row-major grid cell centers over the square `[-size/2, size/2]^2`.
/// Cells past `count` in the last row are left empty.
pub fn grid_plane(count: usize, size: f32) -> Vec<Vec3> {
    let (cols, rows) = grid_dims(count);
    (0..count)
        .map(|i| {
            let (c, r) = (i % cols, i / cols);
            let u = (c as f32 + 0.5) / cols as f32;
            let v = (r as f32 + 0.5) / rows as f32;
            Vec3::new((u - 0.5) * size, 0.0, (v - 0.5) * size)
        })
        .collect()
}

/// Longitude/latitude grid over a sphere of `radius`.
pub fn grid_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let (cols, rows) = grid_dims(count);
    (0..count)
        .map(|i| {
            let (c, r) = (i % cols, i / cols);
            let lon = (c as f32 + 0.5) / cols as f32 * std::f32::consts::TAU;
            let lat = ((r as f32 + 0.5) / rows as f32 - 0.5) * std::f32::consts::PI;
            Vec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin()) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACES: [Surface; 2] = [Surface::Plane { size: 4.0 }, Surface::Sphere { radius: 1.0 }];
    const PATTERNS: [SamplingPattern; 2] = [SamplingPattern::Fibonacci, SamplingPattern::Grid];

    #[test]
    fn test_exact_counts() {
        for surface in &SURFACES {
            for pattern in PATTERNS {
                for n in [0, 1, 2, 3, 4, 7, 100, 1001, 50_000] {
                    assert_eq!(sample(surface, pattern, n).len(), n, "{surface:?} {pattern:?} {n}");
                }
            }
        }
    }

    #[test]
    fn test_plane_points_in_bounds() {
        for pattern in PATTERNS {
            for p in sample(&Surface::Plane { size: 4.0 }, pattern, 5000) {
                assert_eq!(p.y, 0.0);
                assert!(p.x >= -2.0 && p.x <= 2.0);
                assert!(p.z >= -2.0 && p.z <= 2.0);
            }
        }
    }

    #[test]
    fn test_sphere_points_on_surface() {
        for pattern in PATTERNS {
            for p in sample(&Surface::Sphere { radius: 3.0 }, pattern, 2000) {
                assert!((p.length() - 3.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_grid_unit_square() {
        let pts = grid_plane(4, 1.0);
        assert_eq!(pts, vec![
            Vec3::new(-0.25, 0.0, -0.25),
            Vec3::new(0.25, 0.0, -0.25),
            Vec3::new(-0.25, 0.0, 0.25),
            Vec3::new(0.25, 0.0, 0.25),
        ]);
    }

    #[test]
    fn test_fibonacci_plane_coverage() {
        // Every quadrant of the patch receives roughly a quarter of the points
        let pts = fibonacci_plane(10_000, 2.0);
        let mut quadrants = [0usize; 4];
        for p in &pts {
            let q = (p.x >= 0.0) as usize + 2 * (p.z >= 0.0) as usize;
            quadrants[q] += 1;
        }
        for count in quadrants {
            assert!((2300..2700).contains(&count), "{quadrants:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(fibonacci_plane(777, 4.0), fibonacci_plane(777, 4.0));
        assert_eq!(fibonacci_sphere(777, 1.0), fibonacci_sphere(777, 1.0));
    }

    #[test]
    fn test_grid_dims_cover() {
        for n in 1..500 {
            let (c, r) = grid_dims(n);
            assert!(c * r >= n);
            assert!(c * (r - 1) < n);
        }
    }

    #[test]
    fn test_cell_size() {
        let cell = grid_cell_size(&Surface::Plane { size: 1.0 }, 4).unwrap();
        assert_eq!(cell, Vec2::new(0.5, 0.5));
        assert!(grid_cell_size(&Surface::Sphere { radius: 1.0 }, 4).is_none());
    }
}
