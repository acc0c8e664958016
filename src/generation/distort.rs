//! Surface distortion used to perturb blade normals.

use noise::{NoiseFn, Perlin};

use crate::core::types::Vec3;
use crate::math::SimpleRng;

/// In-place perturbation of a point on the surface.
pub trait Distort {
    fn distort(&self, p: &mut Vec3);
}

impl<F: Fn(&mut Vec3)> Distort for F {
    fn distort(&self, p: &mut Vec3) {
        self(p)
    }
}

/// Radial Perlin displacement: `p *= 2 + radius * perlin(p + offset)`.
///
/// Each distribution draws a fresh offset into the noise domain and a
/// fresh amplitude, so re-randomizing changes the terrain the normals are
/// estimated against without touching point placement.
#[derive(Clone, Debug)]
pub struct NoiseDistortion {
    perlin: Perlin,
    offset: [f64; 3],
    radius: f32,
}

impl NoiseDistortion {
    pub fn from_seed(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed as u64);
        let offset = [
            rng.range(-1000.0, 1000.0) as f64,
            rng.range(-1000.0, 1000.0) as f64,
            rng.range(-1000.0, 1000.0) as f64,
        ];
        let radius = rng.range(0.5, 1.0);
        Self {
            perlin: Perlin::new(seed),
            offset,
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Scalar multiplier applied to `p`.
    pub fn factor(&self, p: Vec3) -> f32 {
        let n = self.perlin.get([
            p.x as f64 + self.offset[0],
            p.y as f64 + self.offset[1],
            p.z as f64 + self.offset[2],
        ]);
        2.0 + self.radius * n as f32
    }
}

impl Distort for NoiseDistortion {
    fn distort(&self, p: &mut Vec3) {
        *p *= self.factor(*p);
    }
}
