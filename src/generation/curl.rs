//! CPU evolution of the wind/dryness curl field.
//!
//! Produces the same texture the shader samples per blade: `xyz` is a
//! divergence-free wind vector (curl of a Perlin vector potential), `w` is
//! a slowly varying dryness in [0, 1]. Texels follow the baked layout, so
//! texel `i` belongs to blade `i`.

use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::{Vec3, Vec4};
use crate::grass::layout::TexelLayout;
use crate::grass::texture::{Vec3Texture, Vec4Texture};

/// Finite-difference step in noise space
const CURL_STEP: f64 = 1e-3;

/// Curl field parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurlParams {
    /// Spatial frequency applied to seed positions
    pub frequency: f32,
    /// Time multiplier
    pub speed: f32,
    /// Weight of the second, double-frequency octave
    pub persistence: f32,
}

impl Default for CurlParams {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            speed: 1.0,
            persistence: 1.0,
        }
    }
}

/// Time-evolving curl noise sampled at per-blade seed positions.
pub struct CurlField {
    potential: [Perlin; 3],
    dryness: Perlin,
    params: CurlParams,
}

impl CurlField {
    pub fn new(seed: u32, params: CurlParams) -> Self {
        Self {
            potential: [
                Perlin::new(seed),
                Perlin::new(seed.wrapping_add(1)),
                Perlin::new(seed.wrapping_add(2)),
            ],
            dryness: Perlin::new(seed.wrapping_add(3)),
            params,
        }
    }

    pub fn params(&self) -> &CurlParams {
        &self.params
    }

    fn potential_at(&self, axis: usize, p: [f64; 3], w: f64) -> f64 {
        self.potential[axis].get([p[0], p[1], p[2], w])
    }

    /// Curl of the potential at `p`, one octave.
    fn curl_octave(&self, p: [f64; 3], w: f64) -> Vec3 {
        let h = CURL_STEP;
        let d = |axis: usize, along: usize| {
            let mut hi = p;
            let mut lo = p;
            hi[along] += h;
            lo[along] -= h;
            (self.potential_at(axis, hi, w) - self.potential_at(axis, lo, w)) / (2.0 * h)
        };
        Vec3::new(
            (d(2, 1) - d(1, 2)) as f32,
            (d(0, 2) - d(2, 0)) as f32,
            (d(1, 0) - d(0, 1)) as f32,
        )
    }

    /// Wind vector and dryness for one seed position at `time`.
    pub fn sample(&self, seed: Vec3, time: f32) -> Vec4 {
        let f = self.params.frequency as f64;
        let w = (time * self.params.speed) as f64;
        let p = [seed.x as f64 * f, seed.y as f64 * f, seed.z as f64 * f];
        let p2 = [p[0] * 2.0, p[1] * 2.0, p[2] * 2.0];

        let wind = self.curl_octave(p, w) + self.curl_octave(p2, w) * self.params.persistence * 0.5;

        let dry = self.dryness.get([p[0] * 0.5, p[1] * 0.5, p[2] * 0.5, w * 0.25]);
        let dry = (dry as f32 * 0.5 + 0.5).clamp(0.0, 1.0);

        wind.extend(dry)
    }

    /// Evaluate every used texel of `seeds` at `time`. Unused tail texels
    /// stay zero.
    pub fn evolve(&self, seeds: &Vec3Texture, layout: &TexelLayout, time: f32) -> Vec4Texture {
        let mut out = Vec4Texture::new(layout);
        let count = layout.count() as usize;
        out.data_mut()
            .par_chunks_mut(4)
            .take(count)
            .enumerate()
            .for_each(|(i, texel)| {
                let v = self.sample(seeds.read_vec3(i), time);
                texel.copy_from_slice(&v.to_array());
            });
        out
    }
}
