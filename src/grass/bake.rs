//! Placement/attribute baker.
//!
//! Samples anchors, estimates a normal per anchor, builds the decomposed
//! blade transform and packs every attribute group into its texture at
//! the blade's texel. Runs synchronously; large counts take a noticeable
//! fraction of a second.

use std::time::Instant;

use super::config::BakeConfig;
use super::layout::TexelLayout;
use super::texture::{Vec3Texture, Vec4Texture};
use crate::core::types::{Result, Vec3};
use crate::generation::distort::{Distort, NoiseDistortion};
use crate::generation::normal::estimate_normal;
use crate::generation::sampler::{self, SamplingPattern, Surface};
use crate::generation::transform::BladeTransform;
use crate::math::SimpleRng;

/// Mixed into the distortion seed for the normal-offset stream
const OFFSET_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Struct-of-arrays attribute set, one texture per group.
#[derive(Clone, Debug, PartialEq)]
pub struct BladeAttributes {
    pub offset: Vec3Texture,
    pub position: Vec3Texture,
    pub quaternion: Vec4Texture,
    pub axis_angle: Vec4Texture,
    pub scale: Vec3Texture,
    pub curl_seed: Vec3Texture,
}

impl BladeAttributes {
    fn new(layout: &TexelLayout) -> Self {
        Self {
            offset: Vec3Texture::new(layout),
            position: Vec3Texture::new(layout),
            quaternion: Vec4Texture::new(layout),
            axis_angle: Vec4Texture::new(layout),
            scale: Vec3Texture::new(layout),
            curl_seed: Vec3Texture::new(layout),
        }
    }
}

/// Output of one bake: the attribute textures plus per-instance id colors.
#[derive(Clone, Debug)]
pub struct BakedField {
    layout: TexelLayout,
    attributes: BladeAttributes,
    instance_colors: Vec<[f32; 3]>,
    origin_offset: Vec3,
    seed: u64,
    distortion_seed: u32,
}

impl BakedField {
    pub fn layout(&self) -> &TexelLayout {
        &self.layout
    }

    pub fn count(&self) -> u32 {
        self.layout.count()
    }

    pub fn attributes(&self) -> &BladeAttributes {
        &self.attributes
    }

    /// Per-instance `(id, u, v)` colors: the id plus its normalized texel
    /// origin, streamed as an instance vertex attribute.
    pub fn instance_colors(&self) -> &[[f32; 3]] {
        &self.instance_colors
    }

    /// Offset added to anchors before normal estimation
    pub fn origin_offset(&self) -> Vec3 {
        self.origin_offset
    }

    pub fn seeds(&self) -> (u64, u32) {
        (self.seed, self.distortion_seed)
    }

    /// Reassemble the transform of blade `id` from the packed textures.
    pub fn transform(&self, id: u32) -> Option<BladeTransform> {
        if id >= self.count() {
            return None;
        }
        let i = self.layout.texel_index(id);
        let a = &self.attributes;
        let axis_angle = a.axis_angle.read_vec4(i);
        Some(BladeTransform {
            position: a.position.read_vec3(i),
            q_base: a.quaternion.read_quat(i),
            normal: axis_angle.truncate(),
            theta: axis_angle.w,
            scale: a.scale.read_vec3(i),
        })
    }
}

/// Bakes blade distributions.
pub struct Baker;

impl Baker {
    /// Bake with the config's own noise distortion.
    pub fn bake(config: &BakeConfig) -> Result<BakedField> {
        let distortion = NoiseDistortion::from_seed(config.distortion_seed);
        Self::bake_with(config, &distortion)
    }

    /// Bake using a caller-supplied distortion.
    pub fn bake_with<D: Distort + ?Sized>(config: &BakeConfig, distort: &D) -> Result<BakedField> {
        config.validate()?;
        let start = Instant::now();

        let layout = match config.texture_size {
            Some([w, h]) => TexelLayout::with_dimensions(config.count, w, h)?,
            None => TexelLayout::for_count(config.count)?,
        };

        let count = config.count as usize;
        let points = sampler::sample(&config.surface, config.pattern, count);
        let origin_offset = origin_offset(&config.surface, config.distortion_seed);
        let cell = match config.pattern {
            SamplingPattern::Grid if config.root_jitter > 0.0 => {
                sampler::grid_cell_size(&config.surface, count)
            }
            _ => None,
        };
        let scale = config.blade_scale();

        let mut rng = SimpleRng::new(config.seed);
        let mut attributes = BladeAttributes::new(&layout);
        let mut instance_colors = Vec::with_capacity(count);
        let mut on_origin = 0usize;

        for (id, &anchor) in points.iter().enumerate() {
            let id = id as u32;
            let jitter = match cell {
                Some(cell) => Vec3::new(
                    (rng.next_float() - 0.5) * cell.x * config.root_jitter,
                    0.0,
                    (rng.next_float() - 0.5) * cell.y * config.root_jitter,
                ),
                None => Vec3::ZERO,
            };
            let root = anchor + jitter;

            let probe = root + origin_offset;
            if probe.length_squared() < 1e-12 {
                on_origin += 1;
            }
            let normal = estimate_normal(probe, config.surface.outward(root), distort, &config.normal);
            let theta = rng.range(-config.max_twist, config.max_twist);
            let transform = BladeTransform::new(jitter, normal, theta, scale);

            let i = layout.texel_index(id);
            attributes.offset.write_vec3(i, anchor);
            attributes.position.write_vec3(i, transform.position);
            attributes.quaternion.write_quat(i, transform.q_base);
            attributes.axis_angle.write_vec4(i, transform.axis_angle());
            attributes.scale.write_vec3(i, transform.scale);
            attributes.curl_seed.write_vec3(i, root);

            let (x, y) = layout.texel(id);
            instance_colors.push([
                id as f32,
                x as f32 / layout.width() as f32,
                y as f32 / layout.height() as f32,
            ]);
        }

        if on_origin > 0 {
            log::warn!("{} blades sat on the origin; their normals defaulted to up", on_origin);
        }
        log::info!(
            "Baked {} blades into {}x{} textures in {:.1}ms",
            count,
            layout.width(),
            layout.height(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(BakedField {
            layout,
            attributes,
            instance_colors,
            origin_offset,
            seed: config.seed,
            distortion_seed: config.distortion_seed,
        })
    }
}

/// Per-distribution shift applied before normal estimation so planar
/// anchors never sit on the origin. Length is half the patch diagonal.
fn origin_offset(surface: &Surface, distortion_seed: u32) -> Vec3 {
    match surface {
        Surface::Plane { size } => {
            let mut rng = SimpleRng::new(distortion_seed as u64 ^ OFFSET_STREAM);
            let dir = Vec3::new(rng.range(-1.0, 1.0), 0.0, rng.range(-1.0, 1.0));
            let dir = if dir.length_squared() < 1e-12 { Vec3::X } else { dir.normalize() };
            dir * (size * 0.5 * std::f32::consts::SQRT_2)
        }
        Surface::Sphere { .. } => Vec3::ZERO,
    }
}
