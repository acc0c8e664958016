//! GPU-ready grass uniform (224 bytes, 16-byte aligned).
//!
//! Per-frame values from `FrameUniforms` packed together with the active
//! `ShadingProfile`, so one buffer write per frame covers the whole shader.

use bytemuck::{Pod, Zeroable};

use super::profile::ShadingProfile;
use super::shading::FrameUniforms;
use crate::math::Ease;

/// GPU uniform for blade shading. Must match `GrassUniform` in grass.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GrassUniform {
    pub view_proj: [[f32; 4]; 4],
    // -- 64 bytes --
    pub disturbance: [f32; 3],
    pub time: f32,
    // -- 16 bytes --
    pub facing: [f32; 3],
    pub scale: f32,
    // -- 16 bytes --
    pub camera_target: [f32; 3],
    pub cutoff: f32,
    // -- 16 bytes --
    pub light_falloff: f32,
    pub light_max: f32,
    pub curl_bend: f32,
    pub disturbance_push: f32,
    // -- 16 bytes --
    pub tile_half_range: f32,
    pub vertical_stretch: f32,
    pub highlight_base: f32,
    pub mask_threshold: f32,
    // -- 16 bytes --
    pub ease_mode: u32,
    pub _pad: [u32; 3],
    // -- 16 bytes --
    pub base_color: [f32; 4],
    pub tip_color: [f32; 4],
    pub dry_color: [f32; 4],
    pub highlight_color: [f32; 4],
    // -- 64 bytes --
    // Total: 224 bytes
}

impl GrassUniform {
    pub fn new(frame: &FrameUniforms, profile: &ShadingProfile) -> Self {
        let rgba = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            disturbance: frame.disturbance.to_array(),
            time: frame.time,
            facing: frame.facing.to_array(),
            scale: frame.scale,
            camera_target: frame.camera_target.to_array(),
            cutoff: profile.cutoff,
            light_falloff: profile.light_falloff,
            light_max: profile.light_max,
            curl_bend: profile.curl_bend,
            disturbance_push: profile.disturbance_push,
            tile_half_range: profile.tile_half_range,
            vertical_stretch: profile.vertical_stretch,
            highlight_base: profile.highlight_base,
            mask_threshold: profile.mask_threshold,
            ease_mode: match profile.ease {
                Ease::InCubic => 0,
                Ease::OutCubic => 1,
            },
            _pad: [0; 3],
            base_color: rgba(profile.base_color),
            tip_color: rgba(profile.tip_color),
            dry_color: rgba(profile.dry_color),
            highlight_color: rgba(profile.highlight_color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Mat4, Vec3};

    #[test]
    fn test_grass_uniform_size() {
        assert_eq!(std::mem::size_of::<GrassUniform>(), 224);
    }

    #[test]
    fn test_grass_uniform_alignment() {
        assert_eq!(std::mem::size_of::<GrassUniform>() % 16, 0);
    }

    #[test]
    fn test_bytemuck_cast() {
        let u = GrassUniform::zeroed();
        assert_eq!(bytemuck::bytes_of(&u).len(), 224);
    }

    #[test]
    fn test_packs_frame_and_profile() {
        let frame = FrameUniforms {
            time: 2.5,
            disturbance: Vec3::new(1.0, 2.0, 3.0),
            scale: 5.0,
            view_proj: Mat4::from_translation(Vec3::new(7.0, 0.0, 0.0)),
            ..Default::default()
        };
        let profile = ShadingProfile::windswept();
        let u = GrassUniform::new(&frame, &profile);
        assert_eq!(u.time, 2.5);
        assert_eq!(u.disturbance, [1.0, 2.0, 3.0]);
        assert_eq!(u.scale, 5.0);
        assert_eq!(u.view_proj[3][0], 7.0);
        assert_eq!(u.cutoff, profile.cutoff);
        assert_eq!(u.ease_mode, 1);
        assert_eq!(u.tip_color[3], 1.0);
        assert_eq!(u.tip_color[0], profile.tip_color[0]);
    }
}
