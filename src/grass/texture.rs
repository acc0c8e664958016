//! CPU-side attribute textures: fixed channel count, row-major texels.

use super::layout::TexelLayout;
use crate::core::types::{Quat, Vec3, Vec4};

/// Float texture with `C` channels per texel.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeTexture<const C: usize> {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// Position/scale style texture (RGB)
pub type Vec3Texture = AttributeTexture<3>;
/// Quaternion/axis-angle/curl style texture (RGBA)
pub type Vec4Texture = AttributeTexture<4>;

impl<const C: usize> AttributeTexture<C> {
    pub const CHANNELS: usize = C;

    /// Zero-filled texture covering every texel of `layout`.
    pub fn new(layout: &TexelLayout) -> Self {
        Self {
            width: layout.width(),
            height: layout.height(),
            data: vec![0.0; layout.texel_count() * C],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Store one texel.
    ///
    /// # Panics
    /// If `texel_index` is past the last texel. Callers index through
    /// `TexelLayout`, which never yields such an index for a valid id.
    pub fn write(&mut self, texel_index: usize, value: [f32; C]) {
        let start = texel_index * C;
        self.data[start..start + C].copy_from_slice(&value);
    }

    /// Load one texel. Panics like `write` on an out-of-range index.
    pub fn read(&self, texel_index: usize) -> [f32; C] {
        let start = texel_index * C;
        let mut out = [0.0; C];
        out.copy_from_slice(&self.data[start..start + C]);
        out
    }
}

impl Vec3Texture {
    pub fn write_vec3(&mut self, texel_index: usize, v: Vec3) {
        self.write(texel_index, v.to_array());
    }

    pub fn read_vec3(&self, texel_index: usize) -> Vec3 {
        Vec3::from_array(self.read(texel_index))
    }
}

impl Vec4Texture {
    pub fn write_vec4(&mut self, texel_index: usize, v: Vec4) {
        self.write(texel_index, v.to_array());
    }

    pub fn read_vec4(&self, texel_index: usize) -> Vec4 {
        Vec4::from_array(self.read(texel_index))
    }

    /// Quaternions are stored as `(x, y, z, w)`.
    pub fn write_quat(&mut self, texel_index: usize, q: Quat) {
        self.write(texel_index, q.to_array());
    }

    pub fn read_quat(&self, texel_index: usize) -> Quat {
        Quat::from_array(self.read(texel_index))
    }
}
