//! Float attribute textures on the GPU.
//!
//! Every attribute group is uploaded as `Rgba32Float` whatever its channel
//! count; RGB groups are padded with `w = 1`. The shader reads them with
//! `textureLoad` at the blade's texel, so no filtering is involved.

use wgpu::{Device, Extent3d, Queue, Texture, TextureView};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::texture::AttributeTexture;

pub const ATTRIBUTE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

const BYTES_PER_TEXEL: u32 = 16;

/// Expand `channels`-wide texels to RGBA, padding missing channels with
/// 0 and alpha with 1.
pub fn expand_to_rgba(data: &[f32], channels: usize) -> Result<Vec<f32>> {
    if !(1..=4).contains(&channels) {
        return Err(Error::Config(format!("attribute textures have 1 to 4 channels, got {}", channels)));
    }
    if data.len() % channels != 0 {
        return Err(Error::Config(format!(
            "attribute data length {} is not a multiple of {} channels",
            data.len(),
            channels
        )));
    }
    if channels == 4 {
        return Ok(data.to_vec());
    }
    let mut out = Vec::with_capacity(data.len() / channels * 4);
    for texel in data.chunks_exact(channels) {
        let mut rgba = [0.0, 0.0, 0.0, 1.0];
        rgba[..channels].copy_from_slice(texel);
        out.extend_from_slice(&rgba);
    }
    Ok(out)
}

/// Byte length of a `width x height` RGBA8 image, or an error when it does
/// not fit in memory.
pub fn rgba8_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::Gpu(format!("{}x{} RGBA8 image is too large", width, height)))
}

/// One attribute group resident on the GPU.
pub struct GpuAttributeTexture {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
    channels: usize,
}

impl GpuAttributeTexture {
    /// Create a texture and upload `data` (`width * height * channels` floats).
    pub fn create(
        device: &Device,
        queue: &Queue,
        label: &str,
        data: &[f32],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(Error::Gpu(format!(
                "attribute texture {}x{} outside device limit {}",
                width, height, max
            )));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ATTRIBUTE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let gpu = Self { texture, view, width, height, channels };
        gpu.replace(queue, data)?;
        Ok(gpu)
    }

    /// Upload a baked attribute group.
    pub fn from_attribute<const C: usize>(
        device: &Device,
        queue: &Queue,
        label: &str,
        attribute: &AttributeTexture<C>,
    ) -> Result<Self> {
        Self::create(device, queue, label, attribute.data(), attribute.width(), attribute.height(), C)
    }

    /// Overwrite the whole texture. Dimensions and channel count are fixed
    /// at creation.
    pub fn replace(&self, queue: &Queue, data: &[f32]) -> Result<()> {
        let expected = self.width as usize * self.height as usize * self.channels;
        if data.len() != expected {
            return Err(Error::Gpu(format!(
                "attribute upload of {} floats, texture holds {}",
                data.len(),
                expected
            )));
        }
        let rgba = expand_to_rgba(data, self.channels)?;

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&rgba),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * BYTES_PER_TEXEL),
                rows_per_image: Some(self.height),
            },
            Extent3d { width: self.width, height: self.height, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// The blade cutout mask, sampled with filtering in the fragment stage.
pub struct GpuMaskTexture {
    #[allow(dead_code)]
    texture: Texture,
    view: TextureView,
    sampler: wgpu::Sampler,
}

impl GpuMaskTexture {
    pub fn create(device: &Device, queue: &Queue, width: u32, height: u32, rgba8: &[u8]) -> Result<Self> {
        if rgba8.len() != rgba8_len(width, height)? {
            return Err(Error::Gpu(format!("mask data is {} bytes for {}x{}", rgba8.len(), width, height)));
        }
        let size = Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("blade_mask"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width.saturating_mul(4)),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blade_mask_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Ok(Self { texture, view, sampler })
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_rgb_pads_alpha() {
        let rgba = expand_to_rgba(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
        assert_eq!(rgba, vec![1.0, 2.0, 3.0, 1.0, 4.0, 5.0, 6.0, 1.0]);
    }

    #[test]
    fn test_expand_rgba_is_copy() {
        let data = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(expand_to_rgba(&data, 4).unwrap(), data.to_vec());
    }

    #[test]
    fn test_expand_rejects_ragged_data() {
        assert!(expand_to_rgba(&[1.0, 2.0], 3).is_err());
        assert!(expand_to_rgba(&[1.0], 0).is_err());
        assert!(expand_to_rgba(&[1.0; 5], 5).is_err());
    }

    #[test]
    fn test_rgba8_len() {
        assert_eq!(rgba8_len(32, 128).unwrap(), 32 * 128 * 4);
        assert_eq!(rgba8_len(0, 10).unwrap(), 0);
        // Would wrap a u32 product
        assert_eq!(rgba8_len(65_536, 65_536).unwrap(), 1usize << 34);
    }

    #[test]
    fn test_expand_keeps_texel_order() {
        let data: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let rgba = expand_to_rgba(&data, 3).unwrap();
        assert_eq!(rgba.len(), 16);
        for t in 0..4 {
            assert_eq!(&rgba[t * 4..t * 4 + 3], &data[t * 3..t * 3 + 3]);
        }
    }
}
