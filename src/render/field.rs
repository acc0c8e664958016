//! A baked grass field resident on the GPU.

use std::collections::HashMap;

use super::buffer::{BladeBuffers, GrassUniformBuffer};
use super::pipeline::grass::{GrassPipeline, MASK_BINDING, MASK_SAMPLER_BINDING};
use super::texture::{GpuAttributeTexture, GpuMaskTexture};
use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::bake::BakedField;
use crate::grass::blade::{BladeMask, BladeMesh};
use crate::grass::layout::{AttributeGroup, CURL_BINDING};
use crate::grass::profile::ShadingProfile;
use crate::grass::shading::FrameUniforms;
use crate::grass::texture::Vec4Texture;

/// Attribute textures, curl texture, mesh buffers and bind group for one
/// baked field. Rebuilt when the field is regenerated.
pub struct GrassGpuField {
    attributes: HashMap<AttributeGroup, GpuAttributeTexture>,
    curl: GpuAttributeTexture,
    #[allow(dead_code)]
    mask: GpuMaskTexture,
    uniforms: GrassUniformBuffer,
    buffers: BladeBuffers,
    bind_group: wgpu::BindGroup,
}

impl GrassGpuField {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &GrassPipeline,
        field: &BakedField,
        curl: &Vec4Texture,
        mesh: &BladeMesh,
        mask: &BladeMask,
    ) -> Result<Self> {
        let layout = field.layout();
        if curl.width() != layout.width() || curl.height() != layout.height() {
            return Err(Error::Gpu(format!(
                "curl texture {}x{} does not match attribute layout {}x{}",
                curl.width(),
                curl.height(),
                layout.width(),
                layout.height()
            )));
        }

        let a = field.attributes();
        let mut attributes = HashMap::new();
        for group in AttributeGroup::ALL {
            if group.binding().is_none() {
                continue;
            }
            let texture = match group {
                AttributeGroup::Offset => GpuAttributeTexture::from_attribute(device, queue, group.label(), &a.offset)?,
                AttributeGroup::Position => {
                    GpuAttributeTexture::from_attribute(device, queue, group.label(), &a.position)?
                }
                AttributeGroup::Quaternion => {
                    GpuAttributeTexture::from_attribute(device, queue, group.label(), &a.quaternion)?
                }
                AttributeGroup::AxisAngle => {
                    GpuAttributeTexture::from_attribute(device, queue, group.label(), &a.axis_angle)?
                }
                AttributeGroup::Scale => GpuAttributeTexture::from_attribute(device, queue, group.label(), &a.scale)?,
                AttributeGroup::CurlSeed => continue,
            };
            attributes.insert(group, texture);
        }
        let curl = GpuAttributeTexture::from_attribute(device, queue, "grass_curl", curl)?;
        let mask = GpuMaskTexture::create(device, queue, mask.width(), mask.height(), mask.data())?;
        let uniforms = GrassUniformBuffer::new(device);
        let buffers = BladeBuffers::new(device, mesh, field.instance_colors());

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniforms.buffer().as_entire_binding(),
        }];
        for (group, texture) in &attributes {
            if let Some(binding) = group.binding() {
                entries.push(wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                });
            }
        }
        entries.push(wgpu::BindGroupEntry {
            binding: CURL_BINDING,
            resource: wgpu::BindingResource::TextureView(curl.view()),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: MASK_BINDING,
            resource: wgpu::BindingResource::TextureView(mask.view()),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: MASK_SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(mask.sampler()),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_bind_group"),
            layout: pipeline.bind_group_layout(),
            entries: &entries,
        });

        log::info!(
            "Uploaded {} blades ({}x{} attribute textures, {} indices per blade)",
            field.count(),
            layout.width(),
            layout.height(),
            buffers.index_count()
        );

        Ok(Self { attributes, curl, mask, uniforms, buffers, bind_group })
    }

    /// Replace the curl texture contents with this frame's evolution.
    pub fn replace_curl(&self, queue: &wgpu::Queue, curl: &Vec4Texture) -> Result<()> {
        self.curl.replace(queue, curl.data())
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, frame: &FrameUniforms, profile: &ShadingProfile) {
        self.uniforms.update(queue, frame, profile);
    }

    pub fn attribute(&self, group: AttributeGroup) -> Option<&GpuAttributeTexture> {
        self.attributes.get(&group)
    }

    pub fn instance_count(&self) -> u32 {
        self.buffers.instance_count()
    }

    /// Record the instanced draw into an open render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline: &GrassPipeline) {
        pass.set_pipeline(pipeline.pipeline());
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.buffers.vertices().slice(..));
        pass.set_vertex_buffer(1, self.buffers.instances().slice(..));
        pass.set_index_buffer(self.buffers.indices().slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.buffers.index_count(), 0, 0..self.buffers.instance_count());
    }
}
