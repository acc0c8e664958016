//! GPU buffers for the grass field: per-frame uniform, blade template
//! geometry and the per-instance id stream.

use wgpu::util::DeviceExt;

use crate::grass::blade::BladeMesh;
use crate::grass::params::GrassUniform;
use crate::grass::profile::ShadingProfile;
use crate::grass::shading::FrameUniforms;

/// Uniform buffer holding one `GrassUniform`.
pub struct GrassUniformBuffer {
    buffer: wgpu::Buffer,
}

impl GrassUniformBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_uniform"),
            size: std::mem::size_of::<GrassUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    /// Write this frame's values.
    pub fn update(&self, queue: &wgpu::Queue, frame: &FrameUniforms, profile: &ShadingProfile) {
        let uniform = GrassUniform::new(frame, profile);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Blade template vertex/index buffers plus the instance color buffer.
pub struct BladeBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    instances: wgpu::Buffer,
    index_count: u32,
    instance_count: u32,
}

impl BladeBuffers {
    pub fn new(device: &wgpu::Device, mesh: &BladeMesh, instance_colors: &[[f32; 3]]) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_instance_colors"),
            contents: bytemuck::cast_slice(instance_colors),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertices,
            indices,
            instances,
            index_count: mesh.indices.len() as u32,
            instance_count: instance_colors.len() as u32,
        }
    }

    pub fn vertices(&self) -> &wgpu::Buffer {
        &self.vertices
    }

    pub fn indices(&self) -> &wgpu::Buffer {
        &self.indices
    }

    pub fn instances(&self) -> &wgpu::Buffer {
        &self.instances
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}
