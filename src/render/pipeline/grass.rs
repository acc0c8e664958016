//! Instanced blade render pipeline

use crate::grass::blade::BladeVertex;
use crate::grass::layout::{AttributeGroup, CURL_BINDING};

/// Blade mask texture binding in grass.wgsl
pub const MASK_BINDING: u32 = 7;
/// Blade mask sampler binding in grass.wgsl
pub const MASK_SAMPLER_BINDING: u32 = 8;

/// Stride of the per-instance `(id, u, v)` color stream
pub const INSTANCE_STRIDE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

fn attribute_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Render pipeline drawing every blade as an instance of the template.
pub struct GrassPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GrassPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grass_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/grass.wgsl").into()),
        });

        // 0: uniform, 1-5: baked groups, 6: curl, 7-8: mask
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        entries.extend(AttributeGroup::ALL.iter().filter_map(|g| g.binding()).map(attribute_entry));
        entries.push(attribute_entry(CURL_BINDING));
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: MASK_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: MASK_SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_bind_group_layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<BladeVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: INSTANCE_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRIBUTES,
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grass_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Blades are single quads seen from both sides
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, bind_group_layout }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_are_distinct() {
        let mut bindings: Vec<u32> = AttributeGroup::ALL.iter().filter_map(|g| g.binding()).collect();
        bindings.extend([0, CURL_BINDING, MASK_BINDING, MASK_SAMPLER_BINDING]);
        let n = bindings.len();
        bindings.sort_unstable();
        bindings.dedup();
        assert_eq!(bindings.len(), n);
        assert_eq!(bindings, (0..=8).collect::<Vec<_>>());
    }

    fn grass_module() -> wgpu::naga::Module {
        let source = include_str!("../../../shaders/grass.wgsl");
        wgpu::naga::front::wgsl::parse_str(source).unwrap()
    }

    #[test]
    fn test_shader_validates() {
        let module = grass_module();
        let mut validator = wgpu::naga::valid::Validator::new(
            wgpu::naga::valid::ValidationFlags::all(),
            wgpu::naga::valid::Capabilities::empty(),
        );
        validator.validate(&module).unwrap();

        let entry_points: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }

    #[test]
    fn test_shader_bindings_match_layout() {
        let module = grass_module();
        let mut declared: Vec<(u32, String)> = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| {
                let binding = var.binding.as_ref()?;
                assert_eq!(binding.group, 0);
                Some((binding.binding, var.name.clone().unwrap_or_default()))
            })
            .collect();
        declared.sort();

        let mut expected: Vec<(u32, String)> = vec![
            (0, "u".to_string()),
            (CURL_BINDING, "curl_tex".to_string()),
            (MASK_BINDING, "mask_tex".to_string()),
            (MASK_SAMPLER_BINDING, "mask_sampler".to_string()),
        ];
        for group in AttributeGroup::ALL {
            if let Some(binding) = group.binding() {
                let name = group.label().trim_start_matches("grass_");
                expected.push((binding, format!("{}_tex", name)));
            }
        }
        expected.sort();

        assert_eq!(declared, expected);
    }

    #[test]
    fn test_vertex_layout_matches_blade_vertex() {
        assert_eq!(VERTEX_ATTRIBUTES[1].offset, 12);
        assert_eq!(VERTEX_ATTRIBUTES[2].offset, 24);
        assert_eq!(std::mem::size_of::<BladeVertex>(), 32);
        assert_eq!(INSTANCE_STRIDE, 12);
    }
}
