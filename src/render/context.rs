//! Headless GPU context using wgpu

use crate::core::error::Error;

/// GPU device and queue without a presentation surface.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Request an adapter and device. Fails when no adapter is available.
    pub async fn new() -> Result<Self, Error> {
        let instance_desc = wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        };
        let instance = wgpu::Instance::new(&instance_desc);

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(format!("No suitable adapter found: {:?}", e)))?;

        let adapter_limits = adapter.limits();

        let device_desc = wgpu::DeviceDescriptor {
            label: Some("meadow_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits {
                // 300k blades need a 1024x293 attribute texture; keep the
                // adapter's own ceiling in case it is higher
                max_texture_dimension_2d: adapter_limits.max_texture_dimension_2d,
                ..Default::default()
            },
            memory_hints: wgpu::MemoryHints::Performance,
            experimental_features: Default::default(),
            trace: Default::default(),
        };

        let (device, queue) = adapter
            .request_device(&device_desc)
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let info = adapter.get_info();
        log::info!(
            "GPU adapter: {} ({:?}), max texture {}",
            info.name,
            info.backend,
            adapter_limits.max_texture_dimension_2d
        );

        Ok(Self { instance, adapter, device, queue })
    }

    /// Blocking wrapper around `new` for tools without an async runtime.
    pub fn new_blocking() -> Result<Self, Error> {
        pollster::block_on(Self::new())
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
