//! GPU side of the grass field: textures, buffers and the blade pipeline

pub mod buffer;
pub mod context;
pub mod field;
pub mod pipeline;
pub mod texture;

pub use context::GpuContext;
pub use field::GrassGpuField;
pub use pipeline::GrassPipeline;
