//! Render pipelines

pub mod grass;

pub use grass::GrassPipeline;
