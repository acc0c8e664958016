//! GPU texture resources

pub mod attribute;

pub use attribute::{expand_to_rgba, rgba8_len, GpuAttributeTexture, GpuMaskTexture, ATTRIBUTE_FORMAT};
