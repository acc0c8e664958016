//! Procedural generation: surface sampling, distortion, normals, blade
//! transforms and the curl field.

pub mod curl;
pub mod distort;
pub mod normal;
pub mod sampler;
pub mod transform;

pub use curl::{CurlField, CurlParams};
pub use distort::{Distort, NoiseDistortion};
pub use normal::{estimate_normal, NormalParams};
pub use sampler::{SamplingPattern, Surface};
pub use transform::BladeTransform;
