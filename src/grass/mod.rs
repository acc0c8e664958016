//! Instanced grass field.
//!
//! Baking packs every blade's placement into attribute textures indexed
//! by blade id; shading reads them back per vertex. `shading` is the CPU
//! twin of grass.wgsl and shares its uniform layout through `params`.

pub mod bake;
pub mod blade;
pub mod config;
pub mod field;
pub mod layout;
pub mod params;
pub mod profile;
pub mod shading;
pub mod texture;

pub use bake::{BakedField, Baker, BladeAttributes};
pub use blade::{BladeMask, BladeMesh, BladeVertex};
pub use config::{BakeConfig, Quality};
pub use field::{FieldState, GrassField};
pub use layout::{AttributeGroup, TexelLayout};
pub use params::GrassUniform;
pub use profile::{ShadingProfile, ShadingProfileTable};
pub use shading::{FrameUniforms, InstanceSample, VertexOutput};
pub use texture::{AttributeTexture, Vec3Texture, Vec4Texture};
