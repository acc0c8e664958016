//! Meadow - instanced procedural grass: blade placement baking and shading

pub mod core;
pub mod math;
pub mod generation;
pub mod grass;
pub mod render;
