//! Mathematical utilities shared by the baker and the shading reference

pub mod ease;
pub mod quat;
pub mod ray;
pub mod rng;
pub mod wrap;

pub use ease::Ease;
pub use ray::Ray;
pub use rng::SimpleRng;
