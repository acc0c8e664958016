//! Per-blade instance transforms.
//!
//! A blade's rotation is kept in two halves: the look quaternion that
//! stands the blade along its normal, and a twist of `theta` about that
//! normal. Both halves are baked separately and recombined on the GPU.

use crate::core::types::{Mat4, Quat, Vec3, Vec4};
use crate::math::quat::{compose, compose_rotation, look_rotation};

/// Up hint for the look rotation. The blade template grows along local +Z.
pub const LOOK_UP: Vec3 = Vec3::Z;

/// Decomposed transform of one blade instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BladeTransform {
    /// Root position relative to the blade's tiling anchor
    pub position: Vec3,
    /// Look rotation: local +Z along `normal`
    pub q_base: Quat,
    /// Estimated surface normal, also the twist axis
    pub normal: Vec3,
    /// Twist about `normal`, radians
    pub theta: f32,
    pub scale: Vec3,
}

impl BladeTransform {
    pub fn new(position: Vec3, normal: Vec3, theta: f32, scale: Vec3) -> Self {
        Self {
            position,
            q_base: look_rotation(normal, LOOK_UP),
            normal,
            theta,
            scale,
        }
    }

    /// Packed `(n.x, n.y, n.z, theta)` as stored in the axis-angle texture.
    pub fn axis_angle(&self) -> Vec4 {
        self.normal.extend(self.theta)
    }

    /// Final rotation, `q_base * quat(n, theta)`.
    pub fn rotation(&self) -> Quat {
        compose_rotation(self.q_base, self.axis_angle())
    }

    pub fn matrix(&self) -> Mat4 {
        compose(self.position, self.rotation(), self.scale)
    }
}
