//! Quaternion helpers shared by the baker and the shading reference.
//!
//! The GPU rebuilds each blade's rotation as `q_base * axis_angle(n, theta)`
//! and composes it with position and scale into a TRS matrix. These
//! functions are the single CPU definition of that contract; grass.wgsl
//! mirrors them line for line.

use crate::core::types::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Rotation whose local +Z axis points along `dir`, with local +Y as close
/// to `up` as possible.
///
/// When `up` is parallel to `dir` the direction is nudged slightly so a
/// basis still exists.
pub fn look_rotation(dir: Vec3, up: Vec3) -> Quat {
    let mut z = if dir.length_squared() < 1e-12 { Vec3::Z } else { dir.normalize() };

    let mut x = up.cross(z);
    if x.length_squared() < 1e-12 {
        if up.z.abs() >= 1.0 - 1e-6 {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Quaternion for a rotation of `angle` radians about `axis`.
///
/// The axis is normalized here; a zero axis yields the identity.
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, angle)
}

/// Reconstruct the final blade rotation from its packed halves.
///
/// `packed_axis_angle` is `(n.x, n.y, n.z, theta)` as stored in the
/// axis-angle texture.
pub fn compose_rotation(q_base: Quat, packed_axis_angle: Vec4) -> Quat {
    q_base * axis_angle(packed_axis_angle.truncate(), packed_axis_angle.w)
}

/// Standard TRS composition: rotation from the quaternion, translation in
/// the last column, no projective terms.
pub fn compose(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}

/// Orthonormal vector perpendicular to `v`
pub fn orthogonal(v: Vec3) -> Vec3 {
    if v.x.abs() > v.z.abs() {
        Vec3::new(-v.y, v.x, 0.0).normalize_or_zero()
    } else {
        Vec3::new(0.0, -v.z, v.y).normalize_or_zero()
    }
}
