//! Local "up" estimation for blade anchors.
//!
//! The normal at `p` comes from two nearby samples along the tangent
//! frame, pushed through the distortion, then crossed.

use serde::{Deserialize, Serialize};

use super::distort::Distort;
use crate::core::types::Vec3;
use crate::math::quat::orthogonal;

/// World up used for the tangent frame and for blending.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Parameters for normal estimation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalParams {
    /// Offset of the tangent/binormal samples from `p`
    pub epsilon: f32,
    /// Fraction to blend the estimate toward world up (0 = none, 1 = up)
    pub up_blend: f32,
    /// Flip estimates that point into the surface
    pub orient_outward: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            up_blend: 0.3,
            orient_outward: true,
        }
    }
}

/// Estimate the local normal at `p`.
///
/// `outward` is the surface's outward direction at `p`, used when
/// `orient_outward` is set. Never returns NaN: degenerate inputs (the
/// origin, a vanishing cross product) fall back to world up.
pub fn estimate_normal<D: Distort + ?Sized>(
    p: Vec3,
    outward: Vec3,
    distort: &D,
    params: &NormalParams,
) -> Vec3 {
    if p.length_squared() < 1e-12 {
        return WORLD_UP;
    }
    let dir = p.normalize();

    let tangent = dir.cross(WORLD_UP);
    let tangent = if tangent.length_squared() < 1e-12 {
        orthogonal(dir)
    } else {
        tangent.normalize()
    };
    let binormal = dir.cross(tangent);

    let mut a = p + tangent * params.epsilon;
    let mut b = p + binormal * params.epsilon;
    distort.distort(&mut a);
    distort.distort(&mut b);

    let mut n = (a - p).cross(b - p).normalize_or_zero();
    if n == Vec3::ZERO || !n.is_finite() {
        return WORLD_UP;
    }

    if params.orient_outward && n.dot(outward) < 0.0 {
        n = -n;
    }

    if params.up_blend > 0.0 {
        n = n.lerp(WORLD_UP, params.up_blend).normalize_or_zero();
        if n == Vec3::ZERO {
            return WORLD_UP;
        }
    }
    n
}
