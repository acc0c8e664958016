//! Easing curves used to pin blade bases while tips bend

use serde::{Deserialize, Serialize};

/// Cubic ease-in: `t^3`
pub fn in_cubic(t: f32) -> f32 {
    t * t * t
}

/// Cubic ease-out: `(t - 1)^3 + 1`
pub fn out_cubic(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}

/// Selectable bend curve. Discriminants match `ease_mode` in grass.wgsl.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    InCubic = 0,
    OutCubic = 1,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Ease::InCubic => in_cubic(t),
            Ease::OutCubic => out_cubic(t),
        }
    }
}
