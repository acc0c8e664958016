//! Packing contract between the baker and the blade shader.
//!
//! Blade `id` lives at texel `(id % width, id / width)` of every attribute
//! texture. grass.wgsl decodes ids with the same formula; keep the two in
//! step.

use crate::core::error::Error;
use crate::core::types::{Result, Vec2};

/// Texel grid shared by all attribute textures of one distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexelLayout {
    width: u32,
    height: u32,
    count: u32,
}

impl TexelLayout {
    /// Layout for `count` blades: width is the next power of two at or
    /// above `sqrt(count)`, height is `ceil(count / width)`.
    pub fn for_count(count: u32) -> Result<Self> {
        if count == 0 {
            return Err(Error::Config("blade count must be greater than zero".into()));
        }
        let width = ((count as f64).sqrt().ceil() as u32).next_power_of_two();
        let height = count.div_ceil(width);
        log::debug!("Texel layout for {} blades: {}x{}", count, width, height);
        Self::with_dimensions(count, width, height)
    }

    /// Layout with explicit dimensions. Fails if the grid cannot hold
    /// `count` texels, since overflowing ids would wrap onto other blades.
    pub fn with_dimensions(count: u32, width: u32, height: u32) -> Result<Self> {
        if count == 0 {
            return Err(Error::Config("blade count must be greater than zero".into()));
        }
        if width == 0 || height == 0 {
            return Err(Error::Config(format!("texture dimensions must be non-zero, got {}x{}", width, height)));
        }
        if (width as u64) * (height as u64) < count as u64 {
            return Err(Error::Config(format!(
                "{}x{} texture holds {} texels, fewer than {} blades",
                width, height, width as u64 * height as u64, count
            )));
        }
        Ok(Self { width, height, count })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of blades (used texels)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Total texels including the unused tail
    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Integer texel coordinate of `id`.
    pub fn texel(&self, id: u32) -> (u32, u32) {
        (id % self.width, id / self.width)
    }

    /// Row-major index of `id`'s texel; multiply by the channel count to
    /// get the float offset.
    pub fn texel_index(&self, id: u32) -> usize {
        let (x, y) = self.texel(id);
        y as usize * self.width as usize + x as usize
    }

    /// Normalized coordinate of the texel center, for sampled lookups.
    pub fn texel_uv(&self, id: u32) -> Vec2 {
        let (x, y) = self.texel(id);
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }

    /// Inverse of `texel`: the blade stored at `(x, y)`, if any.
    pub fn id_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let id = y as u64 * self.width as u64 + x as u64;
        (id < self.count as u64).then_some(id as u32)
    }
}

/// Attribute groups baked per blade, one texture each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeGroup {
    /// Tiling anchor, wrapped around the camera target
    Offset,
    /// Root displacement from the anchor
    Position,
    /// Look quaternion
    Quaternion,
    /// `(n.x, n.y, n.z, theta)` twist
    AxisAngle,
    Scale,
    /// Seed position for the curl field
    CurlSeed,
}

impl AttributeGroup {
    pub const ALL: [AttributeGroup; 6] = [
        AttributeGroup::Offset,
        AttributeGroup::Position,
        AttributeGroup::Quaternion,
        AttributeGroup::AxisAngle,
        AttributeGroup::Scale,
        AttributeGroup::CurlSeed,
    ];

    pub const fn channels(self) -> usize {
        match self {
            AttributeGroup::Quaternion | AttributeGroup::AxisAngle => 4,
            _ => 3,
        }
    }

    /// Texture binding in grass.wgsl, if the render shader reads the group.
    pub const fn binding(self) -> Option<u32> {
        match self {
            AttributeGroup::Offset => Some(1),
            AttributeGroup::Position => Some(2),
            AttributeGroup::Quaternion => Some(3),
            AttributeGroup::AxisAngle => Some(4),
            AttributeGroup::Scale => Some(5),
            AttributeGroup::CurlSeed => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttributeGroup::Offset => "grass_offset",
            AttributeGroup::Position => "grass_position",
            AttributeGroup::Quaternion => "grass_quaternion",
            AttributeGroup::AxisAngle => "grass_axis_angle",
            AttributeGroup::Scale => "grass_scale",
            AttributeGroup::CurlSeed => "grass_curl_seed",
        }
    }
}

/// Curl texture binding in grass.wgsl (the curl field is not a baked group).
pub const CURL_BINDING: u32 = 6;
