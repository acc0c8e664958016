//! Blade template mesh and cutout mask.

use bytemuck::{Pod, Zeroable};

use crate::core::types::{Mat4, Vec2, Vec3};

/// Blade template vertex. Must match `VertexInput` locations 0..2 in grass.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BladeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl BladeVertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Indexed blade geometry shared by every instance.
#[derive(Clone, Debug)]
pub struct BladeMesh {
    pub vertices: Vec<BladeVertex>,
    pub indices: Vec<u32>,
}

impl BladeMesh {
    /// Thin subdivided quad standing on the origin and rising along +Z
    /// from 0 to `height`. The base row has `uv.y = 1`, the tip row `0`.
    pub fn template(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let gx = width_segments.max(1);
        let gy = height_segments.max(1);
        let seg_w = width / gx as f32;
        let seg_h = height / gy as f32;

        // Plane in XY facing +Z, top row first; then dropped so the top
        // edge sits at y = 0 and tipped forward to stand along +Z.
        let to_standing = Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
            * Mat4::from_translation(Vec3::new(0.0, -height * 0.5, 0.0));

        let mut vertices = Vec::with_capacity(((gx + 1) * (gy + 1)) as usize);
        for iy in 0..=gy {
            let y = height * 0.5 - iy as f32 * seg_h;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - width * 0.5;
                let position = to_standing.transform_point3(Vec3::new(x, y, 0.0));
                let normal = to_standing.transform_vector3(Vec3::Z);
                vertices.push(BladeVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                });
            }
        }

        let row = gx + 1;
        let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// The template the meadow uses: 0.015 wide, unit tall, 2x10 segments.
    pub fn standard() -> Self {
        Self::template(0.015, 1.0, 2, 10)
    }

    /// Highest vertex of the blade (last of the top row)
    pub fn tip(&self) -> Option<&BladeVertex> {
        self.vertices
            .iter()
            .max_by(|a, b| a.position[2].total_cmp(&b.position[2]))
    }
}

/// RGBA8 cutout mask sampled by the fragment stage. Red >= 0.5 is blade.
#[derive(Clone, Debug)]
pub struct BladeMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BladeMask {
    /// Tapered blade silhouette: full width at the base (`v = 0`),
    /// narrowing to a point at the tip (`v = 1`). Row `r` holds
    /// `v = (r + 0.5) / height`.
    pub fn procedural(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for r in 0..height {
            let v = (r as f32 + 0.5) / height as f32;
            let half_width = 0.5 * (1.0 - v * v);
            for c in 0..width {
                let u = (c as f32 + 0.5) / width as f32;
                let inside = (u - 0.5).abs() <= half_width;
                let value = if inside { 255 } else { 0 };
                data.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Nearest-texel red channel at `uv`, in [0, 1].
    pub fn red_at(&self, uv: Vec2) -> f32 {
        let x = ((uv.x.clamp(0.0, 1.0) * self.width as f32) as u32).min(self.width - 1);
        let y = ((uv.y.clamp(0.0, 1.0) * self.height as f32) as u32).min(self.height - 1);
        self.data[(y as usize * self.width as usize + x as usize) * 4] as f32 / 255.0
    }
}
