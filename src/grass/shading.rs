//! CPU reference of the blade shader.
//!
//! Mirrors `vs_main` / `fs_main` in grass.wgsl one step at a time so the
//! packing and composition contract can be tested without a GPU. Frames
//! are stateless: everything time-varying arrives in `FrameUniforms`.

use rayon::prelude::*;

use super::bake::BakedField;
use super::blade::BladeVertex;
use super::profile::ShadingProfile;
use super::texture::Vec4Texture;
use crate::core::types::{Mat4, Quat, Vec2, Vec3, Vec4};
use crate::math::quat::{compose, compose_rotation};
use crate::math::wrap::wrap_xz;

/// Per-frame values pushed by the render loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    /// Elapsed time
    pub time: f32,
    /// Disturbance ("boulder") position in field space
    pub disturbance: Vec3,
    /// Horizontal direction blades turn to face
    pub facing: Vec3,
    /// Camera look-at target in world space
    pub camera_target: Vec3,
    /// Global world scale
    pub scale: f32,
    pub view_proj: Mat4,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            disturbance: Vec3::splat(1.0e4),
            facing: Vec3::NEG_Z,
            camera_target: Vec3::ZERO,
            scale: 1.0,
            view_proj: Mat4::IDENTITY,
        }
    }
}

/// Horizontal view direction from a camera rotation: camera forward with
/// its vertical part dropped, or camera up when looking straight down.
pub fn facing_from_camera(rotation: Quat) -> Vec3 {
    let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z);
    let forward = flatten(rotation * Vec3::NEG_Z);
    if forward.length() >= 0.01 {
        return forward.normalize();
    }
    let up = flatten(rotation * Vec3::Y);
    if up.length() >= 0.01 { up.normalize() } else { Vec3::NEG_Z }
}

/// Angle about local Z that turns a blade's face toward `facing`.
///
/// Negative of `π/2 + atan2(f.z, f.x)`: the look rotation maps local X to
/// world -X, so the blade's width axis only ends up perpendicular to
/// `facing` when turned the other way.
pub fn facing_angle(facing: Vec3) -> f32 {
    -(std::f32::consts::FRAC_PI_2 + facing.z.atan2(facing.x))
}

/// Everything the vertex stage fetches for one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceSample {
    pub id: u32,
    pub offset: Vec3,
    pub position: Vec3,
    pub q_base: Quat,
    pub axis_angle: Vec4,
    pub scale: Vec3,
    /// Wind vector in `xyz`, dryness in `w`
    pub curl: Vec4,
}

impl InstanceSample {
    pub fn rotation(&self) -> Quat {
        compose_rotation(self.q_base, self.axis_angle)
    }

    pub fn matrix(&self) -> Mat4 {
        compose(self.position, self.rotation(), self.scale)
    }
}

/// Blade id carried in the first channel of the instance color.
pub fn decode_instance_id(color: [f32; 3]) -> u32 {
    color[0] as u32
}

/// Fetch blade `id`'s attributes and curl sample. `None` past the last blade.
pub fn fetch_instance(field: &BakedField, curl: &Vec4Texture, id: u32) -> Option<InstanceSample> {
    if id >= field.count() {
        return None;
    }
    let i = field.layout().texel_index(id);
    let a = field.attributes();
    Some(InstanceSample {
        id,
        offset: a.offset.read_vec3(i),
        position: a.position.read_vec3(i),
        q_base: a.quaternion.read_quat(i),
        axis_angle: a.axis_angle.read_vec4(i),
        scale: a.scale.read_vec3(i),
        curl: curl.read_vec4(i),
    })
}

/// Disturbance seen from one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disturbance {
    /// From the point toward the disturbance; zero beyond the cutoff
    pub vector: Vec3,
    pub distance: f32,
    /// Highlight intensity in [0, light_max]; zero beyond the cutoff
    pub light: f32,
    /// Inverted proximity, `1 - distance / cutoff`: 1 at the disturbance,
    /// falling linearly to 0 at the cutoff
    pub influence: f32,
}

pub fn disturbance_at(point: Vec3, disturbance: Vec3, profile: &ShadingProfile) -> Disturbance {
    let vector = disturbance - point;
    let distance = vector.length();

    if !(distance <= profile.cutoff) {
        return Disturbance { vector: Vec3::ZERO, distance, light: 0.0, influence: 0.0 };
    }

    let light = if distance <= f32::EPSILON {
        profile.light_max
    } else {
        (1.0 / (distance * profile.light_falloff)).powi(2).min(profile.light_max)
    };
    let influence = if profile.cutoff > 0.0 {
        (1.0 - distance / profile.cutoff).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Disturbance { vector, distance, light, influence }
}

/// Where a rest-pose vertex bends to under the curl sample: the vertex
/// nudged along a curl-tilted up axis, stretched by `1 + dryness`.
pub fn bend_target(rest: Vec3, curl: Vec4, profile: &ShadingProfile) -> Vec3 {
    let axis = Vec3::new(curl.x * profile.curl_bend, curl.y * profile.curl_bend, 1.0).normalize();
    (rest + axis).normalize_or_zero() * (1.0 + curl.w)
}

/// Wrap a blade anchor into the tiling window around the camera target.
pub fn wrap_offset(offset: Vec3, uniforms: &FrameUniforms, profile: &ShadingProfile) -> Vec3 {
    if profile.tile_half_range <= 0.0 {
        return offset;
    }
    let center = if uniforms.scale != 0.0 {
        uniforms.camera_target / uniforms.scale
    } else {
        uniforms.camera_target
    };
    wrap_xz(offset, center, profile.tile_half_range)
}

/// Vertex stage output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexOutput {
    /// Final world position, after stretch and global scale
    pub world: Vec3,
    pub clip: Vec4,
    pub uv: Vec2,
    pub dry: f32,
    pub light: f32,
}

/// Run the vertex stage for one template vertex of one instance.
pub fn shade_vertex(
    vertex: &BladeVertex,
    sample: &InstanceSample,
    uniforms: &FrameUniforms,
    profile: &ShadingProfile,
) -> VertexOutput {
    let rest = vertex.position();
    let matrix = sample.matrix();

    let base = matrix.transform_point3(Vec3::new(rest.x, rest.y, 0.0)) + sample.offset;
    let disturbance = disturbance_at(base, uniforms.disturbance, profile);

    let target = bend_target(rest, sample.curl, profile);
    let bend = profile.ease.apply(rest.z.clamp(0.0, 1.0));

    let mut p = Quat::from_rotation_z(facing_angle(uniforms.facing)) * rest;
    p = p.lerp(target, bend);

    let mut world = matrix.transform_point3(p);
    world -= disturbance.vector * (disturbance.influence * profile.disturbance_push * bend);
    world += wrap_offset(sample.offset, uniforms, profile);
    world.y *= profile.vertical_stretch;
    world *= uniforms.scale;

    let uv = vertex.uv();
    VertexOutput {
        world,
        clip: uniforms.view_proj * world.extend(1.0),
        uv: Vec2::new(uv.x, 1.0 - uv.y),
        dry: sample.curl.w,
        light: disturbance.light,
    }
}

/// Fragment stage: `None` when the mask cuts the fragment out.
pub fn shade_fragment(uv: Vec2, dry: f32, light: f32, mask_red: f32, profile: &ShadingProfile) -> Option<Vec4> {
    if mask_red < profile.mask_threshold {
        return None;
    }
    let gradient = profile.base_color().lerp(profile.tip_color(), uv.y);
    let color = gradient.lerp(profile.dry_color(), dry);
    let highlight = profile.highlight_base + light * (1.0 - profile.highlight_base);
    let color = color.lerp(profile.highlight_color(), highlight);
    Some((color * uv.y).extend(1.0))
}

/// Run the vertex stage for one template vertex across every instance,
/// decoding ids from the instance colors like the GPU does.
pub fn shade_instances(
    field: &BakedField,
    curl: &Vec4Texture,
    vertex: &BladeVertex,
    uniforms: &FrameUniforms,
    profile: &ShadingProfile,
) -> Vec<VertexOutput> {
    field
        .instance_colors()
        .par_iter()
        .filter_map(|color| fetch_instance(field, curl, decode_instance_id(*color)))
        .map(|sample| shade_vertex(vertex, &sample, uniforms, profile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::curl::{CurlField, CurlParams};
    use crate::generation::sampler::{SamplingPattern, Surface};
    use crate::grass::bake::Baker;
    use crate::grass::blade::BladeMesh;
    use crate::grass::config::BakeConfig;

    fn profile() -> ShadingProfile {
        ShadingProfile::meadow()
    }

    #[test]
    fn test_zero_distance_light_is_max() {
        let d = disturbance_at(Vec3::ONE, Vec3::ONE, &profile());
        assert_eq!(d.light, profile().light_max);
        assert_eq!(d.influence, 1.0);
        assert!(d.light.is_finite());
    }

    #[test]
    fn test_beyond_cutoff_is_zero() {
        let d = disturbance_at(Vec3::ZERO, Vec3::new(0.26, 0.0, 0.0), &profile());
        assert_eq!(d.vector, Vec3::ZERO);
        assert_eq!(d.light, 0.0);
        assert_eq!(d.influence, 0.0);

        let far = disturbance_at(Vec3::ZERO, Vec3::splat(1.0e4), &profile());
        assert_eq!(far.vector, Vec3::ZERO);
    }

    #[test]
    fn test_nan_disturbance_is_ignored() {
        let d = disturbance_at(Vec3::ZERO, Vec3::splat(f32::NAN), &profile());
        assert_eq!(d.vector, Vec3::ZERO);
        assert_eq!(d.light, 0.0);
    }

    #[test]
    fn test_light_falloff_within_cutoff() {
        let d = disturbance_at(Vec3::ZERO, Vec3::new(0.24, 0.0, 0.0), &profile());
        let expected = (1.0 / (0.24_f32 * 5.0)).powi(2);
        assert!((d.light - expected).abs() < 1e-5);
        assert!(d.influence > 0.0 && d.influence < 0.1);

        let close = disturbance_at(Vec3::ZERO, Vec3::new(0.01, 0.0, 0.0), &profile());
        assert_eq!(close.light, 1.0);
    }

    #[test]
    fn test_facing_from_camera() {
        let f = facing_from_camera(Quat::IDENTITY);
        assert!((f - Vec3::NEG_Z).length() < 1e-6);

        // Looking straight down: fall back to camera up, flattened
        let down = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let f = facing_from_camera(down);
        assert!((f - Vec3::NEG_Z).length() < 1e-5, "{f}");
    }

    #[test]
    fn test_blade_face_points_along_facing() {
        // Flat ground, no twist: the width axis of the base row must stay
        // perpendicular to the facing direction whatever the camera yaw.
        let mesh = BladeMesh::standard();
        let base_row: Vec<_> = mesh.vertices.iter().filter(|v| v.position[2] == 0.0).collect();
        let left = base_row.iter().min_by(|a, b| a.position[0].total_cmp(&b.position[0])).unwrap();
        let right = base_row.iter().max_by(|a, b| a.position[0].total_cmp(&b.position[0])).unwrap();
        let sample = InstanceSample {
            id: 0,
            offset: Vec3::ZERO,
            position: Vec3::ZERO,
            q_base: crate::math::quat::look_rotation(Vec3::Y, Vec3::Z),
            axis_angle: Vec4::new(0.0, 1.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 0.1),
            curl: Vec4::ZERO,
        };

        for yaw in [0.0_f32, 30.0, 45.0, 60.0, 90.0, 135.0, 200.0, 315.0] {
            let facing = Quat::from_rotation_y(yaw.to_radians()) * Vec3::NEG_Z;
            let uniforms = FrameUniforms { facing, ..Default::default() };
            let a = shade_vertex(left, &sample, &uniforms, &profile()).world;
            let b = shade_vertex(right, &sample, &uniforms, &profile()).world;
            let width = Vec3::new(b.x - a.x, 0.0, b.z - a.z).normalize();
            assert!(width.dot(facing).abs() < 1e-4, "yaw {yaw}: {}", width.dot(facing));
        }
    }

    #[test]
    fn test_bend_target_no_curl() {
        let p = profile();
        let t = bend_target(Vec3::new(0.0, 0.0, 1.0), Vec4::ZERO, &p);
        assert!((t - Vec3::Z).length() < 1e-6);
        let t = bend_target(Vec3::new(0.0, 0.0, 1.0), Vec4::new(0.0, 0.0, 0.0, 1.0), &p);
        assert!((t - Vec3::Z * 2.0).length() < 1e-6);
    }

    #[test]
    fn test_base_vertices_stay_pinned() {
        // Bend weight is ease(0) = 0 at the base, so curl never moves it.
        let mesh = BladeMesh::standard();
        let base = mesh.vertices.iter().find(|v| v.position[2] == 0.0).unwrap();
        let mut sample = InstanceSample {
            id: 0,
            offset: Vec3::new(0.5, 0.0, 0.5),
            position: Vec3::ZERO,
            q_base: crate::math::quat::look_rotation(Vec3::Y, Vec3::Z),
            axis_angle: Vec4::new(0.0, 1.0, 0.0, 0.1),
            scale: Vec3::new(1.0, 1.0, 0.1),
            curl: Vec4::ZERO,
        };
        let uniforms = FrameUniforms::default();
        let calm = shade_vertex(base, &sample, &uniforms, &profile());
        sample.curl = Vec4::new(3.0, -2.0, 0.5, 0.9);
        let windy = shade_vertex(base, &sample, &uniforms, &profile());
        assert!((calm.world - windy.world).length() < 1e-5);
    }

    #[test]
    fn test_fragment_discard_and_color() {
        let p = profile();
        assert!(shade_fragment(Vec2::new(0.5, 0.5), 0.0, 0.0, 0.2, &p).is_none());

        let c = shade_fragment(Vec2::new(0.5, 1.0), 0.0, 0.0, 1.0, &p).unwrap();
        let expected = p.tip_color().lerp(p.highlight_color(), 0.3);
        assert!((c.truncate() - expected).length() < 1e-5);
        assert_eq!(c.w, 1.0);

        // Blade base is black
        let base = shade_fragment(Vec2::new(0.5, 0.0), 0.5, 1.0, 1.0, &p).unwrap();
        assert_eq!(base.truncate(), Vec3::ZERO);

        // Full light goes all the way to the highlight color
        let lit = shade_fragment(Vec2::new(0.5, 1.0), 0.0, 1.0, 1.0, &p).unwrap();
        assert!((lit.truncate() - p.highlight_color()).length() < 1e-5);
    }

    #[test]
    fn test_wrap_offset_follows_camera() {
        let p = profile();
        let uniforms = FrameUniforms { camera_target: Vec3::new(50.0, 0.0, 0.0), scale: 5.0, ..Default::default() };
        let wrapped = wrap_offset(Vec3::new(-1.0, 0.0, 1.0), &uniforms, &p);
        // Window is [8, 12) x [-2, 2)
        assert!((wrapped.x - 11.0).abs() < 1e-5);
        assert!((wrapped.z - 1.0).abs() < 1e-5);

        let planet = ShadingProfile::planet();
        assert_eq!(wrap_offset(Vec3::new(-1.0, 0.0, 1.0), &uniforms, &planet), Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn test_four_blade_grid_far_disturbance() {
        let cfg = BakeConfig {
            count: 4,
            surface: Surface::Plane { size: 1.0 },
            pattern: SamplingPattern::Grid,
            root_jitter: 0.0,
            ..Default::default()
        };
        let field = Baker::bake(&cfg).unwrap();
        let layout = *field.layout();

        let mut curl = Vec4Texture::new(&layout);
        for i in 0..4 {
            curl.write_vec4(i, Vec4::new(0.5 * i as f32, -0.25, 0.0, 0.1 * i as f32));
        }
        let calm = Vec4Texture::new(&layout);

        let mesh = BladeMesh::standard();
        let tip = mesh.tip().unwrap();
        let p = profile();

        let far_a = FrameUniforms { disturbance: Vec3::new(100.0, 0.0, 100.0), ..Default::default() };
        let far_b = FrameUniforms { disturbance: Vec3::new(-70.0, 3.0, 20.0), ..Default::default() };

        let a = shade_instances(&field, &curl, tip, &far_a, &p);
        let b = shade_instances(&field, &curl, tip, &far_b, &p);
        let still = shade_instances(&field, &calm, tip, &far_a, &p);
        assert_eq!(a.len(), 4);

        for id in 0..4 {
            // No proximity light, and the disturbance position is irrelevant
            assert_eq!(a[id].light, 0.0);
            assert_eq!(a[id].world, b[id].world);
            assert!(a[id].world.is_finite());

            let frag = shade_fragment(a[id].uv, a[id].dry, a[id].light, 1.0, &p).unwrap();
            let expected = p.tip_color().lerp(p.dry_color(), a[id].dry).lerp(p.highlight_color(), p.highlight_base);
            assert!((frag.truncate() - expected * a[id].uv.y).length() < 1e-5);
        }
        // Blades with wind or dryness bend away from the calm pose
        for id in 1..4 {
            assert!((a[id].world - still[id].world).length() > 1e-4, "blade {id}");
        }
    }

    #[test]
    fn test_nearby_disturbance_lights_and_pushes() {
        let cfg = BakeConfig {
            count: 4,
            surface: Surface::Plane { size: 1.0 },
            pattern: SamplingPattern::Grid,
            root_jitter: 0.0,
            ..Default::default()
        };
        let field = Baker::bake(&cfg).unwrap();
        let curl = Vec4Texture::new(field.layout());
        let mesh = BladeMesh::standard();
        let tip = mesh.tip().unwrap();
        let windswept = ShadingProfile::windswept();

        let sample = fetch_instance(&field, &curl, 0).unwrap();
        let anchor = sample.offset;
        let near = FrameUniforms { disturbance: anchor + Vec3::new(0.05, 0.0, 0.0), ..Default::default() };
        let far = FrameUniforms::default();

        let lit = shade_vertex(tip, &sample, &near, &windswept);
        let unlit = shade_vertex(tip, &sample, &far, &windswept);
        assert!(lit.light > 0.0);
        assert_eq!(unlit.light, 0.0);
        assert!((lit.world - unlit.world).length() > 1e-4);

        // The meadow preset only lights blades near the disturbance
        let lit = shade_vertex(tip, &sample, &near, &profile());
        let unlit = shade_vertex(tip, &sample, &far, &profile());
        assert!(lit.light > 0.0);
        assert!((lit.world - unlit.world).length() < 1e-6);
    }

    #[test]
    fn test_shade_instances_with_evolved_curl() {
        let cfg = BakeConfig { count: 2000, ..Default::default() };
        let field = Baker::bake(&cfg).unwrap();
        let curl = CurlField::new(9, CurlParams::default())
            .evolve(&field.attributes().curl_seed, field.layout(), 1.0);
        let mesh = BladeMesh::standard();
        let out = shade_instances(&field, &curl, mesh.tip().unwrap(), &FrameUniforms::default(), &profile());
        assert_eq!(out.len(), 2000);
        assert!(out.iter().all(|o| o.world.is_finite() && o.clip.is_finite()));
        assert!(out.iter().all(|o| (0.0..=1.0).contains(&o.dry)));
    }

    #[test]
    fn test_instance_matrix_matches_baked_transform() {
        let field = Baker::bake(&BakeConfig { count: 100, ..Default::default() }).unwrap();
        let curl = Vec4Texture::new(field.layout());
        for id in [0, 42, 99] {
            let sample = fetch_instance(&field, &curl, id).unwrap();
            let baked = field.transform(id).unwrap();
            let d = sample.matrix() - baked.matrix();
            for col in 0..4 {
                assert!(d.col(col).length() < 1e-6);
            }
        }
        assert!(fetch_instance(&field, &curl, 100).is_none());
    }
}
