//! Bake a grass field, evolve its curl field once and shade every blade tip.
//!
//! Usage: cargo run --release --bin bake_field -- [--quality low|medium|high]
//!        [--count N] [--seed N] [--grid] [--sphere] [--config FILE]
//!        [--profile NAME] [--time T] [--gpu]

use std::path::PathBuf;
use std::time::Instant;

use glam::{Mat4, Vec3};

use meadow::core::error::Error;
use meadow::core::types::Result;
use meadow::generation::curl::{CurlField, CurlParams};
use meadow::generation::sampler::{SamplingPattern, Surface};
use meadow::grass::shading::{self, FrameUniforms};
use meadow::grass::{BakeConfig, BladeMask, BladeMesh, GrassField, Quality, ShadingProfileTable};
use meadow::math::Ray;
use meadow::render::{GpuContext, GrassGpuField, GrassPipeline};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const FRAME_SIZE: u32 = 512;

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    match flag_value(args, flag) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid value '{}' for {}", v, flag))),
        None => Ok(None),
    }
}

fn build_config(args: &[String]) -> Result<BakeConfig> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => BakeConfig::load(&PathBuf::from(path))?,
        None => BakeConfig::default(),
    };

    if let Some(name) = flag_value(args, "--quality") {
        let quality = Quality::from_name(name)
            .ok_or_else(|| Error::Config(format!("unknown quality '{}', expected low|medium|high", name)))?;
        config.count = quality.blade_count();
    }
    if let Some(count) = parse_flag(args, "--count")? {
        config.count = count;
    }
    if let Some(seed) = parse_flag(args, "--seed")? {
        config.seed = seed;
    }
    if let Some(seed) = parse_flag(args, "--distortion-seed")? {
        config.distortion_seed = seed;
    }
    if args.iter().any(|a| a == "--grid") {
        config.pattern = SamplingPattern::Grid;
    }
    if args.iter().any(|a| a == "--sphere") {
        config.surface = Surface::Sphere { radius: 1.0 };
    }
    config.validate()?;
    Ok(config)
}

fn run() -> Result<()> {
    meadow::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = build_config(&args)?;
    let time: f32 = parse_flag(&args, "--time")?.unwrap_or(0.0);

    let profiles = ShadingProfileTable::default();
    let default_profile = if matches!(config.surface, Surface::Sphere { .. }) { "planet" } else { "meadow" };
    let profile_name = flag_value(&args, "--profile").unwrap_or(default_profile);
    let profile = *profiles.get(profile_name).ok_or_else(|| {
        let known: Vec<&str> = profiles.names().collect();
        Error::Config(format!("unknown profile '{}', known: {}", profile_name, known.join(", ")))
    })?;

    println!("=== Baking {} blades ({:?} on {:?}) ===", config.count, config.pattern, config.surface);

    let mut field = GrassField::new(config);
    let baked = field.build()?;
    let layout = *baked.layout();

    let start = Instant::now();
    let curl = CurlField::new(baked.seeds().1, CurlParams::default())
        .evolve(&baked.attributes().curl_seed, &layout, time);
    log::info!("Evolved curl field in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    // Camera above the field looking at its center; pointer at screen center
    let eye = Vec3::new(0.0, 1.5, 3.0);
    let target = Vec3::ZERO;
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
    let view_proj = proj * view;
    let scale = 1.0;
    let disturbance = Ray::from_ndc(0.0, 0.0, &view_proj.inverse())
        .disturbance_point(0.0, scale)
        .unwrap_or(Vec3::splat(1.0e4));

    let frame = FrameUniforms {
        time,
        disturbance,
        facing: shading::facing_from_camera(glam::Quat::from_mat4(&view.inverse())),
        camera_target: target,
        scale,
        view_proj,
    };

    let mesh = BladeMesh::standard();
    let tip = mesh.tip().ok_or_else(|| Error::Config("blade template has no vertices".into()))?;

    let start = Instant::now();
    let tips = shading::shade_instances(baked, &curl, tip, &frame, &profile);
    let elapsed = start.elapsed();

    let lit = tips.iter().filter(|o| o.light > 0.0).count();
    let mean_dry = tips.iter().map(|o| o.dry).sum::<f32>() / tips.len().max(1) as f32;
    let (min, max) = tips.iter().fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), o| {
        (lo.min(o.world), hi.max(o.world))
    });

    println!("Attribute textures: {}x{}", layout.width(), layout.height());
    println!("Disturbance at ({:.3}, {:.3}, {:.3})", disturbance.x, disturbance.y, disturbance.z);
    println!("Shaded {} blade tips in {:.1}ms", tips.len(), elapsed.as_secs_f64() * 1000.0);
    println!("Lit by disturbance: {}", lit);
    println!("Mean dryness: {:.3}", mean_dry);
    println!("Tip bounds: {:?} .. {:?}", min, max);

    if args.iter().any(|a| a == "--gpu") {
        render_frame(baked, &curl, &mesh, &frame, &profile)?;
    }

    Ok(())
}

/// Upload the field and draw one offscreen frame.
fn render_frame(
    baked: &meadow::grass::BakedField,
    curl: &meadow::grass::Vec4Texture,
    mesh: &BladeMesh,
    frame: &FrameUniforms,
    profile: &meadow::grass::ShadingProfile,
) -> Result<()> {
    let ctx = GpuContext::new_blocking()?;
    let pipeline = GrassPipeline::new(&ctx.device, COLOR_FORMAT, Some(DEPTH_FORMAT));
    let mask = BladeMask::procedural(32, 128);
    let gpu_field = GrassGpuField::new(&ctx.device, &ctx.queue, &pipeline, baked, curl, mesh, &mask)?;
    gpu_field.update_uniforms(&ctx.queue, frame, profile);
    gpu_field.replace_curl(&ctx.queue, curl)?;

    let size = wgpu::Extent3d { width: FRAME_SIZE, height: FRAME_SIZE, depth_or_array_layers: 1 };
    let target = |label, format| {
        ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    };
    let color = target("frame_color", COLOR_FORMAT).create_view(&wgpu::TextureViewDescriptor::default());
    let depth = target("frame_depth", DEPTH_FORMAT).create_view(&wgpu::TextureViewDescriptor::default());

    let start = Instant::now();
    let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("grass_frame"),
    });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        gpu_field.draw(&mut pass, &pipeline);
    }
    ctx.queue.submit(std::iter::once(encoder.finish()));
    ctx.device
        .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
        .map_err(|e| Error::Gpu(e.to_string()))?;

    println!(
        "GPU: drew {} instances in {:.1}ms",
        gpu_field.instance_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("bake_field: {}", e);
        std::process::exit(1);
    }
}
