//! The pointer trail as a tapered, color-graded ribbon. The CPU resamples
//! the point FIFO through a Catmull-Rom spline and emits a triangle strip;
//! an optional wide low-alpha strip underneath stands in for canvas blur.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::ops::Range;

use crate::anim::{catmull_rom, gradient_color, Rgb};
use crate::quality::QualityPreset;
use crate::sim::trail::{TrailField, POINT_LIFETIME};

/// Head-to-tail hue stops. Position along the trail picks the color, not
/// time, so the gradient reads the same at any trail length.
pub const TRAIL_GRADIENT: [Rgb; 5] = [
    [228.0, 77.0, 144.0],
    [168.0, 85.0, 247.0],
    [139.0, 92.0, 246.0],
    [59.0, 130.0, 246.0],
    [6.0, 182.0, 212.0],
];

/// Taper exponent — width and alpha fall off toward the tail.
const TAPER_EXP: f32 = 0.4;
/// Base alpha of the main ribbon.
const RIBBON_ALPHA: f32 = 0.7;
/// Alpha of the glow strip.
const GLOW_ALPHA: f32 = 0.1;

/// Enough for a full-length trail at the High tier's sampling density,
/// glow strip included.
pub const MAX_RIBBON_VERTICES: usize = 1024;

/// Per-vertex data for the ribbon strips.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 2],
    /// Premultiplied RGBA.
    pub color: [f32; 4],
}

/// CPU-side strip builder. Reused across frames to keep the allocation.
pub struct RibbonBuilder {
    verts: Vec<RibbonVertex>,
    centers: Vec<Vec2>,
    glow: Range<u32>,
    main: Range<u32>,
}

impl RibbonBuilder {
    pub fn new() -> Self {
        Self {
            verts: Vec::with_capacity(MAX_RIBBON_VERTICES),
            centers: Vec::with_capacity(MAX_RIBBON_VERTICES / 2),
            glow: 0..0,
            main: 0..0,
        }
    }

    /// Drop this frame's geometry (simulator disabled or trail empty).
    pub fn clear(&mut self) {
        self.verts.clear();
        self.centers.clear();
        self.glow = 0..0;
        self.main = 0..0;
    }

    /// Rebuild both strips for this frame.
    pub fn build(&mut self, trail: &TrailField, preset: &QualityPreset) {
        self.clear();

        let points = trail.points();
        let n = points.len();
        if n < 3 || trail.fade <= 0.0 {
            return;
        }

        let total_segs = (((n - 1) as f32) * preset.trail_segment_mult).floor() as usize;
        if total_segs == 0 {
            return;
        }

        // Spline centers, head (t=0) to tail (t=1).
        for s in 0..=total_segs {
            let t = s as f32 / total_segs as f32;
            let idx = t * (n - 1) as f32;
            let ii = (idx.floor() as usize).min(n - 1);
            let frac = idx - ii as f32;
            let i0 = ii.saturating_sub(1);
            let i2 = (ii + 1).min(n - 1);
            let i3 = (ii + 2).min(n - 1);
            self.centers.push(Vec2::new(
                catmull_rom(points[i0].pos.x, points[ii].pos.x, points[i2].pos.x, points[i3].pos.x, frac),
                catmull_rom(points[i0].pos.y, points[ii].pos.y, points[i2].pos.y, points[i3].pos.y, frac),
            ));
        }

        if preset.glow_ribbon && preset.glow_width > 0.0 {
            let start = self.verts.len() as u32;
            let color = gradient_color(&TRAIL_GRADIENT, 0.5);
            let alpha = GLOW_ALPHA * trail.fade;
            let half = preset.glow_width * trail.boost * 0.5;
            self.emit_strip(|_t| (half, color, alpha));
            self.glow = start..self.verts.len() as u32;
        }

        let start = self.verts.len() as u32;
        let fade = trail.fade;
        let boost = trail.boost;
        let width = preset.trail_width;
        self.emit_strip(|t| {
            let taper = (1.0 - t).powf(TAPER_EXP);
            let point = &points[((t * (n - 1) as f32) as usize).min(n - 1)];
            let age = (point.age / POINT_LIFETIME).clamp(0.0, 1.0);
            let age_fade = (1.0 - age * age).max(0.0);
            let alpha = age_fade * taper * RIBBON_ALPHA * fade;
            (width * boost * taper * 0.5, gradient_color(&TRAIL_GRADIENT, t), alpha)
        });
        self.main = start..self.verts.len() as u32;
    }

    /// Emit one strip along `centers`; `attrs(t)` yields half-width,
    /// color, alpha per sample.
    fn emit_strip(&mut self, mut attrs: impl FnMut(f32) -> (f32, Rgb, f32)) {
        let count = self.centers.len();
        let mut last_normal = Vec2::new(0.0, 1.0);
        for s in 0..count {
            let t = s as f32 / (count - 1).max(1) as f32;
            let prev = self.centers[s.saturating_sub(1)];
            let next = self.centers[(s + 1).min(count - 1)];
            let dir = next - prev;
            let normal = if dir.length_squared() > 1e-6 {
                last_normal = Vec2::new(-dir.y, dir.x).normalize();
                last_normal
            } else {
                last_normal
            };

            let (half_width, color, alpha) = attrs(t);
            let premul = [
                color[0] / 255.0 * alpha,
                color[1] / 255.0 * alpha,
                color[2] / 255.0 * alpha,
                alpha,
            ];
            let center = self.centers[s];
            for side in [-1.0f32, 1.0] {
                self.verts.push(RibbonVertex {
                    position: (center + normal * half_width * side).into(),
                    color: premul,
                });
            }
        }
    }

    pub fn vertices(&self) -> &[RibbonVertex] {
        &self.verts
    }

    /// Vertex ranges for the two draw calls (glow beneath, main on top).
    pub fn ranges(&self) -> (Range<u32>, Range<u32>) {
        (self.glow.clone(), self.main.clone())
    }
}

/// GPU pipeline for the ribbon strips.
pub struct RibbonPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub screen_bind_group: wgpu::BindGroup,
    pub glow_range: Range<u32>,
    pub main_range: Range<u32>,
}

impl RibbonPipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        screen_uniform_buffer: &wgpu::Buffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ribbon_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ribbon.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ribbon_screen_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ribbon_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RibbonVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 8,
                    shader_location: 1,
                },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ribbon_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ribbon_vertex_buffer"),
            size: (MAX_RIBBON_VERTICES * std::mem::size_of::<RibbonVertex>())
                as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ribbon_screen_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            vertex_buffer,
            screen_bind_group,
            glow_range: 0..0,
            main_range: 0..0,
        }
    }

    pub fn update_vertices(&mut self, queue: &wgpu::Queue, builder: &RibbonBuilder) {
        let verts = builder.vertices();
        let count = verts.len().min(MAX_RIBBON_VERTICES);
        let (glow, main) = builder.ranges();
        self.glow_range = glow.start.min(count as u32)..glow.end.min(count as u32);
        self.main_range = main.start.min(count as u32)..main.end.min(count as u32);
        if count > 0 {
            queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&verts[..count]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityTier;
    use crate::sim::pointer::PointerState;

    fn driven_trail(frames: usize) -> TrailField {
        let mut trail = TrailField::new();
        let mut pointer = PointerState::new();
        for i in 0..frames {
            pointer.moved(Vec2::new(i as f32 * 25.0, 200.0 + (i as f32 * 0.3).sin() * 40.0));
            pointer.step();
            trail.step(1.0 / 60.0, &pointer, false);
        }
        trail
    }

    #[test]
    fn too_few_points_build_nothing() {
        let trail = TrailField::new();
        let mut builder = RibbonBuilder::new();
        builder.build(&trail, QualityTier::High.preset());
        assert!(builder.vertices().is_empty());
    }

    #[test]
    fn strip_tapers_toward_the_tail() {
        let trail = driven_trail(40);
        let mut builder = RibbonBuilder::new();
        builder.build(&trail, QualityTier::Medium.preset());
        let (_, main) = builder.ranges();
        assert!(main.end > main.start);

        let verts = builder.vertices();
        let pair_width = |i: usize| {
            let a = Vec2::from(verts[i].position);
            let b = Vec2::from(verts[i + 1].position);
            (a - b).length()
        };
        let head = pair_width(main.start as usize);
        let tail = pair_width(main.end as usize - 2);
        assert!(head > tail);
    }

    #[test]
    fn glow_strip_only_on_high() {
        let trail = driven_trail(40);
        let mut builder = RibbonBuilder::new();

        builder.build(&trail, QualityTier::High.preset());
        let (glow, _) = builder.ranges();
        assert!(glow.end > glow.start);

        builder.build(&trail, QualityTier::Medium.preset());
        let (glow, main) = builder.ranges();
        assert_eq!(glow.len(), 0);
        assert!(main.end > main.start);
    }

    #[test]
    fn low_tier_halves_the_sampling() {
        let trail = driven_trail(40);
        let mut builder = RibbonBuilder::new();
        builder.build(&trail, QualityTier::High.preset());
        let high_count = builder.vertices().len();
        builder.build(&trail, QualityTier::Low.preset());
        let low_count = builder.vertices().len();
        assert!(low_count < high_count);
        assert!(low_count > 0);
    }

    #[test]
    fn vertex_budget_holds_for_a_full_trail() {
        let trail = driven_trail(400);
        let mut builder = RibbonBuilder::new();
        builder.build(&trail, QualityTier::High.preset());
        assert!(builder.vertices().len() <= MAX_RIBBON_VERTICES);
    }
}
