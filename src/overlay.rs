//! egui overlay: the text the sprite pass doesn't draw (card labels and
//! the hover detail panel) plus an F12 debug HUD.

use glam::Vec2;
use winit::window::Window;

use crate::anim::Rgb;
use crate::cards::{Card, CARD_COUNT};
use crate::interact::{panel_side, PanelSide, CARD_H, CARD_W};
use crate::quality::QualityTier;
use crate::render::GpuState;
use crate::util::ring::RingBuffer;
use crate::util::timer::FramePhase;

/// Number of frame times in the HUD histogram.
const FRAME_HISTORY_LEN: usize = 300;

/// Detail panel dimensions (matches the card art direction).
const PANEL_W: f32 = 240.0;
const PANEL_H: f32 = 210.0;

/// On-screen card state the overlay needs each frame.
#[derive(Debug, Clone, Copy)]
pub struct CardScreen {
    /// Card center in logical pixels.
    pub pos: Vec2,
    pub scale: f32,
    pub opacity: f32,
}

/// Read-only inputs for one overlay frame.
pub struct OverlaySnapshot<'a> {
    pub cards: &'a [Card],
    pub card_screens: [CardScreen; CARD_COUNT],
    pub hovered: Option<usize>,
    pub occluded: Option<usize>,
    /// Labels and panels only appear once the choreography settles.
    pub settled: bool,
    pub tier: QualityTier,
    pub mean_fps: f32,
    pub timer_durations_us: [f64; 6],
    /// (trail points, live orbs, bursts, rings)
    pub counts: (usize, usize, usize, usize),
    pub seed: Option<u64>,
    pub reduced_motion: bool,
}

/// What the overlay asked the app to do this frame.
#[derive(Debug, Default)]
pub struct OverlayResponse {
    pub replay: bool,
    pub navigate: Option<String>,
    pub force_tier_changed: bool,
}

const TIER_LABELS: [&str; 4] = ["Auto", "High", "Medium", "Low"];

fn tier_from_index(index: usize) -> Option<QualityTier> {
    match index {
        1 => Some(QualityTier::High),
        2 => Some(QualityTier::Medium),
        3 => Some(QualityTier::Low),
        _ => None,
    }
}

fn accent32(accent: Rgb, alpha: f32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(
        accent[0] as u8,
        accent[1] as u8,
        accent[2] as u8,
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// egui context plus HUD state.
pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub hud_visible: bool,

    /// Rolling window of frame times (seconds).
    frame_times: RingBuffer<f32>,
    fps: f64,
    frame_time_avg: f64,

    force_tier_index: usize,

    // Periodic log accumulator.
    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
}

impl Overlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            hud_visible: false,
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            force_tier_index: 0,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt as f32);

        let len = self.frame_times.len();
        if len > 0 {
            let sum: f32 = self.frame_times.iter().sum();
            self.frame_time_avg = (sum / len as f32) as f64;
            self.fps = 1.0 / self.frame_time_avg.max(1e-6);
        }

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_timer += dt;
        if self.log_timer >= 5.0 {
            let avg_ms = (self.log_frame_sum / self.log_frame_count as f64) * 1000.0;
            let fps = self.log_frame_count as f64 / self.log_timer;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
        }
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    pub fn toggle_hud(&mut self) {
        self.hud_visible = !self.hud_visible;
    }

    /// Quality override selected in the HUD.
    pub fn forced_tier(&self) -> Option<QualityTier> {
        tier_from_index(self.force_tier_index)
    }

    /// Run the egui frame and produce paint output plus app requests.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        snapshot: &OverlaySnapshot,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
        OverlayResponse,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let mut response = OverlayResponse::default();
        let hud = HudSnapshot {
            visible: self.hud_visible,
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_times: self.frame_times.iter().copied().collect(),
            tier: snapshot.tier,
            mean_fps: snapshot.mean_fps,
            timer_durations_us: snapshot.timer_durations_us,
            counts: snapshot.counts,
            seed: snapshot.seed,
            reduced_motion: snapshot.reduced_motion,
        };
        let mut force_tier_index = self.force_tier_index;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_cards(ctx, snapshot, &mut response);
            draw_hud(ctx, &hud, &mut force_tier_index, &mut response);
        });

        if force_tier_index != self.force_tier_index {
            self.force_tier_index = force_tier_index;
            response.force_tier_changed = true;
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (
            clipped_primitives,
            full_output.textures_delta,
            screen_descriptor,
            response,
        )
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// Card labels + detail panel
// ---------------------------------------------------------------------------

fn draw_cards(ctx: &egui::Context, s: &OverlaySnapshot, response: &mut OverlayResponse) {
    if !s.settled {
        return;
    }

    for (i, card) in s.cards.iter().enumerate().take(CARD_COUNT) {
        let screen = &s.card_screens[i];
        // Text only reads once the card is essentially full size.
        if screen.scale < 0.85 || screen.opacity < 0.5 {
            continue;
        }
        // The occluded neighbor's front face is hidden while a hover lasts.
        if s.occluded == Some(i) && s.hovered != Some(i) {
            continue;
        }

        let alpha = screen.opacity;
        egui::Area::new(egui::Id::new(("card_label", i)))
            .fixed_pos([screen.pos.x, screen.pos.y + 28.0])
            .pivot(egui::Align2::CENTER_CENTER)
            .interactable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&card.label)
                            .strong()
                            .size(14.0)
                            .color(accent32(card.accent, 0.87 * alpha)),
                    );
                    ui.label(
                        egui::RichText::new(&card.subtitle)
                            .size(10.0)
                            .color(accent32(card.accent, 0.31 * alpha)),
                    );
                });
            });
    }

    if let Some(i) = s.hovered {
        draw_detail_panel(ctx, s, i, response);
    }
}

fn draw_detail_panel(
    ctx: &egui::Context,
    s: &OverlaySnapshot,
    index: usize,
    response: &mut OverlayResponse,
) {
    let card = &s.cards[index];
    let screen = &s.card_screens[index];

    let panel_x = match panel_side(index) {
        PanelSide::Left => screen.pos.x - CARD_W * 0.5 - PANEL_W - 2.0,
        PanelSide::Right => screen.pos.x + CARD_W * 0.5 + 2.0,
    };
    let panel_y = screen.pos.y - CARD_H * 0.5;

    let frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(16, 16, 22, 247))
        .stroke(egui::Stroke::new(1.0, accent32(card.accent, 0.15)))
        .corner_radius(12.0)
        .inner_margin(14.0);

    egui::Window::new("card_detail")
        .id(egui::Id::new(("card_panel", index)))
        .title_bar(false)
        .fixed_pos([panel_x, panel_y])
        .fixed_size([PANEL_W - 28.0, PANEL_H - 28.0])
        .resizable(false)
        .frame(frame)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(&card.detail)
                    .size(13.0)
                    .color(accent32(card.accent, 0.56)),
            );
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(format!("Duration: {}", card.duration))
                    .size(12.0)
                    .color(accent32(card.accent, 0.44)),
            );
            ui.label(
                egui::RichText::new(format!("{} students", card.population))
                    .size(12.0)
                    .color(accent32(card.accent, 0.44)),
            );
            ui.add_space(8.0);
            let cta = egui::Button::new(
                egui::RichText::new("Learn more →")
                    .size(12.0)
                    .strong()
                    .color(accent32(card.accent, 1.0)),
            )
            .fill(accent32(card.accent, 0.09))
            .stroke(egui::Stroke::new(1.0, accent32(card.accent, 0.15)));
            if ui.add(cta).clicked() {
                response.navigate = Some(card.link.clone());
            }
        });
}

// ---------------------------------------------------------------------------
// Debug HUD (F12)
// ---------------------------------------------------------------------------

struct HudSnapshot {
    visible: bool,
    fps: f64,
    frame_time_avg: f64,
    frame_times: Vec<f32>,
    tier: QualityTier,
    mean_fps: f32,
    timer_durations_us: [f64; 6],
    counts: (usize, usize, usize, usize),
    seed: Option<u64>,
    reduced_motion: bool,
}

fn draw_hud(
    ctx: &egui::Context,
    s: &HudSnapshot,
    force_tier_index: &mut usize,
    response: &mut OverlayResponse,
) {
    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(300.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            ui.label(format!(
                "FPS: {:.1} ({:.2}ms avg)",
                s.fps,
                s.frame_time_avg * 1000.0
            ));
            ui.label(format!(
                "Quality: {} (rolling mean {:.0} fps)",
                s.tier.label(),
                s.mean_fps
            ));
            ui.add_space(4.0);

            // --- Frame time histogram ---
            if !s.frame_times.is_empty() {
                let max_time = s.frame_times.iter().copied().fold(0.0f32, f32::max).max(0.020);

                let (resp, painter) =
                    ui.allocate_painter(egui::vec2(280.0, 50.0), egui::Sense::hover());
                let rect = resp.rect;
                let bar_width = rect.width() / s.frame_times.len() as f32;

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    let color = if t > 0.01667 {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width, rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }
            }
            ui.add_space(4.0);

            // --- Frame timers ---
            ui.heading("Frame Timers");
            let max_us = s
                .timer_durations_us
                .iter()
                .copied()
                .fold(0.0f64, f64::max)
                .max(1.0);
            for phase in FramePhase::ALL {
                let us = s.timer_durations_us[phase as usize];
                let bar_frac = (us / max_us) as f32;
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("{:<10}", phase.label())).monospace());
                    ui.label(egui::RichText::new(format!("{us:>6.0}us")).monospace());
                    let (resp, painter) =
                        ui.allocate_painter(egui::vec2(70.0, 12.0), egui::Sense::hover());
                    let r = resp.rect;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            r.left_top(),
                            egui::pos2(r.left() + r.width() * bar_frac, r.bottom()),
                        ),
                        2.0,
                        egui::Color32::from_rgb(100, 180, 255),
                    );
                });
            }
            let total: f64 = s.timer_durations_us.iter().sum();
            ui.label(
                egui::RichText::new(format!("Total: {total:.0}us ({:.2}ms)", total / 1000.0))
                    .monospace(),
            );
            ui.add_space(4.0);

            // --- Controls ---
            ui.heading("Controls");
            ui.horizontal(|ui| {
                ui.label("Quality:");
                egui::ComboBox::from_id_salt("force_tier")
                    .selected_text(TIER_LABELS[*force_tier_index])
                    .show_ui(ui, |ui| {
                        for (i, label) in TIER_LABELS.iter().enumerate() {
                            ui.selectable_value(force_tier_index, i, *label);
                        }
                    });
            });
            if ui.button("Replay entrance").clicked() {
                response.replay = true;
            }
            ui.add_space(4.0);

            // --- Info ---
            ui.heading("Info");
            let (points, orbs, bursts, rings) = s.counts;
            ui.label(format!(
                "Trail: {points} pts | Orbs: {orbs} | Bursts: {bursts} | Rings: {rings}"
            ));
            match s.seed {
                Some(seed) => ui.label(format!("Seed: {seed}")),
                None => ui.label("Seed: entropy"),
            };
            if s.reduced_motion {
                ui.label("Reduced motion: simulator disabled");
            }
            ui.label("F12: HUD | R: Replay | ESC: Quit");
        });
}
