use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::cards::{self, Card, CARD_COUNT};
use crate::choreo::{self, Phase, Timeline};
use crate::interact::{self, HoverState, Tilt, CARD_H, CARD_W};
use crate::options::LaunchOptions;
use crate::overlay::{CardScreen, Overlay, OverlaySnapshot};
use crate::quality::QualityController;
use crate::render::instance::SpriteInstance;
use crate::render::ribbon::{RibbonBuilder, TRAIL_GRADIENT};
use crate::render::GpuState;
use crate::sim::HeroSim;
use crate::util::timer::{FramePhase, FrameTimers};

/// Initial window size (logical points).
const WINDOW_W: f64 = 1280.0;
const WINDOW_H: f64 = 720.0;
/// Frame delta clamp — a backgrounded or stalled frame resumes smoothly
/// instead of integrating a huge step.
const MAX_FRAME_DT: f32 = 0.05;
/// Hovered card swell.
const HOVER_SCALE: f32 = 1.04;
/// Sparkle emission gates near the trail head.
const SPARKLE_MIN_FADE: f32 = 0.3;
const SPARKLE_MIN_SPEED: f32 = 8.0;

/// Top-level application state. Owns every subsystem; the frame pass in
/// `RedrawRequested` is the only place simulation state mutates.
struct App {
    options: LaunchOptions,
    rng: fastrand::Rng,
    cards: Vec<Card>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<Overlay>,

    /// None under reduced motion, or until the surface has area.
    sim: Option<HeroSim>,
    timeline: Timeline,
    hover: HoverState,
    tilt: Tilt,
    quality: QualityController,

    /// Latest pointer position in logical points (event-written).
    cursor: Vec2,
    cursor_on_surface: bool,

    scale_factor: f64,
    surface: Vec2,

    last_frame_time: Option<Instant>,
    timers: FrameTimers,

    // Reusable per-frame buffers (avoid per-frame allocation).
    bg_instances: Vec<SpriteInstance>,
    fg_instances: Vec<SpriteInstance>,
    ribbon: RibbonBuilder,
}

impl App {
    fn new(options: LaunchOptions) -> Self {
        let rng = options.rng();
        let cards = cards::load(options.cards_path.as_deref());

        let mut timeline = Timeline::new();
        if options.reduced_motion {
            timeline.jump_to_settled();
        }

        Self {
            options,
            rng,
            cards,
            window: None,
            gpu: None,
            overlay: None,
            sim: None,
            timeline,
            hover: HoverState::new(),
            tilt: Tilt::new(),
            quality: QualityController::new(),
            cursor: Vec2::new(-100.0, -100.0),
            cursor_on_surface: false,
            scale_factor: 1.0,
            surface: Vec2::ZERO,
            last_frame_time: None,
            timers: FrameTimers::new(),
            bg_instances: Vec::with_capacity(16),
            fg_instances: Vec::with_capacity(128),
            ribbon: RibbonBuilder::new(),
        }
    }

    fn restart_choreography(&mut self) {
        if self.options.reduced_motion {
            self.timeline.jump_to_settled();
        } else {
            self.timeline.replay();
        }
        self.hover.set(None);
    }

    fn navigate(&self, link: &str) {
        // Navigation is owned by the surrounding page; the engine only
        // reports the target.
        log::info!("navigate: {link}");
    }

    /// One simulation + render pass. Exactly one of these runs per redraw.
    fn frame(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if self.gpu.is_none() {
            return;
        }

        // --- Timing ---
        let now = Instant::now();
        let dt_raw = self
            .last_frame_time
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame_time = Some(now);
        let dt = dt_raw.min(MAX_FRAME_DT);

        if let Some(overlay) = &mut self.overlay {
            overlay.record_frame(dt_raw as f64);
        }
        self.quality.record_frame(dt);

        // Not laid out yet: skip the whole frame, retry next redraw.
        if self.surface.x <= 0.0 || self.surface.y <= 0.0 {
            return;
        }

        // Lazy simulator init, once the surface has area.
        if self.sim.is_none() && !self.options.reduced_motion {
            self.sim = Some(HeroSim::new(self.surface, &mut self.rng));
            log::info!("trail/orb simulator initialized ({}x{})", self.surface.x, self.surface.y);
        }

        let center = self.surface * 0.5;

        // --- Choreography ---
        self.timers.begin();
        let entered = self.timeline.advance(dt);
        for phase in &entered {
            log::debug!("choreography phase -> {phase:?}");
            if *phase == Phase::Exploding {
                if let Some(sim) = &mut self.sim {
                    let accents: Vec<_> = self.cards.iter().map(|c| c.accent).collect();
                    sim.effects
                        .spawn_center_blast(center, &accents, &mut self.rng);
                }
            }
        }
        self.timers.end(FramePhase::Choreograph);

        // --- Interaction ---
        let parallax = self.tilt.parallax();
        let hovered = if self.timeline.phase() == Phase::Settled && self.cursor_on_surface {
            interact::hit_test(center, parallax, self.cursor)
        } else {
            None
        };
        self.hover.set(hovered);

        let tilt_input = self
            .cursor_on_surface
            .then_some(self.cursor - center);
        self.tilt.step(tilt_input, dt);

        // --- Simulation ---
        let suppress = self.hover.suppress_trail();
        self.timers.begin();
        if let Some(sim) = &mut self.sim {
            sim.step(dt, self.surface, suppress, self.quality.preset(), &mut self.rng);
        }
        self.timers.end(FramePhase::Simulate);

        // --- Geometry ---
        self.timers.begin();
        let card_screens = self.build_geometry(center, parallax);
        self.timers.end(FramePhase::BuildGeometry);

        // --- GPU upload ---
        self.timers.begin();
        if let Some(gpu) = &mut self.gpu {
            gpu.update_sprites(&self.bg_instances, &self.fg_instances);
            gpu.update_ribbon(&self.ribbon);
        }
        self.timers.end(FramePhase::GpuUpload);

        // --- Overlay ---
        let counts = self.counts();
        self.timers.begin();
        let overlay_output = if let (Some(overlay), Some(gpu)) = (&mut self.overlay, &self.gpu) {
            let snapshot = OverlaySnapshot {
                cards: &self.cards,
                card_screens,
                hovered: self.hover.hovered(),
                occluded: self.hover.occluded(),
                settled: self.timeline.phase() == Phase::Settled,
                tier: self.quality.tier(),
                mean_fps: self.quality.mean_fps(),
                timer_durations_us: self.timers.durations_us,
                counts,
                seed: self.options.seed,
                reduced_motion: self.options.reduced_motion,
            };
            Some(overlay.run_frame(
                &window,
                gpu.surface_config.width,
                gpu.surface_config.height,
                &snapshot,
            ))
        } else {
            None
        };
        self.timers.end(FramePhase::Overlay);

        if let Some((_, _, _, response)) = &overlay_output {
            if response.replay {
                self.restart_choreography();
            }
            if let Some(link) = &response.navigate {
                self.navigate(link);
            }
            if response.force_tier_changed {
                let forced = self.overlay.as_ref().and_then(|o| o.forced_tier());
                self.quality.set_override(forced);
            }
        }

        // --- Render ---
        self.timers.begin();
        if let (Some(gpu), Some(overlay)) = (&mut self.gpu, &mut self.overlay) {
            let Some(frame) = gpu.begin_frame() else {
                self.timers.end(FramePhase::RenderSubmit);
                return;
            };
            let mut encoder = frame.encoder;
            gpu.draw_background(&mut encoder, &frame.view);
            gpu.draw_ribbon(&mut encoder, &frame.view);
            gpu.draw_foreground(&mut encoder, &frame.view);

            let mut extra_cmd_bufs = Vec::new();
            if let Some((primitives, textures_delta, screen_descriptor, _)) = &overlay_output {
                extra_cmd_bufs = overlay.prepare_egui(
                    &gpu.device,
                    &gpu.queue,
                    &mut encoder,
                    primitives,
                    textures_delta,
                    screen_descriptor,
                );
                let mut pass = GpuState::begin_egui_pass(&mut encoder, &frame.view);
                overlay.render_egui(&mut pass, primitives, screen_descriptor);
            }

            gpu.finish_frame(encoder, frame.output, extra_cmd_bufs);

            if let Some((_, textures_delta, _, _)) = &overlay_output {
                overlay.free_textures(textures_delta);
            }
        }
        self.timers.end(FramePhase::RenderSubmit);
    }

    /// Build this frame's sprite instances and ribbon vertices. Returns
    /// the on-screen card placements for the overlay.
    fn build_geometry(&mut self, center: Vec2, parallax: Vec2) -> [CardScreen; CARD_COUNT] {
        self.bg_instances.clear();
        self.fg_instances.clear();

        let preset = self.quality.preset();

        // Ambient pulse behind everything; static under reduced motion.
        let (pulse_scale, pulse_alpha) = if self.options.reduced_motion {
            (1.0, 0.4)
        } else {
            choreo::ambient_pulse(self.timeline.elapsed())
        };
        self.bg_instances
            .push(SpriteInstance::ambient_glow(center, pulse_scale, pulse_alpha));

        if let Some(sim) = &self.sim {
            for orb in sim.orbs.orbs().iter().filter(|o| o.alive) {
                self.bg_instances
                    .push(SpriteInstance::from_orb(orb, preset.orb_glow));
            }

            self.ribbon.build(&sim.trail, preset);

            if preset.sparkles
                && sim.trail.len() > 0
                && sim.trail.fade > SPARKLE_MIN_FADE
                && sim.pointer.speed > SPARKLE_MIN_SPEED
            {
                if let Some(head) = sim.trail.points().front() {
                    let angle = self.rng.f32() * std::f32::consts::TAU;
                    let dist = 8.0 + self.rng.f32() * 14.0;
                    let pos = head.pos + Vec2::new(angle.cos(), angle.sin()) * dist;
                    let color = crate::anim::gradient_color(&TRAIL_GRADIENT, self.rng.f32() * 0.3);
                    self.fg_instances.push(SpriteInstance::sparkle(
                        pos,
                        color,
                        0.4 * sim.trail.fade,
                    ));
                }
            }

            for burst in sim.effects.bursts() {
                self.fg_instances.push(SpriteInstance::from_burst(burst));
            }
            for ring in sim.effects.rings() {
                self.fg_instances.push(SpriteInstance::from_ring(ring));
            }
        } else {
            self.ribbon.clear();
        }

        if let Some((scale, alpha)) =
            choreo::center_glow(self.timeline.phase(), self.timeline.time_in_phase())
        {
            self.fg_instances
                .push(SpriteInstance::center_glow(center, scale, alpha));
        }

        // Cards: hovered card renders last so it sits on top.
        let mut screens = [CardScreen {
            pos: center,
            scale: 0.0,
            opacity: 0.0,
        }; CARD_COUNT];

        let hovered = self.hover.hovered();
        let occluded = self.hover.occluded();
        let order = (0..self.cards.len().min(CARD_COUNT))
            .filter(|i| Some(*i) != hovered)
            .chain(hovered.into_iter());

        for i in order {
            let card = &self.cards[i];
            let pose = choreo::pose(i, self.timeline.phase(), self.timeline.time_in_phase());

            let is_hovered = hovered == Some(i);
            let scale = pose.scale * if is_hovered { HOVER_SCALE } else { 1.0 };
            let pos = center + pose.offset + parallax;
            screens[i] = CardScreen {
                pos,
                scale,
                opacity: pose.opacity,
            };

            if pose.opacity <= 0.001 || scale <= 0.001 {
                continue;
            }

            let rot = pose.rotation_rad();
            let hover_glow = if is_hovered { 1.0 } else { 0.0 };
            self.fg_instances.push(SpriteInstance::card_body(
                pos,
                Vec2::new(CARD_W, CARD_H) * scale,
                card.accent,
                pose.opacity,
                rot,
                hover_glow,
            ));

            // Front face (icon chip + glyph) hides while this card is the
            // hovered neighbor's occluded partner.
            if occluded == Some(i) && !is_hovered {
                continue;
            }
            let chip_offset = Vec2::from_angle(rot).rotate(Vec2::new(0.0, -38.0)) * scale;
            self.fg_instances.push(SpriteInstance::icon_chip(
                pos + chip_offset,
                54.0 * scale,
                card.accent,
                pose.opacity,
                rot,
            ));
            self.fg_instances.push(SpriteInstance::icon(
                card.icon,
                pos + chip_offset,
                28.0 * scale,
                card.accent,
                pose.opacity,
                rot,
            ));
        }

        screens
    }

    fn counts(&self) -> (usize, usize, usize, usize) {
        match &self.sim {
            Some(sim) => {
                let (bursts, rings) = sim.effects.counts();
                (sim.trail.len(), sim.orbs.live_count(), bursts, rings)
            }
            None => (0, 0, 0, 0),
        }
    }

    fn set_surface_size(&mut self, physical_w: u32, physical_h: u32) {
        self.surface = Vec2::new(
            (physical_w as f64 / self.scale_factor) as f32,
            (physical_h as f64 / self.scale_factor) as f32,
        );
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(physical_w, physical_h);
            gpu.set_logical_size(self.surface.x, self.surface.y);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("herofx")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_W, WINDOW_H));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.scale_factor = window.scale_factor();

        let gpu = match GpuState::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("GPU init failed: {e}");
                event_loop.exit();
                return;
            }
        };
        self.overlay = Some(Overlay::new(&window, &gpu));
        self.gpu = Some(gpu);

        let size = window.inner_size();
        self.set_surface_size(size.width, size.height);

        log::info!(
            "window created: {}x{} (scale {}), {} cards, reduced_motion={}",
            size.width,
            size.height,
            self.scale_factor,
            self.cards.len(),
            self.options.reduced_motion,
        );

        event_loop.set_control_flow(ControlFlow::Poll);
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The overlay sees every event first; consumed events (clicks on
        // the detail panel or HUD) never reach the scene below.
        let consumed = match (&mut self.overlay, &self.window) {
            (Some(overlay), Some(window)) => overlay.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.set_surface_size(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.set_surface_size(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.scale_factor);
                let pos = Vec2::new(logical.x as f32, logical.y as f32);
                if !consumed {
                    self.cursor = pos;
                    self.cursor_on_surface = true;
                    if let Some(sim) = &mut self.sim {
                        sim.pointer.moved(pos);
                    }
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_on_surface = false;
                if let Some(sim) = &mut self.sim {
                    sim.pointer.left();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if !consumed {
                    if let Some(nav) = interact::click(&self.hover, &self.cards) {
                        self.navigate(&nav.link);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => {
                            log::info!("ESC pressed, exiting");
                            event_loop.exit();
                        }
                        PhysicalKey::Code(KeyCode::F12) => {
                            if let Some(overlay) = &mut self.overlay {
                                overlay.toggle_hud();
                            }
                        }
                        PhysicalKey::Code(KeyCode::KeyR) => {
                            log::info!("replaying card entrance");
                            self.restart_choreography();
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(reduced_motion: bool) -> LaunchOptions {
        LaunchOptions {
            reduced_motion,
            seed: Some(1),
            cards_path: None,
        }
    }

    #[test]
    fn reduced_motion_never_constructs_the_simulator() {
        let app = App::new(options(true));
        assert!(app.sim.is_none());
        assert_eq!(app.timeline.phase(), Phase::Settled);
    }

    #[test]
    fn replay_honors_reduced_motion() {
        let mut app = App::new(options(true));
        app.restart_choreography();
        assert_eq!(app.timeline.phase(), Phase::Settled);

        let mut app = App::new(options(false));
        app.timeline.advance(5.0);
        app.restart_choreography();
        assert_eq!(app.timeline.phase(), Phase::Hidden);
    }

    #[test]
    fn fallback_cards_are_loaded_at_construction() {
        let app = App::new(options(false));
        assert_eq!(app.cards.len(), CARD_COUNT);
    }
}

/// Entry point — create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let options = LaunchOptions::from_env();
    log::info!(
        "launch options: reduced_motion={}, seed={:?}, cards={:?}",
        options.reduced_motion,
        options.seed,
        options.cards_path,
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;
    Ok(())
}
