//! Adaptive quality: watch achieved frame rate, pick a tier that scales
//! rendering cost. Backpressure only — the loop itself never stops.

use crate::util::ring::RingBuffer;

/// Rolling FPS window length.
const WINDOW: usize = 30;
/// Re-evaluate the tier every this many frames.
const CHECK_INTERVAL: u64 = 30;
/// Minimum samples before the first evaluation.
const MIN_SAMPLES: usize = 10;
/// Mean FPS below this selects Low.
const LOW_FPS: f32 = 30.0;
/// Mean FPS below this (and at least LOW_FPS) selects Medium.
const MID_FPS: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

/// Per-tier rendering knobs. Low still draws a functioning trail — it
/// only sheds glow, sparkles, and particle volume.
pub struct QualityPreset {
    /// Ribbon samples per trail point.
    pub trail_segment_mult: f32,
    /// Draw the wide low-alpha glow ribbon behind the trail.
    pub glow_ribbon: bool,
    /// Radial-gradient orb glow vs flat disc.
    pub orb_glow: bool,
    /// Sparkle points near the trail head.
    pub sparkles: bool,
    /// Particles per absorption burst.
    pub burst_count: usize,
    /// Shock rings per absorption.
    pub ring_count: usize,
    /// Ribbon width at the head (px).
    pub trail_width: f32,
    /// Glow ribbon width (px).
    pub glow_width: f32,
}

const HIGH: QualityPreset = QualityPreset {
    trail_segment_mult: 2.0,
    glow_ribbon: true,
    orb_glow: true,
    sparkles: true,
    burst_count: 20,
    ring_count: 2,
    trail_width: 12.0,
    glow_width: 36.0,
};

const MEDIUM: QualityPreset = QualityPreset {
    trail_segment_mult: 1.0,
    glow_ribbon: false,
    orb_glow: true,
    sparkles: false,
    burst_count: 10,
    ring_count: 1,
    trail_width: 10.0,
    glow_width: 28.0,
};

const LOW: QualityPreset = QualityPreset {
    trail_segment_mult: 0.5,
    glow_ribbon: false,
    orb_glow: false,
    sparkles: false,
    burst_count: 5,
    ring_count: 0,
    trail_width: 8.0,
    glow_width: 0.0,
};

impl QualityTier {
    pub fn preset(self) -> &'static QualityPreset {
        match self {
            QualityTier::High => &HIGH,
            QualityTier::Medium => &MEDIUM,
            QualityTier::Low => &LOW,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::High => "High",
            QualityTier::Medium => "Medium",
            QualityTier::Low => "Low",
        }
    }

    fn from_mean_fps(fps: f32) -> Self {
        if fps < LOW_FPS {
            QualityTier::Low
        } else if fps < MID_FPS {
            QualityTier::Medium
        } else {
            QualityTier::High
        }
    }
}

/// Rolling-window tier selector. The fixed sampling interval is the only
/// debounce; transitions apply on the next frame.
pub struct QualityController {
    window: RingBuffer<f32>,
    frame_count: u64,
    tier: QualityTier,
    /// HUD override; None means adaptive.
    force: Option<QualityTier>,
}

impl QualityController {
    pub fn new() -> Self {
        Self {
            window: RingBuffer::new(WINDOW),
            frame_count: 0,
            tier: QualityTier::High,
            force: None,
        }
    }

    /// Record one frame's delta time. Returns the new tier when it changed.
    pub fn record_frame(&mut self, dt: f32) -> Option<QualityTier> {
        self.frame_count += 1;
        if dt > 0.0 {
            self.window.push(1.0 / dt);
        }
        if self.frame_count % CHECK_INTERVAL != 0 || self.window.len() < MIN_SAMPLES {
            return None;
        }
        let next = QualityTier::from_mean_fps(self.window.mean());
        if next != self.tier {
            log::info!(
                "quality tier {} -> {} (mean {:.0} fps)",
                self.tier.label(),
                next.label(),
                self.window.mean()
            );
            self.tier = next;
            return Some(next);
        }
        None
    }

    /// The tier in effect, honoring any HUD override.
    pub fn tier(&self) -> QualityTier {
        self.force.unwrap_or(self.tier)
    }

    pub fn preset(&self) -> &'static QualityPreset {
        self.tier().preset()
    }

    pub fn set_override(&mut self, force: Option<QualityTier>) {
        self.force = force;
    }

    pub fn mean_fps(&self) -> f32 {
        self.window.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `frames` frames at a steady synthetic frame rate.
    fn drive(ctl: &mut QualityController, fps: f32, frames: usize) {
        for _ in 0..frames {
            ctl.record_frame(1.0 / fps);
        }
    }

    #[test]
    fn sustained_low_fps_selects_low() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 20.0, 60);
        assert_eq!(ctl.tier(), QualityTier::Low);
    }

    #[test]
    fn mid_band_selects_medium() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 40.0, 60);
        assert_eq!(ctl.tier(), QualityTier::Medium);

        // Boundary: exactly 30 is Medium, exactly 50 is High.
        assert_eq!(QualityTier::from_mean_fps(30.0), QualityTier::Medium);
        assert_eq!(QualityTier::from_mean_fps(49.9), QualityTier::Medium);
        assert_eq!(QualityTier::from_mean_fps(50.0), QualityTier::High);
        assert_eq!(QualityTier::from_mean_fps(29.9), QualityTier::Low);
    }

    #[test]
    fn healthy_fps_stays_high() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 60.0, 120);
        assert_eq!(ctl.tier(), QualityTier::High);
    }

    #[test]
    fn tier_only_moves_at_the_sampling_interval() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 60.0, 60);
        assert_eq!(ctl.tier(), QualityTier::High);
        // 29 terrible frames: no change until the interval boundary.
        for _ in 0..(CHECK_INTERVAL as usize - 1) {
            assert!(ctl.record_frame(1.0 / 10.0).is_none());
        }
        assert_eq!(ctl.tier(), QualityTier::High);
        let changed = ctl.record_frame(1.0 / 10.0);
        assert!(changed.is_some());
        assert_ne!(ctl.tier(), QualityTier::High);
    }

    #[test]
    fn recovery_returns_to_high() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 20.0, 60);
        assert_eq!(ctl.tier(), QualityTier::Low);
        drive(&mut ctl, 60.0, 90);
        assert_eq!(ctl.tier(), QualityTier::High);
    }

    #[test]
    fn override_wins_until_cleared() {
        let mut ctl = QualityController::new();
        drive(&mut ctl, 60.0, 60);
        ctl.set_override(Some(QualityTier::Low));
        assert_eq!(ctl.tier(), QualityTier::Low);
        ctl.set_override(None);
        assert_eq!(ctl.tier(), QualityTier::High);
    }

    #[test]
    fn low_preset_still_draws_a_trail() {
        let p = QualityTier::Low.preset();
        assert!(p.trail_segment_mult > 0.0);
        assert!(p.trail_width > 0.0);
        assert!(!p.glow_ribbon && !p.sparkles && !p.orb_glow);
    }
}
