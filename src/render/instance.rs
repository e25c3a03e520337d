use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::anim::{pack_rgba, Rgb};
use crate::cards::Icon;
use crate::sim::effects::{BurstParticle, ShockRing};
use crate::sim::orbs::Orb;

/// Shader frame indices. 5..=10 are the card icon glyphs (see
/// `Icon::frame`).
pub const FRAME_GLOW_DISC: u32 = 0;
pub const FRAME_DISC: u32 = 1;
pub const FRAME_RING: u32 = 2;
pub const FRAME_CARD: u32 = 3;
pub const FRAME_SPARKLE: u32 = 4;
pub const FRAME_CHIP: u32 = 11;

/// Orb glow halo multiplier over the body radius.
const ORB_GLOW_BASE: f32 = 2.2;

/// Per-instance data uploaded to the GPU each frame. Stride = 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Center position in surface pixels.
    pub position: [f32; 2],
    /// Quad extents in pixels (width, height).
    pub size: [f32; 2],
    /// RGBA packed as u32.
    pub color: u32,
    /// Procedural sprite selector.
    pub frame: u32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Frame-specific parameter: ring stroke width (px), card hover glow.
    pub param: f32,
}

impl SpriteInstance {
    /// Ambient orb: a glow halo on High/Medium, a flat disc on Low.
    pub fn from_orb(orb: &Orb, glow: bool) -> Self {
        let radius = orb.draw_radius();
        let alpha = orb.draw_alpha();
        if glow {
            let halo = radius * (ORB_GLOW_BASE + orb.attract_t);
            Self {
                position: orb.pos.into(),
                size: [halo * 2.0, halo * 2.0],
                color: pack_rgba(orb.color, alpha),
                frame: FRAME_GLOW_DISC,
                rotation: 0.0,
                param: 0.0,
            }
        } else {
            Self {
                position: orb.pos.into(),
                size: [radius * 2.0, radius * 2.0],
                color: pack_rgba(orb.color, alpha),
                frame: FRAME_DISC,
                rotation: 0.0,
                param: 0.0,
            }
        }
    }

    pub fn from_burst(b: &BurstParticle) -> Self {
        let r = b.draw_radius();
        Self {
            position: b.pos.into(),
            size: [r * 2.0, r * 2.0],
            color: pack_rgba(b.color, b.draw_alpha()),
            frame: FRAME_DISC,
            rotation: 0.0,
            param: 0.0,
        }
    }

    pub fn from_ring(ring: &ShockRing) -> Self {
        let d = ring.radius() * 2.0;
        Self {
            position: ring.pos.into(),
            size: [d, d],
            color: pack_rgba(ring.color, ring.draw_alpha()),
            frame: FRAME_RING,
            rotation: 0.0,
            param: ring.stroke_width(),
        }
    }

    pub fn sparkle(pos: Vec2, color: Rgb, alpha: f32) -> Self {
        Self {
            position: pos.into(),
            size: [6.0, 6.0],
            color: pack_rgba(color, alpha),
            frame: FRAME_SPARKLE,
            rotation: 0.0,
            param: 0.0,
        }
    }

    /// Big soft pulse behind the ensemble.
    pub fn ambient_glow(center: Vec2, scale: f32, alpha: f32) -> Self {
        let d = 280.0 * scale;
        Self {
            position: center.into(),
            size: [d, d],
            color: pack_rgba([150.0, 110.0, 230.0], alpha * 0.25),
            frame: FRAME_GLOW_DISC,
            rotation: 0.0,
            param: 0.0,
        }
    }

    /// Center energy orb shown while the cards gather.
    pub fn center_glow(center: Vec2, scale: f32, alpha: f32) -> Self {
        let d = 60.0 * scale;
        Self {
            position: center.into(),
            size: [d, d],
            color: pack_rgba([190.0, 130.0, 255.0], alpha),
            frame: FRAME_GLOW_DISC,
            rotation: 0.0,
            param: 0.0,
        }
    }

    /// Card body: rounded rect tinted by the accent. `hover_glow` in
    /// [0, 1] widens the border and lifts the fill.
    pub fn card_body(
        pos: Vec2,
        size: Vec2,
        accent: Rgb,
        opacity: f32,
        rotation: f32,
        hover_glow: f32,
    ) -> Self {
        Self {
            position: pos.into(),
            size: size.into(),
            color: pack_rgba(accent, opacity),
            frame: FRAME_CARD,
            rotation,
            param: hover_glow,
        }
    }

    /// Icon backdrop square inside the card.
    pub fn icon_chip(pos: Vec2, side: f32, accent: Rgb, opacity: f32, rotation: f32) -> Self {
        Self {
            position: pos.into(),
            size: [side, side],
            color: pack_rgba(accent, opacity),
            frame: FRAME_CHIP,
            rotation,
            param: 0.0,
        }
    }

    pub fn icon(icon: Icon, pos: Vec2, side: f32, accent: Rgb, opacity: f32, rotation: f32) -> Self {
        Self {
            position: pos.into(),
            size: [side, side],
            color: pack_rgba(accent, opacity),
            frame: icon.frame(),
            rotation,
            param: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_the_pipeline_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }

    #[test]
    fn icon_frames_do_not_collide_with_builtin_frames() {
        for icon in [
            Icon::Code,
            Icon::Palette,
            Icon::Chart,
            Icon::Chip,
            Icon::Rocket,
            Icon::Bolt,
        ] {
            assert!((5..=10).contains(&icon.frame()));
        }
    }
}
