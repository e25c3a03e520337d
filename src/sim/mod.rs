pub mod effects;
pub mod orbs;
pub mod pointer;
pub mod trail;

use glam::Vec2;

use crate::quality::QualityPreset;

use self::effects::EffectSystem;
use self::orbs::{Absorption, OrbField};
use self::pointer::PointerState;
use self::trail::TrailField;

/// The pointer-trail & orb-field simulator. Owns every piece of
/// continuous simulation state; only the frame pass mutates it.
pub struct HeroSim {
    pub pointer: PointerState,
    pub trail: TrailField,
    pub orbs: OrbField,
    pub effects: EffectSystem,
    absorbed: Vec<Absorption>,
}

impl HeroSim {
    pub fn new(surface: Vec2, rng: &mut fastrand::Rng) -> Self {
        Self {
            pointer: PointerState::new(),
            trail: TrailField::new(),
            orbs: OrbField::new(surface, rng),
            effects: EffectSystem::new(),
            absorbed: Vec::new(),
        }
    }

    /// Run one simulation frame. `suppressed` is the shared flag raised
    /// while a card is hovered. The caller guarantees a non-zero surface.
    pub fn step(
        &mut self,
        dt: f32,
        surface: Vec2,
        suppressed: bool,
        preset: &QualityPreset,
        rng: &mut fastrand::Rng,
    ) {
        // 1. Pointer smoothing + per-frame delta
        self.pointer.step();

        // 2. Trail emission, aging, fade
        self.trail.step(dt, &self.pointer, suppressed);

        // 3. Orb reactions; completed absorptions queue up
        self.absorbed.clear();
        self.orbs
            .step(dt, &self.pointer, surface, rng, &mut self.absorbed);

        // 4. Absorption feedback: bursts, a ring, trail boost
        for a in self.absorbed.drain(..) {
            self.effects.spawn_absorption(
                a.pos,
                a.color,
                preset.burst_count,
                preset.ring_count,
                rng,
            );
            self.trail.boost_intensity();
        }

        // 5. Transient effect integration + pruning
        self.effects.step(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityTier;

    #[test]
    fn absorption_feeds_effects_and_trail_boost() {
        let mut rng = fastrand::Rng::with_seed(11);
        let surface = Vec2::new(1280.0, 720.0);
        let mut sim = HeroSim::new(surface, &mut rng);
        let preset = QualityTier::High.preset();

        let target = sim.orbs.orbs()[0].pos;
        sim.pointer.moved(target);

        let mut saw_effects = false;
        for _ in 0..240 {
            sim.step(1.0 / 60.0, surface, false, preset, &mut rng);
            if sim.effects.counts().0 > 0 {
                saw_effects = true;
                break;
            }
        }
        assert!(saw_effects);
        assert!(sim.trail.boost > 1.0);
    }

    #[test]
    fn suppressed_frames_emit_nothing() {
        let mut rng = fastrand::Rng::with_seed(12);
        let surface = Vec2::new(1280.0, 720.0);
        let mut sim = HeroSim::new(surface, &mut rng);
        let preset = QualityTier::High.preset();

        for i in 0..120 {
            sim.pointer.moved(Vec2::new(i as f32 * 25.0, 300.0));
            sim.step(1.0 / 60.0, surface, true, preset, &mut rng);
        }
        assert_eq!(sim.trail.len(), 0);
    }
}
