//! Transient visuals: burst particles and expanding shock rings, spawned
//! by orb absorptions and by the card explosion beat.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::anim::Rgb;

/// Downward acceleration on burst particles (px/s^2).
const BURST_GRAVITY: f32 = 25.0;
/// Burst launch speed range.
const BURST_SPEED_MIN: f32 = 60.0;
const BURST_SPEED_SPREAD: f32 = 120.0;
/// How far burst colors are pushed toward white.
const BURST_LIGHTEN: f32 = 0.3;

/// A short-lived spark.
#[derive(Debug, Clone, Copy)]
pub struct BurstParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub life: f32,
    pub max_life: f32,
}

impl BurstParticle {
    fn t(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn draw_alpha(&self) -> f32 {
        let u = 1.0 - self.t();
        u * u
    }

    pub fn draw_radius(&self) -> f32 {
        self.radius * (1.0 - self.t() * 0.5)
    }
}

/// An expanding stroked circle.
#[derive(Debug, Clone, Copy)]
pub struct ShockRing {
    pub pos: Vec2,
    pub color: Rgb,
    pub age: f32,
    pub max_age: f32,
    base_radius: f32,
    growth: f32,
}

impl ShockRing {
    fn t(&self) -> f32 {
        (self.age / self.max_age).clamp(0.0, 1.0)
    }

    /// Radius grows monotonically with age.
    pub fn radius(&self) -> f32 {
        self.base_radius + self.t() * self.growth
    }

    /// Opacity decays monotonically with age.
    pub fn draw_alpha(&self) -> f32 {
        (1.0 - self.t()) * 0.5
    }

    pub fn stroke_width(&self) -> f32 {
        ((1.0 - self.t()) * 3.0).max(0.5)
    }
}

/// Owns all live bursts and rings; spawn, integrate, prune.
pub struct EffectSystem {
    bursts: Vec<BurstParticle>,
    rings: Vec<ShockRing>,
}

impl EffectSystem {
    pub fn new() -> Self {
        Self {
            bursts: Vec::with_capacity(64),
            rings: Vec::with_capacity(8),
        }
    }

    /// Orb absorbed: a radial batch of sparks plus up to one ring, colored
    /// to match the orb. `burst_count`/`ring_count` come from the quality
    /// tier.
    pub fn spawn_absorption(
        &mut self,
        pos: Vec2,
        color: Rgb,
        burst_count: usize,
        ring_count: usize,
        rng: &mut fastrand::Rng,
    ) {
        let lightened = [
            color[0] + (255.0 - color[0]) * BURST_LIGHTEN,
            color[1] + (255.0 - color[1]) * BURST_LIGHTEN,
            color[2] + (255.0 - color[2]) * BURST_LIGHTEN,
        ];
        for j in 0..burst_count {
            let angle = TAU * j as f32 / burst_count as f32 + (rng.f32() - 0.5) * 0.4;
            let speed = BURST_SPEED_MIN + rng.f32() * BURST_SPEED_SPREAD;
            self.bursts.push(BurstParticle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                radius: 3.0 + rng.f32() * 4.0,
                color: lightened,
                life: 0.0,
                max_life: 0.5 + rng.f32() * 0.3,
            });
        }
        if ring_count > 0 {
            self.rings.push(ShockRing {
                pos,
                color,
                age: 0.0,
                max_age: 0.5,
                base_radius: 16.0,
                growth: 120.0,
            });
        }
    }

    /// The card-explosion beat: a wide spark ring at the ensemble center
    /// plus staggered-size shock rings, colored from the card accents.
    pub fn spawn_center_blast(&mut self, center: Vec2, accents: &[Rgb], rng: &mut fastrand::Rng) {
        const SPARKS: usize = 18;
        const FALLBACK_ACCENT: [Rgb; 1] = [[190.0, 130.0, 255.0]];
        let accents = if accents.is_empty() {
            &FALLBACK_ACCENT[..]
        } else {
            accents
        };
        for j in 0..SPARKS {
            let angle = TAU * j as f32 / SPARKS as f32;
            let speed = 100.0 + rng.f32() * 125.0;
            let accent = accents[j % accents.len()];
            self.bursts.push(BurstParticle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                radius: 2.0 + rng.f32() * 2.0,
                color: accent,
                life: 0.0,
                max_life: 0.8,
            });
        }
        for (i, base) in [40.0, 30.0, 50.0].iter().enumerate() {
            let accent = accents[i % accents.len()];
            self.rings.push(ShockRing {
                pos: center,
                color: accent,
                age: -0.05 * i as f32, // negative age staggers the starts
                max_age: 1.0,
                base_radius: *base,
                growth: 140.0,
            });
        }
    }

    /// Integrate and prune one frame.
    pub fn step(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.bursts.len() {
            let b = &mut self.bursts[i];
            b.life += dt;
            if b.life >= b.max_life {
                self.bursts.swap_remove(i);
                continue;
            }
            let t = b.life / b.max_life;
            let ease = 1.0 - t * t;
            b.pos += b.vel * dt * ease;
            b.vel.y += BURST_GRAVITY * dt;
            i += 1;
        }

        let mut i = 0;
        while i < self.rings.len() {
            let r = &mut self.rings[i];
            r.age += dt;
            if r.age >= r.max_age {
                self.rings.swap_remove(i);
                continue;
            }
            i += 1;
        }
    }

    pub fn bursts(&self) -> &[BurstParticle] {
        &self.bursts
    }

    pub fn rings(&self) -> impl Iterator<Item = &ShockRing> {
        // Staggered rings sit at negative age until their start.
        self.rings.iter().filter(|r| r.age >= 0.0)
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.bursts.len(), self.rings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_expire_within_their_lifetime() {
        let mut fx = EffectSystem::new();
        let mut rng = fastrand::Rng::with_seed(9);
        fx.spawn_absorption(Vec2::new(10.0, 10.0), [228.0, 77.0, 144.0], 20, 1, &mut rng);
        assert_eq!(fx.counts(), (20, 1));

        // Longest burst life is 0.8 s, ring 0.5 s.
        for _ in 0..60 {
            fx.step(1.0 / 60.0);
        }
        assert_eq!(fx.counts(), (0, 0));
    }

    #[test]
    fn ring_radius_grows_and_alpha_decays() {
        let mut fx = EffectSystem::new();
        let mut rng = fastrand::Rng::with_seed(9);
        fx.spawn_absorption(Vec2::ZERO, [6.0, 182.0, 212.0], 0, 1, &mut rng);

        let mut last_radius = 0.0;
        let mut last_alpha = f32::MAX;
        for _ in 0..25 {
            fx.step(1.0 / 60.0);
            let Some(ring) = fx.rings().next() else { break };
            assert!(ring.radius() > last_radius);
            assert!(ring.draw_alpha() < last_alpha);
            last_radius = ring.radius();
            last_alpha = ring.draw_alpha();
        }
        assert!(last_radius > 16.0);
    }

    #[test]
    fn ring_count_zero_spawns_no_ring() {
        let mut fx = EffectSystem::new();
        let mut rng = fastrand::Rng::with_seed(9);
        fx.spawn_absorption(Vec2::ZERO, [6.0, 182.0, 212.0], 5, 0, &mut rng);
        assert_eq!(fx.counts(), (5, 0));
    }

    #[test]
    fn center_blast_uses_accent_cycle() {
        let mut fx = EffectSystem::new();
        let mut rng = fastrand::Rng::with_seed(9);
        let accents = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        fx.spawn_center_blast(Vec2::ZERO, &accents, &mut rng);
        let (bursts, rings) = fx.counts();
        assert_eq!(bursts, 18);
        assert_eq!(rings, 3);
        assert_eq!(fx.bursts()[0].color, accents[0]);
        assert_eq!(fx.bursts()[1].color, accents[1]);
        // Staggered rings surface over the first tenth of a second.
        assert_eq!(fx.rings().count(), 1);
        fx.step(0.06);
        assert_eq!(fx.rings().count(), 2);
    }
}
