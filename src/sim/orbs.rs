use glam::Vec2;

use crate::anim::Rgb;

use super::pointer::PointerState;

/// Size of the orb pool. Dead orbs stay in the pool and only run their
/// respawn countdown.
pub const ORB_COUNT: usize = 5;

/// Inside this pointer distance an active pointer absorbs the orb.
const ABSORB_DIST: f32 = 80.0;
/// Inside this distance the orb is gently pulled toward the pointer.
const ATTRACT_DIST: f32 = 180.0;
/// Seconds a dead orb waits before respawning at a fresh anchor.
const RESPAWN_COOLDOWN: f32 = 4.0;
/// Absorption progress gained per second inside the absorb radius.
const ABSORB_RATE: f32 = 2.5;
/// Absorption progress lost per second outside it.
const ABSORB_RECOVERY: f32 = 1.5;
/// Progress at which absorption completes.
const ABSORB_COMPLETE: f32 = 0.9;
/// Keep-out margin for randomized anchors.
const EDGE_MARGIN: f32 = 80.0;
/// Idle float amplitudes.
const FLOAT_X: f32 = 18.0;
const FLOAT_Y: f32 = 13.0;

const ORB_COLORS: [Rgb; ORB_COUNT] = [
    [228.0, 77.0, 144.0],
    [139.0, 92.0, 246.0],
    [59.0, 130.0, 246.0],
    [6.0, 182.0, 212.0],
    [168.0, 85.0, 247.0],
];

/// An ambient floating orb.
#[derive(Debug, Clone)]
pub struct Orb {
    pub pos: Vec2,
    pub anchor: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub phase: f32,
    pub speed: f32,
    pub alive: bool,
    /// Absorption progress in [0, 1].
    pub absorb_t: f32,
    /// Pointer-proximity factor in [0, 1], refreshed each frame.
    pub attract_t: f32,
}

impl Orb {
    /// Rendered radius: shrinks while absorbing, swells near the pointer.
    pub fn draw_radius(&self) -> f32 {
        self.radius * (1.0 - self.absorb_t * 0.6) * (1.0 + self.attract_t * 0.3)
    }

    /// Body opacity: slow pulse, dimming as absorption progresses.
    pub fn draw_alpha(&self) -> f32 {
        let pulse = 0.5 + 0.5 * (self.phase * 2.0).sin();
        (0.3 + pulse * 0.15) * (1.0 - self.absorb_t * 0.5)
    }
}

/// Emitted when an orb finishes being absorbed; the effects system turns
/// this into a burst batch and a shock ring.
#[derive(Debug, Clone, Copy)]
pub struct Absorption {
    pub pos: Vec2,
    pub color: Rgb,
}

/// Fixed pool of ambient orbs plus per-slot respawn countdowns.
pub struct OrbField {
    orbs: Vec<Orb>,
    respawn: [f32; ORB_COUNT],
}

fn random_coord(extent: f32, rng: &mut fastrand::Rng) -> f32 {
    // Undersized surfaces shrink the margin instead of inverting the range.
    let margin = EDGE_MARGIN.min(extent * 0.25);
    margin + rng.f32() * (extent - margin * 2.0).max(0.0)
}

fn random_anchor(surface: Vec2, rng: &mut fastrand::Rng) -> Vec2 {
    Vec2::new(random_coord(surface.x, rng), random_coord(surface.y, rng))
}

impl OrbField {
    pub fn new(surface: Vec2, rng: &mut fastrand::Rng) -> Self {
        let orbs = (0..ORB_COUNT)
            .map(|i| {
                let anchor = random_anchor(surface, rng);
                Orb {
                    pos: anchor,
                    anchor,
                    radius: 12.0 + rng.f32() * 18.0,
                    color: ORB_COLORS[i % ORB_COLORS.len()],
                    phase: rng.f32() * std::f32::consts::TAU,
                    speed: 0.3 + rng.f32() * 0.5,
                    alive: true,
                    absorb_t: 0.0,
                    attract_t: 0.0,
                }
            })
            .collect();
        Self {
            orbs,
            respawn: [0.0; ORB_COUNT],
        }
    }

    /// Advance every orb one frame. Completed absorptions are appended to
    /// `absorbed` for the caller to turn into effects.
    pub fn step(
        &mut self,
        dt: f32,
        pointer: &PointerState,
        surface: Vec2,
        rng: &mut fastrand::Rng,
        absorbed: &mut Vec<Absorption>,
    ) {
        let m = pointer.smoothed();

        for (i, orb) in self.orbs.iter_mut().enumerate() {
            if !orb.alive {
                self.respawn[i] += dt;
                if self.respawn[i] > RESPAWN_COOLDOWN {
                    orb.alive = true;
                    orb.absorb_t = 0.0;
                    orb.attract_t = 0.0;
                    orb.anchor = random_anchor(surface, rng);
                    orb.pos = orb.anchor;
                    orb.phase = rng.f32() * std::f32::consts::TAU;
                    self.respawn[i] = 0.0;
                }
                continue;
            }

            orb.phase += dt * orb.speed;
            let float = Vec2::new(
                orb.phase.sin() * FLOAT_X,
                (orb.phase * 0.7).cos() * FLOAT_Y,
            );

            let to_pointer = m - orb.pos;
            let dist = to_pointer.length();
            let in_attract_zone = dist < ATTRACT_DIST && pointer.active;
            orb.attract_t = if in_attract_zone {
                (1.0 - dist / ATTRACT_DIST).max(0.0)
            } else {
                0.0
            };

            if dist < ABSORB_DIST && pointer.active {
                orb.absorb_t = (orb.absorb_t + dt * ABSORB_RATE).min(1.0);
                orb.pos += to_pointer * 0.15;

                if orb.absorb_t > ABSORB_COMPLETE {
                    absorbed.push(Absorption {
                        pos: orb.pos,
                        color: orb.color,
                    });
                    orb.alive = false;
                }
            } else if in_attract_zone {
                orb.absorb_t = (orb.absorb_t - dt * ABSORB_RECOVERY).max(0.0);
                orb.pos += to_pointer * (orb.attract_t * 0.02);
                orb.pos += (orb.anchor + float - orb.pos) * 0.01;
            } else {
                orb.absorb_t = (orb.absorb_t - dt * ABSORB_RECOVERY).max(0.0);
                orb.pos += (orb.anchor + float - orb.pos) * 0.03;
            }
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn live_count(&self) -> usize {
        self.orbs.iter().filter(|o| o.alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Vec2 = Vec2::new(1280.0, 720.0);
    const DT: f32 = 1.0 / 60.0;

    fn field(seed: u64) -> (OrbField, fastrand::Rng) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let field = OrbField::new(SURFACE, &mut rng);
        (field, rng)
    }

    fn pointer_at(pos: Vec2) -> PointerState {
        let mut p = PointerState::new();
        p.moved(pos);
        // Run the filter until the smoothed position catches up.
        for _ in 0..80 {
            p.step();
        }
        p
    }

    #[test]
    fn anchors_spawn_within_surface_bounds() {
        for seed in 0..20 {
            let (field, _) = field(seed);
            for orb in field.orbs() {
                assert!(orb.anchor.x >= EDGE_MARGIN && orb.anchor.x <= SURFACE.x - EDGE_MARGIN);
                assert!(orb.anchor.y >= EDGE_MARGIN && orb.anchor.y <= SURFACE.y - EDGE_MARGIN);
            }
        }
    }

    #[test]
    fn tiny_surface_still_produces_in_bounds_anchors() {
        let mut rng = fastrand::Rng::with_seed(7);
        let small = Vec2::new(100.0, 60.0);
        let field = OrbField::new(small, &mut rng);
        for orb in field.orbs() {
            assert!(orb.anchor.x >= 0.0 && orb.anchor.x <= small.x);
            assert!(orb.anchor.y >= 0.0 && orb.anchor.y <= small.y);
        }
    }

    #[test]
    fn pointer_on_top_of_orb_absorbs_it() {
        let (mut field, mut rng) = field(1);
        let target = field.orbs()[0].pos;
        let pointer = pointer_at(target);

        let mut absorbed = Vec::new();
        for _ in 0..120 {
            field.step(DT, &pointer, SURFACE, &mut rng, &mut absorbed);
            if !absorbed.is_empty() {
                break;
            }
        }
        assert!(!absorbed.is_empty());
        assert!(!field.orbs()[0].alive);
        assert_eq!(absorbed[0].color, field.orbs()[0].color);
    }

    #[test]
    fn dead_orb_respawns_after_exactly_the_cooldown() {
        let (mut field, mut rng) = field(2);
        let target = field.orbs()[0].pos;
        let pointer = pointer_at(target);

        let mut absorbed = Vec::new();
        for _ in 0..240 {
            field.step(DT, &pointer, SURFACE, &mut rng, &mut absorbed);
            if !field.orbs()[0].alive {
                break;
            }
        }
        assert!(!field.orbs()[0].alive);

        // Park the pointer far away so the respawned orb is left alone.
        let idle = pointer_at(Vec2::new(-500.0, -500.0));
        let mut frames_dead = 0;
        while !field.orbs()[0].alive {
            field.step(DT, &idle, SURFACE, &mut rng, &mut absorbed);
            frames_dead += 1;
            assert!(frames_dead < 60 * 6, "orb never respawned");
        }
        // Never alive-and-respawning: countdown reset on revival.
        assert_eq!(field.respawn[0], 0.0);
        let dead_seconds = frames_dead as f32 * DT;
        assert!((dead_seconds - RESPAWN_COOLDOWN).abs() < 0.1);

        let orb = &field.orbs()[0];
        assert_eq!(orb.absorb_t, 0.0);
        assert!(orb.anchor.x >= 0.0 && orb.anchor.x <= SURFACE.x);
        assert!(orb.anchor.y >= 0.0 && orb.anchor.y <= SURFACE.y);
    }

    #[test]
    fn idle_orbs_hold_near_their_anchor() {
        let (mut field, mut rng) = field(3);
        let idle = pointer_at(Vec2::new(-500.0, -500.0));
        let mut absorbed = Vec::new();
        for _ in 0..600 {
            field.step(DT, &idle, SURFACE, &mut rng, &mut absorbed);
        }
        assert!(absorbed.is_empty());
        for orb in field.orbs() {
            assert!(orb.alive);
            let wander = (orb.pos - orb.anchor).length();
            assert!(wander < FLOAT_X + FLOAT_Y + 5.0, "wandered {wander}");
        }
    }

    #[test]
    fn inactive_pointer_never_absorbs() {
        let (mut field, mut rng) = field(4);
        let mut pointer = pointer_at(field.orbs()[0].pos);
        pointer.left();
        let mut absorbed = Vec::new();
        for _ in 0..300 {
            field.step(DT, &pointer, SURFACE, &mut rng, &mut absorbed);
        }
        assert!(absorbed.is_empty());
        assert_eq!(field.live_count(), ORB_COUNT);
    }
}
