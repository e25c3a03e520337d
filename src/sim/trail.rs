use std::collections::VecDeque;

use glam::Vec2;

use super::pointer::PointerState;

/// Maximum retained trail points — the bounded FIFO capacity.
pub const TRAIL_CAPACITY: usize = 65;
/// Seconds a point lives before it is discarded.
pub const POINT_LIFETIME: f32 = 2.5;
/// Pointer travel (pixels) between emitted points.
const SPACING: f32 = 5.0;
/// Fraction of the frame's pointer delta carried as point velocity.
const VELOCITY_SCALE: f32 = 0.04;
/// Per-frame velocity decay.
const VELOCITY_DAMPING: f32 = 0.99;
/// Fade-out rate when the pointer is idle or gone (per second).
const IDLE_FADE_RATE: f32 = 0.8;
/// Fade-out rate while suppressed by a hovered card (per second).
const SUPPRESS_FADE_RATE: f32 = 8.0;
/// Fade level below which a suppressed trail is cleared outright.
const CLEAR_THRESHOLD: f32 = 0.01;
/// Boost decay back toward 1.0 (per second).
const BOOST_DECAY: f32 = 0.3;
/// Boost gained per orb absorption, and its ceiling.
const BOOST_STEP: f32 = 0.4;
const BOOST_MAX: f32 = 2.5;

/// One sample of pointer history.
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
}

/// Decaying polyline of recent pointer positions. Front is the head
/// (newest sample); ages grow monotonically toward the back.
pub struct TrailField {
    points: VecDeque<TrailPoint>,
    dist_accum: f32,
    /// Overall trail visibility in [0, 1].
    pub fade: f32,
    /// Width multiplier raised by orb absorptions, decaying toward 1.
    pub boost: f32,
}

impl TrailField {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
            dist_accum: 0.0,
            fade: 0.0,
            boost: 1.0,
        }
    }

    /// One frame: emit spacing-gated points, enforce the cap, age and
    /// advect the survivors. While `suppressed`, emission stops and the
    /// trail fades fast, clearing once invisible.
    pub fn step(&mut self, dt: f32, pointer: &PointerState, suppressed: bool) {
        self.boost = (self.boost - dt * BOOST_DECAY).max(1.0);

        if suppressed {
            self.fade = (self.fade - dt * SUPPRESS_FADE_RATE).max(0.0);
            if self.fade < CLEAR_THRESHOLD {
                self.points.clear();
                self.dist_accum = 0.0;
            }
        } else if pointer.active {
            self.dist_accum += pointer.speed;
            while self.dist_accum >= SPACING {
                self.dist_accum -= SPACING;
                self.points.push_front(TrailPoint {
                    pos: pointer.smoothed(),
                    vel: pointer.delta * VELOCITY_SCALE,
                    age: 0.0,
                });
                if self.points.len() > TRAIL_CAPACITY {
                    self.points.pop_back();
                }
                self.fade = 1.0;
            }
        }

        if !suppressed && (!pointer.active || pointer.speed < 1.0) {
            self.fade = (self.fade - dt * IDLE_FADE_RATE).max(0.0);
        }

        for p in self.points.iter_mut() {
            p.age += dt;
            p.pos += p.vel * dt;
            p.vel *= VELOCITY_DAMPING;
        }
        // Ages are monotone toward the back, so expiry only happens there.
        while self.points.back().is_some_and(|p| p.age >= POINT_LIFETIME) {
            self.points.pop_back();
        }
    }

    /// Orb absorption feedback: brighten and widen the trail briefly.
    pub fn boost_intensity(&mut self) {
        self.boost = (self.boost + BOOST_STEP).min(BOOST_MAX);
        self.fade = 1.0;
    }

    pub fn points(&self) -> &VecDeque<TrailPoint> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the pointer along a line fast enough to emit every frame.
    fn sweep(trail: &mut TrailField, pointer: &mut PointerState, frames: usize, dt: f32) {
        for i in 0..frames {
            pointer.moved(Vec2::new(i as f32 * 30.0, 100.0));
            pointer.step();
            trail.step(dt, pointer, false);
        }
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut trail = TrailField::new();
        let mut pointer = PointerState::new();
        sweep(&mut trail, &mut pointer, 500, 1.0 / 60.0);
        assert!(trail.len() <= TRAIL_CAPACITY);
        assert!(trail.len() > 0);
    }

    #[test]
    fn ages_increase_and_points_expire_on_schedule() {
        let mut trail = TrailField::new();
        let mut pointer = PointerState::new();
        sweep(&mut trail, &mut pointer, 10, 1.0 / 60.0);
        assert!(trail.len() > 0);

        // Pointer gone: ages climb, nothing new is emitted, and nothing
        // expires before the lifetime.
        pointer.left();
        pointer.step();
        let count = trail.len();
        let before: Vec<f32> = trail.points().iter().map(|p| p.age).collect();
        trail.step(0.05, &pointer, false);
        assert_eq!(trail.len(), count);
        for (a, b) in trail.points().iter().zip(&before) {
            assert!(a.age > *b);
            assert!(a.age < POINT_LIFETIME);
        }

        // Run the clock out; every point must be gone.
        for _ in 0..((POINT_LIFETIME / 0.05) as usize + 2) {
            trail.step(0.05, &pointer, false);
        }
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn no_emission_while_pointer_inactive() {
        let mut trail = TrailField::new();
        let mut pointer = PointerState::new();
        pointer.step();
        for _ in 0..60 {
            trail.step(1.0 / 60.0, &pointer, false);
        }
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn suppression_fades_fast_then_clears() {
        let mut trail = TrailField::new();
        let mut pointer = PointerState::new();
        sweep(&mut trail, &mut pointer, 20, 1.0 / 60.0);
        assert!(trail.len() > 0);
        assert_eq!(trail.fade, 1.0);

        // ~1/8 s of suppression drains the fade; the trail clears, not pops.
        let mut cleared_at_fade = f32::MAX;
        for _ in 0..20 {
            trail.step(1.0 / 60.0, &pointer, true);
            if trail.len() == 0 {
                cleared_at_fade = cleared_at_fade.min(trail.fade);
                break;
            }
        }
        assert_eq!(trail.len(), 0);
        assert!(cleared_at_fade < CLEAR_THRESHOLD);
    }

    #[test]
    fn boost_caps_and_decays() {
        let mut trail = TrailField::new();
        for _ in 0..10 {
            trail.boost_intensity();
        }
        assert!(trail.boost <= BOOST_MAX);
        let pointer = PointerState::new();
        for _ in 0..120 {
            trail.step(1.0 / 60.0, &pointer, false);
        }
        assert!(trail.boost < BOOST_MAX);
        assert!(trail.boost >= 1.0);
    }
}
