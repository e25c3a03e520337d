//! Staged card choreography: a one-shot entrance timeline shared by all
//! six cards, and the pure pose function that places each card for a
//! given phase and time.

use glam::Vec2;

use crate::anim::{ease_out_cubic, ease_out_quint, lerp};
use crate::cards::CARD_COUNT;

/// Global choreography phase. Monotonic within a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Hidden = 0,
    Gathered = 1,
    Exploding = 2,
    Settled = 3,
}

impl Phase {
    fn prev(self) -> Option<Phase> {
        match self {
            Phase::Hidden => None,
            Phase::Gathered => Some(Phase::Hidden),
            Phase::Exploding => Some(Phase::Gathered),
            Phase::Settled => Some(Phase::Exploding),
        }
    }
}

/// Seconds after mount at which each phase begins.
const GATHER_AT: f32 = 0.3;
const EXPLODE_AT: f32 = 1.0;
const SETTLE_AT: f32 = 1.8;

const SCHEDULE: [(f32, Phase); 3] = [
    (GATHER_AT, Phase::Gathered),
    (EXPLODE_AT, Phase::Exploding),
    (SETTLE_AT, Phase::Settled),
];

/// Wall-clock phase driver. Phases only ever move forward; `replay`
/// restarts the whole playthrough.
pub struct Timeline {
    elapsed: f32,
    phase: Phase,
    phase_started_at: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            phase: Phase::Hidden,
            phase_started_at: 0.0,
        }
    }

    /// Advance by `dt`, returning any phases entered this frame in order.
    pub fn advance(&mut self, dt: f32) -> Vec<Phase> {
        self.elapsed += dt;
        let mut entered = Vec::new();
        for (at, phase) in SCHEDULE {
            if self.elapsed >= at && self.phase < phase {
                self.phase = phase;
                self.phase_started_at = at;
                entered.push(phase);
            }
        }
        entered
    }

    /// Restart the playthrough from Hidden.
    pub fn replay(&mut self) {
        *self = Self::new();
    }

    /// Skip straight to the resting state (reduced motion).
    pub fn jump_to_settled(&mut self) {
        self.elapsed = SETTLE_AT + 10.0;
        self.phase = Phase::Settled;
        self.phase_started_at = SETTLE_AT;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds spent in the current phase.
    pub fn time_in_phase(&self) -> f32 {
        self.elapsed - self.phase_started_at
    }

    /// Total seconds since mount/replay. Drives the ambient pulse.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Final resting slot per card, relative to the ensemble center.
pub const SLOTS: [Vec2; CARD_COUNT] = [
    Vec2::new(-180.0, -110.0),
    Vec2::new(0.0, -110.0),
    Vec2::new(180.0, -110.0),
    Vec2::new(-180.0, 110.0),
    Vec2::new(0.0, 110.0),
    Vec2::new(180.0, 110.0),
];

/// Per-card launch offsets — each card enters from its own direction.
const LAUNCH: [Vec2; CARD_COUNT] = [
    Vec2::new(60.0, 200.0),
    Vec2::new(0.0, 250.0),
    Vec2::new(-60.0, 200.0),
    Vec2::new(180.0, 0.0),
    Vec2::new(0.0, -200.0),
    Vec2::new(-180.0, 0.0),
];

/// Overshoot factor applied to slots during the explosion.
const OVERSHOOT: f32 = 1.2;

/// Computed card placement. Rotation in degrees, opacity and scale plain
/// multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPose {
    pub offset: Vec2,
    pub scale: f32,
    pub opacity: f32,
    pub rotation_deg: f32,
}

impl CardPose {
    pub fn rotation_rad(&self) -> f32 {
        self.rotation_deg.to_radians()
    }
}

/// Rotation sign alternates by index parity.
fn sign(index: usize) -> f32 {
    if index % 2 == 0 {
        -1.0
    } else {
        1.0
    }
}

/// The target pose a card eases toward within a phase.
fn target(index: usize, phase: Phase) -> CardPose {
    match phase {
        Phase::Hidden => CardPose {
            offset: LAUNCH[index],
            scale: 0.0,
            opacity: 0.0,
            rotation_deg: sign(index) * 40.0,
        },
        Phase::Gathered => CardPose {
            offset: Vec2::ZERO,
            scale: 0.4,
            opacity: 0.6,
            rotation_deg: sign(index) * 15.0,
        },
        Phase::Exploding => CardPose {
            offset: SLOTS[index] * OVERSHOOT,
            scale: 1.08,
            opacity: 1.0,
            rotation_deg: sign(index) * 3.0,
        },
        Phase::Settled => CardPose {
            offset: SLOTS[index],
            scale: 1.0,
            opacity: 1.0,
            rotation_deg: 0.0,
        },
    }
}

/// Transition duration and per-card stagger delay for entering `phase`.
fn transition(phase: Phase, index: usize) -> (f32, f32) {
    match phase {
        Phase::Hidden => (0.3, 0.0),
        Phase::Gathered => (0.5, index as f32 * 0.04),
        Phase::Exploding => (0.7, index as f32 * 0.08),
        Phase::Settled => (0.4, 0.0),
    }
}

/// Pose for card `index` at `time_in_phase` seconds into `phase`.
/// Pure and deterministic — identical inputs always give identical poses.
pub fn pose(index: usize, phase: Phase, time_in_phase: f32) -> CardPose {
    debug_assert!(index < CARD_COUNT);
    let to = target(index, phase);
    let Some(prev) = phase.prev() else {
        return to;
    };
    let from = target(index, prev);
    let (duration, delay) = transition(phase, index);
    let k = ease_out_quint(((time_in_phase - delay) / duration).clamp(0.0, 1.0));
    CardPose {
        offset: from.offset.lerp(to.offset, k),
        scale: lerp(from.scale, to.scale, k),
        opacity: lerp(from.opacity, to.opacity, k),
        rotation_deg: lerp(from.rotation_deg, to.rotation_deg, k),
    }
}

/// Center energy glow shown while the cards gather and explode.
/// Returns (scale, alpha) of the 60 px glow, or None when not visible.
pub fn center_glow(phase: Phase, time_in_phase: f32) -> Option<(f32, f32)> {
    match phase {
        Phase::Gathered => {
            let t = (time_in_phase / 0.6).clamp(0.0, 1.0);
            let k = ease_out_cubic(t);
            // Swell past full then relax toward 0.9.
            Some((1.2 * k - 0.3 * t, k * (1.0 - 0.2 * t)))
        }
        Phase::Exploding => {
            let t = (time_in_phase / 0.4).clamp(0.0, 1.0);
            if t >= 1.0 {
                return None;
            }
            Some((0.9 + 1.6 * ease_out_cubic(t), 0.8 * (1.0 - t)))
        }
        _ => None,
    }
}

/// Slow ambient pulse behind the ensemble: (scale, alpha) on a 7 s cycle.
pub fn ambient_pulse(elapsed: f32) -> (f32, f32) {
    let s = 0.5 - 0.5 * (std::f32::consts::TAU * elapsed / 7.0).cos();
    (1.0 + 0.12 * s, 0.4 + 0.2 * s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_monotonically_each_exactly_once() {
        let mut tl = Timeline::new();
        let mut seen = vec![tl.phase()];
        for _ in 0..240 {
            for phase in tl.advance(1.0 / 60.0) {
                seen.push(phase);
            }
        }
        assert_eq!(
            seen,
            vec![Phase::Hidden, Phase::Gathered, Phase::Exploding, Phase::Settled]
        );
        assert_eq!(tl.phase(), Phase::Settled);
    }

    #[test]
    fn oversized_step_still_enters_every_phase_in_order() {
        let mut tl = Timeline::new();
        let entered = tl.advance(10.0);
        assert_eq!(entered, vec![Phase::Gathered, Phase::Exploding, Phase::Settled]);
    }

    #[test]
    fn replay_restarts_from_hidden() {
        let mut tl = Timeline::new();
        tl.advance(5.0);
        assert_eq!(tl.phase(), Phase::Settled);
        tl.replay();
        assert_eq!(tl.phase(), Phase::Hidden);
        assert_eq!(tl.time_in_phase(), 0.0);
    }

    #[test]
    fn pose_is_deterministic() {
        for index in 0..CARD_COUNT {
            for phase in [Phase::Hidden, Phase::Gathered, Phase::Exploding, Phase::Settled] {
                for t in [0.0, 0.13, 0.4, 2.0] {
                    assert_eq!(pose(index, phase, t), pose(index, phase, t));
                }
            }
        }
    }

    #[test]
    fn settled_pose_lands_exactly_on_slot() {
        for index in 0..CARD_COUNT {
            let p = pose(index, Phase::Settled, 10.0);
            assert_eq!(p.offset, SLOTS[index]);
            assert_eq!(p.scale, 1.0);
            assert_eq!(p.opacity, 1.0);
            assert_eq!(p.rotation_deg, 0.0);
        }
    }

    #[test]
    fn hidden_poses_are_distinct_per_card() {
        for a in 0..CARD_COUNT {
            for b in (a + 1)..CARD_COUNT {
                assert_ne!(
                    pose(a, Phase::Hidden, 0.0).offset,
                    pose(b, Phase::Hidden, 0.0).offset
                );
            }
        }
    }

    #[test]
    fn rotation_sign_alternates_by_parity() {
        assert!(pose(0, Phase::Hidden, 0.0).rotation_deg < 0.0);
        assert!(pose(1, Phase::Hidden, 0.0).rotation_deg > 0.0);
        assert!(pose(2, Phase::Hidden, 0.0).rotation_deg < 0.0);
    }

    #[test]
    fn stagger_delays_later_cards() {
        // Early in the explosion, card 0 has begun moving but card 5
        // (delay 0.4 s) is still at its gathered pose.
        let early = 0.1;
        let p0 = pose(0, Phase::Exploding, early);
        let p5 = pose(5, Phase::Exploding, early);
        assert_ne!(p0.offset, target(0, Phase::Gathered).offset);
        assert_eq!(p5.offset, target(5, Phase::Gathered).offset);
    }

    #[test]
    fn exploding_overshoots_the_slot() {
        for index in [0, 2, 3, 5] {
            let p = pose(index, Phase::Exploding, 10.0);
            assert!(p.offset.length() > SLOTS[index].length());
        }
    }

    #[test]
    fn center_glow_only_during_gather_and_explode() {
        assert!(center_glow(Phase::Hidden, 0.1).is_none());
        assert!(center_glow(Phase::Gathered, 0.3).is_some());
        assert!(center_glow(Phase::Exploding, 0.1).is_some());
        assert!(center_glow(Phase::Exploding, 1.0).is_none());
        assert!(center_glow(Phase::Settled, 0.1).is_none());
    }

    #[test]
    fn ambient_pulse_stays_in_band() {
        for i in 0..100 {
            let (scale, alpha) = ambient_pulse(i as f32 * 0.37);
            assert!((1.0..=1.12).contains(&scale));
            assert!((0.4..=0.6).contains(&alpha));
        }
    }
}
