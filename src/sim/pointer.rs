use glam::Vec2;

/// Single-pole smoothing factor applied to the raw pointer each frame.
const SMOOTHING: f32 = 0.35;

/// Where the pointer parks before the first move — far enough off-surface
/// that nothing reacts to it.
const OFF_SURFACE: Vec2 = Vec2::new(-100.0, -100.0);

/// Pointer tracking shared between the event handlers and the frame pass.
/// Event handlers only write `raw` and `active`; everything else is derived
/// once per frame by `step`.
pub struct PointerState {
    /// Latest raw position, written by the cursor-moved handler.
    pub raw: Vec2,
    /// True once the pointer has moved over the surface, cleared on leave.
    pub active: bool,
    smoothed: Vec2,
    prev_smoothed: Vec2,
    /// Smoothed positional delta for the current frame.
    pub delta: Vec2,
    /// Magnitude of `delta` (pixels per frame).
    pub speed: f32,
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            raw: OFF_SURFACE,
            active: false,
            smoothed: OFF_SURFACE,
            prev_smoothed: OFF_SURFACE,
            delta: Vec2::ZERO,
            speed: 0.0,
        }
    }

    /// Cursor-moved handler: record the position, mark the pointer live.
    pub fn moved(&mut self, pos: Vec2) {
        self.raw = pos;
        self.active = true;
    }

    /// Cursor-left handler.
    pub fn left(&mut self) {
        self.active = false;
    }

    /// Advance the smoothed position one frame and derive delta/speed.
    pub fn step(&mut self) {
        self.smoothed += (self.raw - self.smoothed) * SMOOTHING;
        self.delta = self.smoothed - self.prev_smoothed;
        self.speed = self.delta.length();
        self.prev_smoothed = self.smoothed;
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_converges_on_held_position() {
        let mut p = PointerState::new();
        p.moved(Vec2::new(200.0, 120.0));
        for _ in 0..60 {
            p.step();
        }
        assert!((p.smoothed() - Vec2::new(200.0, 120.0)).length() < 0.5);
        assert!(p.speed < 0.1);
    }

    #[test]
    fn leave_clears_active_but_keeps_position() {
        let mut p = PointerState::new();
        p.moved(Vec2::new(50.0, 50.0));
        p.left();
        assert!(!p.active);
        assert_eq!(p.raw, Vec2::new(50.0, 50.0));
    }
}
