use instant::Instant;

/// Which slice of the frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FramePhase {
    Simulate = 0,
    Choreograph = 1,
    BuildGeometry = 2,
    GpuUpload = 3,
    RenderSubmit = 4,
    Overlay = 5,
}

impl FramePhase {
    pub const ALL: [FramePhase; 6] = [
        Self::Simulate,
        Self::Choreograph,
        Self::BuildGeometry,
        Self::GpuUpload,
        Self::RenderSubmit,
        Self::Overlay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Simulate => "Simulate",
            Self::Choreograph => "Choreo",
            Self::BuildGeometry => "Geometry",
            Self::GpuUpload => "GPU Upload",
            Self::RenderSubmit => "Render",
            Self::Overlay => "Overlay",
        }
    }
}

const EMA_ALPHA: f64 = 0.1;

/// Per-phase frame timing with exponential moving average smoothing.
pub struct FrameTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 6],
    start: Instant,
}

impl FrameTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 6],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: FramePhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}
