use std::path::PathBuf;

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Disable the trail/orb simulator entirely and show cards settled.
    pub reduced_motion: bool,
    /// RNG seed. None means seed from entropy.
    pub seed: Option<u64>,
    /// Optional JSON file with card descriptors.
    pub cards_path: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn from_env() -> Self {
        let reduced_motion = std::env::var("HEROFX_REDUCED_MOTION")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let seed = std::env::var("HEROFX_SEED")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok());

        let cards_path = std::env::var("HEROFX_CARDS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            reduced_motion,
            seed,
            cards_path,
        }
    }

    /// RNG for the session — seeded when requested so runs can be replayed.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
