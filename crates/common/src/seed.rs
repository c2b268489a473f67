use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::WorldGenConfig;

/// The 32-bit signed world seed every peer must agree on before generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSeed(pub i32);

impl std::fmt::Display for WorldSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exclusive upper bound of randomly drawn seeds.
const RANDOM_SEED_LIMIT: i32 = 2_000_000_000;

/// The single peer that decides the world seed and publishes it.
///
/// Replicas never resolve a seed themselves; they wait until the authority's
/// value reaches them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedAuthority;

impl SeedAuthority {
    /// Pick the seed to publish: the configured one, or a fresh random one
    /// when `randomize_seed_on_start` is set.
    pub fn resolve(config: &WorldGenConfig) -> WorldSeed {
        if config.randomize_seed_on_start {
            let seed = rand::thread_rng().gen_range(0..RANDOM_SEED_LIMIT);
            tracing::info!(seed, "randomized world seed");
            WorldSeed(seed)
        } else {
            WorldSeed(config.world_seed)
        }
    }
}
