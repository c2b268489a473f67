use mazeworld_common::{TileCoord, WorldSeed};

const X_MULTIPLIER: i32 = 13_263_126;
const Y_MULTIPLIER: i32 = 2_154_135;
const BATCH_MULTIPLIER: i32 = 10_413_561;

/// Derives the PRNG seed for one batch of one tile's generation.
///
/// The seed is a pure function of `(tile, world seed, batch counter)` using
/// wrapping 32-bit arithmetic, so every peer reseeds to the same state no
/// matter how its scheduler interleaves tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSeedKey {
    pub tile: TileCoord,
    pub world_seed: WorldSeed,
}

impl TileSeedKey {
    pub fn new(tile: TileCoord, world_seed: WorldSeed) -> Self {
        Self { tile, world_seed }
    }

    /// Seed for batch `counter`. Counter 0 is used to initialise a generator.
    pub fn seed_for(&self, counter: u32) -> u64 {
        let mixed = self
            .tile
            .x
            .wrapping_mul(X_MULTIPLIER)
            .wrapping_add(self.tile.y.wrapping_mul(Y_MULTIPLIER))
            .wrapping_add(self.world_seed.0)
            .wrapping_add((counter as i32).wrapping_mul(BATCH_MULTIPLIER));
        let folded = if mixed < 0 {
            i32::MAX.wrapping_add(mixed)
        } else {
            mixed
        };
        u64::from(folded as u32)
    }
}
