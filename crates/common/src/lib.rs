//! Shared types for the maze world: tile coordinates, observer grid positions,
//! the distributed world seed and the generation configuration.
//!
//! # Invariants
//! - Tile coordinates are unbounded signed pairs; arithmetic on them wraps
//!   only inside seed derivation, never here.
//! - A validated `WorldGenConfig` is the only configuration the core accepts.

pub mod config;
pub mod seed;
pub mod types;

pub use config::{ConfigError, WorldGenConfig};
pub use seed::{SeedAuthority, WorldSeed};
pub use types::{GridPos, TileCoord};
