//! Maze kernel: the seedable PRNG and the resumable maze generator.
//!
//! # Invariants
//! - Identical seed ⇒ identical draw sequence on every platform (integer only).
//! - A tile's maze depends only on `(tile, world seed)`: the shared PRNG is
//!   reseeded from a `TileSeedKey` before every generator step, so neither the
//!   per-tick budget nor interleaving with other tiles can leak into the layout.
//! - Every internal wall bit is mirrored on the neighbouring cell.

pub mod grid;
pub mod maze;
pub mod rng;
pub mod seed_key;

pub use grid::{Wall, WallGrid};
pub use maze::{GenState, MAX_STACK_DEPTH, MazeGenerator, Orientation, Region, generate_tile};
pub use rng::Xorshift;
pub use seed_key::TileSeedKey;
