//! Streaming: the sliding window of tile slots, their generation pipelines
//! and the single-threaded tick scheduler that drives them.
//!
//! # Invariants
//! - The window's slot coordinates always form a gapless `N×N` square.
//! - At most `max_parallel_chunks` slots generate or mesh at once, and only
//!   slots within one tile (Manhattan) of the observer are admitted.
//! - Nothing generates before the world seed is received.
//! - A relabelled slot's old geometry is cleared before any new geometry for
//!   its new tile is submitted.

mod budget;
mod scheduler;
mod sink;
mod slot;
mod window;

pub use budget::{TickStats, TickTimer};
pub use scheduler::Scheduler;
pub use sink::{CountingSink, GeometrySink};
pub use slot::{SlotState, TileSlot};
pub use window::StreamingGrid;
