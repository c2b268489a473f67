//! Developer tooling: maze debug renders and streaming window inspection.
//!
//! # Invariants
//! - Tools are read-only; nothing here mutates generation state.

mod inspector;

pub use inspector::{MazeInspector, MazeSummary, Raster, WindowInspector, WindowSummary};
