//! Incremental mesh synthesis: turns a finished wall grid into `W×W`
//! tile-bounded sub-meshes, a few cell columns per tick.
//!
//! # Invariants
//! - A sub-mesh's buffers are sized from an exact face count and committed
//!   wholesale; no partially written buffer is ever visible.
//! - Face decisions read only the canonical wall grid, never sub-mesh
//!   ownership, so geometry is seamless across sub-mesh boundaries.

mod buffers;
mod builder;
mod face;

pub use buffers::{Aabb, Collider, MeshBuffers, SubMesh};
pub use builder::{BuildPhase, IncrementalMeshBuilder, MeshError, WallParams};
pub use face::{FaceDir, FaceKind, FaceSpec, QUAD_INDICES, for_each_cell_face};

/// Number of faces a whole tile produces, counted over every cell.
pub fn count_tile_faces(grid: &mazeworld_kernel::WallGrid) -> usize {
    let mut total = 0;
    for x in 0..grid.size() {
        for y in 0..grid.size() {
            for_each_cell_face(grid, x, y, |_| total += 1);
        }
    }
    total
}
