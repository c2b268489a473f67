use mazeworld_common::TileCoord;
use mazeworld_mesh::SubMesh;

/// Receives finished geometry for submission to the host renderer and
/// collision system.
///
/// The sink never mutates generation state; it only observes commits and
/// clears.
pub trait GeometrySink {
    /// A sub-mesh of `tile` was rebuilt and its buffers replaced.
    fn submit_sub_mesh(&mut self, tile: TileCoord, sub_mesh: &SubMesh);

    /// `tile` left the window; all of its geometry is gone.
    fn clear_tile(&mut self, tile: TileCoord);
}

/// Discards everything.
impl GeometrySink for () {
    fn submit_sub_mesh(&mut self, _tile: TileCoord, _sub_mesh: &SubMesh) {}

    fn clear_tile(&mut self, _tile: TileCoord) {}
}

/// Tallies what reached the sink. Useful for CLI output, logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountingSink {
    pub sub_meshes: usize,
    pub faces: usize,
    pub cleared_tiles: usize,
}

impl GeometrySink for CountingSink {
    fn submit_sub_mesh(&mut self, _tile: TileCoord, sub_mesh: &SubMesh) {
        self.sub_meshes += 1;
        self.faces += sub_mesh.face_count();
    }

    fn clear_tile(&mut self, _tile: TileCoord) {
        self.cleared_tiles += 1;
    }
}
