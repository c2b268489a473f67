use glam::{Vec2, Vec3};
use mazeworld_common::WorldGenConfig;
use mazeworld_kernel::WallGrid;

use crate::buffers::{MeshBuffers, SubMesh};
use crate::face::{FaceDir, FaceKind, FaceSpec, for_each_cell_face};

/// Contract violations detected while building. The slot that hit one must
/// be reset and regenerated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("sub-mesh {sub_mesh}: counted {counted} faces but emitted {emitted}")]
    FaceCountMismatch {
        sub_mesh: usize,
        counted: usize,
        emitted: usize,
    },
    #[error("wall grid is {actual} cells wide, builder expects {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },
    #[error("output holds {actual} sub-meshes, builder expects {expected}")]
    OutputSizeMismatch { expected: usize, actual: usize },
}

/// World-space dimensions of the generated walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallParams {
    /// Side of one maze cell.
    pub cell_length: f32,
    /// Slab thickness; also the width of connector caps.
    pub thickness: f32,
    pub height: f32,
    /// Horizontal UV scale of connector caps.
    pub connector_uv_scale: f32,
}

impl WallParams {
    pub fn from_config(config: &WorldGenConfig) -> Self {
        let cell_length = config.tile_size / config.maze_size as f32;
        Self {
            cell_length,
            thickness: cell_length * 0.1 * config.wall_thickness_factor,
            height: config.wall_height,
            connector_uv_scale: 0.1 * config.wall_thickness_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Counting the faces of the current sub-mesh.
    Count,
    /// Writing the faces of the current sub-mesh into exact-size buffers.
    Emit,
    Done,
}

/// Resumable two-phase mesher for one tile.
///
/// Sub-meshes are handled strictly in index order; for each one a full count
/// pass precedes a full emit pass. The unit of work is one cell column of the
/// current sub-mesh.
#[derive(Debug, Clone)]
pub struct IncrementalMeshBuilder {
    maze_size: usize,
    partitions: usize,
    sub_size: usize,
    params: WallParams,
    sub_mesh: usize,
    phase: BuildPhase,
    column: usize,
    counted: usize,
    staging: MeshBuffers,
}

impl IncrementalMeshBuilder {
    pub fn new(config: &WorldGenConfig) -> Self {
        Self {
            maze_size: config.maze_size,
            partitions: config.sub_mesh_partitions,
            sub_size: config.sub_mesh_size(),
            params: WallParams::from_config(config),
            sub_mesh: 0,
            phase: BuildPhase::Count,
            column: 0,
            counted: 0,
            staging: MeshBuffers::default(),
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Index of the sub-mesh currently being counted or emitted.
    pub fn current_sub_mesh(&self) -> usize {
        self.sub_mesh
    }

    pub fn is_done(&self) -> bool {
        self.phase == BuildPhase::Done
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.partitions * self.partitions
    }

    /// Start over at sub-mesh 0.
    pub fn reset(&mut self) {
        self.sub_mesh = 0;
        self.phase = BuildPhase::Count;
        self.column = 0;
        self.counted = 0;
        self.staging = MeshBuffers::default();
    }

    /// Advance the current phase by at most `count_budget` (count phase) or
    /// `emit_budget` (emit phase) columns. A phase change ends the call.
    ///
    /// Returns the index of the sub-mesh committed by this call, if any.
    pub fn step(
        &mut self,
        grid: &WallGrid,
        count_budget: usize,
        emit_budget: usize,
        out: &mut [SubMesh],
    ) -> Result<Option<usize>, MeshError> {
        if grid.size() != self.maze_size {
            return Err(MeshError::GridSizeMismatch {
                expected: self.maze_size,
                actual: grid.size(),
            });
        }
        if out.len() != self.sub_mesh_count() {
            return Err(MeshError::OutputSizeMismatch {
                expected: self.sub_mesh_count(),
                actual: out.len(),
            });
        }
        match self.phase {
            BuildPhase::Count => {
                self.count(grid, count_budget);
                Ok(None)
            }
            BuildPhase::Emit => self.emit(grid, emit_budget, out),
            BuildPhase::Done => Ok(None),
        }
    }

    /// Cell range `(x0, y0)` of the current sub-mesh.
    fn sub_origin(&self) -> (usize, usize) {
        let mx = self.sub_mesh % self.partitions;
        let my = self.sub_mesh / self.partitions;
        (mx * self.sub_size, my * self.sub_size)
    }

    fn count(&mut self, grid: &WallGrid, budget: usize) {
        let (x0, y0) = self.sub_origin();
        if self.column == 0 {
            self.counted = 0;
        }
        for _ in 0..budget {
            let x = x0 + self.column;
            for y in y0..y0 + self.sub_size {
                for_each_cell_face(grid, x, y, |_| self.counted += 1);
            }
            self.column += 1;
            if self.column == self.sub_size {
                tracing::trace!(sub_mesh = self.sub_mesh, faces = self.counted, "sub-mesh counted");
                self.staging = MeshBuffers::with_faces(self.counted);
                self.phase = BuildPhase::Emit;
                self.column = 0;
                return;
            }
        }
    }

    fn emit(
        &mut self,
        grid: &WallGrid,
        budget: usize,
        out: &mut [SubMesh],
    ) -> Result<Option<usize>, MeshError> {
        let (x0, y0) = self.sub_origin();
        for _ in 0..budget {
            let x = x0 + self.column;
            for y in y0..y0 + self.sub_size {
                let params = self.params;
                let half = self.maze_size / 2;
                let staging = &mut self.staging;
                for_each_cell_face(grid, x, y, |face| emit_face(staging, &params, half, face));
            }
            self.column += 1;

            let emitted = self.staging.face_count();
            let finished = self.column == self.sub_size;
            let mismatch = emitted > self.counted || (finished && emitted != self.counted);
            debug_assert!(!mismatch, "face count mismatch in sub-mesh {}", self.sub_mesh);
            if mismatch {
                return Err(MeshError::FaceCountMismatch {
                    sub_mesh: self.sub_mesh,
                    counted: self.counted,
                    emitted,
                });
            }
            if finished {
                return Ok(Some(self.commit(out)));
            }
        }
        Ok(None)
    }

    fn commit(&mut self, out: &mut [SubMesh]) -> usize {
        let index = self.sub_mesh;
        out[index].commit(std::mem::take(&mut self.staging));
        self.column = 0;
        self.sub_mesh += 1;
        self.phase = if self.sub_mesh == self.sub_mesh_count() {
            BuildPhase::Done
        } else {
            BuildPhase::Count
        };
        index
    }
}

/// Write one quad. Positions are tile-local (origin at the tile centre,
/// Y up); north and east faces sit one slab thickness past the cell edge.
/// Corners are ordered so that both triangles of `QUAD_INDICES` wind
/// counter-clockwise when seen from the side the normal points to.
fn emit_face(out: &mut MeshBuffers, params: &WallParams, half: usize, face: FaceSpec) {
    let len = params.cell_length;
    let t = params.thickness;
    let h = params.height;
    let px = (face.x as f32 - half as f32) * len;
    let pz = (face.y as f32 - half as f32) * len;

    let (width, uv_scale) = match face.kind {
        FaceKind::Wall => (len, 1.0),
        FaceKind::Connector => (t, params.connector_uv_scale),
    };
    let offset = match (face.kind, face.dir) {
        (FaceKind::Wall, FaceDir::North | FaceDir::East) => t,
        _ => 0.0,
    };

    let (corners, normal) = match face.dir {
        FaceDir::South => {
            let z = pz + offset;
            (
                [
                    Vec3::new(px + width, h, z),
                    Vec3::new(px, h, z),
                    Vec3::new(px, 0.0, z),
                    Vec3::new(px + width, 0.0, z),
                ],
                Vec3::NEG_Z,
            )
        }
        FaceDir::North => {
            let z = pz + len + offset;
            (
                [
                    Vec3::new(px, h, z),
                    Vec3::new(px + width, h, z),
                    Vec3::new(px + width, 0.0, z),
                    Vec3::new(px, 0.0, z),
                ],
                Vec3::Z,
            )
        }
        FaceDir::West => {
            let x = px + offset;
            (
                [
                    Vec3::new(x, h, pz),
                    Vec3::new(x, h, pz + width),
                    Vec3::new(x, 0.0, pz + width),
                    Vec3::new(x, 0.0, pz),
                ],
                Vec3::NEG_X,
            )
        }
        FaceDir::East => {
            let x = px + len + offset;
            (
                [
                    Vec3::new(x, h, pz + width),
                    Vec3::new(x, h, pz),
                    Vec3::new(x, 0.0, pz),
                    Vec3::new(x, 0.0, pz + width),
                ],
                Vec3::X,
            )
        }
    };
    let uvs = [
        Vec2::new(uv_scale, 1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(uv_scale, 0.0),
    ];
    out.push_quad(corners, normal, uvs);
}
