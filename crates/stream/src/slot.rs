use mazeworld_common::{TileCoord, WorldGenConfig, WorldSeed};
use mazeworld_kernel::{MazeGenerator, TileSeedKey, Xorshift};
use mazeworld_mesh::{IncrementalMeshBuilder, MeshError, SubMesh};

use crate::sink::GeometrySink;

/// Lifecycle of one slot's tile pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Freshly (re)labelled; geometry cleared.
    Idle,
    /// Waiting for admission.
    PendingGeneration,
    Generating,
    Meshing,
    Ready,
}

impl SlotState {
    /// Holds one of the parallel generation permits.
    pub fn is_busy(self) -> bool {
        matches!(self, SlotState::Generating | SlotState::Meshing)
    }
}

/// What one pipeline advance did, for tick statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SlotProgress {
    pub maze_steps: u32,
    pub commits: usize,
    pub finished: bool,
}

/// A fixed arena entry: one tile's maze, mesher and sub-meshes.
///
/// Slots are allocated once; moving the window only relabels them.
#[derive(Debug, Clone)]
pub struct TileSlot {
    coord: Option<TileCoord>,
    state: SlotState,
    visible: bool,
    maze: MazeGenerator,
    builder: IncrementalMeshBuilder,
    sub_meshes: Vec<SubMesh>,
}

impl TileSlot {
    pub fn new(config: &WorldGenConfig) -> Self {
        Self {
            coord: None,
            state: SlotState::Idle,
            visible: false,
            maze: MazeGenerator::new(config.maze_size),
            builder: IncrementalMeshBuilder::new(config),
            sub_meshes: (0..config.sub_mesh_count()).map(SubMesh::new).collect(),
        }
    }

    /// Assigned tile; `None` until the window is first seated.
    pub fn coord(&self) -> Option<TileCoord> {
        self.coord
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Whether the host should draw this tile (the observer's tile or an
    /// edge neighbour).
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn maze(&self) -> &MazeGenerator {
        &self.maze
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    pub fn face_count(&self) -> usize {
        self.sub_meshes.iter().map(SubMesh::face_count).sum()
    }

    /// Move the slot to a new tile, cancelling any work in progress.
    /// Returns the tile it previously held.
    pub(crate) fn relabel(&mut self, coord: TileCoord) -> Option<TileCoord> {
        let old = self.coord.replace(coord);
        self.reset();
        old
    }

    /// Back to `Idle` with empty geometry, keeping the coordinate.
    pub(crate) fn reset(&mut self) {
        self.state = SlotState::Idle;
        self.maze.reset();
        self.builder.reset();
        for sm in &mut self.sub_meshes {
            sm.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn replace_maze(&mut self, maze: MazeGenerator) {
        self.maze = maze;
    }

    #[cfg(test)]
    pub(crate) fn builder(&self) -> &IncrementalMeshBuilder {
        &self.builder
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn mark_pending(&mut self) {
        if self.state == SlotState::Idle {
            self.state = SlotState::PendingGeneration;
        }
    }

    /// Admit the slot: seed the generator for its tile and start generating.
    pub(crate) fn start(&mut self, rng: &mut Xorshift, world_seed: WorldSeed) {
        let Some(coord) = self.coord else {
            return;
        };
        let key = TileSeedKey::new(coord, world_seed);
        self.maze.init_keyed(rng, key, coord == TileCoord::ORIGIN);
        self.state = SlotState::Generating;
        tracing::debug!(%coord, "tile generation started");
    }

    /// Run one bounded batch of whichever phase the slot is in.
    pub(crate) fn advance(
        &mut self,
        rng: &mut Xorshift,
        world_seed: WorldSeed,
        config: &WorldGenConfig,
        sink: &mut impl GeometrySink,
    ) -> Result<SlotProgress, MeshError> {
        let mut progress = SlotProgress::default();
        let Some(coord) = self.coord else {
            return Ok(progress);
        };
        match self.state {
            SlotState::Generating => {
                let key = TileSeedKey::new(coord, world_seed);
                let before = self.maze.steps();
                let done = self.maze.advance(rng, key, config.generation_iters);
                progress.maze_steps = self.maze.steps() - before;
                if done {
                    self.builder.reset();
                    self.state = SlotState::Meshing;
                    tracing::debug!(%coord, steps = self.maze.steps(), "maze generated");
                }
            }
            SlotState::Meshing => {
                let committed = self.builder.step(
                    self.maze.grid(),
                    config.init_iters(),
                    config.build_iters,
                    &mut self.sub_meshes,
                )?;
                if let Some(index) = committed {
                    progress.commits = 1;
                    sink.submit_sub_mesh(coord, &self.sub_meshes[index]);
                }
                if self.builder.is_done() {
                    self.state = SlotState::Ready;
                    progress.finished = true;
                    tracing::debug!(%coord, faces = self.face_count(), "tile meshed");
                }
            }
            SlotState::Idle | SlotState::PendingGeneration | SlotState::Ready => {}
        }
        Ok(progress)
    }
}
