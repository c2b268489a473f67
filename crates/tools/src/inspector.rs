use std::io::{self, Write};

use mazeworld_common::{GridPos, TileCoord, WorldSeed};
use mazeworld_kernel::{MazeGenerator, Wall, WallGrid};
use mazeworld_stream::{SlotState, StreamingGrid};

/// Maze inspector for developer tooling.
///
/// Renders wall grids as text or greyscale images. North is up in both.
pub struct MazeInspector;

impl MazeInspector {
    pub const PIXELS_PER_CELL: usize = 4;

    pub fn summary(maze: &MazeGenerator) -> MazeSummary {
        MazeSummary {
            size: maze.grid().size(),
            done: maze.is_done(),
            steps: maze.steps(),
            max_stack_depth: maze.max_stack_depth(),
            wall_bits: maze.grid().wall_bits(),
            content_hash: maze.grid().content_hash(),
        }
    }

    /// Box-drawing style text render, two characters per cell.
    pub fn ascii(grid: &WallGrid) -> String {
        let size = grid.size();
        let mut out = String::with_capacity((size * 3 + 2) * (size * 2 + 1));
        let horizontal = |out: &mut String, y: usize, wall: Wall| {
            for x in 0..size {
                out.push('+');
                out.push_str(if grid.has_wall(x, y, wall) { "--" } else { "  " });
            }
            out.push_str("+\n");
        };

        for y in (0..size).rev() {
            horizontal(&mut out, y, Wall::North);
            for x in 0..size {
                out.push(if grid.has_wall(x, y, Wall::West) { '|' } else { ' ' });
                out.push_str("  ");
            }
            let east = size > 0 && grid.has_wall(size - 1, y, Wall::East);
            out.push(if east { '|' } else { ' ' });
            out.push('\n');
        }
        if size > 0 {
            horizontal(&mut out, 0, Wall::South);
        }
        out
    }

    /// White canvas with a black line for every wall bit, four pixels per
    /// cell plus one closing row and column.
    pub fn raster(grid: &WallGrid) -> Raster {
        const WHITE: u8 = 255;
        let ppc = Self::PIXELS_PER_CELL;
        let side = grid.size() * ppc + 1;
        let mut raster = Raster {
            width: side,
            height: side,
            pixels: vec![WHITE; side * side],
        };

        for x in 0..grid.size() {
            for y in 0..grid.size() {
                let (px, py) = (x * ppc, y * ppc);
                for k in 0..ppc {
                    if grid.has_wall(x, y, Wall::South) {
                        raster.set_black(px + k, py);
                    }
                    if grid.has_wall(x, y, Wall::North) {
                        raster.set_black(px + k, py + ppc);
                    }
                    if grid.has_wall(x, y, Wall::West) {
                        raster.set_black(px, py + k);
                    }
                    if grid.has_wall(x, y, Wall::East) {
                        raster.set_black(px + ppc, py + k);
                    }
                }
            }
        }
        raster
    }

    /// Write the raster as a binary PGM (`P5`).
    pub fn write_pgm(grid: &WallGrid, out: &mut impl Write) -> io::Result<()> {
        let raster = Self::raster(grid);
        write!(out, "P5\n{} {}\n255\n", raster.width, raster.height)?;
        // Image rows run top to bottom; raster rows run south to north.
        for row in raster.pixels.chunks(raster.width).rev() {
            out.write_all(row)?;
        }
        tracing::debug!(width = raster.width, height = raster.height, "wrote maze PGM");
        Ok(())
    }
}

/// Summary of one tile's maze for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeSummary {
    pub size: usize,
    pub done: bool,
    pub steps: u32,
    pub max_stack_depth: usize,
    pub wall_bits: usize,
    pub content_hash: u64,
}

impl std::fmt::Display for MazeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Maze {0}x{0}: done={1} steps={2} max_depth={3} wall_bits={4} hash={5:016x}",
            self.size, self.done, self.steps, self.max_stack_depth, self.wall_bits, self.content_hash
        )
    }
}

/// Greyscale image, row-major with row 0 at the south edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    fn set_black(&mut self, x: usize, y: usize) {
        self.pixels[y * self.width + x] = 0;
    }
}

/// Read-only queries against the streaming window.
pub struct WindowInspector;

impl WindowInspector {
    pub fn summary(grid: &StreamingGrid) -> WindowSummary {
        let count = |state: SlotState| grid.slots().iter().filter(|s| s.state() == state).count();
        WindowSummary {
            ready: grid.is_ready(),
            seed: grid.world_seed(),
            observer: grid.observer(),
            min_corner: grid.min_corner(),
            window_size: grid.window_size(),
            pending: count(SlotState::PendingGeneration),
            busy: grid.busy_slots(),
            finished: count(SlotState::Ready),
            visible: grid.slots().iter().filter(|s| s.visible()).count(),
            faces: grid.slots().iter().map(|s| s.face_count()).sum(),
        }
    }
}

/// Summary of the window state for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSummary {
    pub ready: bool,
    pub seed: Option<WorldSeed>,
    pub observer: GridPos,
    pub min_corner: Option<TileCoord>,
    pub window_size: usize,
    pub pending: usize,
    pub busy: usize,
    pub finished: usize,
    pub visible: usize,
    pub faces: usize,
}

impl std::fmt::Display for WindowSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.ready {
            return write!(f, "Window: waiting for world seed");
        }
        let seed = self.seed.map(|s| s.0).unwrap_or_default();
        let corner = self.min_corner.unwrap_or(TileCoord::ORIGIN);
        write!(
            f,
            "Window: seed={} observer=({}, {}) corner={} size={} pending={} busy={} ready={} visible={} faces={}",
            seed,
            self.observer.x,
            self.observer.y,
            corner,
            self.window_size,
            self.pending,
            self.busy,
            self.finished,
            self.visible,
            self.faces,
        )
    }
}
