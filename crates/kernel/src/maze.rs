//! Resumable recursive-division maze generation.
//!
//! The classic algorithm is modified in three ways: walls get two gaps (three
//! on long walls) so a tile has many routes across it, small regions are
//! sometimes left undivided to form open rooms, and the recursion is an
//! explicit stack so the work can be sliced into single steps across ticks.

use crate::grid::{Wall, WallGrid};
use crate::rng::Xorshift;
use crate::seed_key::TileSeedKey;

/// Stack capacity; enough for mazes up to 128×128.
pub const MAX_STACK_DEPTH: usize = 32;
/// Regions narrower than this across a divider are never subdivided.
const MIN_REGION_SIZE: usize = 3;
/// Regions whose smaller side is below this may be left as a room.
const ROOM_THRESHOLD: usize = 8;
/// Walls at least this long get a third gap.
const LONG_WALL_SPAN: usize = 32;
/// Half extents of the cleared spawn room: 6 cells along x, 10 along y.
const SPAWN_ROOM_HALF_X: usize = 3;
const SPAWN_ROOM_HALF_Y: usize = 5;

/// Direction of the divider wall across a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Wall runs along x, splitting the region into a low-y and a high-y half.
    Horizontal,
    /// Wall runs along y, splitting the region into a low-x and a high-x half.
    Vertical,
}

/// A pending rectangle of the subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Offset of the divider from the region's low edge along the split axis.
    pub divider: usize,
    pub orientation: Orientation,
    pub needs_divider: bool,
}

impl Region {
    fn child(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            divider: 0,
            orientation: Orientation::Horizontal,
            needs_divider: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenState {
    Idle,
    Generating,
    Done,
}

/// Generates one tile's wall grid, one stack operation per [`MazeGenerator::step`].
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    grid: WallGrid,
    stack: Vec<Region>,
    state: GenState,
    carve_spawn_room: bool,
    steps: u32,
    max_depth: usize,
}

impl MazeGenerator {
    pub fn new(maze_size: usize) -> Self {
        Self {
            grid: WallGrid::new(maze_size),
            stack: Vec::with_capacity(MAX_STACK_DEPTH),
            state: GenState::Idle,
            carve_spawn_room: false,
            steps: 0,
            max_depth: 0,
        }
    }

    pub fn state(&self) -> GenState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == GenState::Done
    }

    /// The wall grid. Only meaningful once [`MazeGenerator::is_done`].
    pub fn grid(&self) -> &WallGrid {
        &self.grid
    }

    /// Steps taken since the last `init`.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Deepest stack seen since the last `init`.
    pub fn max_stack_depth(&self) -> usize {
        self.max_depth
    }

    /// Drop all progress and return to `Idle` with an empty grid.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.stack.clear();
        self.state = GenState::Idle;
        self.steps = 0;
        self.max_depth = 0;
    }

    /// Clear the grid and push the root region: the whole tile with a
    /// horizontal divider at a random offset.
    pub fn init(&mut self, rng: &mut Xorshift, carve_spawn_room: bool) {
        self.reset();
        let size = self.grid.size();
        self.carve_spawn_room = carve_spawn_room;
        self.stack.push(Region {
            x: 0,
            y: 0,
            width: size,
            height: size,
            divider: rng.next_int(size as i32 - 1) as usize + 1,
            orientation: Orientation::Horizontal,
            needs_divider: false,
        });
        self.max_depth = 1;
        self.state = GenState::Generating;
    }

    /// Init with the PRNG reseeded from the tile's base key.
    pub fn init_keyed(&mut self, rng: &mut Xorshift, key: TileSeedKey, carve_spawn_room: bool) {
        rng.seed(key.seed_for(0));
        self.init(rng, carve_spawn_room);
    }

    /// Run up to `budget` steps, reseeding the shared PRNG from `key` before
    /// each one. Returns `true` once generation is complete.
    ///
    /// Every step is keyed by its own index, so the result is the same for any
    /// budget and any interleaving with other tiles.
    pub fn advance(&mut self, rng: &mut Xorshift, key: TileSeedKey, budget: usize) -> bool {
        for _ in 0..budget {
            if self.state != GenState::Generating {
                break;
            }
            rng.seed(key.seed_for(self.steps + 1));
            self.step(rng);
        }
        self.is_done()
    }

    /// Perform exactly one stack operation.
    pub fn step(&mut self, rng: &mut Xorshift) {
        if self.state != GenState::Generating {
            return;
        }
        self.steps += 1;

        let Some(mut region) = self.stack.pop() else {
            self.finish();
            return;
        };

        if region.needs_divider {
            // Draw the divider now and carve it on the next pop, so each step
            // consumes a fixed pattern of draws.
            region.orientation = if region.width > region.height {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            let extent = match region.orientation {
                Orientation::Vertical => region.width,
                Orientation::Horizontal => region.height,
            };
            region.divider = rng.next_int(extent as i32 - 1) as usize + 1;
            region.needs_divider = false;
            self.push(region);
            return;
        }

        self.carve(rng, &region);
        self.divide(rng, &region);
    }

    fn push(&mut self, region: Region) {
        self.stack.push(region);
        if self.stack.len() > self.max_depth {
            self.max_depth = self.stack.len();
            if self.max_depth > MAX_STACK_DEPTH {
                tracing::warn!(depth = self.max_depth, "maze stack exceeded its nominal depth");
            }
        }
    }

    fn carve(&mut self, rng: &mut Xorshift, region: &Region) {
        let (start, span) = match region.orientation {
            Orientation::Vertical => (region.y, region.height),
            Orientation::Horizontal => (region.x, region.width),
        };
        let gap1 = start + rng.next_int(span as i32) as usize;
        let gap2 = start + rng.next_int(span as i32) as usize;
        let gap3 = (span >= LONG_WALL_SPAN).then(|| start + rng.next_int(span as i32) as usize);

        for i in start..start + span {
            if i == gap1 || i == gap2 || Some(i) == gap3 {
                continue;
            }
            match region.orientation {
                Orientation::Vertical => self.grid.set_wall(region.x + region.divider, i, Wall::West),
                Orientation::Horizontal => {
                    self.grid.set_wall(i, region.y + region.divider, Wall::South)
                }
            }
        }
    }

    /// Push the two halves of a carved region, low side first.
    fn divide(&mut self, rng: &mut Xorshift, region: &Region) {
        let div = region.divider;
        let (along, across) = match region.orientation {
            Orientation::Vertical => (region.height, region.width),
            Orientation::Horizontal => (region.width, region.height),
        };
        if along < MIN_REGION_SIZE {
            return;
        }

        for (offset, extent) in [(0, div), (div, across - div)] {
            if extent < MIN_REGION_SIZE {
                continue;
            }
            let d = extent.min(along);
            if d < ROOM_THRESHOLD && rng.next_int(2 * d as i32) == 0 {
                continue;
            }
            let child = match region.orientation {
                Orientation::Vertical => {
                    Region::child(region.x + offset, region.y, extent, region.height)
                }
                Orientation::Horizontal => {
                    Region::child(region.x, region.y + offset, region.width, extent)
                }
            };
            self.push(child);
        }
    }

    fn finish(&mut self) {
        if self.carve_spawn_room {
            let size = self.grid.size();
            let half = size / 2;
            let xs = half.saturating_sub(SPAWN_ROOM_HALF_X)..(half + SPAWN_ROOM_HALF_X).min(size);
            let ys = half.saturating_sub(SPAWN_ROOM_HALF_Y)..(half + SPAWN_ROOM_HALF_Y).min(size);
            for x in xs {
                for y in ys.clone() {
                    self.grid.clear_cell(x, y);
                }
            }
        }
        self.state = GenState::Done;
        tracing::trace!(
            steps = self.steps,
            max_depth = self.max_depth,
            walls = self.grid.wall_bits(),
            "maze generation finished"
        );
    }
}

/// Run a full generation for one tile in a single call.
pub fn generate_tile(maze_size: usize, key: TileSeedKey, carve_spawn_room: bool) -> MazeGenerator {
    let mut rng = Xorshift::default();
    let mut generator = MazeGenerator::new(maze_size);
    generator.init_keyed(&mut rng, key, carve_spawn_room);
    while !generator.advance(&mut rng, key, usize::MAX) {}
    generator
}
