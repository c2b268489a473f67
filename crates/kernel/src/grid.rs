/// One edge of a maze cell, stored as a bit in the cell's 4-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wall {
    /// Edge towards `y - 1`.
    South,
    /// Edge towards `y + 1`.
    North,
    /// Edge towards `x - 1`.
    West,
    /// Edge towards `x + 1`.
    East,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::South, Wall::North, Wall::West, Wall::East];

    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Wall::South => 0b0001,
            Wall::North => 0b0010,
            Wall::West => 0b0100,
            Wall::East => 0b1000,
        }
    }

    /// The same edge as seen from the neighbouring cell.
    pub const fn opposite(self) -> Wall {
        match self {
            Wall::South => Wall::North,
            Wall::North => Wall::South,
            Wall::West => Wall::East,
            Wall::East => Wall::West,
        }
    }

    /// Offset to the neighbour sharing this edge.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Wall::South => (0, -1),
            Wall::North => (0, 1),
            Wall::West => (-1, 0),
            Wall::East => (1, 0),
        }
    }
}

/// Square grid of wall bitmasks, indexed by `(x, y)`.
///
/// Cells are stored row-major (`y * size + x`); all access goes through the
/// indexing helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallGrid {
    size: usize,
    cells: Vec<u8>,
}

impl WallGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size, "cell ({x}, {y}) out of range");
        y * self.size + x
    }

    /// Raw 4-bit mask of a cell.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn has_wall(&self, x: usize, y: usize, wall: Wall) -> bool {
        self.cell(x, y) & wall.bit() != 0
    }

    /// Set a wall on one cell and its mirror on the neighbour, when the
    /// neighbour exists.
    pub fn set_wall(&mut self, x: usize, y: usize, wall: Wall) {
        let i = self.index(x, y);
        self.cells[i] |= wall.bit();
        if let Some((nx, ny)) = self.neighbour(x, y, wall) {
            let j = self.index(nx, ny);
            self.cells[j] |= wall.opposite().bit();
        }
    }

    /// Remove every wall of a cell, including the mirrored bits on its
    /// neighbours.
    pub fn clear_cell(&mut self, x: usize, y: usize) {
        for wall in Wall::ALL {
            if let Some((nx, ny)) = self.neighbour(x, y, wall) {
                let j = self.index(nx, ny);
                self.cells[j] &= !wall.opposite().bit();
            }
        }
        let i = self.index(x, y);
        self.cells[i] = 0;
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn neighbour(&self, x: usize, y: usize, wall: Wall) -> Option<(usize, usize)> {
        let (dx, dy) = wall.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.size && ny < self.size).then_some((nx, ny))
    }

    /// Number of set wall bits over the whole grid.
    pub fn wall_bits(&self) -> usize {
        self.cells.iter().map(|c| c.count_ones() as usize).sum()
    }

    /// First internal edge whose two sides disagree, if any.
    pub fn find_one_sided_wall(&self) -> Option<(usize, usize, Wall)> {
        for y in 0..self.size {
            for x in 0..self.size {
                for wall in [Wall::North, Wall::East] {
                    if let Some((nx, ny)) = self.neighbour(x, y, wall) {
                        if self.has_wall(x, y, wall) != self.has_wall(nx, ny, wall.opposite()) {
                            return Some((x, y, wall));
                        }
                    }
                }
            }
        }
        None
    }

    /// FNV-1a over the cell masks, for cheap equality checks across runs.
    pub fn content_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for &c in &self.cells {
            h ^= c as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        h
    }
}
