use mazeworld_kernel::{Wall, WallGrid};

/// Direction a quad faces, which is also the side of the cell it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceDir {
    South,
    North,
    West,
    East,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    /// Full cell-length side of a wall slab.
    Wall,
    /// Thin end cap closing a wall slab that meets no cross wall.
    Connector,
}

/// One quad required by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceSpec {
    pub x: usize,
    pub y: usize,
    pub dir: FaceDir,
    pub kind: FaceKind,
}

/// Two triangles per quad, relative to the quad's first vertex.
pub const QUAD_INDICES: [u32; 6] = [3, 1, 0, 3, 2, 1];

/// True when the neighbour across `side` exists and has neither of the two
/// walls that would already close the slab end.
fn needs_cap(grid: &WallGrid, x: usize, y: usize, side: Wall, a: Wall, b: Wall) -> bool {
    match grid.neighbour(x, y, side) {
        Some((nx, ny)) => grid.cell(nx, ny) & (a.bit() | b.bit()) == 0,
        None => false,
    }
}

/// Visit every face cell `(x, y)` needs, in a fixed order.
///
/// South and west walls own the connector caps of their slab; north and east
/// walls contribute only their own side. Both the counting and the emitting
/// pass go through this function.
pub fn for_each_cell_face(grid: &WallGrid, x: usize, y: usize, mut visit: impl FnMut(FaceSpec)) {
    let mut face = |dir, kind| visit(FaceSpec { x, y, dir, kind });

    if grid.has_wall(x, y, Wall::South) {
        face(FaceDir::South, FaceKind::Wall);
        if needs_cap(grid, x, y, Wall::East, Wall::South, Wall::West) {
            face(FaceDir::East, FaceKind::Connector);
        }
        if needs_cap(grid, x, y, Wall::West, Wall::South, Wall::East) {
            face(FaceDir::West, FaceKind::Connector);
        }
    }
    if grid.has_wall(x, y, Wall::North) {
        face(FaceDir::North, FaceKind::Wall);
    }
    if grid.has_wall(x, y, Wall::West) {
        face(FaceDir::West, FaceKind::Wall);
        if needs_cap(grid, x, y, Wall::North, Wall::West, Wall::South) {
            face(FaceDir::North, FaceKind::Connector);
        }
        if needs_cap(grid, x, y, Wall::South, Wall::West, Wall::North) {
            face(FaceDir::South, FaceKind::Connector);
        }
    }
    if grid.has_wall(x, y, Wall::East) {
        face(FaceDir::East, FaceKind::Wall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(grid: &WallGrid, x: usize, y: usize) -> Vec<FaceSpec> {
        let mut out = Vec::new();
        for_each_cell_face(grid, x, y, |f| out.push(f));
        out
    }

    #[test]
    fn empty_cell_has_no_faces() {
        let grid = WallGrid::new(4);
        assert!(faces(&grid, 1, 1).is_empty());
    }

    #[test]
    fn isolated_wall_gets_both_caps() {
        let mut grid = WallGrid::new(4);
        grid.set_wall(1, 2, Wall::South);

        let upper = faces(&grid, 1, 2);
        assert_eq!(upper.len(), 3);
        assert_eq!(upper[0].dir, FaceDir::South);
        assert_eq!(upper[1], FaceSpec { x: 1, y: 2, dir: FaceDir::East, kind: FaceKind::Connector });
        assert_eq!(upper[2], FaceSpec { x: 1, y: 2, dir: FaceDir::West, kind: FaceKind::Connector });

        let lower = faces(&grid, 1, 1);
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].dir, FaceDir::North);
    }

    #[test]
    fn continuing_wall_has_no_cap_between_segments() {
        let mut grid = WallGrid::new(4);
        grid.set_wall(1, 2, Wall::South);
        grid.set_wall(2, 2, Wall::South);

        let left = faces(&grid, 1, 2);
        assert!(!left.iter().any(|f| f.dir == FaceDir::East && f.kind == FaceKind::Connector));
        let right = faces(&grid, 2, 2);
        assert!(!right.iter().any(|f| f.dir == FaceDir::West && f.kind == FaceKind::Connector));
    }

    #[test]
    fn grid_edge_counts_as_walled() {
        let mut grid = WallGrid::new(3);
        grid.set_wall(0, 1, Wall::South);
        grid.set_wall(1, 1, Wall::South);
        grid.set_wall(2, 1, Wall::South);

        // No cap towards the missing neighbours at x = -1 and x = 3.
        assert_eq!(faces(&grid, 0, 1).len(), 1);
        assert_eq!(faces(&grid, 2, 1).len(), 1);
    }

    #[test]
    fn cross_wall_suppresses_cap() {
        let mut grid = WallGrid::new(4);
        grid.set_wall(1, 2, Wall::South);
        grid.set_wall(2, 2, Wall::West);

        let f = faces(&grid, 1, 2);
        assert!(!f.iter().any(|f| f.dir == FaceDir::East && f.kind == FaceKind::Connector));
    }
}
