use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies one tile of the infinite maze plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile.
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The tile itself or one of its four edge neighbours.
    pub fn is_adjacent_or_same(self, other: Self) -> bool {
        self.manhattan(other) <= 1
    }

    /// World-space position of the tile centre (Y-up, tiles laid out on XZ).
    pub fn world_origin(self, tile_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * tile_size, 0.0, self.y as f32 * tile_size)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The observer's discretised position: world position divided by the tile
/// size, rounded to the nearest integer on X and Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_world(position: Vec3, tile_size: f32) -> Self {
        Self {
            x: (position.x / tile_size).round() as i32,
            y: (position.z / tile_size).round() as i32,
        }
    }

    /// The tile the observer stands in.
    pub fn tile(self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// Both components truncated to an even value (towards zero).
    pub fn to_even(self) -> Self {
        Self {
            x: (self.x / 2) * 2,
            y: (self.y / 2) * 2,
        }
    }
}
