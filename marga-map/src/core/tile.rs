//! Tile coordinates on the discrete grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use super::Direction;

/// One discrete grid cell on a map (integer tile indices).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    /// X coordinate (column index)
    pub x: i32,
    /// Y coordinate (row index, grows downward)
    pub y: i32,
}

impl TileCoord {
    /// Create a new tile coordinate
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another coordinate.
    ///
    /// Admissible and consistent heuristic for uniform-cost 4-connected
    /// movement.
    #[inline]
    pub fn manhattan_distance(&self, other: &TileCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The neighbor one step away in the given direction.
    #[inline]
    pub fn step(&self, dir: Direction) -> TileCoord {
        let (dx, dy) = dir.delta();
        TileCoord::new(self.x + dx, self.y + dy)
    }

    /// The 4 cardinal neighbors, paired with the direction that reaches
    /// them, in the deterministic expansion order.
    #[inline]
    pub fn neighbors_4(&self) -> [(Direction, TileCoord); 4] {
        [
            (Direction::Up, self.step(Direction::Up)),
            (Direction::Down, self.step(Direction::Down)),
            (Direction::Left, self.step(Direction::Left)),
            (Direction::Right, self.step(Direction::Right)),
        ]
    }
}

impl Add for TileCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        TileCoord::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for TileCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        TileCoord::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_matches_neighbors() {
        let c = TileCoord::new(3, 7);
        for (dir, n) in c.neighbors_4() {
            assert_eq!(c.step(dir), n);
            assert_eq!(c.manhattan_distance(&n), 1);
        }
    }

    #[test]
    fn test_manhattan_distance() {
        let a = TileCoord::new(0, 0);
        let b = TileCoord::new(4, 4);
        assert_eq!(a.manhattan_distance(&b), 8);
        assert_eq!(b.manhattan_distance(&a), 8);
    }
}
