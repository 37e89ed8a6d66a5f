//! Rectangular grid bounds.

use serde::{Deserialize, Serialize};

use super::TileCoord;

/// Inclusive rectangular bounds of a map's recorded tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl GridBounds {
    /// Bounds covering exactly one tile.
    pub fn at(coord: TileCoord) -> Self {
        Self {
            min_x: coord.x,
            max_x: coord.x,
            min_y: coord.y,
            max_y: coord.y,
        }
    }

    /// Whether the coordinate lies within the bounds (inclusive).
    #[inline]
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min_x && coord.x <= self.max_x && coord.y >= self.min_y && coord.y <= self.max_y
    }

    /// Grow the bounds to include the coordinate.
    pub fn expand_to(&mut self, coord: TileCoord) {
        self.min_x = self.min_x.min(coord.x);
        self.max_x = self.max_x.max(coord.x);
        self.min_y = self.min_y.min(coord.y);
        self.max_y = self.max_y.max(coord.y);
    }

    /// Bounds of a coordinate set, or `None` when empty.
    pub fn of<'a, I: IntoIterator<Item = &'a TileCoord>>(coords: I) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bounds = GridBounds::at(*first);
        for c in iter {
            bounds.expand_to(*c);
        }
        Some(bounds)
    }

    /// Width in tiles.
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    /// Height in tiles.
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_and_contains() {
        let mut b = GridBounds::at(TileCoord::new(2, 2));
        b.expand_to(TileCoord::new(5, 0));
        assert!(b.contains(TileCoord::new(3, 1)));
        assert!(!b.contains(TileCoord::new(6, 1)));
        assert_eq!(b.width(), 4);
        assert_eq!(b.height(), 3);
    }

    #[test]
    fn test_of_empty_set() {
        assert!(GridBounds::of(std::iter::empty::<&TileCoord>()).is_none());
    }
}
