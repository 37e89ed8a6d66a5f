//! Fundamental coordinate and identity types.

mod bounds;
mod direction;
mod tile;

pub use bounds::GridBounds;
pub use direction::Direction;
pub use tile::TileCoord;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identity of one map.
///
/// Values come from whatever the simulated world reports as its map id;
/// the core never interprets them beyond equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u16);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}
