//! A single map's tile record: walkable set, walls and warps.

use std::collections::HashSet;

use crate::core::{Direction, GridBounds, MapId, TileCoord};
use crate::error::MapError;

/// A directed transition from a tile on one map to a coordinate on another
/// (or the same) map.
///
/// Warps need not be bidirectional: entering a doorway from the other side
/// is a different, independently recorded warp on the other map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warp {
    /// Tile the controller stands on to take the warp.
    pub at: TileCoord,
    /// Direction that must be pressed to cross, when the scan recorded one.
    pub approach: Option<Direction>,
    /// Map the warp lands on.
    pub target_map: MapId,
    /// Landing coordinate on the target map.
    pub target: TileCoord,
}

/// Per-map tile data: pure data, no behavior beyond queries.
#[derive(Clone, Debug)]
pub struct TileMap {
    /// Stable map identity.
    pub id: MapId,
    /// Human-readable map name (drives the persisted filename).
    pub name: String,
    /// Tiles the controller may occupy.
    pub walkable: HashSet<TileCoord>,
    /// Tiles probed and found blocked.
    pub walls: HashSet<TileCoord>,
    /// Recorded outgoing warps.
    pub warps: Vec<Warp>,
    /// False when a scan was interrupted before the frontier drained;
    /// the router refuses to guess about the unexplored remainder.
    pub complete: bool,
    bounds: Option<GridBounds>,
}

impl TileMap {
    /// Create an empty map record (marked complete until a scanner says
    /// otherwise).
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            walkable: HashSet::new(),
            walls: HashSet::new(),
            warps: Vec::new(),
            complete: true,
            bounds: None,
        }
    }

    /// Record a walkable tile, growing the bounds.
    pub fn add_walkable(&mut self, coord: TileCoord) {
        self.walkable.insert(coord);
        self.expand(coord);
    }

    /// Record a wall tile, growing the bounds.
    pub fn add_wall(&mut self, coord: TileCoord) {
        self.walls.insert(coord);
        self.expand(coord);
    }

    /// Record an outgoing warp. The warp tile itself counts as walkable:
    /// the controller stands on it before crossing.
    pub fn add_warp(&mut self, warp: Warp) {
        self.expand(warp.at);
        self.walkable.insert(warp.at);
        self.warps.push(warp);
    }

    fn expand(&mut self, coord: TileCoord) {
        match &mut self.bounds {
            Some(b) => b.expand_to(coord),
            None => self.bounds = Some(GridBounds::at(coord)),
        }
    }

    /// Recorded bounds, or `None` for an empty record.
    pub fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    /// Whether the controller may occupy this tile.
    #[inline]
    pub fn is_walkable(&self, coord: TileCoord) -> bool {
        self.walkable.contains(&coord)
    }

    /// The warp standing on this tile, if one is recorded.
    pub fn warp_at(&self, coord: TileCoord) -> Option<&Warp> {
        self.warps.iter().find(|w| w.at == coord)
    }

    /// All warps leading to the given map, in recorded order.
    pub fn warps_to(&self, target: MapId) -> impl Iterator<Item = &Warp> {
        self.warps.iter().filter(move |w| w.target_map == target)
    }

    /// Check the record invariants: walkable and wall sets disjoint, every
    /// warp tile within bounds.
    pub fn validate(&self) -> Result<(), MapError> {
        if let Some(&coord) = self.walkable.intersection(&self.walls).next() {
            return Err(MapError::ConflictingTile { map: self.id, coord });
        }
        if let Some(bounds) = self.bounds {
            for warp in &self.warps {
                if !bounds.contains(warp.at) {
                    return Err(MapError::WarpOutOfBounds {
                        map: self.id,
                        at: warp.at,
                    });
                }
            }
        } else if let Some(warp) = self.warps.first() {
            return Err(MapError::WarpOutOfBounds {
                map: self.id,
                at: warp.at,
            });
        }
        Ok(())
    }
}
