//! Error types for Marga-Map.

use thiserror::Error;

use crate::core::{MapId, TileCoord};

/// Failures while building or validating map records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A coordinate appears in both the walkable and the wall set.
    #[error("{map}: tile {coord} is recorded as both walkable and wall")]
    ConflictingTile { map: MapId, coord: TileCoord },

    /// A warp references a coordinate outside the map bounds.
    #[error("{map}: warp at {at} lies outside recorded bounds")]
    WarpOutOfBounds { map: MapId, at: TileCoord },

    /// Two maps with the same id were inserted into the store.
    #[error("duplicate map id {0}")]
    DuplicateMap(MapId),
}

/// Typed routing failures, surfaced to callers unmodified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No path exists within one map between the given tiles.
    #[error("{map}: no path from {start} to {goal}")]
    Unreachable {
        map: MapId,
        start: TileCoord,
        goal: TileCoord,
    },

    /// No sequence of recorded warps connects the two maps.
    #[error("no warp chain connects {from} to {to}")]
    NoRoute { from: MapId, to: MapId },

    /// The route would need territory that has not been scanned.
    #[error("route requires unscanned territory on {map}")]
    UnscannedMap { map: MapId },
}

/// Failures while loading or saving persisted map data.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid map record: {0}")]
    InvalidRecord(#[from] MapError),
}
