//! Map store: per-map tile records and the collection that routing reads.

mod tile_map;

pub use tile_map::{TileMap, Warp};

use std::collections::HashMap;

use crate::core::MapId;
use crate::error::MapError;

/// Collection of scanned maps, keyed by map id.
///
/// Written by the scanner (or loaded from disk), read-only to the
/// pathfinder, router and navigator at runtime.
#[derive(Debug, Default, Clone)]
pub struct MapStore {
    maps: HashMap<MapId, TileMap>,
}

impl MapStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a map after validating its invariants.
    ///
    /// Re-inserting an id that is already present is an error; replacing a
    /// partial scan with a fuller one goes through [`MapStore::replace`].
    pub fn insert(&mut self, map: TileMap) -> Result<(), MapError> {
        map.validate()?;
        if self.maps.contains_key(&map.id) {
            return Err(MapError::DuplicateMap(map.id));
        }
        self.maps.insert(map.id, map);
        Ok(())
    }

    /// Insert or replace a map record (used when a re-scan supersedes a
    /// partial one).
    pub fn replace(&mut self, map: TileMap) -> Result<(), MapError> {
        map.validate()?;
        self.maps.insert(map.id, map);
        Ok(())
    }

    /// Look up a map by id.
    pub fn get(&self, id: MapId) -> Option<&TileMap> {
        self.maps.get(&id)
    }

    /// Whether the store holds a record for this id.
    pub fn contains(&self, id: MapId) -> bool {
        self.maps.contains_key(&id)
    }

    /// Number of maps in the store.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Iterate over all maps (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = &TileMap> {
        self.maps.values()
    }

    /// All known maps as (id, name, complete) triples, sorted by id.
    pub fn scanned_maps(&self) -> Vec<(MapId, String, bool)> {
        let mut out: Vec<_> = self
            .maps
            .values()
            .map(|m| (m.id, m.name.clone(), m.complete))
            .collect();
        out.sort_by_key(|(id, _, _)| *id);
        out
    }
}
