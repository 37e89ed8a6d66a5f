//! Static world description for the mock engine.

use std::collections::{HashMap, HashSet};

use crate::engine::Facing;

/// One map of the mock world.
#[derive(Clone, Debug, Default)]
pub struct MockMap {
    /// Tiles the avatar may stand on.
    pub walkable: HashSet<(i32, i32)>,
    /// (tile, press direction) pairs that warp instead of stepping.
    pub warps: HashMap<((i32, i32), Facing), (u16, (i32, i32))>,
    /// Tiles that open an interactive exchange on arrival.
    pub exchange_triggers: HashSet<(i32, i32)>,
}

/// Static layout shared by all checkpoints of one engine.
#[derive(Clone, Debug, Default)]
pub struct MockWorld {
    maps: HashMap<u16, MockMap>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self, id: u16) -> Option<&MockMap> {
        self.maps.get(&id)
    }

    /// Add an empty map, replacing any existing one with the same id.
    pub fn add_map(&mut self, id: u16) -> &mut MockMap {
        self.maps.entry(id).or_default()
    }

    /// Add a fully walkable `width` x `height` map with origin (0, 0).
    pub fn add_grid(&mut self, id: u16, width: i32, height: i32) {
        let map = self.maps.entry(id).or_default();
        for y in 0..height {
            for x in 0..width {
                map.walkable.insert((x, y));
            }
        }
    }

    /// Carve a tile out of a map, making it blocking.
    pub fn remove_tile(&mut self, id: u16, tile: (i32, i32)) {
        if let Some(map) = self.maps.get_mut(&id) {
            map.walkable.remove(&tile);
        }
    }

    /// Register a warp: pressing `approach` while standing on `from`
    /// lands the avatar at `dest` on map `dest_map`.
    pub fn add_warp(
        &mut self,
        id: u16,
        from: (i32, i32),
        approach: Facing,
        dest_map: u16,
        dest: (i32, i32),
    ) {
        self.maps
            .entry(id)
            .or_default()
            .warps
            .insert((from, approach), (dest_map, dest));
    }

    /// Mark a tile so stepping onto it opens an exchange.
    pub fn add_exchange_trigger(&mut self, id: u16, tile: (i32, i32)) {
        self.maps
            .entry(id)
            .or_default()
            .exchange_triggers
            .insert(tile);
    }
}
