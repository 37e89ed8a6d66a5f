//! JSON persistence for map records.
//!
//! One record per map id, stored as `<snake_case_name>.json` inside the
//! maps directory. Coordinate lists are sorted before writing so records
//! diff cleanly between scans.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Direction, GridBounds, MapId, TileCoord};
use crate::error::PersistError;
use crate::store::{MapStore, TileMap, Warp};

/// Serialized form of one warp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarpRecord {
    pub at: TileCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<Direction>,
    pub target_map: MapId,
    pub target: TileCoord,
}

/// Serialized form of one map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRecord {
    pub map_id: MapId,
    pub map_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GridBounds>,
    #[serde(default = "default_complete")]
    pub complete: bool,
    pub walkable: Vec<TileCoord>,
    pub walls: Vec<TileCoord>,
    #[serde(default)]
    pub warps: Vec<WarpRecord>,
}

fn default_complete() -> bool {
    true
}

impl From<&TileMap> for MapRecord {
    fn from(map: &TileMap) -> Self {
        let mut walkable: Vec<_> = map.walkable.iter().copied().collect();
        walkable.sort();
        let mut walls: Vec<_> = map.walls.iter().copied().collect();
        walls.sort();
        Self {
            map_id: map.id,
            map_name: map.name.clone(),
            bounds: map.bounds(),
            complete: map.complete,
            walkable,
            walls,
            warps: map
                .warps
                .iter()
                .map(|w| WarpRecord {
                    at: w.at,
                    approach: w.approach,
                    target_map: w.target_map,
                    target: w.target,
                })
                .collect(),
        }
    }
}

impl MapRecord {
    /// Rebuild the in-memory map, re-validating its invariants.
    pub fn into_tile_map(self) -> Result<TileMap, PersistError> {
        let mut map = TileMap::new(self.map_id, self.map_name);
        map.complete = self.complete;
        for c in self.walkable {
            map.add_walkable(c);
        }
        for c in self.walls {
            map.add_wall(c);
        }
        for w in self.warps {
            map.add_warp(Warp {
                at: w.at,
                approach: w.approach,
                target_map: w.target_map,
                target: w.target,
            });
        }
        map.validate()?;
        Ok(map)
    }
}

/// Filename stem for a map name: lowercase, apostrophes and dots dropped,
/// spaces to underscores (`"Oak's Lab"` -> `oaks_lab`).
pub fn map_file_stem(name: &str) -> String {
    name.to_lowercase()
        .replace('\'', "")
        .replace('.', "")
        .replace(' ', "_")
}

/// Path a map record is saved under.
pub fn map_path(dir: &Path, map: &TileMap) -> PathBuf {
    dir.join(format!("{}.json", map_file_stem(&map.name)))
}

/// Save one map record, creating the directory as needed.
pub fn save_map(map: &TileMap, dir: &Path) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir)?;
    let path = map_path(dir, map);
    let record = MapRecord::from(map);
    fs::write(&path, serde_json::to_string_pretty(&record)?)?;
    info!(
        "[MapIo] saved {} ({} tiles, {} warps) -> {}",
        map.id,
        map.walkable.len() + map.walls.len(),
        map.warps.len(),
        path.display()
    );
    Ok(path)
}

/// Load one map record from a file.
pub fn load_map(path: &Path) -> Result<TileMap, PersistError> {
    let data = fs::read_to_string(path)?;
    let record: MapRecord = serde_json::from_str(&data)?;
    record.into_tile_map()
}

/// Load every readable map record in a directory into a store.
///
/// Unreadable or invalid files are skipped with a warning, matching the
/// tolerant loading the scanner's output has always had.
pub fn load_all_maps(dir: &Path) -> Result<MapStore, PersistError> {
    let mut store = MapStore::new();
    if !dir.exists() {
        return Ok(store);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match load_map(&path) {
            Ok(map) => {
                if let Err(e) = store.replace(map) {
                    warn!("[MapIo] skipping {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("[MapIo] skipping {}: {}", path.display(), e),
        }
    }
    info!("[MapIo] loaded {} map(s) from {}", store.len(), dir.display());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TileMap {
        env_logger::try_init().ok();
        let mut m = TileMap::new(MapId(3), "Oak's Lab");
        for x in 0..3 {
            for y in 0..2 {
                m.add_walkable(TileCoord::new(x, y));
            }
        }
        m.add_wall(TileCoord::new(0, 2));
        m.add_warp(Warp {
            at: TileCoord::new(2, 0),
            approach: Some(Direction::Up),
            target_map: MapId(0),
            target: TileCoord::new(12, 12),
        });
        m.complete = false;
        m
    }

    #[test]
    fn test_file_stem_rule() {
        assert_eq!(map_file_stem("Oak's Lab"), "oaks_lab");
        assert_eq!(map_file_stem("Route 1"), "route_1");
        assert_eq!(map_file_stem("Mt. Moon B1F"), "mt_moon_b1f");
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let map = sample_map();
        let path = save_map(&map, dir.path()).unwrap();
        assert!(path.ends_with("oaks_lab.json"));

        let loaded = load_map(&path).unwrap();
        assert_eq!(loaded.id, map.id);
        assert_eq!(loaded.name, map.name);
        assert_eq!(loaded.walkable, map.walkable);
        assert_eq!(loaded.walls, map.walls);
        assert_eq!(loaded.warps, map.warps);
        assert_eq!(loaded.complete, false);
        assert_eq!(loaded.bounds(), map.bounds());
    }

    #[test]
    fn test_load_all_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        save_map(&sample_map(), dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let store = load_all_maps(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(MapId(3)));
    }
}
