//! Live map discovery through the bridge.
//!
//! Breadth-first flood fill over the current map, driven entirely by
//! probing: from each frontier tile the scanner presses each cardinal
//! direction once and classifies the neighbor by what actually happened.
//!
//! - position advanced on the same map: walkable, undone by walking back
//!   (checkpoint restore when the walk-back itself misbehaves);
//! - map changed: a warp out of this map, undone by checkpoint restore;
//! - position unchanged: wall.
//!
//! The frontier is an explicit queue rather than recursion, so an
//! interrupted scan still leaves a coherent partial map: everything probed
//! so far is valid, `complete` is just false and the router refuses to
//! guess past the explored region.

use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

use marga_map::pathfinding::{find_path, AStarConfig};
use marga_map::{Direction, MapId, TileCoord, TileMap, Warp};
use setu_io::{Error as BridgeError, SimulationBridge};

use crate::config::ScannerConfig;
use crate::error::Result;
use crate::navigator::press_for;

/// Why a scan stopped before draining its frontier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EarlyStop {
    /// The walkable tile budget ran out.
    Budget,
    /// An interactive exchange opened; probing blind is not safe.
    Exchange,
    /// The bridge shut down underneath the scan.
    ShutDown,
    /// The avatar could not be brought to a frontier tile.
    LostPosition,
}

/// Flood-fills the map the session currently sits on.
pub struct MapScanner<'a> {
    bridge: &'a SimulationBridge,
    limits: ScannerConfig,
    astar: AStarConfig,
}

impl<'a> MapScanner<'a> {
    pub fn new(bridge: &'a SimulationBridge, limits: ScannerConfig) -> Self {
        Self {
            bridge,
            limits,
            astar: AStarConfig::default(),
        }
    }

    /// Scan the current map, returning its record. An early stop still
    /// returns the explored region, marked `complete: false`.
    pub fn scan(&self, name: &str) -> Result<TileMap> {
        let origin = self.bridge.observation();
        let map_id = MapId(origin.position.map_id);
        let start = TileCoord::new(origin.position.x, origin.position.y);
        info!("scanning {} '{}' from {}", map_id, name, start);

        let mut map = TileMap::new(map_id, name);
        map.add_walkable(start);

        let mut frontier = VecDeque::from([start]);
        let mut queued: HashSet<TileCoord> = HashSet::from([start]);
        let mut here = start;

        while let Some(tile) = frontier.pop_front() {
            if map.walkable.len() >= self.limits.max_tiles {
                warn!(
                    "tile budget {} reached with {} tiles queued",
                    self.limits.max_tiles,
                    frontier.len() + 1
                );
                return Ok(self.finish(map, Some(EarlyStop::Budget)));
            }

            // Visit: bring the avatar to the frontier tile along tiles we
            // already know to be walkable.
            if here != tile {
                match self.walk_to(&map, here, tile)? {
                    WalkOutcome::Arrived => here = tile,
                    WalkOutcome::Stopped(stop) => {
                        return Ok(self.finish(map, Some(stop)))
                    }
                }
            }

            let checkpoint = self.bridge.checkpoint()?;

            for dir in Direction::CARDINAL {
                let target = tile.step(dir);
                let probed = map.is_walkable(target)
                    || map.walls.contains(&target)
                    || map
                        .warps
                        .iter()
                        .any(|w| w.at == tile && w.approach == Some(dir));
                if probed {
                    continue;
                }

                let obs = match self.bridge.apply_action(press_for(dir)) {
                    Ok(obs) => obs,
                    Err(BridgeError::ShutDown) => {
                        return Ok(self.finish(map, Some(EarlyStop::ShutDown)))
                    }
                    Err(e) => return Err(e.into()),
                };

                if obs.position.map_id != map_id.0 {
                    // Crossed out of the map: record the warp, then put
                    // the avatar back where it was.
                    let landing =
                        TileCoord::new(obs.position.x, obs.position.y);
                    debug!(
                        "warp at {} pressing {} -> map#{} {}",
                        tile, dir, obs.position.map_id, landing
                    );
                    map.add_warp(Warp {
                        at: tile,
                        approach: Some(dir),
                        target_map: MapId(obs.position.map_id),
                        target: landing,
                    });
                    self.bridge.restore(&checkpoint)?;
                    continue;
                }

                let landed = TileCoord::new(obs.position.x, obs.position.y);
                if landed == target {
                    map.add_walkable(target);
                    if queued.insert(target) {
                        frontier.push_back(target);
                    }
                    if obs.flags.exchange_active {
                        return Ok(self.finish(map, Some(EarlyStop::Exchange)));
                    }
                    // Undo: step straight back.
                    let back = self.bridge.apply_action(press_for(dir.opposite()));
                    let restored = match back {
                        Ok(obs)
                            if obs.position.map_id == map_id.0
                                && TileCoord::new(obs.position.x, obs.position.y)
                                    == tile
                                && !obs.flags.exchange_active =>
                        {
                            true
                        }
                        Ok(_) => false,
                        Err(BridgeError::ShutDown) => {
                            return Ok(self.finish(map, Some(EarlyStop::ShutDown)))
                        }
                        Err(e) => return Err(e.into()),
                    };
                    if !restored {
                        self.bridge.restore(&checkpoint)?;
                    }
                } else {
                    map.add_wall(target);
                }
            }
        }

        Ok(self.finish(map, None))
    }

    fn finish(&self, mut map: TileMap, stop: Option<EarlyStop>) -> TileMap {
        map.complete = stop.is_none();
        info!(
            "scan of {} done: {} walkable, {} walls, {} warps, complete={}{}",
            map.id,
            map.walkable.len(),
            map.walls.len(),
            map.warps.len(),
            map.complete,
            match stop {
                Some(reason) => format!(" (stopped: {:?})", reason),
                None => String::new(),
            }
        );
        map
    }

    /// Move the avatar along already-discovered walkable tiles.
    fn walk_to(&self, map: &TileMap, from: TileCoord, to: TileCoord) -> Result<WalkOutcome> {
        let moves = match find_path(map, from, to, &self.astar) {
            Ok(moves) => moves,
            Err(_) => {
                warn!("no known path {} -> {} on the partial map", from, to);
                return Ok(WalkOutcome::Stopped(EarlyStop::LostPosition));
            }
        };
        let mut at = from;
        for dir in moves {
            let obs = match self.bridge.apply_action(press_for(dir)) {
                Ok(obs) => obs,
                Err(BridgeError::ShutDown) => {
                    return Ok(WalkOutcome::Stopped(EarlyStop::ShutDown))
                }
                Err(e) => return Err(e.into()),
            };
            let expected = at.step(dir);
            let landed = TileCoord::new(obs.position.x, obs.position.y);
            if obs.position.map_id != map.id.0 || landed != expected {
                warn!("walk diverged at {}, expected {}", landed, expected);
                return Ok(WalkOutcome::Stopped(EarlyStop::LostPosition));
            }
            if obs.flags.exchange_active {
                return Ok(WalkOutcome::Stopped(EarlyStop::Exchange));
            }
            at = expected;
        }
        Ok(WalkOutcome::Arrived)
    }
}

enum WalkOutcome {
    Arrived,
    Stopped(EarlyStop),
}

#[cfg(test)]
mod tests {
    use super::*;
    use setu_io::mock::{MockEngine, MockWorld};
    use setu_io::{BridgeConfig, Facing, SimulationSession};
    use std::collections::HashSet;

    fn fast_bridge(world: MockWorld, map: u16, x: i32, y: i32) -> SimulationBridge {
        let mut engine = MockEngine::new(world, map, x, y);
        engine.set_move_ticks(1);
        engine.set_warp_ticks(1);
        SimulationBridge::start(
            SimulationSession::new(Box::new(engine)),
            BridgeConfig {
                tick_hz: 1000,
                budget_ticks: 40,
                settle_ticks: 1,
            },
        )
    }

    fn scan_with(bridge: &SimulationBridge, limits: ScannerConfig) -> TileMap {
        MapScanner::new(bridge, limits).scan("Probe").unwrap()
    }

    #[test]
    fn test_scan_reproduces_grid_exactly() {
        let mut world = MockWorld::new();
        world.add_grid(0, 5, 5);
        world.remove_tile(0, (2, 2));
        let bridge = fast_bridge(world, 0, 0, 0);

        let map = scan_with(&bridge, ScannerConfig::default());
        assert!(map.complete);

        let expected: HashSet<TileCoord> = (0..5)
            .flat_map(|x| (0..5).map(move |y| TileCoord::new(x, y)))
            .filter(|c| *c != TileCoord::new(2, 2))
            .collect();
        assert_eq!(map.walkable, expected);
        assert!(map.walls.contains(&TileCoord::new(2, 2)));
        // The border ring was probed and found blocked too.
        assert!(map.walls.contains(&TileCoord::new(-1, 0)));
        assert!(map.warps.is_empty());
    }

    #[test]
    fn test_scan_records_warp_and_returns() {
        let mut world = MockWorld::new();
        world.add_grid(0, 3, 1);
        world.add_grid(9, 2, 2);
        world.add_warp(0, (2, 0), Facing::Right, 9, (0, 0));
        let bridge = fast_bridge(world, 0, 0, 0);

        let map = scan_with(&bridge, ScannerConfig::default());
        assert!(map.complete);
        assert_eq!(map.walkable.len(), 3);
        assert_eq!(
            map.warps,
            vec![Warp {
                at: TileCoord::new(2, 0),
                approach: Some(Direction::Right),
                target_map: MapId(9),
                target: TileCoord::new(0, 0),
            }]
        );
        // The warp probe was undone: the scan never left map 0.
        assert_eq!(bridge.observation().position.map_id, 0);
    }

    #[test]
    fn test_scan_stops_at_budget_with_partial_map() {
        let mut world = MockWorld::new();
        world.add_grid(0, 6, 6);
        let bridge = fast_bridge(world, 0, 0, 0);

        let map = scan_with(
            &bridge,
            ScannerConfig { max_tiles: 4 },
        );
        assert!(!map.complete);
        assert!(map.walkable.len() >= 4);
        assert!(map.walkable.len() < 36);
    }

    #[test]
    fn test_scan_stops_on_exchange() {
        let mut world = MockWorld::new();
        world.add_grid(0, 4, 1);
        world.add_exchange_trigger(0, (1, 0));
        let bridge = fast_bridge(world, 0, 0, 0);

        let map = scan_with(&bridge, ScannerConfig::default());
        assert!(!map.complete);
        // The trigger tile itself was reached and recorded.
        assert!(map.is_walkable(TileCoord::new(1, 0)));
    }
}
