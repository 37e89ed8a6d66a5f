//! The outward-facing operation surface.
//!
//! `NavCore` bundles the map store, the destination table and the bridge
//! behind the handful of operations external callers get: observe, act,
//! plan, list. Everything else (scanning, route execution) is reachable
//! through the same object so the CLI stays a thin driver.

use tracing::{info, warn};

use marga_map::{MapId, MapStore, Router, TileCoord};
use setu_io::{Input, Observation, SimulationBridge};

use crate::config::{NavigatorConfig, ScannerConfig};
use crate::destinations::DestinationTable;
use crate::error::Result;
use crate::navigator::{direction_of, route_inputs, NavReport, Navigator};
use crate::scanner::MapScanner;

/// World model plus live session, bundled.
pub struct NavCore {
    store: MapStore,
    table: DestinationTable,
    bridge: SimulationBridge,
    policy: NavigatorConfig,
}

impl NavCore {
    /// Bundle the pieces, cross-checking the destination table against
    /// the store: a label bound to a tile that is neither walkable nor a
    /// warp on its scanned map can never be navigated to, so it is
    /// dropped up front instead of failing later as unreachable.
    pub fn new(
        store: MapStore,
        mut table: DestinationTable,
        bridge: SimulationBridge,
        policy: NavigatorConfig,
    ) -> Self {
        for label in table.prune_invalid(&store) {
            warn!("dropping destination '{}': not a walkable or warp tile", label);
        }
        Self {
            store,
            table,
            bridge,
            policy,
        }
    }

    /// Latest completed snapshot; never blocks on an in-flight action.
    pub fn state(&self) -> Observation {
        self.bridge.observation()
    }

    /// Submit one primitive action. Busy and stale semantics pass through
    /// from the bridge unchanged.
    pub fn apply_action(&self, input: Input) -> Result<Observation> {
        Ok(self.bridge.apply_action(input)?)
    }

    /// Plan a route to a labeled destination from an explicit position and
    /// flatten it to the primitive actions that would execute it.
    pub fn route_to(&self, label: &str, from: setu_io::Position) -> Result<Vec<Input>> {
        let dest = self.table.resolve(label)?;
        let route = Router::new(&self.store).find_route(
            MapId(from.map_id),
            TileCoord::new(from.x, from.y),
            dest.map,
            dest.coord,
        )?;
        Ok(route_inputs(&route, direction_of(from.facing)))
    }

    /// All destination labels, in stable order.
    pub fn destinations(&self) -> Vec<String> {
        self.table.labels()
    }

    /// (id, name, complete) for every map in the store.
    pub fn scanned_maps(&self) -> Vec<(MapId, String, bool)> {
        self.store.scanned_maps()
    }

    /// Navigate to a labeled destination, executing the route live.
    pub fn navigate(&self, label: &str) -> Result<NavReport> {
        Navigator::new(&self.store, &self.table, &self.bridge, self.policy).navigate(label)
    }

    /// Scan the map the session currently sits on and store the result,
    /// replacing any previous record for that map.
    pub fn scan_current(&mut self, name: &str, limits: ScannerConfig) -> Result<MapId> {
        let map = MapScanner::new(&self.bridge, limits).scan(name)?;
        let id = map.id;
        info!(
            "storing {} '{}': {} walkable tiles",
            id,
            name,
            map.walkable.len()
        );
        self.store.replace(map)?;
        Ok(id)
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn bridge(&self) -> &SimulationBridge {
        &self.bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destinations::Destination;
    use marga_map::TileMap;
    use setu_io::mock::{MockEngine, MockWorld};
    use setu_io::{BridgeConfig, Button, SimulationSession};

    fn core() -> NavCore {
        let mut store = MapStore::new();
        let mut map = TileMap::new(MapId(0), "Field");
        for x in 0..3 {
            for y in 0..3 {
                map.add_walkable(TileCoord::new(x, y));
            }
        }
        store.insert(map).unwrap();

        let mut table = DestinationTable::default();
        table.insert(Destination {
            label: "corner".to_string(),
            map: MapId(0),
            coord: TileCoord::new(2, 2),
            facing: None,
        });

        let mut world = MockWorld::new();
        world.add_grid(0, 3, 3);
        let mut engine = MockEngine::new(world, 0, 0, 0);
        engine.set_move_ticks(1);
        let bridge = SimulationBridge::start(
            SimulationSession::new(Box::new(engine)),
            BridgeConfig {
                tick_hz: 1000,
                budget_ticks: 40,
                settle_ticks: 1,
            },
        );

        NavCore::new(store, table, bridge, NavigatorConfig::default())
    }

    #[test]
    fn test_construction_drops_unnavigable_destination() {
        let mut store = MapStore::new();
        let mut map = TileMap::new(MapId(0), "Field");
        for x in 0..3 {
            for y in 0..3 {
                map.add_walkable(TileCoord::new(x, y));
            }
        }
        map.add_wall(TileCoord::new(3, 0));
        store.insert(map).unwrap();

        let mut table = DestinationTable::default();
        table.insert(Destination {
            label: "corner".to_string(),
            map: MapId(0),
            coord: TileCoord::new(2, 2),
            facing: None,
        });
        table.insert(Destination {
            label: "inside the wall".to_string(),
            map: MapId(0),
            coord: TileCoord::new(3, 0),
            facing: None,
        });

        let mut world = MockWorld::new();
        world.add_grid(0, 3, 3);
        let bridge = SimulationBridge::start(
            SimulationSession::new(Box::new(MockEngine::new(world, 0, 0, 0))),
            BridgeConfig::default(),
        );

        let core = NavCore::new(store, table, bridge, NavigatorConfig::default());
        assert_eq!(core.destinations(), vec!["corner"]);
        assert!(matches!(
            core.route_to("inside the wall", core.state().position),
            Err(crate::error::NavError::UnknownDestination { .. })
        ));
    }

    #[test]
    fn test_route_to_flattens_actions() {
        let core = core();
        let from = core.state().position;
        let inputs = core.route_to("corner", from).unwrap();
        assert_eq!(inputs.len(), 4);
        assert!(inputs
            .iter()
            .all(|i| matches!(i, Input::Press(Button::Down) | Input::Press(Button::Right))));
    }

    #[test]
    fn test_state_then_navigate_then_list() {
        let mut core = core();
        assert_eq!(core.destinations(), vec!["corner"]);
        assert_eq!(core.scanned_maps().len(), 1);

        let report = core.navigate("corner").unwrap();
        assert_eq!(
            (report.final_position.x, report.final_position.y),
            (2, 2)
        );

        // Rescanning the current map keeps the store at one entry.
        core.scan_current("Field", ScannerConfig::default()).unwrap();
        assert_eq!(core.scanned_maps().len(), 1);
        assert!(core.scanned_maps()[0].2);
    }
}
