//! Route execution against the live bridge.
//!
//! The navigator turns a named destination into a route, then walks the
//! route one primitive action at a time, re-reading the settled
//! observation after every submission. It tolerates transiently blocked
//! steps, aborts on persistent lack of progress and yields control back to
//! the caller the moment an interactive exchange opens.

use tracing::{debug, info, warn};

use marga_map::{Direction, MapId, MapStore, Route, Router, Step, TileCoord};
use setu_io::{Button, Facing, Input, Observation, Position, SimulationBridge};

use crate::config::NavigatorConfig;
use crate::destinations::DestinationTable;
use crate::error::{NavError, Result};

/// The press that attempts one step in a direction.
pub fn press_for(dir: Direction) -> Input {
    Input::Press(match dir {
        Direction::Up => Button::Up,
        Direction::Down => Button::Down,
        Direction::Left => Button::Left,
        Direction::Right => Button::Right,
    })
}

/// Map a facing back onto the grid direction it corresponds to.
pub fn direction_of(facing: Facing) -> Direction {
    match facing {
        Facing::Up => Direction::Up,
        Facing::Down => Direction::Down,
        Facing::Left => Direction::Left,
        Facing::Right => Direction::Right,
    }
}

/// Flatten a route into the primitive presses that execute it.
///
/// A warp without a recorded approach uses the direction of the preceding
/// move, falling back to `fallback` when the route opens on a warp tile.
pub fn route_inputs(route: &Route, fallback: Direction) -> Vec<Input> {
    let mut last = fallback;
    route
        .steps
        .iter()
        .map(|step| match step {
            Step::Move(dir) => {
                last = *dir;
                press_for(*dir)
            }
            Step::Warp(warp) => press_for(warp.approach.unwrap_or(last)),
        })
        .collect()
}

/// Outcome of a completed navigation.
#[derive(Clone, Debug)]
pub struct NavReport {
    /// Actions submitted, including retries.
    pub steps_taken: usize,
    pub final_position: Position,
}

/// Executes routes to named destinations through the bridge.
pub struct Navigator<'a> {
    store: &'a MapStore,
    table: &'a DestinationTable,
    bridge: &'a SimulationBridge,
    policy: NavigatorConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(
        store: &'a MapStore,
        table: &'a DestinationTable,
        bridge: &'a SimulationBridge,
        policy: NavigatorConfig,
    ) -> Self {
        Self {
            store,
            table,
            bridge,
            policy,
        }
    }

    /// Navigate to a named destination from wherever the avatar is now.
    ///
    /// Routing errors surface unmodified; execution aborts with
    /// `StuckDetected` when progress stops and `Interrupted` when an
    /// exchange opens mid-route. Re-invoking after an interruption plans a
    /// fresh route from the interrupted position.
    pub fn navigate(&self, label: &str) -> Result<NavReport> {
        let dest = self.table.resolve(label)?;
        let obs = self.bridge.observation();
        let here = MapId(obs.position.map_id);
        let at = TileCoord::new(obs.position.x, obs.position.y);

        info!(
            "navigating to '{}' ({} {}) from {} {}",
            dest.label, dest.map, dest.coord, here, at
        );

        let route = Router::new(self.store).find_route(here, at, dest.map, dest.coord)?;
        debug!(
            "route: {} moves, {} warps",
            route.len_moves(),
            route.len_warps()
        );

        self.execute(&route, direction_of(obs.position.facing))
    }

    /// Execute a route step by step.
    pub fn execute(&self, route: &Route, initial_facing: Direction) -> Result<NavReport> {
        let mut steps_taken = 0usize;
        let mut stuck = 0u32;
        let mut at = route.start;
        let mut last_dir = initial_facing;

        for step in &route.steps {
            match step {
                Step::Move(dir) => {
                    let target = at.step(*dir);
                    let mut retries = 0u32;
                    loop {
                        let obs = self.submit(press_for(*dir), &mut steps_taken)?;
                        let landed = TileCoord::new(obs.position.x, obs.position.y);
                        if landed == target {
                            at = target;
                            stuck = 0;
                            break;
                        }
                        // Blocked: something transient may be in the way.
                        stuck += 1;
                        retries += 1;
                        if stuck >= self.policy.stuck_threshold
                            || retries > self.policy.step_retries
                        {
                            warn!(
                                "no progress after {} submissions at {}",
                                stuck.max(retries),
                                landed
                            );
                            return Err(NavError::StuckDetected { at: obs.position });
                        }
                        debug!("step {} blocked at {}, retrying", dir, landed);
                    }
                    last_dir = *dir;
                }
                Step::Warp(warp) => {
                    let dir = warp.approach.unwrap_or(last_dir);
                    let obs = self.submit(press_for(dir), &mut steps_taken)?;
                    if obs.position.map_id != warp.target_map.0 {
                        warn!(
                            "warp at {} did not cross to {}",
                            warp.at, warp.target_map
                        );
                        return Err(NavError::StuckDetected { at: obs.position });
                    }
                    at = TileCoord::new(obs.position.x, obs.position.y);
                    stuck = 0;
                }
            }
        }

        let final_obs = self.bridge.observation();
        info!(
            "arrived at map#{} ({}, {}) after {} actions",
            final_obs.position.map_id, final_obs.position.x, final_obs.position.y, steps_taken
        );
        Ok(NavReport {
            steps_taken,
            final_position: final_obs.position,
        })
    }

    /// One action through the bridge, with the exchange interruption check
    /// every submission.
    fn submit(&self, input: Input, steps_taken: &mut usize) -> Result<Observation> {
        let obs = self.bridge.apply_action(input)?;
        *steps_taken += 1;
        if obs.flags.exchange_active {
            return Err(NavError::Interrupted { at: obs.position });
        }
        Ok(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destinations::Destination;
    use marga_map::TileMap;
    use setu_io::mock::{MockEngine, MockWorld};
    use setu_io::{BridgeConfig, SimulationSession};

    fn fast_bridge(world: MockWorld, map: u16, x: i32, y: i32) -> SimulationBridge {
        let mut engine = MockEngine::new(world, map, x, y);
        engine.set_move_ticks(2);
        engine.set_warp_ticks(2);
        SimulationBridge::start(
            SimulationSession::new(Box::new(engine)),
            BridgeConfig {
                tick_hz: 500,
                budget_ticks: 40,
                settle_ticks: 1,
            },
        )
    }

    fn grid_map(id: u16, name: &str, w: i32, h: i32) -> TileMap {
        let mut m = TileMap::new(MapId(id), name);
        for x in 0..w {
            for y in 0..h {
                m.add_walkable(TileCoord::new(x, y));
            }
        }
        m
    }

    fn table_with(label: &str, map: u16, x: i32, y: i32) -> DestinationTable {
        let mut t = DestinationTable::default();
        t.insert(Destination {
            label: label.to_string(),
            map: MapId(map),
            coord: TileCoord::new(x, y),
            facing: None,
        });
        t
    }

    #[test]
    fn test_navigate_same_map() {
        let mut store = MapStore::new();
        store.insert(grid_map(0, "Field", 5, 5)).unwrap();
        let table = table_with("corner", 0, 4, 4);

        let mut world = MockWorld::new();
        world.add_grid(0, 5, 5);
        let bridge = fast_bridge(world, 0, 0, 0);

        let nav = Navigator::new(&store, &table, &bridge, NavigatorConfig::default());
        let report = nav.navigate("corner").unwrap();
        assert_eq!(report.steps_taken, 8);
        assert_eq!(
            (report.final_position.x, report.final_position.y),
            (4, 4)
        );
    }

    #[test]
    fn test_navigate_through_warp() {
        let mut store = MapStore::new();
        let mut a = grid_map(0, "Town", 4, 1);
        a.add_warp(marga_map::Warp {
            at: TileCoord::new(3, 0),
            approach: Some(Direction::Right),
            target_map: MapId(1),
            target: TileCoord::new(0, 0),
        });
        store.insert(a).unwrap();
        store.insert(grid_map(1, "House", 3, 3)).unwrap();
        let table = table_with("house back", 1, 2, 2);

        let mut world = MockWorld::new();
        world.add_grid(0, 4, 1);
        world.add_grid(1, 3, 3);
        world.add_warp(0, (3, 0), Facing::Right, 1, (0, 0));
        let bridge = fast_bridge(world, 0, 0, 0);

        let nav = Navigator::new(&store, &table, &bridge, NavigatorConfig::default());
        let report = nav.navigate("house back").unwrap();
        assert_eq!(report.final_position.map_id, 1);
        assert_eq!(
            (report.final_position.x, report.final_position.y),
            (2, 2)
        );
    }

    #[test]
    fn test_stuck_on_permanently_blocked_tile() {
        // The store believes the whole row is walkable; the world blocks
        // the middle tile for good.
        let mut store = MapStore::new();
        store.insert(grid_map(0, "Hall", 5, 1)).unwrap();
        let table = table_with("end", 0, 4, 0);

        let mut world = MockWorld::new();
        world.add_grid(0, 5, 1);
        world.remove_tile(0, (2, 0));
        let bridge = fast_bridge(world, 0, 0, 0);

        let nav = Navigator::new(&store, &table, &bridge, NavigatorConfig::default());
        let err = nav.navigate("end").unwrap_err();
        assert!(matches!(err, NavError::StuckDetected { .. }));
    }

    #[test]
    fn test_interrupted_by_exchange() {
        let mut store = MapStore::new();
        store.insert(grid_map(0, "Hall", 5, 1)).unwrap();
        let table = table_with("end", 0, 4, 0);

        let mut world = MockWorld::new();
        world.add_grid(0, 5, 1);
        world.add_exchange_trigger(0, (2, 0));
        let bridge = fast_bridge(world, 0, 0, 0);

        let nav = Navigator::new(&store, &table, &bridge, NavigatorConfig::default());
        let err = nav.navigate("end").unwrap_err();
        match err {
            NavError::Interrupted { at } => assert_eq!((at.x, at.y), (2, 0)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_destination_passes_through() {
        let store = MapStore::new();
        let table = DestinationTable::default();
        let mut world = MockWorld::new();
        world.add_grid(0, 2, 2);
        let bridge = fast_bridge(world, 0, 0, 0);

        let nav = Navigator::new(&store, &table, &bridge, NavigatorConfig::default());
        let err = nav.navigate("nowhere").unwrap_err();
        assert!(matches!(err, NavError::UnknownDestination { .. }));
    }

    #[test]
    fn test_route_inputs_flatten() {
        let route = Route {
            start_map: MapId(0),
            start: TileCoord::new(0, 0),
            goal_map: MapId(1),
            goal: TileCoord::new(0, 0),
            steps: vec![
                Step::Move(Direction::Right),
                Step::Warp(marga_map::Warp {
                    at: TileCoord::new(1, 0),
                    approach: None,
                    target_map: MapId(1),
                    target: TileCoord::new(0, 0),
                }),
            ],
        };
        let inputs = route_inputs(&route, Direction::Down);
        // The unrecorded approach inherits the preceding move direction.
        assert_eq!(
            inputs,
            vec![Input::Press(Button::Right), Input::Press(Button::Right)]
        );
    }
}
