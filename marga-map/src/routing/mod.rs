//! Cross-map routing over the warp graph.
//!
//! Maps are nodes; every recorded warp is a directed edge. Map-to-map
//! edges carry no weight beyond "one warp traversal", so a plain BFS finds
//! a shortest map chain; A* inside each map fills in the tile-level moves.

mod route;

pub use route::{Route, Step};

use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{Direction, MapId, TileCoord};
use crate::error::RouteError;
use crate::pathfinding::{find_path, AStarConfig};
use crate::store::{MapStore, TileMap, Warp};

/// Stitches single-map paths across the warp graph.
pub struct Router<'a> {
    store: &'a MapStore,
    config: AStarConfig,
}

impl<'a> Router<'a> {
    /// Create a router over the given store with default search limits.
    pub fn new(store: &'a MapStore) -> Self {
        Self {
            store,
            config: AStarConfig::default(),
        }
    }

    /// Create a router with a custom A* configuration.
    pub fn with_config(store: &'a MapStore, config: AStarConfig) -> Self {
        Self { store, config }
    }

    /// Find a route from `(start_map, start)` to `(goal_map, goal)`.
    ///
    /// Fails with `UnscannedMap` when the route would need undiscovered
    /// territory, `NoRoute` when no warp chain connects the maps, and
    /// propagates `Unreachable` from any failing segment unmodified.
    pub fn find_route(
        &self,
        start_map: MapId,
        start: TileCoord,
        goal_map: MapId,
        goal: TileCoord,
    ) -> Result<Route, RouteError> {
        trace!(
            "[Router] find_route: {} {} -> {} {}",
            start_map,
            start,
            goal_map,
            goal
        );

        let first = self
            .store
            .get(start_map)
            .ok_or(RouteError::UnscannedMap { map: start_map })?;
        if !self.store.contains(goal_map) {
            return Err(RouteError::UnscannedMap { map: goal_map });
        }

        let mut steps = Vec::new();

        if start_map == goal_map {
            let moves = find_path(first, start, goal, &self.config)
                .map_err(|e| refine_segment_error(first, e))?;
            steps.extend(moves.into_iter().map(Step::Move));
            return Ok(Route {
                start_map,
                start,
                goal_map,
                goal,
                steps,
            });
        }

        let chain = self.map_chain(start_map, goal_map)?;
        debug!("[Router] map chain: {} hops", chain.len() - 1);

        let mut entry = start;
        for window in chain.windows(2) {
            let (cur, next) = (window[0], window[1]);
            let map = self
                .store
                .get(cur)
                .ok_or(RouteError::UnscannedMap { map: cur })?;
            let (moves, warp) = self.segment_to_warp(map, entry, next)?;
            steps.extend(moves.into_iter().map(Step::Move));
            entry = warp.target;
            steps.push(Step::Warp(warp));
        }

        let last = self
            .store
            .get(goal_map)
            .ok_or(RouteError::UnscannedMap { map: goal_map })?;
        let moves = find_path(last, entry, goal, &self.config)
            .map_err(|e| refine_segment_error(last, e))?;
        steps.extend(moves.into_iter().map(Step::Move));

        Ok(Route {
            start_map,
            start,
            goal_map,
            goal,
            steps,
        })
    }

    /// BFS over map-level warp edges; returns the map sequence including
    /// both endpoints.
    fn map_chain(&self, from: MapId, to: MapId) -> Result<Vec<MapId>, RouteError> {
        let mut prev: HashMap<MapId, MapId> = HashMap::new();
        let mut visited: HashSet<MapId> = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(cur) = queue.pop_front() {
            if cur == to {
                let mut chain = vec![to];
                let mut at = to;
                while let Some(&p) = prev.get(&at) {
                    chain.push(p);
                    at = p;
                }
                chain.reverse();
                return Ok(chain);
            }
            let Some(map) = self.store.get(cur) else {
                continue;
            };
            for warp in &map.warps {
                // Edges into unscanned maps are not usable routes.
                if self.store.contains(warp.target_map) && visited.insert(warp.target_map) {
                    prev.insert(warp.target_map, cur);
                    queue.push_back(warp.target_map);
                }
            }
        }

        debug!("[Router] FAILED: no warp chain {} -> {}", from, to);
        Err(RouteError::NoRoute { from, to })
    }

    /// Shortest path from `entry` to a warp leading to `next`, returning
    /// the moves up to the warp tile and the warp itself. Ties between
    /// equally distant warps go to the first recorded one.
    fn segment_to_warp(
        &self,
        map: &TileMap,
        entry: TileCoord,
        next: MapId,
    ) -> Result<(Vec<Direction>, Warp), RouteError> {
        let mut best: Option<(Vec<Direction>, Warp)> = None;
        let mut last_err = None;

        for warp in map.warps_to(next) {
            match find_path(map, entry, warp.at, &self.config) {
                Ok(moves) => {
                    let better = best
                        .as_ref()
                        .map(|(b, _)| moves.len() < b.len())
                        .unwrap_or(true);
                    if better {
                        best = Some((moves, warp.clone()));
                    }
                }
                Err(e) => last_err = Some(refine_segment_error(map, e)),
            }
        }

        best.ok_or_else(|| {
            last_err.unwrap_or(RouteError::NoRoute {
                from: map.id,
                to: next,
            })
        })
    }
}

/// On a partial map an unreachable segment means unexplored territory, not
/// a proven wall: refuse with `UnscannedMap` instead of guessing.
fn refine_segment_error(map: &TileMap, err: RouteError) -> RouteError {
    match err {
        RouteError::Unreachable { .. } if !map.complete => {
            RouteError::UnscannedMap { map: map.id }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Direction;

    fn grid(id: u16, name: &str, w: i32, h: i32) -> TileMap {
        let mut m = TileMap::new(MapId(id), name);
        for x in 0..w {
            for y in 0..h {
                m.add_walkable(TileCoord::new(x, y));
            }
        }
        m
    }

    fn two_map_store() -> MapStore {
        let mut a = grid(0, "A", 4, 3);
        a.add_warp(Warp {
            at: TileCoord::new(3, 0),
            approach: Some(Direction::Right),
            target_map: MapId(1),
            target: TileCoord::new(0, 0),
        });
        let b = grid(1, "B", 3, 3);
        let mut store = MapStore::new();
        store.insert(a).unwrap();
        store.insert(b).unwrap();
        store
    }

    #[test]
    fn test_cross_map_route_has_one_warp_step() {
        let store = two_map_store();
        let route = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(1),
                TileCoord::new(2, 2),
            )
            .unwrap();

        assert_eq!(route.len_warps(), 1);
        let warp_idx = route
            .steps
            .iter()
            .position(|s| matches!(s, Step::Warp(_)))
            .unwrap();
        match &route.steps[warp_idx] {
            Step::Warp(w) => assert_eq!(w.at, TileCoord::new(3, 0)),
            _ => unreachable!(),
        }
        // Moves after the warp stay inside B and reach (2,2).
        assert_eq!(route.replay(&store).unwrap(), (MapId(1), TileCoord::new(2, 2)));
    }

    #[test]
    fn test_same_map_delegates_to_pathfinder() {
        let store = two_map_store();
        let route = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(0),
                TileCoord::new(3, 2),
            )
            .unwrap();
        assert_eq!(route.len_warps(), 0);
        assert_eq!(route.len_moves(), 5);
        assert_eq!(route.replay(&store).unwrap(), (MapId(0), TileCoord::new(3, 2)));
    }

    #[test]
    fn test_no_route_between_disconnected_maps() {
        let mut store = MapStore::new();
        store.insert(grid(0, "A", 2, 2)).unwrap();
        store.insert(grid(1, "B", 2, 2)).unwrap();
        let err = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(1),
                TileCoord::new(1, 1),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::NoRoute {
                from: MapId(0),
                to: MapId(1)
            }
        );
    }

    #[test]
    fn test_unscanned_goal_map() {
        let store = two_map_store();
        let err = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(9),
                TileCoord::new(0, 0),
            )
            .unwrap_err();
        assert_eq!(err, RouteError::UnscannedMap { map: MapId(9) });
    }

    #[test]
    fn test_partial_map_failure_is_unscanned() {
        let mut store = MapStore::new();
        let mut a = grid(0, "A", 2, 1);
        // Island tile the scan never connected; the record is partial.
        a.add_walkable(TileCoord::new(5, 5));
        a.complete = false;
        store.insert(a).unwrap();

        let err = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(0),
                TileCoord::new(5, 5),
            )
            .unwrap_err();
        assert_eq!(err, RouteError::UnscannedMap { map: MapId(0) });
    }

    #[test]
    fn test_complete_map_failure_is_unreachable() {
        let mut store = MapStore::new();
        let mut a = grid(0, "A", 2, 1);
        a.add_walkable(TileCoord::new(5, 5));
        store.insert(a).unwrap();

        let err = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(0),
                TileCoord::new(5, 5),
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::Unreachable { .. }));
    }

    #[test]
    fn test_three_map_chain() {
        let mut store = MapStore::new();
        let mut a = grid(0, "A", 3, 1);
        a.add_warp(Warp {
            at: TileCoord::new(2, 0),
            approach: Some(Direction::Right),
            target_map: MapId(1),
            target: TileCoord::new(0, 0),
        });
        let mut b = grid(1, "B", 3, 1);
        b.add_warp(Warp {
            at: TileCoord::new(2, 0),
            approach: Some(Direction::Right),
            target_map: MapId(2),
            target: TileCoord::new(0, 0),
        });
        let c = grid(2, "C", 3, 1);
        store.insert(a).unwrap();
        store.insert(b).unwrap();
        store.insert(c).unwrap();

        let route = Router::new(&store)
            .find_route(
                MapId(0),
                TileCoord::new(0, 0),
                MapId(2),
                TileCoord::new(2, 0),
            )
            .unwrap();
        assert_eq!(route.len_warps(), 2);
        assert_eq!(route.replay(&store).unwrap(), (MapId(2), TileCoord::new(2, 0)));
    }
}
