//! A* search over the 4-connected walkable grid.
//!
//! Uniform cost (1 per move) with the Manhattan heuristic, so returned
//! paths are exactly as short as an unweighted BFS would find. Output is
//! deterministic: the open heap breaks f-score ties by insertion order and
//! neighbors are expanded in the fixed `Direction::CARDINAL` priority.

use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::core::{Direction, TileCoord};
use crate::error::RouteError;
use crate::store::{TileMap, Warp};

/// A* search configuration.
#[derive(Clone, Debug)]
pub struct AStarConfig {
    /// Maximum number of nodes to expand before giving up.
    pub max_expansions: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
        }
    }
}

/// A node in the A* open heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    coord: TileCoord,
    g_cost: i32,
    f_cost: i32,
    /// Insertion counter: earlier pushes win f-score ties, which together
    /// with the fixed neighbor order makes the search fully deterministic.
    seq: u64,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the shortest move sequence from `start` to `goal` on one map.
///
/// Tiles outside the walkable set (walls or unscanned territory) are never
/// expanded. The goal additionally passes when it hosts a warp, so routes
/// may end on a doorway tile.
pub fn find_path(
    map: &TileMap,
    start: TileCoord,
    goal: TileCoord,
    config: &AStarConfig,
) -> Result<Vec<Direction>, RouteError> {
    trace!("[AStar] find_path: {} {} -> {}", map.id, start, goal);

    let unreachable = || RouteError::Unreachable {
        map: map.id,
        start,
        goal,
    };

    let goal_passable = map.is_walkable(goal) || map.warp_at(goal).is_some();
    if !map.is_walkable(start) || !goal_passable {
        debug!(
            "[AStar] FAILED: start or goal not passable ({} {} -> {})",
            map.id, start, goal
        );
        return Err(unreachable());
    }
    if start == goal {
        return Ok(Vec::new());
    }

    let mut open: BinaryHeap<OpenNode> = BinaryHeap::new();
    let mut closed: HashSet<TileCoord> = HashSet::new();
    let mut came_from: HashMap<TileCoord, (TileCoord, Direction)> = HashMap::new();
    let mut g_scores: HashMap<TileCoord, i32> = HashMap::new();

    let mut seq = 0u64;
    open.push(OpenNode {
        coord: start,
        g_cost: 0,
        f_cost: start.manhattan_distance(&goal),
        seq,
    });
    g_scores.insert(start, 0);

    let mut expanded = 0usize;

    while let Some(current) = open.pop() {
        if current.coord == goal {
            trace!(
                "[AStar] SUCCESS: length={} expanded={}",
                current.g_cost,
                expanded
            );
            return Ok(reconstruct(&came_from, start, goal));
        }

        if !closed.insert(current.coord) {
            continue;
        }

        expanded += 1;
        if expanded > config.max_expansions {
            debug!("[AStar] FAILED: expansion budget hit ({expanded} nodes)");
            return Err(unreachable());
        }

        for (dir, neighbor) in current.coord.neighbors_4() {
            let passable =
                map.is_walkable(neighbor) || (neighbor == goal && goal_passable);
            if !passable || closed.contains(&neighbor) {
                continue;
            }

            let tentative_g = current.g_cost + 1;
            let known_g = g_scores.get(&neighbor).copied().unwrap_or(i32::MAX);
            if tentative_g < known_g {
                g_scores.insert(neighbor, tentative_g);
                came_from.insert(neighbor, (current.coord, dir));
                seq += 1;
                open.push(OpenNode {
                    coord: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + neighbor.manhattan_distance(&goal),
                    seq,
                });
            }
        }
    }

    debug!(
        "[AStar] FAILED: no path {} {} -> {} after {} nodes",
        map.id, start, goal, expanded
    );
    Err(unreachable())
}

/// Shortest path to any warp leading to `target_map`, with the crossing
/// press appended. Returns the moves and the warp chosen.
///
/// Ties between equally distant warps go to the first recorded one.
pub fn find_path_to_warp(
    map: &TileMap,
    start: TileCoord,
    target_map: crate::core::MapId,
    config: &AStarConfig,
) -> Result<(Vec<Direction>, Warp), RouteError> {
    let mut candidates = map.warps_to(target_map).peekable();
    if candidates.peek().is_none() {
        return Err(RouteError::NoRoute {
            from: map.id,
            to: target_map,
        });
    }

    let mut best: Option<(Vec<Direction>, Warp)> = None;
    let mut last_err = None;

    for warp in candidates {
        match find_path(map, start, warp.at, config) {
            Ok(mut moves) => {
                if let Some(approach) = warp.approach {
                    moves.push(approach);
                }
                let better = best
                    .as_ref()
                    .map(|(b, _)| moves.len() < b.len())
                    .unwrap_or(true);
                if better {
                    best = Some((moves, warp.clone()));
                }
            }
            Err(e) => last_err = Some(e),
        }
    }

    match (best, last_err) {
        (Some(found), _) => Ok(found),
        (None, Some(e)) => Err(e),
        (None, None) => Err(RouteError::NoRoute {
            from: map.id,
            to: target_map,
        }),
    }
}

fn reconstruct(
    came_from: &HashMap<TileCoord, (TileCoord, Direction)>,
    start: TileCoord,
    goal: TileCoord,
) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut cur = goal;
    while cur != start {
        let (prev, dir) = came_from[&cur];
        path.push(dir);
        cur = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MapId;
    use std::collections::VecDeque;

    fn open_grid(w: i32, h: i32) -> TileMap {
        env_logger::try_init().ok();
        let mut m = TileMap::new(MapId(0), "Grid");
        for x in 0..w {
            for y in 0..h {
                m.add_walkable(TileCoord::new(x, y));
            }
        }
        m
    }

    fn replay(start: TileCoord, moves: &[Direction]) -> TileCoord {
        moves.iter().fold(start, |c, d| c.step(*d))
    }

    /// Independent BFS distance for the shortest-path property check.
    fn bfs_distance(map: &TileMap, start: TileCoord, goal: TileCoord) -> Option<usize> {
        let mut seen = std::collections::HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        while let Some((c, d)) = queue.pop_front() {
            if c == goal {
                return Some(d);
            }
            for (_, n) in c.neighbors_4() {
                if map.is_walkable(n) && seen.insert(n) {
                    queue.push_back((n, d + 1));
                }
            }
        }
        None
    }

    #[test]
    fn test_5x5_with_center_blocked() {
        let mut m = open_grid(5, 5);
        m.walkable.remove(&TileCoord::new(2, 2));
        m.add_wall(TileCoord::new(2, 2));

        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(4, 4);
        let path = find_path(&m, start, goal, &AStarConfig::default()).unwrap();

        assert_eq!(path.len(), 8);
        let mut cur = start;
        for d in &path {
            cur = cur.step(*d);
            assert_ne!(cur, TileCoord::new(2, 2));
            assert!(m.is_walkable(cur));
        }
        assert_eq!(cur, goal);
    }

    #[test]
    fn test_matches_bfs_distance_everywhere() {
        let mut m = open_grid(7, 7);
        // Carve an L-shaped wall
        for y in 1..6 {
            let c = TileCoord::new(3, y);
            m.walkable.remove(&c);
            m.add_wall(c);
        }
        let start = TileCoord::new(0, 3);
        let config = AStarConfig::default();
        for &goal in m.walkable.clone().iter() {
            let expected = bfs_distance(&m, start, goal);
            match find_path(&m, start, goal, &config) {
                Ok(path) => {
                    assert_eq!(Some(path.len()), expected, "goal {goal}");
                    assert_eq!(replay(start, &path), goal);
                }
                Err(RouteError::Unreachable { .. }) => assert_eq!(expected, None),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }

    #[test]
    fn test_unreachable_behind_wall() {
        let mut m = open_grid(5, 1);
        let c = TileCoord::new(2, 0);
        m.walkable.remove(&c);
        m.add_wall(c);
        let err = find_path(
            &m,
            TileCoord::new(0, 0),
            TileCoord::new(4, 0),
            &AStarConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::Unreachable { .. }));
    }

    #[test]
    fn test_deterministic_output() {
        let m = open_grid(6, 6);
        let config = AStarConfig::default();
        let a = find_path(&m, TileCoord::new(0, 0), TileCoord::new(5, 5), &config).unwrap();
        let b = find_path(&m, TileCoord::new(0, 0), TileCoord::new(5, 5), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_path_to_warp_appends_approach() {
        let mut m = open_grid(4, 1);
        m.add_warp(Warp {
            at: TileCoord::new(3, 0),
            approach: Some(Direction::Right),
            target_map: MapId(1),
            target: TileCoord::new(0, 0),
        });
        let (moves, warp) =
            find_path_to_warp(&m, TileCoord::new(0, 0), MapId(1), &AStarConfig::default())
                .unwrap();
        assert_eq!(warp.at, TileCoord::new(3, 0));
        assert_eq!(
            moves,
            vec![
                Direction::Right,
                Direction::Right,
                Direction::Right,
                Direction::Right
            ]
        );
    }

    #[test]
    fn test_goal_on_warp_tile_outside_walkable() {
        let mut m = open_grid(3, 1);
        // A doorway recorded as warp but not in the walkable set (as a
        // loaded record might be).
        let door = TileCoord::new(3, 0);
        m.warps.push(Warp {
            at: door,
            approach: None,
            target_map: MapId(2),
            target: TileCoord::new(0, 0),
        });
        m.add_wall(TileCoord::new(4, 0)); // keep bounds covering the door
        let path = find_path(&m, TileCoord::new(0, 0), door, &AStarConfig::default()).unwrap();
        assert_eq!(replay(TileCoord::new(0, 0), &path), door);
    }
}
