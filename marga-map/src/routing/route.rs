//! The Route model: an ordered, replayable action plan.

use crate::core::{Direction, MapId, TileCoord};
use crate::error::RouteError;
use crate::store::{MapStore, Warp};

/// One step of a route: a cardinal move, or a warp crossing.
///
/// Warp crossings are a distinct step type so the executor can decide
/// whether the environment needs a separate confirming press or absorbs
/// the crossing into the approach move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Move one tile in the given direction.
    Move(Direction),
    /// Cross the given warp (the controller stands on `warp.at`).
    Warp(Warp),
}

/// An ordered sequence of steps connecting a start and a goal coordinate,
/// possibly across maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub start_map: MapId,
    pub start: TileCoord,
    pub goal_map: MapId,
    pub goal: TileCoord,
    pub steps: Vec<Step>,
}

impl Route {
    /// Number of `Move` steps (warp crossings excluded).
    pub fn len_moves(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Move(_)))
            .count()
    }

    /// Number of warp crossings.
    pub fn len_warps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Warp(_)))
            .count()
    }

    /// Replay the steps against the store, moving only through walkable
    /// tiles and declared warps.
    ///
    /// Returns the final position; it is an invariant of every route the
    /// router produces that this equals `(goal_map, goal)`.
    pub fn replay(&self, store: &MapStore) -> Result<(MapId, TileCoord), RouteError> {
        let mut map_id = self.start_map;
        let mut pos = self.start;

        for step in &self.steps {
            let map = store
                .get(map_id)
                .ok_or(RouteError::UnscannedMap { map: map_id })?;
            match step {
                Step::Move(dir) => {
                    let next = pos.step(*dir);
                    let passable = map.is_walkable(next)
                        || (map_id == self.goal_map
                            && next == self.goal
                            && map.warp_at(next).is_some());
                    if !passable {
                        return Err(RouteError::Unreachable {
                            map: map_id,
                            start: pos,
                            goal: next,
                        });
                    }
                    pos = next;
                }
                Step::Warp(warp) => {
                    // The declared warp must actually be recorded here.
                    if pos != warp.at || map.warp_at(pos) != Some(warp) {
                        return Err(RouteError::Unreachable {
                            map: map_id,
                            start: pos,
                            goal: warp.at,
                        });
                    }
                    map_id = warp.target_map;
                    pos = warp.target;
                }
            }
        }

        Ok((map_id, pos))
    }
}
