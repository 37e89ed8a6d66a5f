//! Deterministic single-map pathfinding.

mod astar;

pub use astar::{find_path, find_path_to_warp, AStarConfig};
