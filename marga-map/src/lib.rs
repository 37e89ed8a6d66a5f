//! # Marga-Map: Tile World Mapping and Routing
//!
//! Map data model and routing algorithms for a tile-based 2D world split
//! across multiple discretely-connected maps.
//!
//! The library is pure data and search: it never talks to the running
//! simulation. Maps are produced by the scanner (see the `yatra-nav` crate)
//! or loaded from persisted JSON records, and are read-only at routing time.
//!
//! ## Quick Start
//!
//! ```rust
//! use marga_map::core::{Direction, MapId, TileCoord};
//! use marga_map::routing::Router;
//! use marga_map::store::{MapStore, TileMap};
//!
//! let mut map = TileMap::new(MapId(0), "Test Yard");
//! for x in 0..5 {
//!     for y in 0..5 {
//!         map.add_walkable(TileCoord::new(x, y));
//!     }
//! }
//! let mut store = MapStore::new();
//! store.insert(map).unwrap();
//!
//! let route = Router::new(&store)
//!     .find_route(MapId(0), TileCoord::new(0, 0), MapId(0), TileCoord::new(4, 4))
//!     .unwrap();
//! assert_eq!(route.len_moves(), 8);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Fundamental types (TileCoord, Direction, GridBounds, MapId)
//! - [`store`]: TileMap records, warps and the MapStore
//! - [`pathfinding`]: Deterministic single-map A*
//! - [`routing`]: Cross-map routing over the warp graph, Route model
//! - [`io`]: JSON persistence for map records

pub mod core;
pub mod error;
pub mod io;
pub mod pathfinding;
pub mod routing;
pub mod store;

pub use crate::core::{Direction, GridBounds, MapId, TileCoord};
pub use error::{MapError, PersistError, RouteError};
pub use routing::{Route, Router, Step};
pub use store::{MapStore, TileMap, Warp};
