//! # YatraNav: Navigation Controller
//!
//! Drives an avatar around a tile-based multi-map world through the
//! `setu-io` simulation bridge, using `marga-map` for map data and
//! routing.
//!
//! - [`scanner`]: discovers a map by probing movement through the bridge
//! - [`destinations`]: named target table with forgiving label matching
//! - [`navigator`]: plans and executes routes to named destinations
//! - [`api`]: the bundled operation surface ([`NavCore`]) the CLI drives
//! - [`config`]: TOML configuration with defaults throughout

pub mod api;
pub mod config;
pub mod destinations;
pub mod error;
pub mod navigator;
pub mod scanner;

pub use api::NavCore;
pub use config::NavConfig;
pub use destinations::{Destination, DestinationTable};
pub use error::{NavError, Result};
pub use navigator::{NavReport, Navigator};
pub use scanner::MapScanner;
