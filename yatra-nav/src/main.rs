//! YatraNav CLI - drives the navigation core against the built-in mock
//! world.
//!
//! The binary is a thin driver: it assembles a `NavCore` from the config
//! (persisted maps, destination table, bridge over the mock engine) and
//! dispatches one subcommand against it.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use marga_map::{io as map_io, Direction, MapId, TileCoord};
use setu_io::mock::{MockEngine, MockWorld};
use setu_io::{Facing, SimulationBridge, SimulationSession};
use yatra_nav::destinations::Destination;
use yatra_nav::{DestinationTable, NavConfig, NavCore, Result};

#[derive(Parser)]
#[command(name = "yatra-nav", version, about = "Tile-world navigation controller")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the map the session starts on and persist the record
    Scan {
        /// Human-readable name for the map record
        name: String,
    },
    /// Plan a route to a destination and print the actions, without
    /// executing them
    Route { label: String },
    /// Navigate to a destination, executing the route live
    Goto { label: String },
    /// List known destinations and scanned maps
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yatra_nav=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!("loading configuration from {:?}", path);
            NavConfig::load(path)?
        }
        None if Path::new("yatra.toml").exists() => {
            info!("loading configuration from yatra.toml");
            NavConfig::load(Path::new("yatra.toml"))?
        }
        None => NavConfig::default(),
    };

    let maps_dir = PathBuf::from(&config.paths.maps_dir);
    let store = map_io::load_all_maps(&maps_dir)?;
    info!("loaded {} map records from {:?}", store.len(), maps_dir);

    let table = load_destinations(Path::new(&config.paths.destinations_file));

    let bridge = SimulationBridge::start(
        SimulationSession::new(Box::new(demo_engine())),
        config.bridge,
    );
    let mut core = NavCore::new(store, table, bridge, config.navigator);

    match cli.command {
        Command::Scan { name } => {
            let id = core.scan_current(&name, config.scanner)?;
            if let Some(map) = core.store().get(id) {
                let path = map_io::save_map(map, &maps_dir)?;
                println!(
                    "scanned {} '{}': {} walkable, {} walls, {} warps -> {}",
                    id,
                    name,
                    map.walkable.len(),
                    map.walls.len(),
                    map.warps.len(),
                    path.display()
                );
            }
        }
        Command::Route { label } => {
            let from = core.state().position;
            let inputs = core.route_to(&label, from)?;
            println!("{} actions:", inputs.len());
            for input in inputs {
                let setu_io::Input::Press(button) = input;
                println!("  press {}", button);
            }
        }
        Command::Goto { label } => {
            let report = core.navigate(&label)?;
            let pos = report.final_position;
            println!(
                "arrived: map#{} ({}, {}) in {} actions",
                pos.map_id, pos.x, pos.y, report.steps_taken
            );
        }
        Command::List => {
            println!("destinations:");
            for label in core.destinations() {
                println!("  {}", label);
            }
            println!("maps:");
            for (id, name, complete) in core.scanned_maps() {
                let suffix = if complete { "" } else { " (partial)" };
                println!("  {} {}{}", id, name, suffix);
            }
        }
    }

    Ok(())
}

fn load_destinations(path: &Path) -> DestinationTable {
    if path.exists() {
        match DestinationTable::load(path) {
            Ok(table) => return table,
            Err(e) => warn!("ignoring destinations file: {}", e),
        }
    }
    // Built-in labels matching the demo world.
    let mut table = DestinationTable::default();
    table.insert(Destination {
        label: "Pallet Town".to_string(),
        map: MapId(0),
        coord: TileCoord::new(2, 2),
        facing: None,
    });
    table.insert(Destination {
        label: "Oak's Lab".to_string(),
        map: MapId(40),
        coord: TileCoord::new(3, 1),
        facing: Some(Direction::Up),
    });
    table
}

/// The demo world: a town square with a doorway into a lab and back.
fn demo_engine() -> MockEngine {
    let mut world = MockWorld::new();
    world.add_grid(0, 10, 9);
    world.add_grid(40, 8, 8);
    world.add_warp(0, (5, 5), Facing::Up, 40, (3, 7));
    world.add_warp(40, (3, 7), Facing::Down, 0, (5, 5));
    world.add_exchange_trigger(40, (4, 1));
    MockEngine::new(world, 0, 2, 2)
}
