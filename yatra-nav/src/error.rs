//! Error types for YatraNav

use setu_io::Position;
use thiserror::Error;

/// YatraNav error type
#[derive(Error, Debug)]
pub enum NavError {
    /// The destination label matched nothing, or matched ambiguously.
    #[error("unknown destination '{label}' ({} candidates)", candidates.len())]
    UnknownDestination {
        label: String,
        candidates: Vec<String>,
    },

    /// Routing failed in the map layer.
    #[error(transparent)]
    Route(#[from] marga_map::RouteError),

    /// Map data could not be loaded or saved.
    #[error(transparent)]
    Persist(#[from] marga_map::PersistError),

    /// A map record violated its invariants.
    #[error(transparent)]
    Map(#[from] marga_map::MapError),

    /// The simulation bridge refused or lost the action.
    #[error(transparent)]
    Bridge(#[from] setu_io::Error),

    /// Repeated submissions produced no observable progress.
    #[error("stuck at map#{} ({}, {})", at.map_id, at.x, at.y)]
    StuckDetected { at: Position },

    /// An interactive exchange opened mid-route; the caller decides how to
    /// handle it and re-invokes navigation afterwards.
    #[error("navigation interrupted by an exchange at map#{} ({}, {})", at.map_id, at.x, at.y)]
    Interrupted { at: Position },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
