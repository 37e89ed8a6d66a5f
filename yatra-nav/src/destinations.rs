//! The named destination table.
//!
//! A flat JSON file maps human-readable labels to (map, coordinate)
//! targets. The table is loaded once at startup and is read-only at
//! runtime; editing it is an offline operation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use marga_map::{Direction, MapId, MapStore, TileCoord};

use crate::error::{NavError, Result};

/// A resolved navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub label: String,
    pub map: MapId,
    pub coord: TileCoord,
    /// Direction to end up facing, when the label implies one (counters,
    /// signs). Informational; route execution does not enforce it.
    pub facing: Option<Direction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DestinationRecord {
    map: u16,
    x: i32,
    y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    facing: Option<Direction>,
}

/// Label -> target lookup with forgiving matching.
#[derive(Debug, Default)]
pub struct DestinationTable {
    // BTreeMap keeps listing and candidate order stable.
    entries: BTreeMap<String, Destination>,
}

impl DestinationTable {
    /// Load the table from its JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read destinations file: {}", e)))?;
        let records: BTreeMap<String, DestinationRecord> = serde_json::from_str(&content)
            .map_err(|e| NavError::Config(format!("Bad destinations file: {}", e)))?;

        let mut table = Self::default();
        for (label, record) in records {
            table.insert(Destination {
                label: label.clone(),
                map: MapId(record.map),
                coord: TileCoord::new(record.x, record.y),
                facing: record.facing,
            });
        }
        info!("loaded {} destinations from {:?}", table.entries.len(), path);
        Ok(table)
    }

    /// Add one destination, replacing any previous entry with the same
    /// normalized label.
    pub fn insert(&mut self, destination: Destination) {
        self.entries
            .insert(normalize(&destination.label), destination);
    }

    /// All labels, in stable order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.values().map(|d| d.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a query to one destination.
    ///
    /// Exact normalized match wins; otherwise a substring match is
    /// accepted when it is unique. Anything else (no match, or several)
    /// fails with the candidate list so the caller can present choices.
    pub fn resolve(&self, query: &str) -> Result<&Destination> {
        let needle = normalize(query);
        if let Some(dest) = self.entries.get(&needle) {
            return Ok(dest);
        }

        let matches: Vec<&Destination> = self
            .entries
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .map(|(_, dest)| dest)
            .collect();

        match matches.as_slice() {
            [single] => Ok(single),
            _ => Err(NavError::UnknownDestination {
                label: query.to_string(),
                candidates: matches.iter().map(|d| d.label.clone()).collect(),
            }),
        }
    }

    /// Drop entries whose coordinate is neither walkable nor a warp tile
    /// on their (scanned) map. Entries on maps the store has not seen yet
    /// are kept: there is nothing to check them against until a scan
    /// lands. Returns the dropped labels.
    pub fn prune_invalid(&mut self, store: &MapStore) -> Vec<String> {
        let mut dropped = Vec::new();
        self.entries.retain(|_, dest| {
            let valid = match store.get(dest.map) {
                Some(map) => map.is_walkable(dest.coord) || map.warp_at(dest.coord).is_some(),
                None => true,
            };
            if !valid {
                dropped.push(dest.label.clone());
            }
            valid
        });
        dropped
    }
}

/// Case- and separator-insensitive key form: "Oak's Lab" == "oaks_lab".
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            c if c.is_alphanumeric() || c == '_' => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}
