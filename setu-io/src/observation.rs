//! Observation snapshots returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{Facing, RawState};

/// Avatar position within the simulated world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub map_id: u16,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
}

/// Coarse mode flags the core interprets. Everything else stays in the
/// opaque payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// An interactive exchange is in progress.
    pub exchange_active: bool,
    /// A transition was still playing when the snapshot was taken (only
    /// possible on stale snapshots).
    pub transition_active: bool,
}

/// A point-in-time snapshot of simulation-exposed state.
///
/// Produced only under the tick exclusion boundary, at quiescence or at
/// budget exhaustion (then flagged `stale`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Monotonic snapshot counter.
    pub seq: u64,
    pub position: Position,
    pub flags: ModeFlags,
    /// Uninterpreted engine payload, preserved as-is.
    pub payload: Value,
    /// True when the quiescence budget ran out before the world settled.
    pub stale: bool,
}

impl Observation {
    /// Build a snapshot from raw engine state.
    pub fn from_raw(raw: RawState, seq: u64, stale: bool) -> Self {
        Self {
            seq,
            position: Position {
                map_id: raw.map_id,
                x: raw.x,
                y: raw.y,
                facing: raw.facing,
            },
            flags: ModeFlags {
                exchange_active: raw.exchange_active,
                transition_active: raw.transition_active,
            },
            payload: raw.payload,
            stale,
        }
    }
}
