//! In-memory mock engine for bridge and navigation tests.
//!
//! Models just enough of a tile world to exercise the bridge contract:
//! directional presses turn first and move second, movement and warps play
//! out over a configurable number of ticks with `transition_active` held
//! high, stepping onto a trigger tile opens an interactive exchange, and
//! the dynamic state round-trips through JSON checkpoints.

mod world;

pub use world::{MockMap, MockWorld};

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{Button, Facing, Input, RawState, SimulationEngine};
use crate::error::{Error, Result};

const DEFAULT_MOVE_TICKS: u32 = 4;
const DEFAULT_WARP_TICKS: u32 = 8;

/// Dynamic engine state, the part a checkpoint captures.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct MockState {
    map_id: u16,
    x: i32,
    y: i32,
    facing: Facing,
    exchange_active: bool,
    /// Remaining ticks of the current transition, with the position the
    /// transition lands on.
    transition: Option<(u32, PendingLanding)>,
    ticks_elapsed: u64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct PendingLanding {
    map_id: u16,
    x: i32,
    y: i32,
}

/// A deterministic tile-world engine.
pub struct MockEngine {
    world: MockWorld,
    state: MockState,
    move_ticks: u32,
    warp_ticks: u32,
    /// When set, transitions never finish. For budget-exhaustion tests.
    jammed: bool,
}

impl MockEngine {
    /// Place the avatar at a starting tile of the given map.
    pub fn new(world: MockWorld, map_id: u16, x: i32, y: i32) -> Self {
        Self {
            world,
            state: MockState {
                map_id,
                x,
                y,
                facing: Facing::Down,
                exchange_active: false,
                transition: None,
                ticks_elapsed: 0,
            },
            move_ticks: DEFAULT_MOVE_TICKS,
            warp_ticks: DEFAULT_WARP_TICKS,
            jammed: false,
        }
    }

    /// Ticks a plain step takes to settle.
    pub fn set_move_ticks(&mut self, ticks: u32) {
        self.move_ticks = ticks.max(1);
    }

    /// Ticks a warp crossing takes to settle.
    pub fn set_warp_ticks(&mut self, ticks: u32) {
        self.warp_ticks = ticks.max(1);
    }

    /// Make every transition run forever.
    pub fn jam_transitions(&mut self) {
        self.jammed = true;
    }

    /// Total ticks advanced since start (not checkpointed away by jams).
    pub fn ticks_elapsed(&self) -> u64 {
        self.state.ticks_elapsed
    }

    fn start_move(&mut self, facing: Facing) {
        // One press both turns and attempts the step, as a held press
        // does on the real thing.
        self.state.facing = facing;

        let (dx, dy) = facing.delta();
        let target = (self.state.x + dx, self.state.y + dy);

        // A warp fires on pressing into its edge from the right side.
        if let Some(&(dest_map, (dest_x, dest_y))) = self
            .world
            .map(self.state.map_id)
            .and_then(|m| m.warps.get(&((self.state.x, self.state.y), facing)))
        {
            self.state.transition = Some((
                self.warp_ticks,
                PendingLanding {
                    map_id: dest_map,
                    x: dest_x,
                    y: dest_y,
                },
            ));
            return;
        }

        let walkable = self
            .world
            .map(self.state.map_id)
            .map(|m| m.walkable.contains(&target))
            .unwrap_or(false);
        if !walkable {
            trace!("[Mock] blocked at ({}, {})", target.0, target.1);
            return;
        }

        self.state.transition = Some((
            self.move_ticks,
            PendingLanding {
                map_id: self.state.map_id,
                x: target.0,
                y: target.1,
            },
        ));
    }

    fn land(&mut self, landing: PendingLanding) {
        self.state.map_id = landing.map_id;
        self.state.x = landing.x;
        self.state.y = landing.y;
        let on_trigger = self
            .world
            .map(landing.map_id)
            .map(|m| m.exchange_triggers.contains(&(landing.x, landing.y)))
            .unwrap_or(false);
        if on_trigger {
            self.state.exchange_active = true;
        }
    }
}

impl SimulationEngine for MockEngine {
    fn tick(&mut self) {
        self.state.ticks_elapsed += 1;
        if self.jammed {
            return;
        }
        if let Some((remaining, landing)) = self.state.transition {
            if remaining <= 1 {
                self.state.transition = None;
                self.land(landing);
            } else {
                self.state.transition = Some((remaining - 1, landing));
            }
        }
    }

    fn inject(&mut self, input: Input) {
        // Inputs during a transition are swallowed, as on real hardware.
        if self.state.transition.is_some() {
            return;
        }
        let Input::Press(button) = input;
        if self.state.exchange_active {
            // Any confirm/cancel press closes the exchange.
            if matches!(button, Button::A | Button::B) {
                self.state.exchange_active = false;
            }
            return;
        }
        if let Some(facing) = Facing::from_button(button) {
            self.start_move(facing);
        }
    }

    fn raw_state(&self) -> RawState {
        RawState {
            map_id: self.state.map_id,
            x: self.state.x,
            y: self.state.y,
            facing: self.state.facing,
            transition_active: self.state.transition.is_some(),
            exchange_active: self.state.exchange_active,
            payload: Value::Null,
        }
    }

    fn save_checkpoint(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.state)?)
    }

    fn load_checkpoint(&mut self, bytes: &[u8]) -> Result<()> {
        self.state = serde_json::from_slice(bytes)
            .map_err(|e| Error::InvalidCheckpoint(e.to_string()))?;
        Ok(())
    }
}
