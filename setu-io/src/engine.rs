//! The black-box engine abstraction.
//!
//! Implement [`SimulationEngine`] to connect the bridge to a real emulated
//! world or to the [`crate::mock`] simulation. The bridge never interprets
//! the world beyond this trait.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// A physical input button of the simulated world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

impl Button {
    /// Lowercase name, matching the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::A => "a",
            Button::B => "b",
            Button::Start => "start",
            Button::Select => "select",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discrete input. The only primitive the bridge accepts; batching is
/// a caller-side loop, never a server-side macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// Press and release one button.
    Press(Button),
}

/// The direction the controller avatar faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

impl Facing {
    /// Coordinate delta for one step in the facing direction.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }

    /// Facing implied by a directional button, if any.
    pub fn from_button(button: Button) -> Option<Facing> {
        match button {
            Button::Up => Some(Facing::Up),
            Button::Down => Some(Facing::Down),
            Button::Left => Some(Facing::Left),
            Button::Right => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Raw engine state as read between ticks.
///
/// `payload` carries whatever else the engine exposes; the bridge
/// preserves it opaque and never interprets it.
#[derive(Clone, Debug)]
pub struct RawState {
    pub map_id: u16,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    /// A movement/scene transition is still playing out.
    pub transition_active: bool,
    /// An interactive exchange (dialogue, encounter) is in progress.
    pub exchange_active: bool,
    pub payload: Value,
}

/// An opaque simulation engine the bridge can drive.
///
/// Implementations must be `Send`: the bridge moves the engine into its
/// background tick thread.
pub trait SimulationEngine: Send {
    /// Advance the simulation by exactly one tick.
    fn tick(&mut self);

    /// Consume one discrete input. Called between ticks, never
    /// concurrently with them.
    fn inject(&mut self, input: Input);

    /// Read the current raw state. Called under the same exclusion
    /// boundary as `tick`.
    fn raw_state(&self) -> RawState;

    /// Serialize the full engine state for later restoration.
    fn save_checkpoint(&self) -> Result<Vec<u8>>;

    /// Replace the full engine state from a checkpoint.
    fn load_checkpoint(&mut self, bytes: &[u8]) -> Result<()>;
}
