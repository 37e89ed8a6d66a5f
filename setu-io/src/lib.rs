//! # Setu-IO: Simulation Bridge
//!
//! Bridges a free-running, tick-driven simulation with request/response
//! callers that want to issue one discrete input and deterministically
//! observe its settled effect.
//!
//! The simulated world itself is an opaque black box behind the
//! [`SimulationEngine`] trait: the bridge only injects inputs, advances
//! ticks and reads raw state. A background thread ticks the engine at a
//! fixed real-time cadence regardless of caller activity; callers interact
//! through [`SimulationBridge::apply_action`], which resolves at
//! quiescence (no pending transition) or, bounded by a tick budget, with a
//! snapshot marked stale.
//!
//! A complete mock engine lives in [`mock`] for hardware/ROM-free testing
//! of everything built on top of the bridge.

pub mod bridge;
pub mod engine;
pub mod error;
pub mod mock;
pub mod observation;
pub mod session;

pub use bridge::{BridgeConfig, Phase, SimulationBridge};
pub use engine::{Button, Facing, Input, RawState, SimulationEngine};
pub use error::{Error, Result};
pub use observation::{ModeFlags, Observation, Position};
pub use session::SimulationSession;
