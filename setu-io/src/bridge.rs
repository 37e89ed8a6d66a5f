//! The simulation/controller synchronization bridge.
//!
//! One background thread advances the session at a fixed real-time
//! cadence; it never waits for callers. Callers submit exactly one
//! discrete input at a time through [`SimulationBridge::apply_action`] and
//! block until the world reaches quiescence (no pending transition) or the
//! tick budget runs out (snapshot returned stale). A second caller
//! arriving mid-flight is rejected with [`Error::Busy`] immediately —
//! serialization by rejection, never by silent queueing, so two logical
//! actions can never collapse into one physical step.

use crossbeam_channel::{bounded, Sender};
use log::{debug, info, trace, warn};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::Input;
use crate::error::{Error, Result};
use crate::observation::Observation;
use crate::session::SimulationSession;

/// Bridge timing configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Background tick rate (ticks per second of real time).
    pub tick_hz: u32,
    /// Maximum ticks to wait for quiescence before returning stale.
    pub budget_ticks: u32,
    /// Minimum ticks after injection before quiescence may be declared,
    /// so the engine has a chance to start its transition.
    pub settle_ticks: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            budget_ticks: 180,
            settle_ticks: 2,
        }
    }
}

impl BridgeConfig {
    fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_hz.max(1)
    }
}

/// Externally observable phase of the bridge.
///
/// The full per-action cycle is `Idle -> InputQueued -> Advancing ->
/// (quiescent | budget exhausted) -> Idle`; the resolving states are
/// transient within one tick iteration and are never observed from
/// outside the lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InputQueued,
    Advancing,
}

struct Inflight {
    input: Input,
    done: Sender<Observation>,
    ticks: u32,
}

struct Inner {
    session: SimulationSession,
    phase: Phase,
    inflight: Option<Inflight>,
    seq: u64,
}

/// Serializes discrete actions against the continuously ticking session.
pub struct SimulationBridge {
    inner: Arc<Mutex<Inner>>,
    latest: Arc<RwLock<Observation>>,
    shutdown: Arc<AtomicBool>,
    config: BridgeConfig,
    handle: Option<JoinHandle<()>>,
}

impl SimulationBridge {
    /// Take exclusive ownership of the session and start the tick thread.
    pub fn start(session: SimulationSession, config: BridgeConfig) -> Self {
        let initial = Observation::from_raw(session.raw_state(), 0, false);
        let inner = Arc::new(Mutex::new(Inner {
            session,
            phase: Phase::Idle,
            inflight: None,
            seq: 0,
        }));
        let latest = Arc::new(RwLock::new(initial));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_inner = Arc::clone(&inner);
        let thread_latest = Arc::clone(&latest);
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("setu-tick".into())
            .spawn(move || {
                tick_loop(thread_inner, thread_latest, thread_shutdown, config);
            })
            .expect("Failed to spawn tick thread");

        info!(
            "[Bridge] started: {} Hz, budget {} ticks",
            config.tick_hz, config.budget_ticks
        );

        Self {
            inner,
            latest,
            shutdown,
            config,
            handle: Some(handle),
        }
    }

    /// Start with default timing.
    pub fn with_defaults(session: SimulationSession) -> Self {
        Self::start(session, BridgeConfig::default())
    }

    /// The timing configuration in effect.
    pub fn config(&self) -> BridgeConfig {
        self.config
    }

    /// Current phase (for callers that poll instead of retrying blind).
    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Submit one discrete input and block until its settled observation.
    ///
    /// Accepted only while idle; a call arriving mid-flight fails with
    /// [`Error::Busy`] immediately. Resolution is bounded by the tick
    /// budget, so this never blocks forever: quiescence yields a fresh
    /// snapshot, budget exhaustion yields the best available snapshot
    /// marked stale.
    pub fn apply_action(&self, input: Input) -> Result<Observation> {
        let rx = {
            let mut inner = self.inner.lock();
            if self.shutdown.load(Ordering::Acquire) {
                return Err(Error::ShutDown);
            }
            if inner.phase != Phase::Idle {
                debug!("[Bridge] rejected {:?}: busy ({:?})", input, inner.phase);
                return Err(Error::Busy);
            }
            let (tx, rx) = bounded(1);
            inner.inflight = Some(Inflight {
                input,
                done: tx,
                ticks: 0,
            });
            inner.phase = Phase::InputQueued;
            rx
        };

        // The tick thread owns resolution; a dropped sender means it shut
        // down before resolving us.
        rx.recv().map_err(|_| Error::ShutDown)
    }

    /// The most recently completed snapshot.
    ///
    /// Read-only and safe to call concurrently with an in-flight action:
    /// the snapshot is only ever written under the tick exclusion
    /// boundary, never read from live mutable state.
    pub fn observation(&self) -> Observation {
        self.latest.read().clone()
    }

    /// Serialize the engine state. Only valid while idle.
    pub fn checkpoint(&self) -> Result<Vec<u8>> {
        let inner = self.inner.lock();
        if inner.phase != Phase::Idle {
            return Err(Error::Busy);
        }
        inner.session.checkpoint()
    }

    /// Replace the engine state wholesale from a checkpoint. Only valid
    /// while idle; refreshes the published snapshot to the restored state.
    pub fn restore(&self, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.phase != Phase::Idle {
            return Err(Error::Busy);
        }
        inner.session.restore(bytes)?;
        inner.seq += 1;
        let obs = Observation::from_raw(inner.session.raw_state(), inner.seq, false);
        *self.latest.write() = obs;
        Ok(())
    }

    /// Stop the tick thread and release the session. Any in-flight waiter
    /// resolves with [`Error::ShutDown`] rather than hanging.
    pub fn shutdown(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("[Bridge] tick thread panicked during shutdown");
            }
        }
        info!("[Bridge] stopped");
    }
}

impl Drop for SimulationBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Drains the in-flight action when the tick loop exits, whether it
/// returned normally or unwound out of a panicking engine. Dropping the
/// sender fails the waiter's recv, so the caller sees `ShutDown` instead
/// of blocking forever.
struct InflightDrain {
    inner: Arc<Mutex<Inner>>,
    shutdown: Arc<AtomicBool>,
}

impl Drop for InflightDrain {
    fn drop(&mut self) {
        if thread::panicking() {
            // A dead tick thread can never resolve another action.
            self.shutdown.store(true, Ordering::Release);
        }
        let mut guard = self.inner.lock();
        if guard.inflight.take().is_some() {
            debug!("[Bridge] dropped in-flight action at shutdown");
        }
        guard.phase = Phase::Idle;
    }
}

fn tick_loop(
    inner: Arc<Mutex<Inner>>,
    latest: Arc<RwLock<Observation>>,
    shutdown: Arc<AtomicBool>,
    config: BridgeConfig,
) {
    let interval = config.tick_interval();
    let _drain = InflightDrain {
        inner: Arc::clone(&inner),
        shutdown: Arc::clone(&shutdown),
    };

    while !shutdown.load(Ordering::Acquire) {
        let started = Instant::now();

        {
            let mut guard = inner.lock();
            step(&mut guard, &latest, &config);
        }

        // Fixed cadence independent of caller arrival.
        let elapsed = started.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

/// One tick: consume a queued input, advance the engine, and resolve the
/// in-flight action at quiescence or budget exhaustion.
fn step(inner: &mut Inner, latest: &RwLock<Observation>, config: &BridgeConfig) {
    if inner.phase == Phase::InputQueued {
        if let Some(inflight) = inner.inflight.as_ref() {
            trace!("[Bridge] injecting {:?}", inflight.input);
            inner.session.inject(inflight.input);
        }
        inner.phase = Phase::Advancing;
    }

    inner.session.tick();

    if inner.phase != Phase::Advancing {
        return;
    }
    let ticks = match inner.inflight.as_mut() {
        Some(inflight) => {
            inflight.ticks += 1;
            inflight.ticks
        }
        None => {
            // Advancing without an inflight record cannot happen through
            // the public API; recover rather than wedge the loop.
            inner.phase = Phase::Idle;
            return;
        }
    };

    let raw = inner.session.raw_state();
    let quiescent = !raw.transition_active && ticks >= config.settle_ticks;
    let exhausted = ticks >= config.budget_ticks;

    if !quiescent && !exhausted {
        return;
    }

    let stale = !quiescent;
    if stale {
        warn!(
            "[Bridge] quiescence budget exhausted after {} ticks; returning stale snapshot",
            ticks
        );
    }

    inner.seq += 1;
    let obs = Observation::from_raw(raw, inner.seq, stale);
    *latest.write() = obs.clone();

    if let Some(inflight) = inner.inflight.take() {
        // A vanished receiver just means the caller gave up; the action
        // still happened and the snapshot is published either way.
        let _ = inflight.done.send(obs);
    }
    inner.phase = Phase::Idle;
}
