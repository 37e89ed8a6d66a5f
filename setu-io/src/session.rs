//! The exclusively-owned handle to one running engine.

use crate::engine::{Input, RawState, SimulationEngine};
use crate::error::Result;

/// Single owned handle to the running black-box engine.
///
/// Created once at process start, moved into the bridge's tick thread and
/// never shared: all access goes through the bridge's exclusion boundary.
/// A checkpoint reload replaces the engine state wholesale; there is no
/// partial mutation path.
pub struct SimulationSession {
    engine: Box<dyn SimulationEngine>,
}

impl SimulationSession {
    /// Wrap a freshly started engine.
    pub fn new(engine: Box<dyn SimulationEngine>) -> Self {
        Self { engine }
    }

    /// Wrap an engine and immediately restore a persisted checkpoint.
    pub fn from_checkpoint(engine: Box<dyn SimulationEngine>, bytes: &[u8]) -> Result<Self> {
        let mut session = Self::new(engine);
        session.restore(bytes)?;
        Ok(session)
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    /// Consume one discrete input.
    pub fn inject(&mut self, input: Input) {
        self.engine.inject(input);
    }

    /// Read raw engine state.
    pub fn raw_state(&self) -> RawState {
        self.engine.raw_state()
    }

    /// Serialize the engine state.
    pub fn checkpoint(&self) -> Result<Vec<u8>> {
        self.engine.save_checkpoint()
    }

    /// Replace the engine state wholesale.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        self.engine.load_checkpoint(bytes)
    }
}
