//! Velocity autocorrelation diagnostics.
//!
//! A read-only consumer of the state arenas: it snapshots the initial
//! velocities once, then stores per type the mean v(t)·v(0) for every
//! completed step, plus a global average over all molecules. Values are
//! indexed by step number for later analysis.

use mdk_model::{MdkError, Result, TypeArena};

/// Velocity autocorrelation buffers, one slot per step.
#[derive(Debug, Clone)]
pub struct VelocityCorrelation {
    /// Initial velocity snapshot, one flat array per type.
    initial: Vec<Vec<f64>>,
    /// Per-type mean v(t)·v(0), indexed [type][step].
    pub per_type: Vec<Vec<f64>>,
    /// Global average over all molecules, indexed by step.
    pub global: Vec<f64>,
    initialized: bool,
}

impl VelocityCorrelation {
    /// Buffers for `n_types` types over `n_steps` integration steps
    /// (slot 0 holds the trivial t=0 sample).
    pub fn new(n_types: usize, n_steps: usize) -> Self {
        Self {
            initial: vec![Vec::new(); n_types],
            per_type: vec![vec![0.0; n_steps + 1]; n_types],
            global: vec![0.0; n_steps + 1],
            initialized: false,
        }
    }

    /// Snapshot initial velocities and record the step-0 sample. Must be
    /// called exactly once, before integration begins.
    pub fn init(&mut self, arenas: &[TypeArena]) -> Result<()> {
        if self.initialized {
            return Err(MdkError::CorrelationReinit);
        }
        for (t, arena) in arenas.iter().enumerate() {
            self.initial[t] = arena.velocity.clone();
        }
        self.initialized = true;
        self.sample(arenas, 0);
        Ok(())
    }

    /// Record the sample for one completed step. Runs after the second
    /// velocity half-step.
    pub fn sample(&mut self, arenas: &[TypeArena], step: u64) {
        let step = step as usize;
        if step >= self.global.len() || !self.initialized {
            return;
        }
        let mut total_dot = 0.0;
        let mut total_count = 0;
        for (t, arena) in arenas.iter().enumerate() {
            let dot: f64 = arena
                .velocity
                .iter()
                .zip(&self.initial[t])
                .map(|(v, v0)| v * v0)
                .sum();
            total_dot += dot;
            total_count += arena.n_molecules;
            self.per_type[t][step] = dot / arena.n_molecules as f64;
        }
        if total_count > 0 {
            self.global[step] = total_dot / total_count as f64;
        }
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
