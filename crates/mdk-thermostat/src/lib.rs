//! Thermostats for the mdk molecular dynamics engine.
//!
//! All coefficients are precomputed at construction so the per-step
//! apply pass is pure arithmetic plus reproducible random draws from the
//! splittable stream family. Molecules are chunked by worker index and
//! each chunk draws from its own (step, type, worker) stream; the serial
//! path walks the same chunks, so the trajectory depends only on the
//! seed and the worker count, never on scheduling.

use mdk_model::{ExecutionContext, MdkError, Result, StreamSplitter, TypeArena};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Thermostat selector tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermostatKind {
    /// Microcanonical: no velocity modification.
    None,
    /// Andersen stochastic collisions with a heat bath.
    Andersen,
    /// Global canonical-sampling velocity rescale.
    Rescale,
}

impl FromStr for ThermostatKind {
    type Err = MdkError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "none" => Ok(Self::None),
            "andersen" => Ok(Self::Andersen),
            "rescale" => Ok(Self::Rescale),
            other => Err(MdkError::UnknownThermostat(other.to_string())),
        }
    }
}

/// A thermostat bound to one molecule type, with its coefficients
/// precomputed from the target temperature.
#[derive(Debug, Clone, Copy)]
pub enum Thermostat {
    /// Leave velocities alone.
    None,
    Andersen {
        /// Collision rate ν; each molecule collides with probability
        /// ν·dt per step.
        nu: f64,
        /// Maxwell-Boltzmann component width √(k_B·T/m).
        sigma: f64,
    },
    Rescale {
        /// Deterministic decay e^(−dt/τ) over one step.
        decay: f64,
        /// Target kinetic energy per degree of freedom, k_B·T/2.
        target_per_dof: f64,
    },
}

impl Thermostat {
    /// Andersen thermostat for a type with the given mass at the given
    /// target temperature.
    pub fn andersen(nu: f64, k_b: f64, temperature: f64, mass: f64) -> Result<Self> {
        if nu <= 0.0 || temperature <= 0.0 || mass <= 0.0 {
            return Err(MdkError::Config(
                "Andersen thermostat needs positive rate, temperature and mass".into(),
            ));
        }
        Ok(Self::Andersen {
            nu,
            sigma: (k_b * temperature / mass).sqrt(),
        })
    }

    /// Canonical-sampling rescale thermostat with relaxation time τ.
    pub fn rescale(tau: f64, dt: f64, k_b: f64, temperature: f64) -> Result<Self> {
        if tau <= 0.0 || temperature <= 0.0 {
            return Err(MdkError::Config(
                "rescale thermostat needs positive relaxation time and temperature".into(),
            ));
        }
        Ok(Self::Rescale {
            decay: (-dt / tau).exp(),
            target_per_dof: 0.5 * k_b * temperature,
        })
    }

    /// Apply the thermostat to one type after the velocity update.
    /// `kinetic` is the current translational kinetic energy of the
    /// type. Velocities are modified in place; the caller recomputes
    /// kinetic energy afterwards.
    pub fn apply(
        &self,
        arena: &mut TypeArena,
        dt: f64,
        kinetic: f64,
        streams: &StreamSplitter,
        step: u64,
        type_index: usize,
        exec: &ExecutionContext,
    ) -> Result<()> {
        match *self {
            Self::None => Ok(()),
            Self::Andersen { nu, sigma } => {
                apply_andersen(arena, nu * dt, sigma, streams, step, type_index, exec)
            }
            Self::Rescale {
                decay,
                target_per_dof,
            } => {
                apply_rescale(arena, decay, target_per_dof, kinetic, streams, step, type_index);
                Ok(())
            }
        }
    }
}

/// Collision pass over one worker chunk of molecules.
fn andersen_chunk<R: Rng>(
    velocity: &mut [f64],
    stride: usize,
    probability: f64,
    maxwell: &Normal<f64>,
    rng: &mut R,
) {
    for molecule in velocity.chunks_mut(stride) {
        if rng.gen::<f64>() < probability {
            for v in molecule {
                *v = maxwell.sample(rng);
            }
        }
    }
}

fn apply_andersen(
    arena: &mut TypeArena,
    probability: f64,
    sigma: f64,
    streams: &StreamSplitter,
    step: u64,
    type_index: usize,
    exec: &ExecutionContext,
) -> Result<()> {
    let maxwell = Normal::new(0.0, sigma)
        .map_err(|_| MdkError::Config("invalid Maxwell-Boltzmann width".into()))?;
    let stride = arena.n_dimensions;
    let chunk_molecules = arena.n_molecules.div_ceil(exec.workers).max(1);
    let chunk_len = chunk_molecules * stride;

    if exec.parallel {
        arena
            .velocity
            .par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(worker, chunk)| {
                let mut rng = streams.stream(step, type_index, worker);
                andersen_chunk(chunk, stride, probability, &maxwell, &mut rng);
            });
    } else {
        for (worker, chunk) in arena.velocity.chunks_mut(chunk_len).enumerate() {
            let mut rng = streams.stream(step, type_index, worker);
            andersen_chunk(chunk, stride, probability, &maxwell, &mut rng);
        }
    }
    Ok(())
}

fn apply_rescale(
    arena: &mut TypeArena,
    decay: f64,
    target_per_dof: f64,
    kinetic: f64,
    streams: &StreamSplitter,
    step: u64,
    type_index: usize,
) {
    if kinetic <= 0.0 {
        return;
    }
    let n_dof = arena.n_molecules * arena.n_dimensions;
    let mut rng = streams.stream(step, type_index, 0);

    let r1: f64 = StandardNormal.sample(&mut rng);
    let mut noise = r1 * r1;
    for _ in 1..n_dof {
        let r: f64 = StandardNormal.sample(&mut rng);
        noise += r * r;
    }

    let ratio = target_per_dof / kinetic;
    let alpha2 = decay
        + (1.0 - decay) * ratio * noise
        + 2.0 * r1 * (decay * (1.0 - decay) * ratio).sqrt();
    let alpha = alpha2.sqrt();
    for v in &mut arena.velocity {
        *v *= alpha;
    }
}
