//! Simulation configuration.
//!
//! `InputParams` is the typed result of parsing the flat comma-separated
//! scalar list that external front ends hand to the engine. The engine
//! consumes only this struct, never the serialization format.

use crate::error::{MdkError, Result};
use serde::{Deserialize, Serialize};

/// Default Lennard-Jones cutoff as a multiple of σ: r_c = 2.5σ.
pub const CUTOFF_RATIO_LJ: f64 = 2.5;

/// Default Andersen thermostat collision rate.
pub const DEFAULT_ANDERSEN_NU: f64 = 0.1;

/// Boundary condition applied to every box face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// Minimum-image periodic wrapping into [0, L).
    Periodic,
    /// Rigid walls; particles reflect elastically.
    Reflective,
}

/// How the per-step data-parallel regions are executed. Threaded through
/// the simulation constructor; never a process-wide flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Fan out the per-molecule loops across threads.
    pub parallel: bool,
    /// Number of parallel units. Also the number of independent RNG
    /// streams per (step, type), so it fixes reproducibility: the same
    /// seed and worker count give the same trajectory regardless of
    /// scheduling.
    pub workers: usize,
}

impl ExecutionContext {
    /// Single-threaded execution.
    pub fn serial() -> Self {
        Self {
            parallel: false,
            workers: 1,
        }
    }

    /// Parallel execution over the given number of workers.
    pub fn parallel(workers: usize) -> Self {
        Self {
            parallel: true,
            workers: workers.max(1),
        }
    }
}

/// Typed simulation parameters.
///
/// Field order in the flat input list: n_types, n_dimensions,
/// n_molecules (one per type), timestep, runtime, parallelize flag,
/// mass (one per type), target temperature (one per type), periodic
/// boundary flag, box extents (one per dimension).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputParams {
    /// Number of particle/molecule types.
    pub n_types: usize,
    /// Simulation dimensionality (1, 2 or 3).
    pub n_dimensions: usize,
    /// Molecules per type.
    pub n_molecules: Vec<usize>,
    /// Integration timestep.
    pub timestep: f64,
    /// Total simulated time.
    pub runtime: f64,
    /// Requested parallel execution.
    pub parallelize: bool,
    /// Total mass per type.
    pub mass: Vec<f64>,
    /// Target temperature per type, for the thermostats and the initial
    /// velocity distribution.
    pub temperature_required: Vec<f64>,
    /// Boundary condition.
    pub boundary: Boundary,
    /// Box extents per dimension; the box spans [0, extent) on each axis.
    pub box_size: Vec<f64>,
}

impl InputParams {
    /// Parse the flat comma-separated scalar list.
    pub fn parse(input: &str) -> Result<Self> {
        let values: Vec<f64> = input
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| MdkError::Config(format!("invalid scalar `{}`", field.trim())))
            })
            .collect::<Result<_>>()?;

        let mut cursor = values.into_iter();
        let mut next = |name: &str| {
            cursor
                .next()
                .ok_or_else(|| MdkError::Config(format!("input list ends before {name}")))
        };

        let n_types = next("n_types")? as usize;
        let n_dimensions = next("n_dimensions")? as usize;
        let mut n_molecules = Vec::with_capacity(n_types);
        for _ in 0..n_types {
            n_molecules.push(next("n_molecules")? as usize);
        }
        let timestep = next("timestep")?;
        let runtime = next("runtime")?;
        let parallelize = next("parallelize")? != 0.0;
        let mut mass = Vec::with_capacity(n_types);
        for _ in 0..n_types {
            mass.push(next("mass")?);
        }
        let mut temperature_required = Vec::with_capacity(n_types);
        for _ in 0..n_types {
            temperature_required.push(next("temperature_required")?);
        }
        let boundary = if next("periodic_boundary")? != 0.0 {
            Boundary::Periodic
        } else {
            Boundary::Reflective
        };
        let mut box_size = Vec::with_capacity(n_dimensions);
        for _ in 0..n_dimensions {
            box_size.push(next("box_size")?);
        }

        let params = Self {
            n_types,
            n_dimensions,
            n_molecules,
            timestep,
            runtime,
            parallelize,
            mass,
            temperature_required,
            boundary,
            box_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check internal consistency. Per-type arrays must match n_types and
    /// the box must match the dimensionality.
    pub fn validate(&self) -> Result<()> {
        if self.n_types == 0 {
            return Err(MdkError::Config("n_types must be positive".into()));
        }
        if !(1..=3).contains(&self.n_dimensions) {
            return Err(MdkError::Config(format!(
                "n_dimensions must be 1, 2 or 3, got {}",
                self.n_dimensions
            )));
        }
        for (field, len) in [
            ("n_molecules", self.n_molecules.len()),
            ("mass", self.mass.len()),
            ("temperature_required", self.temperature_required.len()),
        ] {
            if len != self.n_types {
                return Err(MdkError::SizeMismatch {
                    field,
                    expected: self.n_types,
                    got: len,
                });
            }
        }
        if self.box_size.len() != self.n_dimensions {
            return Err(MdkError::SizeMismatch {
                field: "box_size",
                expected: self.n_dimensions,
                got: self.box_size.len(),
            });
        }
        if self.timestep <= 0.0 || self.runtime < 0.0 {
            return Err(MdkError::Config("timestep/runtime must be positive".into()));
        }
        if self.box_size.iter().any(|&l| l <= 0.0) {
            return Err(MdkError::Config("box extents must be positive".into()));
        }
        if self.mass.iter().any(|&m| m <= 0.0) {
            return Err(MdkError::Config("masses must be positive".into()));
        }
        Ok(())
    }

    /// Number of integration steps implied by runtime and timestep,
    /// rounded to the nearest whole step.
    pub fn n_steps(&self) -> usize {
        (self.runtime / self.timestep).round() as usize
    }

    /// Box volume (length in 1D, area in 2D).
    pub fn volume(&self) -> f64 {
        self.box_size.iter().product()
    }

    /// Total molecule count over all types.
    pub fn total_molecules(&self) -> usize {
        self.n_molecules.iter().sum()
    }

    /// Execution context implied by the parallelize flag.
    pub fn execution_context(&self) -> ExecutionContext {
        if self.parallelize {
            let workers = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            ExecutionContext::parallel(workers)
        } else {
            ExecutionContext::serial()
        }
    }
}
