//! Per-type state arenas and the aggregate system state.
//!
//! All kinematic quantities live in contiguous flat arrays indexed by
//! computed (molecule, dimension) and (molecule, atom, dimension)
//! offsets, sized exactly at construction. Rotation matrices and the
//! derived site positions are caches recomputed from the orientation
//! quaternion, never independent sources of truth.

use crate::error::{MdkError, Result};
use crate::molecule::MoleculeTypeConstants;
use mdk_math::{Mat3, Quat, Vec3};

/// Owned state of every molecule of one type.
#[derive(Debug, Clone)]
pub struct TypeArena {
    /// Molecule count.
    pub n_molecules: usize,
    /// Simulation dimensionality (1..=3); COM arrays use this stride.
    pub n_dimensions: usize,
    /// Sites per molecule; site arrays always use stride 3.
    pub n_atoms: usize,

    /// Center-of-mass positions, `n_molecules * n_dimensions`.
    pub position: Vec<f64>,
    /// Center-of-mass velocities, same layout.
    pub velocity: Vec<f64>,
    /// Center-of-mass accelerations, same layout. Reset every
    /// interaction pass.
    pub acceleration: Vec<f64>,

    /// Orientation quaternions, unit norm after every update.
    pub orientation: Vec<Quat>,
    /// Rotation matrices derived from `orientation`; refreshed via
    /// `refresh_rotation`, not independently owned.
    pub rotation: Vec<Mat3>,
    /// World-frame angular momenta.
    pub angular_momentum: Vec<Vec3>,
    /// World-frame torques. Reset every interaction pass.
    pub torque: Vec<Vec3>,

    /// World-frame site positions, `n_molecules * n_atoms * 3`.
    pub site_world: Vec<f64>,
    /// COM-frame site positions (world orientation), same layout.
    pub site_relative: Vec<f64>,
    /// Per-site force accumulators, same layout. Reset every
    /// interaction pass.
    pub site_force: Vec<f64>,
}

fn sized(what: &'static str, len: Option<usize>) -> Result<usize> {
    len.ok_or(MdkError::Allocation { what })
}

impl TypeArena {
    /// Allocate an arena for `n_molecules` molecules of a type with
    /// `n_atoms` sites in an `n_dimensions`-dimensional simulation.
    /// Every array is constructed at its exact final length.
    pub fn new(n_molecules: usize, n_dimensions: usize, n_atoms: usize) -> Result<Self> {
        let com_len = sized("com arrays", n_molecules.checked_mul(n_dimensions))?;
        let site_len = sized(
            "site arrays",
            n_molecules
                .checked_mul(n_atoms)
                .and_then(|n| n.checked_mul(3)),
        )?;

        Ok(Self {
            n_molecules,
            n_dimensions,
            n_atoms,
            position: vec![0.0; com_len],
            velocity: vec![0.0; com_len],
            acceleration: vec![0.0; com_len],
            orientation: vec![Quat::identity(); n_molecules],
            rotation: vec![Mat3::identity(); n_molecules],
            angular_momentum: vec![Vec3::zeros(); n_molecules],
            torque: vec![Vec3::zeros(); n_molecules],
            site_world: vec![0.0; site_len],
            site_relative: vec![0.0; site_len],
            site_force: vec![0.0; site_len],
        })
    }

    /// Flat offset of (molecule, dimension) in the COM arrays.
    #[inline]
    pub fn com(&self, molecule: usize, dim: usize) -> usize {
        molecule * self.n_dimensions + dim
    }

    /// Flat offset of (molecule, atom, dimension) in the site arrays.
    #[inline]
    pub fn site(&self, molecule: usize, atom: usize, dim: usize) -> usize {
        (molecule * self.n_atoms + atom) * 3 + dim
    }

    /// Zero the force, acceleration and torque accumulators. Must run at
    /// the start of every interaction pass.
    pub fn reset_accumulators(&mut self) {
        self.acceleration.fill(0.0);
        self.site_force.fill(0.0);
        self.torque.fill(Vec3::zeros());
    }

    /// Regenerate the rotation-matrix cache from the current
    /// orientation quaternions.
    pub fn refresh_rotation(&mut self) {
        for m in 0..self.n_molecules {
            self.rotation[m] = self.orientation[m].to_matrix();
        }
    }

    /// Recompute site positions from the rotation cache and COM:
    /// `world = COM + R · body`. `refresh_rotation` must run first
    /// whenever the orientation changed.
    pub fn sync_sites(&mut self, consts: &MoleculeTypeConstants) {
        for m in 0..self.n_molecules {
            let rot = self.rotation[m];
            for (a, body) in consts.site_positions.iter().enumerate() {
                let rel = rot * body;
                for k in 0..3 {
                    let idx = self.site(m, a, k);
                    self.site_relative[idx] = rel[k];
                    let com = if k < self.n_dimensions {
                        self.position[self.com(m, k)]
                    } else {
                        0.0
                    };
                    self.site_world[idx] = com + rel[k];
                }
            }
        }
    }

    /// Reduce accumulated site forces to COM acceleration and
    /// world-frame torque. Must run after all pairwise contributions of
    /// the interaction pass are in.
    pub fn reduce_site_forces(&mut self, consts: &MoleculeTypeConstants) {
        for m in 0..self.n_molecules {
            let mut total = Vec3::zeros();
            let mut torque = Vec3::zeros();
            for a in 0..self.n_atoms {
                let f = Vec3::new(
                    self.site_force[self.site(m, a, 0)],
                    self.site_force[self.site(m, a, 1)],
                    self.site_force[self.site(m, a, 2)],
                );
                total += f;
                if consts.is_rigid_body() {
                    let rel = Vec3::new(
                        self.site_relative[self.site(m, a, 0)],
                        self.site_relative[self.site(m, a, 1)],
                        self.site_relative[self.site(m, a, 2)],
                    );
                    torque += rel.cross(&f);
                }
            }
            for k in 0..self.n_dimensions {
                let idx = self.com(m, k);
                self.acceleration[idx] = total[k] / consts.mass;
            }
            self.torque[m] = torque;
        }
    }

    /// Sum of squared COM velocity components over all molecules.
    pub fn velocity_square_sum(&self) -> f64 {
        self.velocity.iter().map(|v| v * v).sum()
    }

    /// Total momentum per axis.
    pub fn momentum(&self, mass: f64) -> Vec<f64> {
        let mut p = vec![0.0; self.n_dimensions];
        for m in 0..self.n_molecules {
            for k in 0..self.n_dimensions {
                p[k] += mass * self.velocity[self.com(m, k)];
            }
        }
        p
    }
}

/// Aggregate per-step observables, mutated once per step by the
/// integrator and interaction engine.
#[derive(Debug, Clone)]
pub struct SystemState {
    /// Total energy at this instant.
    pub energy_total: f64,
    /// Potential energy of interaction at this instant.
    pub energy_potential: f64,
    /// Kinetic energy per type.
    pub energy_kinetic: Vec<f64>,
    /// Instantaneous temperature per type.
    pub temperature: Vec<f64>,
    /// Elapsed simulated time.
    pub time: f64,
    /// Completed step count.
    pub step: u64,
    /// Total molecule count over all types.
    pub total_molecules: usize,
}

impl SystemState {
    /// Fresh state for `n_types` types.
    pub fn new(n_types: usize, total_molecules: usize) -> Self {
        Self {
            energy_total: 0.0,
            energy_potential: 0.0,
            energy_kinetic: vec![0.0; n_types],
            temperature: vec![0.0; n_types],
            time: 0.0,
            step: 0,
            total_molecules,
        }
    }
}
