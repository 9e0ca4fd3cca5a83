//! Rigid-body rotational leapfrog.
//!
//! Angular momentum lives in the world frame and gets torque half-kicks
//! around the interaction pass, mirroring the translational stages. The
//! orientation update solves the implicit midpoint equation
//! dq/dt = ½ q ∘ (0, ω(q)) by fixed-point iteration on the half-step
//! quaternion rate, with an iteration cap so a pathological state cannot
//! stall the step.

use mdk_math::{Quat, Vec3};
use mdk_model::{MdkError, MoleculeTypeConstants, Result, TypeArena};

/// Default fixed-point tolerance on the quaternion-rate residual.
pub const DEFAULT_TOLERANCE: f64 = 1e-14;

/// Default iteration cap for the midpoint solve.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Bounded fixed-point solver for the orientation midpoint equation.
#[derive(Debug, Clone, Copy)]
pub struct RotationSolver {
    /// Convergence threshold on |dq_new − dq_old|.
    pub tolerance: f64,
    /// Hard cap on fixed-point iterations. On hitting the cap the last
    /// iterate is kept and the failure is reported to the caller.
    pub max_iterations: usize,
}

impl Default for RotationSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Body-frame angular velocity for a world-frame angular momentum and
/// orientation.
#[inline]
fn omega_body(q: &Quat, angular_momentum: &Vec3, consts: &MoleculeTypeConstants) -> Vec3 {
    let l_body = q.to_matrix().transpose() * angular_momentum;
    l_body.component_mul(&consts.inv_inertia)
}

impl RotationSolver {
    /// Solver with explicit tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations: max_iterations.max(1),
        }
    }

    /// First rotational stage: torque half-kick on the angular momentum,
    /// then the implicit midpoint orientation update over the full step.
    ///
    /// Every molecule is processed even when some solves hit the
    /// iteration cap; the first failure is reported after the pass and
    /// the capped molecules keep their last iterate.
    pub fn stage_one(
        &self,
        arena: &mut TypeArena,
        consts: &MoleculeTypeConstants,
        dt: f64,
        type_index: usize,
    ) -> Result<()> {
        if !consts.is_rigid_body() {
            return Ok(());
        }

        let mut first_failure = None;
        for m in 0..arena.n_molecules {
            let l_half = arena.angular_momentum[m] + arena.torque[m] * (0.5 * dt);
            let q = arena.orientation[m];

            let mut rate = q.kinematic_rate(&omega_body(&q, &l_half, consts));
            let mut converged = false;
            for _ in 0..self.max_iterations {
                let q_half = q.add(&rate.scale(0.5 * dt)).normalize();
                let next = q_half.kinematic_rate(&omega_body(&q_half, &l_half, consts));
                let residual = next.sub(&rate).norm();
                rate = next;
                if residual < self.tolerance {
                    converged = true;
                    break;
                }
            }
            if !converged && first_failure.is_none() {
                first_failure = Some(m);
            }

            arena.orientation[m] = q.add(&rate.scale(dt)).normalize();
            arena.angular_momentum[m] = l_half;
        }

        match first_failure {
            Some(molecule) => Err(MdkError::RotationNonConverged {
                type_index,
                molecule,
                max_iterations: self.max_iterations,
            }),
            None => Ok(()),
        }
    }

    /// Second rotational stage: the closing torque half-kick with the
    /// refreshed torques.
    pub fn stage_two(&self, arena: &mut TypeArena, consts: &MoleculeTypeConstants, dt: f64) {
        if !consts.is_rigid_body() {
            return;
        }
        for m in 0..arena.n_molecules {
            arena.angular_momentum[m] += arena.torque[m] * (0.5 * dt);
        }
    }
}

/// Rotational kinetic energy ½ Σ ω · L over all molecules of a type.
pub fn rotational_energy(arena: &TypeArena, consts: &MoleculeTypeConstants) -> f64 {
    if !consts.is_rigid_body() {
        return 0.0;
    }
    let mut energy = 0.0;
    for m in 0..arena.n_molecules {
        let omega = omega_body(&arena.orientation[m], &arena.angular_momentum[m], consts);
        let l_body = arena.orientation[m].to_matrix().transpose() * arena.angular_momentum[m];
        energy += 0.5 * omega.dot(&l_body);
    }
    energy
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spinning_top(inertia: Vec3, l: Vec3) -> (TypeArena, MoleculeTypeConstants) {
        let sites = vec![Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -0.5)];
        let consts = MoleculeTypeConstants::rigid(1.0, sites, inertia).unwrap();
        let mut arena = TypeArena::new(1, 3, 2).unwrap();
        arena.angular_momentum[0] = l;
        (arena, consts)
    }

    #[test]
    fn test_symmetric_top_constant_spin() {
        // symmetric inertia and spin about z: ω is constant, so after n
        // steps the orientation is a rotation by n·ω·dt about z
        let omega_z = 2.0;
        let (mut arena, consts) =
            spinning_top(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, omega_z));
        let solver = RotationSolver::default();
        let dt = 1e-3;
        let steps = 200;
        for _ in 0..steps {
            solver.stage_one(&mut arena, &consts, dt, 0).unwrap();
            solver.stage_two(&mut arena, &consts, dt);
        }
        let expected = Quat::from_axis_angle(
            &Vec3::new(0.0, 0.0, 1.0),
            omega_z * dt * steps as f64,
        );
        let q = arena.orientation[0];
        assert_relative_eq!(q.w, expected.w, epsilon = 1e-8);
        assert_relative_eq!(q.v.z, expected.v.z, epsilon = 1e-8);
    }

    #[test]
    fn test_orientation_stays_unit_norm() {
        let (mut arena, consts) =
            spinning_top(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.4, -1.1, 0.7));
        let solver = RotationSolver::default();
        for _ in 0..500 {
            solver.stage_one(&mut arena, &consts, 1e-3, 0).unwrap();
            solver.stage_two(&mut arena, &consts, 1e-3);
        }
        assert_relative_eq!(arena.orientation[0].norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_torque_free_energy_conserved() {
        // asymmetric free top: L (world) and the rotational energy are
        // both invariants of the exact dynamics
        let l = Vec3::new(0.3, 0.8, -0.5);
        let (mut arena, consts) = spinning_top(Vec3::new(1.0, 2.0, 4.0), l);
        let e0 = rotational_energy(&arena, &consts);
        let solver = RotationSolver::default();
        for _ in 0..1000 {
            solver.stage_one(&mut arena, &consts, 1e-3, 0).unwrap();
            solver.stage_two(&mut arena, &consts, 1e-3);
        }
        assert_relative_eq!(arena.angular_momentum[0].x, l.x, epsilon = 1e-12);
        let e1 = rotational_energy(&arena, &consts);
        assert_relative_eq!(e0, e1, epsilon = 1e-4);
    }

    #[test]
    fn test_torque_half_kicks() {
        let (mut arena, consts) = spinning_top(Vec3::new(1.0, 1.0, 1.0), Vec3::zeros());
        arena.torque[0] = Vec3::new(0.0, 0.0, 2.0);
        let solver = RotationSolver::default();
        let dt = 0.1;
        solver.stage_one(&mut arena, &consts, dt, 0).unwrap();
        assert_relative_eq!(arena.angular_momentum[0].z, 0.1);
        solver.stage_two(&mut arena, &consts, dt);
        assert_relative_eq!(arena.angular_momentum[0].z, 0.2);
    }

    #[test]
    fn test_iteration_cap_reports_molecule() {
        let (mut arena, consts) =
            spinning_top(Vec3::new(1.0, 2.0, 3.0), Vec3::new(5.0, -3.0, 2.0));
        // one iteration cannot converge a coupled solve at this spin
        let solver = RotationSolver::new(1e-16, 1);
        let err = solver.stage_one(&mut arena, &consts, 0.1, 3).unwrap_err();
        match err {
            MdkError::RotationNonConverged {
                type_index,
                molecule,
                max_iterations,
            } => {
                assert_eq!(type_index, 3);
                assert_eq!(molecule, 0);
                assert_eq!(max_iterations, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // the last iterate was still applied
        assert_relative_eq!(arena.orientation[0].norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_particles_untouched() {
        let consts = MoleculeTypeConstants::point(1.0);
        let mut arena = TypeArena::new(1, 3, 1).unwrap();
        let solver = RotationSolver::default();
        solver.stage_one(&mut arena, &consts, 0.1, 0).unwrap();
        assert_eq!(arena.orientation[0], Quat::identity());
    }
}
