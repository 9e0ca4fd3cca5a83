//! O(N²) interaction pass over unordered type pairs.
//!
//! Pair passes are read-only over site positions and accumulate into
//! separate force buffers, applied afterwards. That keeps same-type and
//! cross-type loops borrow-clean and lets the parallel path fold
//! thread-local buffers with identical arithmetic to the serial path.

use mdk_model::{ExecutionContext, MoleculeTypeConstants, SystemState, TypeArena};
use rayon::prelude::*;

use crate::pair::{PairKernel, PairParams, PairTable};

/// Separations below this squared distance are skipped rather than fed
/// to the r⁻¹² singularity.
const R2_FLOOR: f64 = 1e-20;

#[inline]
fn min_image(d: f64, extent: f64) -> f64 {
    d - extent * (d / extent).round()
}

/// Energy and force on site i for one site-site separation, or `None`
/// outside the cutoff. `si`/`sj` are base offsets of the site triples.
#[inline]
fn site_pair(
    world_i: &[f64],
    world_j: &[f64],
    si: usize,
    sj: usize,
    params: &PairParams,
    box_size: &[f64],
    periodic: bool,
) -> Option<(f64, [f64; 3])> {
    let mut d = [0.0; 3];
    let mut r2 = 0.0;
    for k in 0..3 {
        let mut dk = world_i[si + k] - world_j[sj + k];
        if periodic && k < box_size.len() {
            dk = min_image(dk, box_size[k]);
        }
        d[k] = dk;
        r2 += dk * dk;
    }
    if r2 >= params.r_cut * params.r_cut || r2 <= R2_FLOOR {
        return None;
    }
    let fr = params.force_over_r(r2);
    Some((params.energy(r2), [fr * d[0], fr * d[1], fr * d[2]]))
}

/// All pairs (a, b) with b > a for one molecule `a`, same type.
fn same_type_row(
    arena: &TypeArena,
    a: usize,
    params: &PairParams,
    box_size: &[f64],
    buf: &mut [f64],
) -> f64 {
    let periodic = params.kernel == PairKernel::LjPeriodic;
    let mut energy = 0.0;
    for b in a + 1..arena.n_molecules {
        for atom_a in 0..arena.n_atoms {
            for atom_b in 0..arena.n_atoms {
                let si = arena.site(a, atom_a, 0);
                let sj = arena.site(b, atom_b, 0);
                if let Some((e, f)) = site_pair(
                    &arena.site_world,
                    &arena.site_world,
                    si,
                    sj,
                    params,
                    box_size,
                    periodic,
                ) {
                    energy += e;
                    for k in 0..3 {
                        buf[si + k] += f[k];
                        buf[sj + k] -= f[k];
                    }
                }
            }
        }
    }
    energy
}

/// Molecule `a` of type i against every molecule of type j.
fn cross_type_row(
    arena_i: &TypeArena,
    arena_j: &TypeArena,
    a: usize,
    params: &PairParams,
    box_size: &[f64],
    buf_i: &mut [f64],
    buf_j: &mut [f64],
) -> f64 {
    let periodic = params.kernel == PairKernel::LjPeriodic;
    let mut energy = 0.0;
    for b in 0..arena_j.n_molecules {
        for atom_a in 0..arena_i.n_atoms {
            for atom_b in 0..arena_j.n_atoms {
                let si = arena_i.site(a, atom_a, 0);
                let sj = arena_j.site(b, atom_b, 0);
                if let Some((e, f)) = site_pair(
                    &arena_i.site_world,
                    &arena_j.site_world,
                    si,
                    sj,
                    params,
                    box_size,
                    periodic,
                ) {
                    energy += e;
                    for k in 0..3 {
                        buf_i[si + k] += f[k];
                        buf_j[sj + k] -= f[k];
                    }
                }
            }
        }
    }
    energy
}

fn same_type_pass(
    arena: &TypeArena,
    params: &PairParams,
    box_size: &[f64],
    exec: &ExecutionContext,
) -> (f64, Vec<f64>) {
    let len = arena.site_force.len();
    if exec.parallel {
        (0..arena.n_molecules)
            .into_par_iter()
            .fold(
                || (0.0, vec![0.0; len]),
                |(mut energy, mut buf), a| {
                    energy += same_type_row(arena, a, params, box_size, &mut buf);
                    (energy, buf)
                },
            )
            .reduce(
                || (0.0, vec![0.0; len]),
                |(ea, mut ba), (eb, bb)| {
                    for (dst, src) in ba.iter_mut().zip(&bb) {
                        *dst += src;
                    }
                    (ea + eb, ba)
                },
            )
    } else {
        let mut buf = vec![0.0; len];
        let mut energy = 0.0;
        for a in 0..arena.n_molecules {
            energy += same_type_row(arena, a, params, box_size, &mut buf);
        }
        (energy, buf)
    }
}

fn cross_type_pass(
    arena_i: &TypeArena,
    arena_j: &TypeArena,
    params: &PairParams,
    box_size: &[f64],
    exec: &ExecutionContext,
) -> (f64, Vec<f64>, Vec<f64>) {
    let len_i = arena_i.site_force.len();
    let len_j = arena_j.site_force.len();
    if exec.parallel {
        (0..arena_i.n_molecules)
            .into_par_iter()
            .fold(
                || (0.0, vec![0.0; len_i], vec![0.0; len_j]),
                |(mut energy, mut bi, mut bj), a| {
                    energy +=
                        cross_type_row(arena_i, arena_j, a, params, box_size, &mut bi, &mut bj);
                    (energy, bi, bj)
                },
            )
            .reduce(
                || (0.0, vec![0.0; len_i], vec![0.0; len_j]),
                |(ea, mut bia, mut bja), (eb, bib, bjb)| {
                    for (dst, src) in bia.iter_mut().zip(&bib) {
                        *dst += src;
                    }
                    for (dst, src) in bja.iter_mut().zip(&bjb) {
                        *dst += src;
                    }
                    (ea + eb, bia, bja)
                },
            )
    } else {
        let mut bi = vec![0.0; len_i];
        let mut bj = vec![0.0; len_j];
        let mut energy = 0.0;
        for a in 0..arena_i.n_molecules {
            energy += cross_type_row(arena_i, arena_j, a, params, box_size, &mut bi, &mut bj);
        }
        (energy, bi, bj)
    }
}

fn apply_forces(target: &mut [f64], buf: &[f64]) {
    for (dst, src) in target.iter_mut().zip(buf) {
        *dst += src;
    }
}

/// One full interaction pass: reset accumulators, run every non-free
/// type pair, add tail corrections, reduce site forces to COM
/// accelerations and torques. Site positions must be in sync with the
/// current orientations before the call.
pub fn compute_interactions(
    arenas: &mut [TypeArena],
    types: &[MoleculeTypeConstants],
    table: &PairTable,
    state: &mut SystemState,
    box_size: &[f64],
    exec: &ExecutionContext,
) {
    for arena in arenas.iter_mut() {
        arena.reset_accumulators();
    }
    state.energy_potential = 0.0;

    let n_types = arenas.len();
    for ti in 0..n_types {
        for tj in ti..n_types {
            let params = table.get(ti, tj);
            if params.kernel == PairKernel::Free {
                continue;
            }
            if ti == tj {
                let (energy, buf) = same_type_pass(&arenas[ti], params, box_size, exec);
                apply_forces(&mut arenas[ti].site_force, &buf);
                state.energy_potential += energy + params.tail_energy;
            } else {
                let (left, right) = arenas.split_at_mut(tj);
                let (energy, buf_i, buf_j) =
                    cross_type_pass(&left[ti], &right[0], params, box_size, exec);
                apply_forces(&mut left[ti].site_force, &buf_i);
                apply_forces(&mut right[0].site_force, &buf_j);
                state.energy_potential += energy + params.tail_energy;
            }
        }
    }

    for (arena, consts) in arenas.iter_mut().zip(types) {
        arena.reduce_site_forces(consts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mdk_model::MoleculeTypeConstants;

    fn two_points(x0: f64, x1: f64) -> (Vec<TypeArena>, Vec<MoleculeTypeConstants>) {
        let consts = MoleculeTypeConstants::point(1.0);
        let mut arena = TypeArena::new(2, 3, 1).unwrap();
        arena.position[0] = x0;
        arena.position[3] = x1;
        arena.refresh_rotation();
        arena.sync_sites(&consts);
        (vec![arena], vec![consts])
    }

    fn lj(kernel: PairKernel, volume: f64) -> PairTable {
        let mut table = PairTable::new(1);
        let params =
            PairParams::lennard_jones(kernel, 1.0, 1.0, 2.5, volume, 2, 2, 3, true).unwrap();
        table.set(0, 0, params);
        table
    }

    #[test]
    fn test_newton_third_law() {
        let (mut arenas, types) = two_points(0.0, 1.2);
        let table = lj(PairKernel::LjBox, 1000.0);
        let mut state = SystemState::new(1, 2);
        compute_interactions(
            &mut arenas,
            &types,
            &table,
            &mut state,
            &[10.0, 10.0, 10.0],
            &ExecutionContext::serial(),
        );
        let a = &arenas[0];
        for k in 0..3 {
            assert_relative_eq!(
                a.acceleration[a.com(0, k)],
                -a.acceleration[a.com(1, k)],
                epsilon = 1e-12
            );
        }
        // attractive beyond the minimum: particle 0 pulled toward +x
        assert!(a.acceleration[0] > 0.0);
    }

    #[test]
    fn test_potential_matches_kernel() {
        let (mut arenas, types) = two_points(0.0, 1.5);
        let table = lj(PairKernel::LjBox, 1000.0);
        let params = *table.get(0, 0);
        let mut state = SystemState::new(1, 2);
        compute_interactions(
            &mut arenas,
            &types,
            &table,
            &mut state,
            &[10.0, 10.0, 10.0],
            &ExecutionContext::serial(),
        );
        assert_relative_eq!(
            state.energy_potential,
            params.energy(1.5 * 1.5) + params.tail_energy,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_minimum_image_wraps_separation() {
        // 0.5 and 9.5 in a 10-box are 1.0 apart through the boundary
        let (mut arenas, types) = two_points(0.5, 9.5);
        let table = lj(PairKernel::LjPeriodic, 1000.0);
        let params = *table.get(0, 0);
        let mut state = SystemState::new(1, 2);
        compute_interactions(
            &mut arenas,
            &types,
            &table,
            &mut state,
            &[10.0, 10.0, 10.0],
            &ExecutionContext::serial(),
        );
        assert_relative_eq!(
            state.energy_potential,
            params.energy(1.0) + params.tail_energy,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_free_kernel_is_inert() {
        let (mut arenas, types) = two_points(0.0, 1.0);
        let table = PairTable::new(1);
        let mut state = SystemState::new(1, 2);
        state.energy_potential = 7.0;
        compute_interactions(
            &mut arenas,
            &types,
            &table,
            &mut state,
            &[10.0, 10.0, 10.0],
            &ExecutionContext::serial(),
        );
        assert_eq!(state.energy_potential, 0.0);
        assert!(arenas[0].acceleration.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let consts = MoleculeTypeConstants::point(1.0);
        let mut arena = TypeArena::new(8, 3, 1).unwrap();
        for m in 0..8 {
            let i0 = arena.com(m, 0);
            let i1 = arena.com(m, 1);
            arena.position[i0] = 1.3 * m as f64;
            arena.position[i1] = 0.7 * (m % 3) as f64;
        }
        arena.refresh_rotation();
        arena.sync_sites(&consts);
        let types = vec![consts];
        let table = {
            let mut t = PairTable::new(1);
            t.set(
                0,
                0,
                PairParams::lennard_jones(
                    PairKernel::LjPeriodic,
                    1.0,
                    1.0,
                    2.5,
                    1000.0,
                    8,
                    8,
                    3,
                    true,
                )
                .unwrap(),
            );
            t
        };
        let box_size = [12.0, 12.0, 12.0];

        let mut serial = vec![arena.clone()];
        let mut serial_state = SystemState::new(1, 8);
        compute_interactions(
            &mut serial,
            &types,
            &table,
            &mut serial_state,
            &box_size,
            &ExecutionContext::serial(),
        );

        let mut parallel = vec![arena];
        let mut parallel_state = SystemState::new(1, 8);
        compute_interactions(
            &mut parallel,
            &types,
            &table,
            &mut parallel_state,
            &box_size,
            &ExecutionContext::parallel(2),
        );

        assert_relative_eq!(
            serial_state.energy_potential,
            parallel_state.energy_potential,
            epsilon = 1e-9
        );
        for (s, p) in serial[0]
            .acceleration
            .iter()
            .zip(&parallel[0].acceleration)
        {
            assert_relative_eq!(s, p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cross_type_forces_balance() {
        let ca = MoleculeTypeConstants::point(1.0);
        let cb = MoleculeTypeConstants::point(2.0);
        let mut aa = TypeArena::new(1, 3, 1).unwrap();
        let mut ab = TypeArena::new(1, 3, 1).unwrap();
        ab.position[0] = 1.1;
        aa.refresh_rotation();
        aa.sync_sites(&ca);
        ab.refresh_rotation();
        ab.sync_sites(&cb);
        let mut table = PairTable::new(2);
        table.set(
            0,
            1,
            PairParams::lennard_jones(
                PairKernel::LjBox,
                1.0,
                1.0,
                2.5,
                1000.0,
                1,
                1,
                3,
                false,
            )
            .unwrap(),
        );
        let mut arenas = vec![aa, ab];
        let mut state = SystemState::new(2, 2);
        compute_interactions(
            &mut arenas,
            &[ca, cb],
            &table,
            &mut state,
            &[10.0, 10.0, 10.0],
            &ExecutionContext::serial(),
        );
        // F_a = -F_b, so m_a * acc_a = -m_b * acc_b
        assert_relative_eq!(
            1.0 * arenas[0].acceleration[0],
            -2.0 * arenas[1].acceleration[0],
            epsilon = 1e-12
        );
    }
}
