//! Translational velocity-Verlet stages.
//!
//! Stage one advances positions with the current accelerations, applies
//! the boundary condition and does the first velocity half-kick. Stage
//! two, run after the interaction pass refreshed the accelerations, does
//! the second half-kick and hands back the squared-velocity sum for the
//! kinetic-energy update.

use mdk_model::{Boundary, ExecutionContext, TypeArena};
use rayon::prelude::*;

/// Position update, boundary handling and first half-kick for one
/// molecule. `pos`, `vel` and `acc` are that molecule's COM slices.
#[inline]
fn advance_molecule(
    pos: &mut [f64],
    vel: &mut [f64],
    acc: &[f64],
    dt: f64,
    boundary: Boundary,
    box_size: &[f64],
) {
    for k in 0..pos.len() {
        let mut x = pos[k] + vel[k] * dt + 0.5 * acc[k] * dt * dt;
        let extent = box_size[k];
        match boundary {
            Boundary::Periodic => {
                x -= extent * (x / extent).floor();
            }
            Boundary::Reflective => {
                // Fold through mirror images with period 2L: the odd
                // half-period is a bounced trajectory, so the velocity
                // flips there.
                let period = 2.0 * extent;
                let mut folded = x - period * (x / period).floor();
                if folded > extent {
                    folded = period - folded;
                    vel[k] = -vel[k];
                }
                x = folded;
            }
        }
        pos[k] = x;
        vel[k] += 0.5 * acc[k] * dt;
    }
}

/// First velocity-Verlet stage over every molecule of one type.
pub fn translate_stage_one(
    arena: &mut TypeArena,
    dt: f64,
    boundary: Boundary,
    box_size: &[f64],
    exec: &ExecutionContext,
) {
    let stride = arena.n_dimensions;
    if exec.parallel {
        arena
            .position
            .par_chunks_mut(stride)
            .zip(arena.velocity.par_chunks_mut(stride))
            .zip(arena.acceleration.par_chunks(stride))
            .for_each(|((pos, vel), acc)| {
                advance_molecule(pos, vel, acc, dt, boundary, box_size)
            });
    } else {
        for ((pos, vel), acc) in arena
            .position
            .chunks_mut(stride)
            .zip(arena.velocity.chunks_mut(stride))
            .zip(arena.acceleration.chunks(stride))
        {
            advance_molecule(pos, vel, acc, dt, boundary, box_size);
        }
    }
}

/// Second half-kick with the refreshed accelerations. Returns the
/// squared-velocity sum over all molecules of the type.
pub fn translate_stage_two(arena: &mut TypeArena, dt: f64, exec: &ExecutionContext) -> f64 {
    if exec.parallel {
        arena
            .velocity
            .par_iter_mut()
            .zip(arena.acceleration.par_iter())
            .map(|(v, a)| {
                *v += 0.5 * a * dt;
                *v * *v
            })
            .sum()
    } else {
        arena
            .velocity
            .iter_mut()
            .zip(arena.acceleration.iter())
            .map(|(v, a)| {
                *v += 0.5 * a * dt;
                *v * *v
            })
            .sum()
    }
}
