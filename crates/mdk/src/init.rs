//! Initial-condition generation.
//!
//! Positions are drawn uniformly inside the box. Velocities start from a
//! centered uniform draw, are shifted to zero net momentum per type, and
//! are rescaled so the instantaneous temperature matches the target. The
//! draws come from a seeded stream, so setup is reproducible.

use mdk_model::{MoleculeTypeConstants, TypeArena};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Randomize one type's positions and velocities in place.
pub fn randomize<R: Rng>(
    arena: &mut TypeArena,
    consts: &MoleculeTypeConstants,
    target_temperature: f64,
    k_b: f64,
    box_size: &[f64],
    rng: &mut R,
) {
    let centered = Uniform::new(-0.5, 0.5);
    for m in 0..arena.n_molecules {
        for k in 0..arena.n_dimensions {
            let along = Uniform::new(0.0, box_size[k]);
            let idx = arena.com(m, k);
            arena.position[idx] = along.sample(rng);
            arena.velocity[idx] = centered.sample(rng);
        }
    }

    // remove net momentum per axis
    let n = arena.n_molecules as f64;
    for k in 0..arena.n_dimensions {
        let mean: f64 = (0..arena.n_molecules)
            .map(|m| arena.velocity[arena.com(m, k)])
            .sum::<f64>()
            / n;
        for m in 0..arena.n_molecules {
            let idx = arena.com(m, k);
            arena.velocity[idx] -= mean;
        }
    }

    // rescale to the target temperature
    let v2 = arena.velocity_square_sum();
    if v2 > 0.0 && target_temperature > 0.0 {
        let dof = (arena.n_molecules * arena.n_dimensions) as f64;
        let current = consts.mass * v2 / (dof * k_b);
        let scale = (target_temperature / current).sqrt();
        for v in &mut arena.velocity {
            *v *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_randomize_contract() {
        let consts = MoleculeTypeConstants::point(2.0);
        let mut arena = TypeArena::new(50, 3, 1).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        randomize(&mut arena, &consts, 1.5, 1.0, &[10.0, 10.0, 10.0], &mut rng);

        // positions inside the box
        for m in 0..50 {
            for k in 0..3 {
                let x = arena.position[arena.com(m, k)];
                assert!((0.0..10.0).contains(&x));
            }
        }
        // zero net momentum
        for p in arena.momentum(2.0) {
            assert_relative_eq!(p, 0.0, epsilon = 1e-10);
        }
        // instantaneous temperature matches the target
        let temp = 2.0 * arena.velocity_square_sum() / (50.0 * 3.0);
        assert_relative_eq!(temp, 1.5, epsilon = 1e-10);
    }

    #[test]
    fn test_randomize_is_reproducible() {
        let consts = MoleculeTypeConstants::point(1.0);
        let mut a = TypeArena::new(10, 2, 1).unwrap();
        let mut b = TypeArena::new(10, 2, 1).unwrap();
        let mut rng_a = rand::rngs::StdRng::seed_from_u64(3);
        let mut rng_b = rand::rngs::StdRng::seed_from_u64(3);
        randomize(&mut a, &consts, 1.0, 1.0, &[5.0, 5.0], &mut rng_a);
        randomize(&mut b, &consts, 1.0, 1.0, &[5.0, 5.0], &mut rng_b);
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}
