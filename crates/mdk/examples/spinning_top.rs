//! Torque-free asymmetric top: angular momentum and rotational energy
//! are invariants the rotational leapfrog should preserve.

use mdk::mdk_dynamics::{rotational_energy, RotationSolver};
use mdk::{MoleculeTypeConstants, TypeArena, Vec3};

fn main() -> mdk::Result<()> {
    let sites = vec![Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -0.5)];
    let consts = MoleculeTypeConstants::rigid(1.0, sites, Vec3::new(1.0, 2.0, 4.0))?;

    let mut arena = TypeArena::new(1, 3, consts.n_atoms)?;
    arena.angular_momentum[0] = Vec3::new(0.3, 1.0, -0.6);
    let e0 = rotational_energy(&arena, &consts);
    let l0 = arena.angular_momentum[0].norm();

    let solver = RotationSolver::default();
    let dt = 1e-3;
    println!("{:>8} {:>12} {:>12} {:>12}", "step", "|q|", "|L|", "E_rot");
    for step in 1..=5000u32 {
        solver.stage_one(&mut arena, &consts, dt, 0)?;
        solver.stage_two(&mut arena, &consts, dt);
        if step % 1000 == 0 {
            println!(
                "{:>8} {:>12.9} {:>12.9} {:>12.9}",
                step,
                arena.orientation[0].norm(),
                arena.angular_momentum[0].norm(),
                rotational_energy(&arena, &consts)
            );
        }
    }

    let e = rotational_energy(&arena, &consts);
    println!(
        "\ndrift: |L| {:.2e}, E_rot {:.2e}",
        (arena.angular_momentum[0].norm() - l0).abs(),
        (e - e0).abs()
    );
    Ok(())
}
