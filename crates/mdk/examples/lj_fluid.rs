//! Lennard-Jones fluid in reduced units with a rescale thermostat.

use mdk::{Constants, Simulation, ThermostatKind, TrajectoryRecorder};

fn main() -> mdk::Result<()> {
    // Reduced units: ε = σ = m = k_B = 1
    let density = 0.05;
    let n = 64;
    let side = (n as f64 / density).powf(1.0 / 3.0);
    let dt = 0.002;
    let runtime = 4.0;
    let temperature = 1.2;

    let input = format!("1,3,{n},{dt},{runtime},0,1.0,{temperature},1,{side},{side},{side}");
    let mut sim = Simulation::from_input(&input, Constants::reduced(), 2024)?;
    sim.set_lennard_jones(0, 0, 1.0, 1.0, None)?;
    sim.set_thermostat(0, ThermostatKind::Rescale, 0.1)?;
    sim.initialize()?;

    println!(
        "{n} LJ particles, box {side:.2}^3, T* = {temperature}, dt = {dt}"
    );
    println!(
        "{:>8} {:>12} {:>12} {:>12} {:>10}",
        "step", "E_total", "E_pot", "E_kin", "T"
    );

    let mut recorder = TrajectoryRecorder::new();
    let report_every = 200;
    for step in 0..sim.params().n_steps() {
        sim.step()?;
        if step % report_every == 0 {
            let state = sim.state();
            recorder.record(state, sim.arenas());
            println!(
                "{:>8} {:>12.5} {:>12.5} {:>12.5} {:>10.4}",
                state.step,
                state.energy_total,
                state.energy_potential,
                state.energy_kinetic[0],
                state.temperature[0]
            );
        }
    }

    println!(
        "\nrecorded {} frames; final v(t)·v(0) correlation {:.4}",
        recorder.len(),
        sim.correlation().global.last().copied().unwrap_or(0.0)
    );
    Ok(())
}
