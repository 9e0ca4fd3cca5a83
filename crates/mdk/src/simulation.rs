//! The simulation aggregate and per-step protocol.
//!
//! `Simulation` owns every subsystem by explicit composition: typed
//! configuration, per-type constants and state arenas, the pair table,
//! thermostats, correlation buffers and the splittable RNG streams. The
//! step protocol is fixed: translational stage one, rotational stage one,
//! rotation-matrix and site refresh, interaction pass, translational
//! stage two, rotational stage two, thermostats, correlation sample.

use mdk_dynamics::{
    rotational_energy, translate_stage_one, translate_stage_two, RotationSolver,
};
use mdk_force::{compute_interactions, PairKernel, PairParams, PairTable};
use mdk_model::config::CUTOFF_RATIO_LJ;
use mdk_model::{
    Boundary, Constants, ExecutionContext, InputParams, MdkError, MoleculeTypeConstants, Result,
    StreamSplitter, SystemState, TypeArena,
};
use mdk_thermostat::{Thermostat, ThermostatKind};

use crate::correlate::VelocityCorrelation;
use crate::init;

/// Owner of all simulation state; advances it one timestep at a time.
pub struct Simulation {
    params: InputParams,
    constants: Constants,
    exec: ExecutionContext,
    streams: StreamSplitter,
    types: Vec<MoleculeTypeConstants>,
    arenas: Vec<TypeArena>,
    state: SystemState,
    pair_table: PairTable,
    thermostats: Vec<Thermostat>,
    correlation: VelocityCorrelation,
    rotation_solver: RotationSolver,
    initialized: bool,
}

impl Simulation {
    /// Build a simulation of point particles from validated parameters.
    /// All type pairs start non-interacting and all thermostats off;
    /// configure them before `initialize`.
    pub fn new(params: InputParams, constants: Constants, seed: u64) -> Result<Self> {
        params.validate()?;
        let exec = params.execution_context();
        let n_types = params.n_types;

        let types: Vec<MoleculeTypeConstants> = params
            .mass
            .iter()
            .map(|&m| MoleculeTypeConstants::point(m))
            .collect();
        let arenas = params
            .n_molecules
            .iter()
            .map(|&n| TypeArena::new(n, params.n_dimensions, 1))
            .collect::<Result<Vec<_>>>()?;

        let state = SystemState::new(n_types, params.total_molecules());
        let correlation = VelocityCorrelation::new(n_types, params.n_steps());

        Ok(Self {
            pair_table: PairTable::new(n_types),
            thermostats: vec![Thermostat::None; n_types],
            streams: StreamSplitter::new(seed),
            rotation_solver: RotationSolver::default(),
            initialized: false,
            params,
            constants,
            exec,
            types,
            arenas,
            state,
            correlation,
        })
    }

    /// Parse the flat scalar input list and build the simulation.
    pub fn from_input(input: &str, constants: Constants, seed: u64) -> Result<Self> {
        Self::new(InputParams::parse(input)?, constants, seed)
    }

    /// Replace a type's point-particle constants with rigid-molecule
    /// constants, reallocating its arena for the site count. Must be
    /// called before `initialize`.
    pub fn set_molecule_type(
        &mut self,
        type_index: usize,
        consts: MoleculeTypeConstants,
    ) -> Result<()> {
        if type_index >= self.params.n_types {
            return Err(MdkError::Config(format!(
                "type index {type_index} out of range"
            )));
        }
        self.arenas[type_index] = TypeArena::new(
            self.params.n_molecules[type_index],
            self.params.n_dimensions,
            consts.n_atoms,
        )?;
        self.types[type_index] = consts;
        Ok(())
    }

    /// Configure a Lennard-Jones interaction for the unordered type pair
    /// (i, j). The kernel follows the boundary condition; `r_cut`
    /// defaults to 2.5σ. Under periodic boundaries the cutoff must not
    /// exceed half the box length in any dimension.
    pub fn set_lennard_jones(
        &mut self,
        i: usize,
        j: usize,
        epsilon: f64,
        sigma: f64,
        r_cut: Option<f64>,
    ) -> Result<()> {
        if i >= self.params.n_types || j >= self.params.n_types {
            return Err(MdkError::Config(format!(
                "pair ({i}, {j}) out of range for {} types",
                self.params.n_types
            )));
        }
        let kernel = match self.params.boundary {
            Boundary::Periodic => PairKernel::LjPeriodic,
            Boundary::Reflective => PairKernel::LjBox,
        };
        let params = PairParams::lennard_jones(
            kernel,
            epsilon,
            sigma,
            r_cut.unwrap_or(CUTOFF_RATIO_LJ * sigma),
            self.params.volume(),
            self.params.n_molecules[i],
            self.params.n_molecules[j],
            self.params.n_dimensions,
            i == j,
        )?;
        self.pair_table.set(i, j, params);
        Ok(())
    }

    /// Configure the thermostat for one type. `parameter` is the
    /// collision rate ν for Andersen and the relaxation time τ for the
    /// rescale thermostat; it is ignored for `None`.
    pub fn set_thermostat(
        &mut self,
        type_index: usize,
        kind: ThermostatKind,
        parameter: f64,
    ) -> Result<()> {
        if type_index >= self.params.n_types {
            return Err(MdkError::Config(format!(
                "type index {type_index} out of range"
            )));
        }
        let temperature = self.params.temperature_required[type_index];
        self.thermostats[type_index] = match kind {
            ThermostatKind::None => Thermostat::None,
            ThermostatKind::Andersen => Thermostat::andersen(
                parameter,
                self.constants.k_b,
                temperature,
                self.params.mass[type_index],
            )?,
            ThermostatKind::Rescale => Thermostat::rescale(
                parameter,
                self.params.timestep,
                self.constants.k_b,
                temperature,
            )?,
        };
        Ok(())
    }

    /// Override the rotational solver's tolerance and iteration cap.
    pub fn set_rotation_solver(&mut self, solver: RotationSolver) {
        self.rotation_solver = solver;
    }

    /// Randomize positions and velocities to the configured targets, run
    /// the first interaction pass and snapshot the correlation buffers.
    /// Must run once before stepping.
    pub fn initialize(&mut self) -> Result<()> {
        for (t, (arena, consts)) in self.arenas.iter_mut().zip(&self.types).enumerate() {
            let mut rng = self.streams.stream(0, t, 0);
            init::randomize(
                arena,
                consts,
                self.params.temperature_required[t],
                self.constants.k_b,
                &self.params.box_size,
                &mut rng,
            );
            arena.refresh_rotation();
            arena.sync_sites(consts);
        }

        compute_interactions(
            &mut self.arenas,
            &self.types,
            &self.pair_table,
            &mut self.state,
            &self.params.box_size,
            &self.exec,
        );
        self.update_energies();
        self.correlation.init(&self.arenas)?;
        self.initialized = true;

        log::debug!(
            "initialized {} molecules of {} types, {} steps at dt {}",
            self.state.total_molecules,
            self.params.n_types,
            self.params.n_steps(),
            self.params.timestep
        );
        Ok(())
    }

    /// Advance the simulation by one timestep.
    ///
    /// A rotational solve that hits its iteration cap keeps the last
    /// iterate; the condition is logged and the step continues.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.params.timestep;
        let completing = self.state.step + 1;

        for (t, arena) in self.arenas.iter_mut().enumerate() {
            translate_stage_one(
                arena,
                dt,
                self.params.boundary,
                &self.params.box_size,
                &self.exec,
            );
            if let Err(err) = self.rotation_solver.stage_one(arena, &self.types[t], dt, t) {
                log::warn!("step {completing}: {err}; keeping last iterate");
            }
            arena.refresh_rotation();
            arena.sync_sites(&self.types[t]);
        }

        compute_interactions(
            &mut self.arenas,
            &self.types,
            &self.pair_table,
            &mut self.state,
            &self.params.box_size,
            &self.exec,
        );

        for (t, arena) in self.arenas.iter_mut().enumerate() {
            let v2 = translate_stage_two(arena, dt, &self.exec);
            self.rotation_solver.stage_two(arena, &self.types[t], dt);
            let kinetic = 0.5 * self.params.mass[t] * v2;
            self.thermostats[t].apply(
                arena,
                dt,
                kinetic,
                &self.streams,
                completing,
                t,
                &self.exec,
            )?;
        }

        self.update_energies();
        self.correlation.sample(&self.arenas, completing);
        self.state.time += dt;
        self.state.step = completing;
        Ok(())
    }

    /// Run the full configured number of steps, initializing first if
    /// needed.
    pub fn run(&mut self) -> Result<()> {
        if !self.initialized {
            self.initialize()?;
        }
        for _ in 0..self.params.n_steps() {
            self.step()?;
        }
        Ok(())
    }

    /// Recompute per-type kinetic energy and temperature from the current
    /// velocities, and the total energy from them plus the potential.
    fn update_energies(&mut self) {
        let mut total = self.state.energy_potential;
        for (t, (arena, consts)) in self.arenas.iter().zip(&self.types).enumerate() {
            let mass = self.params.mass[t];
            let v2 = arena.velocity_square_sum();
            let dof = (arena.n_molecules * arena.n_dimensions) as f64;
            self.state.energy_kinetic[t] = 0.5 * mass * v2;
            self.state.temperature[t] = mass * v2 / (dof * self.constants.k_b);
            total += self.state.energy_kinetic[t] + rotational_energy(arena, consts);
        }
        self.state.energy_total = total;
    }

    /// Translational kinetic energy of one type.
    pub fn trans_ke(&self, type_index: usize) -> f64 {
        0.5 * self.params.mass[type_index] * self.arenas[type_index].velocity_square_sum()
    }

    /// The aggregate per-step observables.
    pub fn state(&self) -> &SystemState {
        &self.state
    }

    /// The per-type state arenas.
    pub fn arenas(&self) -> &[TypeArena] {
        &self.arenas
    }

    /// Mutable access to the state arenas, for custom initial conditions.
    pub fn arenas_mut(&mut self) -> &mut [TypeArena] {
        &mut self.arenas
    }

    /// The correlation buffers.
    pub fn correlation(&self) -> &VelocityCorrelation {
        &self.correlation
    }

    /// The typed configuration.
    pub fn params(&self) -> &InputParams {
        &self.params
    }

    /// The per-type molecule constants.
    pub fn types(&self) -> &[MoleculeTypeConstants] {
        &self.types
    }

    /// The derived interaction parameter table.
    pub fn pair_table(&self) -> &PairTable {
        &self.pair_table
    }
}
