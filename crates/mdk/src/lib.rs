//! mdk — molecular dynamics kernel.
//!
//! This is the umbrella crate that provides the `Simulation` driver and
//! re-exports core types from sub-crates.

pub use mdk_dynamics::{self, RotationSolver};
pub use mdk_force::{self, PairKernel, PairParams, PairTable};
pub use mdk_math::{self, Mat3, Quat, Vec3};
pub use mdk_model::{
    self, Boundary, Constants, ExecutionContext, InputParams, MdkError, MoleculeTypeConstants,
    Result, StreamSplitter, SystemState, TypeArena,
};
pub use mdk_thermostat::{self, Thermostat, ThermostatKind};

pub mod correlate;
pub mod init;
pub mod simulation;
pub mod trajectory;

pub use correlate::VelocityCorrelation;
pub use simulation::Simulation;
pub use trajectory::TrajectoryRecorder;
