//! Time integration for the mdk molecular dynamics engine.
//!
//! Translation uses velocity Verlet split into two half-kick stages
//! around the interaction pass. Rigid-body rotation uses a quaternion
//! leapfrog with an implicit midpoint solve for the orientation, bounded
//! by an iteration cap.

pub mod rotate;
pub mod translate;

pub use rotate::{rotational_energy, RotationSolver};
pub use translate::{translate_stage_one, translate_stage_two};
