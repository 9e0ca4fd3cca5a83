//! Data model for the mdk molecular dynamics engine.
//!
//! Holds the typed configuration parsed from the flat scalar input list,
//! physical constants, the per-type state arenas (contiguous flat storage
//! sized exactly at construction), immutable per-type molecule constants,
//! and the splittable random-number streams used by the stochastic parts
//! of the engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod molecule;
pub mod rng;
pub mod state;

pub use config::{Boundary, ExecutionContext, InputParams};
pub use constants::Constants;
pub use error::{MdkError, Result};
pub use molecule::MoleculeTypeConstants;
pub use rng::StreamSplitter;
pub use state::{SystemState, TypeArena};
