//! Physical constants, supplied to the engine as configuration values.

use serde::{Deserialize, Serialize};

/// Boltzmann's constant in SI units (J/K).
pub const BOLTZ_SI: f64 = 1.380_648_5e-23;

/// Planck's constant in SI units (J·s).
pub const PLANCK_SI: f64 = 6.626_070_04e-34;

/// Avogadro's number (1/mol).
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Constants of nature used by the kernels. Carried as a value so that
/// simulations can run in SI or reduced units without touching the
/// integrators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Constants {
    /// Boltzmann's constant in the simulation's unit system.
    pub k_b: f64,
}

impl Constants {
    /// SI units.
    pub fn si() -> Self {
        Self { k_b: BOLTZ_SI }
    }

    /// Reduced (Lennard-Jones) units: k_B = 1.
    pub fn reduced() -> Self {
        Self { k_b: 1.0 }
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::si()
    }
}
