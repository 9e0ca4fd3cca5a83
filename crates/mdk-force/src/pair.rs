//! Pair potential kernels and their precomputed parameter blocks.

use mdk_model::{MdkError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Potential kernel selector for a type pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairKernel {
    /// Non-interacting (ideal gas): zero force, zero energy.
    Free,
    /// Lennard-Jones with minimum-image periodic distances.
    LjPeriodic,
    /// Lennard-Jones with plain distances inside a reflective box.
    LjBox,
}

impl FromStr for PairKernel {
    type Err = MdkError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "free" => Ok(Self::Free),
            "lj-periodic" => Ok(Self::LjPeriodic),
            "lj-box" => Ok(Self::LjBox),
            other => Err(MdkError::UnknownKernel(other.to_string())),
        }
    }
}

/// Surface area of the unit (n−1)-sphere embedded in n dimensions:
/// 2 points in 1D, 2π in 2D, 4π in 3D.
pub fn unit_sphere_surface(n_dimensions: usize) -> f64 {
    match n_dimensions {
        1 => 2.0,
        2 => 2.0 * std::f64::consts::PI,
        _ => 4.0 * std::f64::consts::PI,
    }
}

/// Radial tail integral ∫_{r_c}^∞ u_LJ(r) r^{n−1} dr in closed form.
/// Converges for n < 6.
pub fn lj_tail_integral(epsilon: f64, sigma: f64, r_cut: f64, n_dimensions: usize) -> f64 {
    let n = n_dimensions as f64;
    let s6 = sigma.powi(6);
    let s12 = s6 * s6;
    4.0 * epsilon
        * (s12 * r_cut.powf(n - 12.0) / (12.0 - n) - s6 * r_cut.powf(n - 6.0) / (6.0 - n))
}

/// Precomputed parameters for one unordered type pair. Derived once at
/// setup; interactions are undefined before derivation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PairParams {
    /// Kernel tag.
    pub kernel: PairKernel,
    /// Well depth ε.
    pub epsilon: f64,
    /// Zero-crossing distance σ.
    pub sigma: f64,
    /// Cutoff radius. Under periodic boundaries it must not exceed half
    /// the box length in any dimension; that is a caller precondition,
    /// not a runtime check.
    pub r_cut: f64,
    /// Truncation shift U(r_cut), subtracted so the potential is
    /// continuous at the cutoff.
    pub shift: f64,
    /// Precomputed σ⁶, shared by the energy and force evaluations.
    pub sigma6: f64,
    /// Analytic long-range correction, added once per type pair per
    /// interaction pass.
    pub tail_energy: f64,
}

impl PairParams {
    /// The no-op kernel.
    pub fn free() -> Self {
        Self {
            kernel: PairKernel::Free,
            epsilon: 0.0,
            sigma: 0.0,
            r_cut: 0.0,
            shift: 0.0,
            sigma6: 0.0,
            tail_energy: 0.0,
        }
    }

    /// Derive Lennard-Jones parameters from ε, σ and the system
    /// geometry. `n_i`/`n_j` are the particle counts of the two types;
    /// `same_type` halves the tail's N² density to count each unordered
    /// pair once.
    #[allow(clippy::too_many_arguments)]
    pub fn lennard_jones(
        kernel: PairKernel,
        epsilon: f64,
        sigma: f64,
        r_cut: f64,
        volume: f64,
        n_i: usize,
        n_j: usize,
        n_dimensions: usize,
        same_type: bool,
    ) -> Result<Self> {
        if epsilon <= 0.0 || sigma <= 0.0 || r_cut <= 0.0 {
            return Err(MdkError::Config(
                "Lennard-Jones parameters must be positive".into(),
            ));
        }
        let sigma6 = sigma.powi(6);
        let sc6 = sigma6 / r_cut.powi(6);
        let shift = 4.0 * epsilon * sc6 * (sc6 - 1.0);

        let pairs = n_i as f64 * n_j as f64 * if same_type { 0.5 } else { 1.0 };
        let tail_energy = pairs / volume
            * unit_sphere_surface(n_dimensions)
            * lj_tail_integral(epsilon, sigma, r_cut, n_dimensions);

        Ok(Self {
            kernel,
            epsilon,
            sigma,
            r_cut,
            shift,
            sigma6,
            tail_energy,
        })
    }

    /// Truncated-shifted potential U(r) − U(r_cut), valid for r ≤ r_cut.
    #[inline]
    pub fn energy(&self, r2: f64) -> f64 {
        let sr6 = self.sigma6 / (r2 * r2 * r2);
        4.0 * self.epsilon * sr6 * (sr6 - 1.0) - self.shift
    }

    /// Force magnitude divided by r: F(r)/r = 24εσ⁶/r⁸ · (2σ⁶/r⁶ − 1).
    /// Positive values are repulsive along the separation vector.
    #[inline]
    pub fn force_over_r(&self, r2: f64) -> f64 {
        let r6 = r2 * r2 * r2;
        let sr6 = self.sigma6 / r6;
        24.0 * self.epsilon * self.sigma6 / (r6 * r2) * (2.0 * sr6 - 1.0)
    }
}

/// Symmetric table of pair parameters over all type pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairTable {
    n_types: usize,
    params: Vec<PairParams>,
}

impl PairTable {
    /// All pairs start free (non-interacting).
    pub fn new(n_types: usize) -> Self {
        Self {
            n_types,
            params: vec![PairParams::free(); n_types * n_types],
        }
    }

    /// Number of types covered.
    pub fn n_types(&self) -> usize {
        self.n_types
    }

    /// Set parameters for the unordered pair (i, j); both orderings are
    /// updated.
    pub fn set(&mut self, i: usize, j: usize, params: PairParams) {
        self.params[i * self.n_types + j] = params;
        self.params[j * self.n_types + i] = params;
    }

    /// Parameters for the pair (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &PairParams {
        &self.params[i * self.n_types + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_tags() {
        assert_eq!("free".parse::<PairKernel>().unwrap(), PairKernel::Free);
        assert_eq!(
            "lj-periodic".parse::<PairKernel>().unwrap(),
            PairKernel::LjPeriodic
        );
        assert!("nosuch".parse::<PairKernel>().is_err());
    }

    #[test]
    fn test_lj_energy_zero_at_sigma_without_shift() {
        let p = PairParams::lennard_jones(
            PairKernel::LjPeriodic,
            1.0,
            1.0,
            2.5,
            1000.0,
            1,
            1,
            3,
            false,
        )
        .unwrap();
        // U(σ) = −shift once truncated
        assert_relative_eq!(p.energy(1.0), -p.shift, epsilon = 1e-12);
    }

    #[test]
    fn test_lj_force_zero_at_minimum() {
        let p = PairParams::lennard_jones(
            PairKernel::LjPeriodic,
            1.0,
            1.0,
            2.5,
            1000.0,
            1,
            1,
            3,
            false,
        )
        .unwrap();
        let r_min = 2.0_f64.powf(1.0 / 6.0);
        assert_relative_eq!(p.force_over_r(r_min * r_min), 0.0, epsilon = 1e-12);
        // repulsive inside, attractive outside
        assert!(p.force_over_r(0.9 * 0.9) > 0.0);
        assert!(p.force_over_r(1.5 * 1.5) < 0.0);
    }

    #[test]
    fn test_energy_continuous_at_cutoff() {
        let p = PairParams::lennard_jones(
            PairKernel::LjPeriodic,
            1.0,
            1.0,
            2.5,
            1000.0,
            1,
            1,
            3,
            false,
        )
        .unwrap();
        assert_relative_eq!(p.energy(p.r_cut * p.r_cut), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tail_integral_against_quadrature() {
        // trapezoid over [r_c, 60σ] converges to the closed form
        let (eps, sigma, r_cut, n) = (1.0, 1.0, 2.5, 3usize);
        let analytic = lj_tail_integral(eps, sigma, r_cut, n);

        let steps = 400_000;
        let r_max = 60.0;
        let h = (r_max - r_cut) / steps as f64;
        let u = |r: f64| {
            let sr6 = (sigma / r).powi(6);
            4.0 * eps * (sr6 * sr6 - sr6) * r.powi(n as i32 - 1)
        };
        let mut numeric = 0.5 * (u(r_cut) + u(r_max));
        for i in 1..steps {
            numeric += u(r_cut + i as f64 * h);
        }
        numeric *= h;

        assert_relative_eq!(analytic, numeric, epsilon = 1e-6);
    }

    #[test]
    fn test_same_type_tail_halved() {
        let full = PairParams::lennard_jones(
            PairKernel::LjPeriodic,
            1.0,
            1.0,
            2.5,
            1000.0,
            10,
            10,
            3,
            false,
        )
        .unwrap();
        let half = PairParams::lennard_jones(
            PairKernel::LjPeriodic,
            1.0,
            1.0,
            2.5,
            1000.0,
            10,
            10,
            3,
            true,
        )
        .unwrap();
        assert_relative_eq!(half.tail_energy * 2.0, full.tail_energy, epsilon = 1e-12);
    }

    #[test]
    fn test_table_is_symmetric() {
        let mut table = PairTable::new(3);
        let p = PairParams::lennard_jones(
            PairKernel::LjBox,
            1.0,
            1.0,
            2.5,
            1000.0,
            2,
            3,
            3,
            false,
        )
        .unwrap();
        table.set(0, 2, p);
        assert_eq!(table.get(0, 2).kernel, PairKernel::LjBox);
        assert_eq!(table.get(2, 0).kernel, PairKernel::LjBox);
        assert_eq!(table.get(1, 1).kernel, PairKernel::Free);
    }
}
