//! Immutable per-type molecule constants.

use crate::error::{MdkError, Result};
use mdk_math::Vec3;

/// Constants shared by every molecule of a type. Created once at setup,
/// never mutated.
///
/// The body frame is chosen principal-axis-aligned, so the inertia
/// tensor is stored as its three eigenvalues and their inverses.
#[derive(Debug, Clone)]
pub struct MoleculeTypeConstants {
    /// Atoms (interaction sites) per molecule; 1 for point particles.
    pub n_atoms: usize,
    /// Total molecule mass.
    pub mass: f64,
    /// Body-frame site positions relative to the center of mass.
    pub site_positions: Vec<Vec3>,
    /// Principal moments of inertia.
    pub inertia: Vec3,
    /// Component-wise inverse of `inertia`; zero for point particles.
    pub inv_inertia: Vec3,
}

impl MoleculeTypeConstants {
    /// A structureless point particle.
    pub fn point(mass: f64) -> Self {
        Self {
            n_atoms: 1,
            mass,
            site_positions: vec![Vec3::zeros()],
            inertia: Vec3::zeros(),
            inv_inertia: Vec3::zeros(),
        }
    }

    /// A rigid molecule with the given body-frame site positions and
    /// principal moments of inertia. Sites must be given relative to the
    /// center of mass in the principal-axis frame.
    pub fn rigid(mass: f64, site_positions: Vec<Vec3>, inertia: Vec3) -> Result<Self> {
        if site_positions.is_empty() {
            return Err(MdkError::Config(
                "rigid molecule needs at least one site".into(),
            ));
        }
        if mass <= 0.0 {
            return Err(MdkError::Config("molecule mass must be positive".into()));
        }
        if inertia.iter().any(|&i| i <= 0.0) {
            return Err(MdkError::Config(
                "principal moments of inertia must be positive".into(),
            ));
        }
        let inv_inertia = Vec3::new(1.0 / inertia.x, 1.0 / inertia.y, 1.0 / inertia.z);
        Ok(Self {
            n_atoms: site_positions.len(),
            mass,
            site_positions,
            inertia,
            inv_inertia,
        })
    }

    /// Whether this type carries rotational degrees of freedom.
    pub fn is_rigid_body(&self) -> bool {
        self.n_atoms > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_particle() {
        let c = MoleculeTypeConstants::point(2.0);
        assert_eq!(c.n_atoms, 1);
        assert!(!c.is_rigid_body());
        assert_eq!(c.inv_inertia, Vec3::zeros());
    }

    #[test]
    fn test_rigid_diatomic() {
        // Two unit-mass sites at ±0.5 on x: I_yy = I_zz = 2 * 1 * 0.25
        let sites = vec![Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)];
        let c =
            MoleculeTypeConstants::rigid(2.0, sites, Vec3::new(1e-6, 0.5, 0.5)).unwrap();
        assert_eq!(c.n_atoms, 2);
        assert!(c.is_rigid_body());
        assert!((c.inv_inertia.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rigid_rejects_bad_inertia() {
        let sites = vec![Vec3::zeros()];
        assert!(MoleculeTypeConstants::rigid(1.0, sites, Vec3::zeros()).is_err());
    }
}
