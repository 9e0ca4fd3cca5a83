//! Math primitives for the mdk molecular dynamics engine.
//!
//! Provides fixed-size vector/matrix aliases over nalgebra and a unit
//! quaternion type for rigid-body orientations.

pub mod quaternion;

pub use quaternion::Quat;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skew_matches_cross() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(0.3, 4.0, -1.0);
        let via_matrix = skew(&a) * b;
        let direct = a.cross(&b);
        assert!((via_matrix - direct).norm() < 1e-12);
    }
}
