//! Quaternion utilities for rigid-body orientations.
//!
//! Convention: q = [w; x, y, z] where w is the scalar part and (x, y, z)
//! the vector part. Orientation quaternions map body-frame vectors into
//! the world frame via `to_matrix`.

use crate::{Mat3, Vec3};

/// A quaternion. Orientation quaternions are kept at unit norm by
/// explicit renormalization after every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    /// Scalar part (w).
    pub w: f64,
    /// Vector part (x, y, z).
    pub v: Vec3,
}

impl Quat {
    /// Create a new quaternion from scalar and vector parts.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            w,
            v: Vec3::new(x, y, z),
        }
    }

    /// Identity quaternion (no rotation).
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            v: Vec3::zeros(),
        }
    }

    /// Create quaternion from axis-angle representation.
    /// `axis` should be a unit vector, `angle` in radians.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let half_angle = angle * 0.5;
        let (s, c) = half_angle.sin_cos();
        Self { w: c, v: *axis * s }
    }

    /// Euclidean norm of the 4-vector.
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.v.norm_squared()).sqrt()
    }

    /// Normalize this quaternion to unit length.
    pub fn normalize(&self) -> Self {
        let norm = self.norm();
        if norm < 1e-12 {
            return Self::identity();
        }
        Self {
            w: self.w / norm,
            v: self.v / norm,
        }
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Quat) -> Quat {
        Quat {
            w: self.w + other.w,
            v: self.v + other.v,
        }
    }

    /// Component-wise difference.
    pub fn sub(&self, other: &Quat) -> Quat {
        Quat {
            w: self.w - other.w,
            v: self.v - other.v,
        }
    }

    /// Scale all four components.
    pub fn scale(&self, s: f64) -> Quat {
        Quat {
            w: self.w * s,
            v: self.v * s,
        }
    }

    /// 4-vector dot product.
    pub fn dot(&self, other: &Quat) -> f64 {
        self.w * other.w + self.v.dot(&other.v)
    }

    /// Quaternion multiplication: self * other.
    pub fn mul(&self, other: &Quat) -> Quat {
        Quat {
            w: self.w * other.w - self.v.dot(&other.v),
            v: self.v.cross(&other.v) + other.v * self.w + self.v * other.w,
        }
    }

    /// Conjugate of the quaternion (inverse for unit quaternions).
    pub fn conjugate(&self) -> Quat {
        Quat {
            w: self.w,
            v: -self.v,
        }
    }

    /// Kinematic rate dq/dt = ½ q ∘ (0, ω) for a body-frame angular
    /// velocity ω.
    pub fn kinematic_rate(&self, omega_body: &Vec3) -> Quat {
        self.mul(&Quat {
            w: 0.0,
            v: *omega_body,
        })
        .scale(0.5)
    }

    /// Convert quaternion to a 3x3 rotation matrix (body frame to world
    /// frame for orientation quaternions).
    pub fn to_matrix(&self) -> Mat3 {
        let w = self.w;
        let x = self.v.x;
        let y = self.v.y;
        let z = self.v.z;

        let x2 = x * x;
        let y2 = y * y;
        let z2 = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat3::new(
            1.0 - 2.0 * (y2 + z2),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (x2 + z2),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (x2 + y2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_identity() {
        let q = Quat::identity();
        assert_eq!(q.w, 1.0);
        assert_eq!(q.v, Vec3::zeros());
    }

    #[test]
    fn test_normalize() {
        let q = Quat::new(1.0, 2.0, 3.0, 4.0);
        let normalized = q.normalize();
        assert!((normalized.norm() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_multiplication() {
        // Two 90 degree rotations about Z compose to 180 degrees
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let q1 = Quat::from_axis_angle(&axis, std::f64::consts::FRAC_PI_2);
        let q2 = Quat::from_axis_angle(&axis, std::f64::consts::FRAC_PI_2);
        let result = q1.mul(&q2);

        let expected = Quat::from_axis_angle(&axis, std::f64::consts::PI);

        assert!((result.w - expected.w).abs() < EPS);
        assert!((result.v - expected.v).norm() < EPS);
    }

    #[test]
    fn test_conjugate_is_inverse() {
        let q = Quat::new(0.5, 0.5, 0.5, 0.5).normalize();
        let result = q.mul(&q.conjugate());
        assert!((result.w - 1.0).abs() < EPS);
        assert!(result.v.norm() < EPS);
    }

    #[test]
    fn test_to_matrix() {
        // 90 degree rotation about Z should map X to Y
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let q = Quat::from_axis_angle(&axis, std::f64::consts::FRAC_PI_2);
        let m = q.to_matrix();

        let y = m * Vec3::new(1.0, 0.0, 0.0);
        assert!((y - Vec3::new(0.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_kinematic_rate_preserves_norm_to_first_order() {
        // dq/dt is orthogonal to q, so q · dq/dt = 0
        let q = Quat::from_axis_angle(&Vec3::new(1.0, 0.0, 0.0), 0.3);
        let omega = Vec3::new(0.2, -0.1, 0.4);
        let rate = q.kinematic_rate(&omega);
        assert!(q.dot(&rate).abs() < EPS);
    }
}
