//! Rotation quaternions.

use std::ops::{Add, Index, Mul, MulAssign, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::macros::{impl_approx_eq, mutable_type};
use crate::matrix3::Matrix3;
use crate::point::Point3D;
use crate::scalar::{acos_deg, sin_cos_deg, to_degrees};
use crate::transformation::Transformation;
use crate::vector::Vector3;

/// A quaternion `x*i + y*j + z*k + w`.
///
/// Construction never normalizes; the rotation operations assume a unit
/// quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quaternion {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn x(&self) -> f32 {
        self.x
    }

    pub const fn y(&self) -> f32 {
        self.y
    }

    pub const fn z(&self) -> f32 {
        self.z
    }

    pub const fn w(&self) -> f32 {
        self.w
    }

    /// The imaginary part as a vector
    pub const fn vector_part(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub const fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn get(&self, index: usize) -> Result<f32> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            2 => Ok(self.z),
            3 => Ok(self.w),
            _ => Err(MathError::index(index, 4, "Quaternion")),
        }
    }

    /// Rotation of `degrees` about a unit `axis`.
    ///
    /// The axis is not normalized; a non-unit axis yields a non-unit
    /// quaternion. Use [`Quaternion::from_axis_angle_safe`] otherwise.
    pub fn from_axis_angle(axis: &Vector3, degrees: f32) -> Self {
        let (sin, cos) = sin_cos_deg(degrees * 0.5);
        Self::new(axis.x() * sin, axis.y() * sin, axis.z() * sin, cos)
    }

    /// Rotation of `degrees` about `axis`, normalizing the axis first
    pub fn from_axis_angle_safe(axis: &Vector3, degrees: f32) -> Self {
        Self::from_axis_angle(&axis.normalize(), degrees)
    }

    /// Rotation applying `x` about X, then `y` about Y, then `z` about Z
    /// (all in degrees).
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        let rx = Self::from_axis_angle(&Vector3::X, x);
        let ry = Self::from_axis_angle(&Vector3::Y, y);
        let rz = Self::from_axis_angle(&Vector3::Z, z);
        rz * ry * rx
    }

    /// Quaternion of a pure rotation matrix
    pub fn from_rotation_matrix(m: &Matrix3) -> Self {
        let trace = m.trace();
        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                (m.e21() - m.e12()) / s,
                (m.e02() - m.e20()) / s,
                (m.e10() - m.e01()) / s,
                0.25 * s,
            )
        } else if m.e00() > m.e11() && m.e00() > m.e22() {
            let s = (1.0 + m.e00() - m.e11() - m.e22()).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m.e01() + m.e10()) / s,
                (m.e02() + m.e20()) / s,
                (m.e21() - m.e12()) / s,
            )
        } else if m.e11() > m.e22() {
            let s = (1.0 + m.e11() - m.e00() - m.e22()).sqrt() * 2.0;
            Self::new(
                (m.e01() + m.e10()) / s,
                0.25 * s,
                (m.e12() + m.e21()) / s,
                (m.e02() - m.e20()) / s,
            )
        } else {
            let s = (1.0 + m.e22() - m.e00() - m.e11()).sqrt() * 2.0;
            Self::new(
                (m.e02() + m.e20()) / s,
                (m.e12() + m.e21()) / s,
                0.25 * s,
                (m.e10() - m.e01()) / s,
            )
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Unit quaternion; the zero quaternion stays zero
    pub fn normalize(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            *self
        } else {
            self.scale(1.0 / magnitude)
        }
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor, self.w * factor)
    }

    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse, `conjugate / |q|^2`
    pub fn inverse(&self) -> Self {
        self.conjugate().scale(1.0 / self.magnitude_squared())
    }

    /// Hamilton product `self * other`: applies `other` first, then `self`
    pub fn multiply(&self, other: &Self) -> Self {
        let (a, b) = (self, other);
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    /// Rotate a vector by this unit quaternion
    pub fn rotate_vector(&self, v: &Vector3) -> Vector3 {
        let u = self.vector_part();
        let t = u.cross(v) * 2.0;
        *v + t * self.w + u.cross(&t)
    }

    /// Rotate a point about the origin
    pub fn rotate_point(&self, p: &Point3D) -> Point3D {
        Point3D::from_vector(&self.rotate_vector(&p.to_vector()))
    }

    /// Rotation angle in degrees
    pub fn angle(&self) -> f32 {
        2.0 * acos_deg(self.w)
    }

    /// Unit rotation axis; X for the identity rotation
    pub fn axis(&self) -> Vector3 {
        let sin_half_squared = 1.0 - self.w * self.w;
        if sin_half_squared <= 0.0 {
            return Vector3::X;
        }
        self.vector_part() / sin_half_squared.sqrt()
    }

    /// Rotation as a 3x3 matrix for column vectors
    pub fn to_matrix3(&self) -> Matrix3 {
        let Self { x, y, z, w } = *self;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Matrix3::new(
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (xx + yy),
        )
    }

    /// Rotation as an affine transformation with no translation
    pub fn to_transformation(&self) -> Transformation {
        Transformation::from_linear(&self.to_matrix3())
    }

    /// Normalized linear interpolation along the shorter arc
    pub fn nlerp(&self, other: &Self, t: f32) -> Self {
        let other = if self.dot(other) < 0.0 { -*other } else { *other };
        (self.scale(1.0 - t) + other.scale(t)).normalize()
    }

    /// Spherical linear interpolation along the shorter arc
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let mut cos_theta = self.dot(other);
        let mut other = *other;
        if cos_theta < 0.0 {
            other = -other;
            cos_theta = -cos_theta;
        }
        // Nearly parallel: the sine below would vanish.
        if cos_theta > 0.9995 {
            return self.nlerp(&other, t);
        }
        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        self.scale(a) + other.scale(b)
    }

    /// Rotation angle between two unit quaternions, in degrees
    pub fn angle_to(&self, other: &Self) -> f32 {
        to_degrees(2.0 * self.dot(other).abs().clamp(0.0, 1.0).acos())
    }

    pub fn multiply_into<'a>(&self, other: &Self, dest: &'a mut MutableQuaternion) -> &'a mut MutableQuaternion {
        dest.commit(self.multiply(other))
    }

    pub fn normalize_into<'a>(&self, dest: &'a mut MutableQuaternion) -> &'a mut MutableQuaternion {
        dest.commit(self.normalize())
    }

    pub fn conjugate_into<'a>(&self, dest: &'a mut MutableQuaternion) -> &'a mut MutableQuaternion {
        dest.commit(self.conjugate())
    }

    pub fn inverse_into<'a>(&self, dest: &'a mut MutableQuaternion) -> &'a mut MutableQuaternion {
        dest.commit(self.inverse())
    }

    pub fn slerp_into<'a>(&self, other: &Self, t: f32, dest: &'a mut MutableQuaternion) -> &'a mut MutableQuaternion {
        dest.commit(self.slerp(other, t))
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.rotate_vector(&rhs)
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Quaternion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Index<usize> for Quaternion {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("{}", MathError::index(index, 4, "Quaternion")),
        }
    }
}

impl_approx_eq!(Quaternion, to_array);

mutable_type!(
    /// A [`Quaternion`] that can change in place and reports each change to an observer.
    MutableQuaternion,
    Quaternion
);

impl MutableQuaternion {
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        self.commit(Quaternion::new(x, y, z, w))
    }

    pub fn set_x(&mut self, x: f32) -> &mut Self {
        self.update(|q| Quaternion { x, ..*q })
    }

    pub fn set_y(&mut self, y: f32) -> &mut Self {
        self.update(|q| Quaternion { y, ..*q })
    }

    pub fn set_z(&mut self, z: f32) -> &mut Self {
        self.update(|q| Quaternion { z, ..*q })
    }

    pub fn set_w(&mut self, w: f32) -> &mut Self {
        self.update(|q| Quaternion { w, ..*q })
    }

    pub fn set_identity(&mut self) -> &mut Self {
        self.commit(Quaternion::IDENTITY)
    }

    pub fn set_axis_angle(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Quaternion::from_axis_angle_safe(axis, degrees))
    }

    pub fn normalize(&mut self) -> &mut Self {
        self.update(|q| q.normalize())
    }

    pub fn conjugate(&mut self) -> &mut Self {
        self.update(|q| q.conjugate())
    }

    pub fn invert(&mut self) -> &mut Self {
        self.update(|q| q.inverse())
    }

    /// Replace the value with `self * other`
    pub fn multiply(&mut self, other: &Quaternion) -> &mut Self {
        self.update(|q| q.multiply(other))
    }

    /// Replace the value with `other * self`
    pub fn multiply_left(&mut self, other: &Quaternion) -> &mut Self {
        self.update(|q| other.multiply(q))
    }
}

impl MulAssign<Quaternion> for MutableQuaternion {
    fn mul_assign(&mut self, rhs: Quaternion) {
        self.multiply(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_is_default() {
        assert_eq!(Quaternion::default(), Quaternion::IDENTITY);
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Quaternion::IDENTITY.rotate_vector(&v), v);
    }

    #[test]
    fn test_axis_angle_rotation() {
        let q = Quaternion::from_axis_angle(&Vector3::Z, 90.0);
        assert_relative_eq!(q.rotate_vector(&Vector3::X), Vector3::Y, epsilon = 1e-6);
        assert_relative_eq!(q * Vector3::Y, -Vector3::X, epsilon = 1e-6);
        assert_relative_eq!(q.angle(), 90.0, epsilon = 1e-3);
        assert_relative_eq!(q.axis(), Vector3::Z, epsilon = 1e-6);
    }

    #[test]
    fn test_safe_variant_normalizes_axis() {
        let safe = Quaternion::from_axis_angle_safe(&Vector3::new(0.0, 5.0, 0.0), 60.0);
        let unit = Quaternion::from_axis_angle(&Vector3::Y, 60.0);
        assert_relative_eq!(safe, unit, epsilon = 1e-6);

        let unsafe_result = Quaternion::from_axis_angle(&Vector3::new(0.0, 5.0, 0.0), 60.0);
        assert!(unsafe_result.magnitude() > 1.5);
    }

    #[test]
    fn test_composition_order() {
        let rx = Quaternion::from_axis_angle(&Vector3::X, 90.0);
        let rz = Quaternion::from_axis_angle(&Vector3::Z, 90.0);
        // rz * rx applies rx first.
        let combined = rz * rx;
        let expected = rz.rotate_vector(&rx.rotate_vector(&Vector3::Y));
        assert_relative_eq!(combined.rotate_vector(&Vector3::Y), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_conjugate_and_inverse() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(q.conjugate(), Quaternion::new(-1.0, -2.0, -3.0, 4.0));
        assert_relative_eq!(q * q.inverse(), Quaternion::IDENTITY, epsilon = 1e-6);
        assert_relative_eq!(q.normalize().magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_round_trip() {
        let q = Quaternion::from_axis_angle_safe(&Vector3::new(1.0, 2.0, -0.5), 73.0);
        let m = q.to_matrix3();
        let v = Vector3::new(0.3, -1.2, 2.0);
        assert_relative_eq!(m * v, q.rotate_vector(&v), epsilon = 1e-5);

        let back = Quaternion::from_rotation_matrix(&m);
        // q and -q are the same rotation.
        assert_relative_eq!(back.dot(&q).abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_euler_matches_matrix_product() {
        let q = Quaternion::from_euler(30.0, 45.0, 60.0);
        let m = Matrix3::rotation_z(60.0) * Matrix3::rotation_y(45.0) * Matrix3::rotation_x(30.0);
        assert_relative_eq!(q.to_matrix3(), m, epsilon = 1e-5);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(&Vector3::Y, 90.0);
        assert_relative_eq!(a.slerp(&b, 0.0), a, epsilon = 1e-6);
        assert_relative_eq!(a.slerp(&b, 1.0), b, epsilon = 1e-6);
        let mid = a.slerp(&b, 0.5);
        assert_relative_eq!(mid.angle(), 45.0, epsilon = 1e-2);
        assert_relative_eq!(a.angle_to(&b), 90.0, epsilon = 1e-2);
    }

    #[test]
    fn test_mutable_quaternion() {
        use std::cell::Cell;
        use std::rc::Rc;

        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut q = MutableQuaternion::with_observer(Quaternion::IDENTITY, move || {
            counter.set(counter.get() + 1)
        });

        q.set_axis_angle(&Vector3::new(0.0, 0.0, 2.0), 90.0);
        q *= Quaternion::from_axis_angle(&Vector3::Z, 90.0);
        assert_relative_eq!(q.angle(), 180.0, epsilon = 1e-3);
        q.set(0.0, 0.0, 0.0, 2.0).normalize();
        assert_eq!(q.copy_immutable(), Quaternion::IDENTITY);
        assert_eq!(count.get(), 4);
    }
}
