//! 3x3 matrices: linear maps of space, and homogeneous maps of the plane.

use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::matrix::{impl_cofactor_expansion, impl_square_matrix, skip_index};
use crate::matrix2::{Matrix2, MutableMatrix2};
use crate::point::{MutablePoint2D, MutablePoint3D, Point2D, Point3D};
use crate::scalar::sin_cos_deg;
use crate::vector::{MutableVector2, MutableVector3, Vector2, Vector3};

/// A 3x3 matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    rows: [[f32; 3]; 3],
}

impl_square_matrix!(
    Matrix3, MutableMatrix3, 3,
    vector: Vector3, MutableVector3,
    elements: [
        e00 / set_e00 = (0, 0), e01 / set_e01 = (0, 1), e02 / set_e02 = (0, 2),
        e10 / set_e10 = (1, 0), e11 / set_e11 = (1, 1), e12 / set_e12 = (1, 2),
        e20 / set_e20 = (2, 0), e21 / set_e21 = (2, 1), e22 / set_e22 = (2, 2),
    ],
    rows: [row0 = 0, row1 = 1, row2 = 2],
    columns: [column0 = 0, column1 = 1, column2 = 2]
);

impl_cofactor_expansion!(Matrix3, 3);

impl Matrix3 {
    /// The 2x2 matrix left after deleting `row` and `col`
    pub fn try_submatrix(&self, row: usize, col: usize) -> Result<Matrix2> {
        if row < 3 && col < 3 {
            Ok(Matrix2::from_fn(|r, c| self.rows[skip_index(r, row)][skip_index(c, col)]))
        } else {
            Err(MathError::element(row, col, 3, "Matrix3"))
        }
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn submatrix(&self, row: usize, col: usize) -> Matrix2 {
        match self.try_submatrix(row, col) {
            Ok(sub) => sub,
            Err(err) => panic!("{err}"),
        }
    }

    /// Panics on an out-of-range index without touching `dest`.
    pub fn submatrix_into<'a>(&self, row: usize, col: usize, dest: &'a mut MutableMatrix2) -> &'a mut MutableMatrix2 {
        dest.commit(self.submatrix(row, col))
    }

    /// Rotation about the X axis
    pub fn rotation_x(degrees: f32) -> Self {
        let (s, c) = sin_cos_deg(degrees);
        Self::new(
            1.0, 0.0, 0.0,
            0.0, c, -s,
            0.0, s, c,
        )
    }

    /// Rotation about the Y axis
    pub fn rotation_y(degrees: f32) -> Self {
        let (s, c) = sin_cos_deg(degrees);
        Self::new(
            c, 0.0, s,
            0.0, 1.0, 0.0,
            -s, 0.0, c,
        )
    }

    /// Rotation about the Z axis
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = sin_cos_deg(degrees);
        Self::new(
            c, -s, 0.0,
            s, c, 0.0,
            0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `degrees` about a unit `axis`
    pub fn rotation(axis: &Vector3, degrees: f32) -> Self {
        let (s, c) = sin_cos_deg(degrees);
        let d = 1.0 - c;
        let (x, y, z) = (axis.x(), axis.y(), axis.z());
        Self::new(
            c + d * x * x, d * x * y - s * z, d * x * z + s * y,
            d * x * y + s * z, c + d * y * y, d * y * z - s * x,
            d * x * z - s * y, d * y * z + s * x, c + d * z * z,
        )
    }

    /// Rotation of `degrees` about `axis`, normalizing it first
    pub fn rotation_safe(axis: &Vector3, degrees: f32) -> Self {
        Self::rotation(&axis.normalize(), degrees)
    }

    /// `I + k a a^T`, the shape shared by reflection, involution and
    /// axis scaling
    fn outer_product_update(axis: &Vector3, k: f32, diagonal: f32) -> Self {
        let a = axis.to_array();
        Self::from_fn(|row, col| {
            let identity = if row == col { diagonal } else { 0.0 };
            identity + k * a[row] * a[col]
        })
    }

    /// Reflection through the plane perpendicular to a unit `axis`
    pub fn reflection(axis: &Vector3) -> Self {
        Self::outer_product_update(axis, -2.0, 1.0)
    }

    pub fn reflection_safe(axis: &Vector3) -> Self {
        Self::reflection(&axis.normalize())
    }

    /// Involution (half turn) about a unit `axis`
    pub fn involution(axis: &Vector3) -> Self {
        Self::outer_product_update(axis, 2.0, -1.0)
    }

    pub fn involution_safe(axis: &Vector3) -> Self {
        Self::involution(&axis.normalize())
    }

    pub fn scaling(factor: f32) -> Self {
        Self::nonuniform_scaling(factor, factor, factor)
    }

    pub fn nonuniform_scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self::new(
            sx, 0.0, 0.0,
            0.0, sy, 0.0,
            0.0, 0.0, sz,
        )
    }

    /// Scale by `factor` along a unit `axis`
    pub fn scaling_along(axis: &Vector3, factor: f32) -> Self {
        Self::outer_product_update(axis, factor - 1.0, 1.0)
    }

    pub fn scaling_along_safe(axis: &Vector3, factor: f32) -> Self {
        Self::scaling_along(&axis.normalize(), factor)
    }

    /// Skew-symmetric matrix `[v]x` with `[v]x * w == v.cross(w)`
    pub fn cross_product(v: &Vector3) -> Self {
        Self::new(
            0.0, -v.z(), v.y(),
            v.z(), 0.0, -v.x(),
            -v.y(), v.x(), 0.0,
        )
    }

    /// Linear image of a point in space
    pub fn multiply_point3(&self, point: &Point3D) -> Point3D {
        Point3D::from_vector(&self.multiply_vector(&point.to_vector()))
    }

    /// Homogeneous transform of a planar point: implicit w = 1, and the
    /// result is divided by the computed w.
    pub fn multiply_point2(&self, point: &Point2D) -> Point2D {
        let (x, y) = (point.x(), point.y());
        let tx = self.e00() * x + self.e01() * y + self.e02();
        let ty = self.e10() * x + self.e11() * y + self.e12();
        let tw = self.e20() * x + self.e21() * y + self.e22();
        Point2D::new(tx / tw, ty / tw)
    }

    /// Planar vector with implicit w = 0: no translation, no division
    pub fn multiply_vector2(&self, vector: &Vector2) -> Vector2 {
        let (x, y) = (vector.x(), vector.y());
        Vector2::new(
            self.e00() * x + self.e01() * y,
            self.e10() * x + self.e11() * y,
        )
    }

    pub fn multiply_point3_into<'a>(&self, point: &Point3D, dest: &'a mut MutablePoint3D) -> &'a mut MutablePoint3D {
        dest.commit(self.multiply_point3(point))
    }

    pub fn multiply_point2_into<'a>(&self, point: &Point2D, dest: &'a mut MutablePoint2D) -> &'a mut MutablePoint2D {
        dest.commit(self.multiply_point2(point))
    }

    pub fn multiply_vector2_into<'a>(&self, vector: &Vector2, dest: &'a mut MutableVector2) -> &'a mut MutableVector2 {
        dest.commit(self.multiply_vector2(vector))
    }
}

impl Mul<Point3D> for Matrix3 {
    type Output = Point3D;

    fn mul(self, rhs: Point3D) -> Point3D {
        self.multiply_point3(&rhs)
    }
}

impl Mul<Point2D> for Matrix3 {
    type Output = Point2D;

    fn mul(self, rhs: Point2D) -> Point2D {
        self.multiply_point2(&rhs)
    }
}

impl Mul<Vector2> for Matrix3 {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        self.multiply_vector2(&rhs)
    }
}

impl MutableMatrix3 {
    pub fn make_rotation_x(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix3::rotation_x(degrees))
    }

    pub fn make_rotation_y(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix3::rotation_y(degrees))
    }

    pub fn make_rotation_z(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix3::rotation_z(degrees))
    }

    pub fn make_rotation(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Matrix3::rotation(axis, degrees))
    }

    pub fn make_rotation_safe(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Matrix3::rotation_safe(axis, degrees))
    }

    pub fn make_reflection(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix3::reflection(axis))
    }

    pub fn make_reflection_safe(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix3::reflection_safe(axis))
    }

    pub fn make_involution(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix3::involution(axis))
    }

    pub fn make_involution_safe(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix3::involution_safe(axis))
    }

    pub fn make_scaling(&mut self, factor: f32) -> &mut Self {
        self.commit(Matrix3::scaling(factor))
    }

    pub fn make_nonuniform_scaling(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.commit(Matrix3::nonuniform_scaling(sx, sy, sz))
    }

    pub fn make_scaling_along(&mut self, axis: &Vector3, factor: f32) -> &mut Self {
        self.commit(Matrix3::scaling_along(axis, factor))
    }

    pub fn make_scaling_along_safe(&mut self, axis: &Vector3, factor: f32) -> &mut Self {
        self.commit(Matrix3::scaling_along_safe(axis, factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sample() -> Matrix3 {
        Matrix3::new(
            2.0, -1.0, 0.5,
            1.0, 3.0, -2.0,
            0.0, 4.0, 1.5,
        )
    }

    /// Determinant by expansion along row 2, independent of the default
    /// column-0 expansion.
    fn determinant_along_row2(m: &Matrix3) -> f32 {
        (0..3).map(|col| m[(2, col)] * m.cofactor(2, col)).sum()
    }

    #[test]
    fn test_determinant() {
        let m = sample();
        // 2*(4.5+8) - (-1)*(1.5-0) + 0.5*(4-0)
        assert_relative_eq!(m.determinant(), 28.5, epsilon = 1e-5);
        assert_relative_eq!(m.determinant(), determinant_along_row2(&m), epsilon = 1e-5);
        assert_relative_eq!(m.determinant(), m.transpose().determinant(), epsilon = 1e-5);
        assert_eq!(Matrix3::IDENTITY.determinant(), 1.0);
    }

    #[test]
    fn test_inverse() {
        let m = sample();
        let inv = m.inverse();
        assert_relative_eq!(m * inv, Matrix3::IDENTITY, epsilon = 1e-5);
        assert_relative_eq!(inv * m, Matrix3::IDENTITY, epsilon = 1e-5);
    }

    #[test]
    fn test_submatrix() {
        let m = sample();
        assert_eq!(m.submatrix(0, 0), Matrix2::new(3.0, -2.0, 4.0, 1.5));
        assert_eq!(m.submatrix(1, 2), Matrix2::new(2.0, -1.0, 0.0, 4.0));
        assert_eq!(m.submatrix(2, 1), Matrix2::new(2.0, 0.5, 1.0, -2.0));
    }

    #[test]
    fn test_try_submatrix_rejects_bad_indices() {
        let m = sample();
        assert_eq!(m.try_submatrix(1, 2), Ok(m.submatrix(1, 2)));
        assert!(m.try_submatrix(3, 0).is_err());
        assert!(m.try_cofactor(0, 7).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_submatrix_out_of_range_panics() {
        sample().submatrix(0, 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cofactor_out_of_range_panics() {
        Matrix3::IDENTITY.cofactor(7, 0);
    }

    #[test]
    fn test_rotation_definitions() {
        let angle = 35.0f32;
        let (s, c) = angle.to_radians().sin_cos();

        let rx = Matrix3::rotation_x(angle);
        assert_relative_eq!(rx.e11(), c, epsilon = 1e-6);
        assert_relative_eq!(rx.e12(), -s, epsilon = 1e-6);
        assert_relative_eq!(rx.e21(), s, epsilon = 1e-6);
        assert_relative_eq!(rx.e22(), c, epsilon = 1e-6);

        let ry = Matrix3::rotation_y(angle);
        assert_relative_eq!(ry.e00(), c, epsilon = 1e-6);
        assert_relative_eq!(ry.e02(), s, epsilon = 1e-6);
        assert_relative_eq!(ry.e20(), -s, epsilon = 1e-6);

        let rz = Matrix3::rotation_z(angle);
        assert_relative_eq!(rz.e01(), -s, epsilon = 1e-6);
        assert_relative_eq!(rz.e10(), s, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_rotation_matches_principal_axes() {
        assert_relative_eq!(Matrix3::rotation(&Vector3::X, 40.0), Matrix3::rotation_x(40.0), epsilon = 1e-6);
        assert_relative_eq!(Matrix3::rotation(&Vector3::Y, 40.0), Matrix3::rotation_y(40.0), epsilon = 1e-6);
        assert_relative_eq!(Matrix3::rotation(&Vector3::Z, 40.0), Matrix3::rotation_z(40.0), epsilon = 1e-6);
    }

    #[test]
    fn test_safe_and_unchecked_rotation() {
        let axis = Vector3::new(0.0, 0.0, 4.0);
        assert_relative_eq!(Matrix3::rotation_safe(&axis, 90.0), Matrix3::rotation_z(90.0), epsilon = 1e-6);
        // A non-unit axis is not rejected; it just builds the wrong matrix.
        let wrong = Matrix3::rotation(&axis, 90.0);
        assert!(!wrong.approx_eq(&Matrix3::rotation_z(90.0), 1e-3));
    }

    #[test]
    fn test_reflection_involution_scaling() {
        let n = Vector3::new(0.0, 1.0, 0.0);
        let reflect = Matrix3::reflection(&n);
        assert_eq!(reflect * Vector3::new(1.0, 2.0, 3.0), Vector3::new(1.0, -2.0, 3.0));
        assert_relative_eq!(reflect.determinant(), -1.0);

        let involution = Matrix3::involution_safe(&Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(involution * Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, -2.0, 3.0));

        let squash = Matrix3::scaling_along(&Vector3::X, 0.5);
        assert_eq!(squash * Vector3::new(4.0, 4.0, 4.0), Vector3::new(2.0, 4.0, 4.0));
        assert_eq!(Matrix3::scaling(2.0).determinant(), 8.0);
    }

    #[test]
    fn test_cross_product_matrix() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(-2.0, 0.5, 4.0);
        assert_relative_eq!(Matrix3::cross_product(&a) * b, a.cross(&b));
    }

    #[test]
    fn test_planar_homogeneous_points() {
        // Translate the plane by (3, 4), then scale everything by w = 2.
        let m = Matrix3::new(
            2.0, 0.0, 6.0,
            0.0, 2.0, 8.0,
            0.0, 0.0, 2.0,
        );
        assert_eq!(m * Point2D::new(1.0, 1.0), Point2D::new(4.0, 5.0));
        assert_eq!(m * Vector2::new(1.0, 1.0), Vector2::new(2.0, 2.0));
    }

    #[test]
    fn test_observer_and_caches() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut m = MutableMatrix3::with_observer(sample(), move || counter.set(counter.get() + 1));

        let t1 = m.transpose();
        assert!(Rc::ptr_eq(&t1, &m.transpose()));

        m.set_elements(1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0);
        assert_eq!(count.get(), 1);
        assert!(!Rc::ptr_eq(&t1, &m.transpose()));
        assert_eq!(*m.inverse(), Matrix3::nonuniform_scaling(1.0, 0.5, 0.25));

        for col in 0..3 {
            m.set_element(0, col, 1.0);
        }
        assert_eq!(count.get(), 4);

        m.make_rotation_z(90.0);
        m *= Matrix3::rotation_z(-90.0);
        assert_relative_eq!(m.copy_immutable(), Matrix3::IDENTITY, epsilon = 1e-6);
        assert_eq!(count.get(), 6);
    }
}
