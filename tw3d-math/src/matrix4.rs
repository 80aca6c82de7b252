//! General 4x4 matrices.

use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::matrix::{impl_cofactor_expansion, impl_square_matrix, skip_index};
use crate::matrix3::{Matrix3, MutableMatrix3};
use crate::point::{MutablePoint3D, Point3D};
use crate::scalar::tan_deg;
use crate::vector::{MutableVector3, MutableVector4, Vector3, Vector4};

/// Read access shared by every 4x4 shape.
pub trait Matrix4Like: Copy {
    /// Element at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    fn element(&self, row: usize, col: usize) -> f32;

    /// Dense copy of the matrix
    fn to_matrix4(&self) -> Matrix4 {
        Matrix4::from_fn(|row, col| self.element(row, col))
    }
}

/// A 4x4 matrix stored row-major.
///
/// Points are multiplied with an implicit w of 1 and divided by the computed
/// w; three component vectors use w = 0 and are never divided.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix4 {
    rows: [[f32; 4]; 4],
}

impl_square_matrix!(
    Matrix4, MutableMatrix4, 4,
    vector: Vector4, MutableVector4,
    elements: [
        e00 / set_e00 = (0, 0), e01 / set_e01 = (0, 1), e02 / set_e02 = (0, 2), e03 / set_e03 = (0, 3),
        e10 / set_e10 = (1, 0), e11 / set_e11 = (1, 1), e12 / set_e12 = (1, 2), e13 / set_e13 = (1, 3),
        e20 / set_e20 = (2, 0), e21 / set_e21 = (2, 1), e22 / set_e22 = (2, 2), e23 / set_e23 = (2, 3),
        e30 / set_e30 = (3, 0), e31 / set_e31 = (3, 1), e32 / set_e32 = (3, 2), e33 / set_e33 = (3, 3),
    ],
    rows: [row0 = 0, row1 = 1, row2 = 2, row3 = 3],
    columns: [column0 = 0, column1 = 1, column2 = 2, column3 = 3]
);

impl_cofactor_expansion!(Matrix4, 4);

impl Matrix4Like for Matrix4 {
    #[inline]
    fn element(&self, row: usize, col: usize) -> f32 {
        self[(row, col)]
    }

    #[inline]
    fn to_matrix4(&self) -> Matrix4 {
        *self
    }
}

impl Matrix4 {
    /// Dense copy of any 4x4 shape
    pub fn from_like(matrix: &impl Matrix4Like) -> Self {
        matrix.to_matrix4()
    }

    /// Embed a 3x3 linear map in the upper-left block
    pub fn from_matrix3(m: &Matrix3) -> Self {
        Self::from_fn(|row, col| {
            if row < 3 && col < 3 {
                m[(row, col)]
            } else if row == col {
                1.0
            } else {
                0.0
            }
        })
    }

    /// The upper-left 3x3 block
    pub fn linear_part(&self) -> Matrix3 {
        Matrix3::from_fn(|row, col| self.rows[row][col])
    }

    /// The 3x3 matrix left after deleting `row` and `col`
    pub fn try_submatrix(&self, row: usize, col: usize) -> Result<Matrix3> {
        if row < 4 && col < 4 {
            Ok(Matrix3::from_fn(|r, c| self.rows[skip_index(r, row)][skip_index(c, col)]))
        } else {
            Err(MathError::element(row, col, 4, "Matrix4"))
        }
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn submatrix(&self, row: usize, col: usize) -> Matrix3 {
        match self.try_submatrix(row, col) {
            Ok(sub) => sub,
            Err(err) => panic!("{err}"),
        }
    }

    /// Panics on an out-of-range index without touching `dest`.
    pub fn submatrix_into<'a>(&self, row: usize, col: usize, dest: &'a mut MutableMatrix3) -> &'a mut MutableMatrix3 {
        dest.commit(self.submatrix(row, col))
    }

    /// Translation by `offset`
    pub fn translation(offset: &Vector3) -> Self {
        Self::new(
            1.0, 0.0, 0.0, offset.x(),
            0.0, 1.0, 0.0, offset.y(),
            0.0, 0.0, 1.0, offset.z(),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_x(degrees: f32) -> Self {
        Self::from_matrix3(&Matrix3::rotation_x(degrees))
    }

    pub fn rotation_y(degrees: f32) -> Self {
        Self::from_matrix3(&Matrix3::rotation_y(degrees))
    }

    pub fn rotation_z(degrees: f32) -> Self {
        Self::from_matrix3(&Matrix3::rotation_z(degrees))
    }

    /// Rotation about a unit `axis`
    pub fn rotation(axis: &Vector3, degrees: f32) -> Self {
        Self::from_matrix3(&Matrix3::rotation(axis, degrees))
    }

    pub fn rotation_safe(axis: &Vector3, degrees: f32) -> Self {
        Self::from_matrix3(&Matrix3::rotation_safe(axis, degrees))
    }

    pub fn reflection(axis: &Vector3) -> Self {
        Self::from_matrix3(&Matrix3::reflection(axis))
    }

    pub fn reflection_safe(axis: &Vector3) -> Self {
        Self::from_matrix3(&Matrix3::reflection_safe(axis))
    }

    pub fn involution(axis: &Vector3) -> Self {
        Self::from_matrix3(&Matrix3::involution(axis))
    }

    pub fn involution_safe(axis: &Vector3) -> Self {
        Self::from_matrix3(&Matrix3::involution_safe(axis))
    }

    pub fn scaling(factor: f32) -> Self {
        Self::from_matrix3(&Matrix3::scaling(factor))
    }

    pub fn nonuniform_scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_matrix3(&Matrix3::nonuniform_scaling(sx, sy, sz))
    }

    pub fn scaling_along(axis: &Vector3, factor: f32) -> Self {
        Self::from_matrix3(&Matrix3::scaling_along(axis, factor))
    }

    pub fn scaling_along_safe(axis: &Vector3, factor: f32) -> Self {
        Self::from_matrix3(&Matrix3::scaling_along_safe(axis, factor))
    }

    /// Perspective projection of an arbitrary (possibly off-center)
    /// frustum. `near` and `far` are positive distances along -Z.
    pub fn perspective_frustum(top: f32, bottom: f32, right: f32, left: f32, near: f32, far: f32) -> Self {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;
        Self::new(
            2.0 * near / width, 0.0, (right + left) / width, 0.0,
            0.0, 2.0 * near / height, (top + bottom) / height, 0.0,
            0.0, 0.0, -(far + near) / depth, -2.0 * far * near / depth,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Symmetric perspective projection; `fov_y` in degrees
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = tan_deg(fov_y * 0.5) * near;
        let right = top * aspect;
        Self::perspective_frustum(top, -top, right, -right, near, far)
    }

    /// Orthographic projection of an arbitrary box
    pub fn orthographic_frustum(top: f32, bottom: f32, right: f32, left: f32, near: f32, far: f32) -> Self {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;
        Self::new(
            2.0 / width, 0.0, 0.0, -(right + left) / width,
            0.0, 2.0 / height, 0.0, -(top + bottom) / height,
            0.0, 0.0, -2.0 / depth, -(far + near) / depth,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Orthographic projection of a box centered on the view axis
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let (half_width, half_height) = (width * 0.5, height * 0.5);
        Self::orthographic_frustum(half_height, -half_height, half_width, -half_width, near, far)
    }

    /// Direction with implicit w = 0; never divided
    pub fn multiply_vector3(&self, vector: &Vector3) -> Vector3 {
        let v = vector.extend(0.0);
        self.multiply_vector(&v).truncate()
    }

    /// Point with implicit w = 1, divided by the computed w
    pub fn multiply_point(&self, point: &Point3D) -> Point3D {
        let h = self.multiply_vector(&point.to_vector().extend(1.0));
        Point3D::new(h.x() / h.w(), h.y() / h.w(), h.z() / h.w())
    }

    pub fn multiply_vector3_into<'a>(&self, vector: &Vector3, dest: &'a mut MutableVector3) -> &'a mut MutableVector3 {
        dest.commit(self.multiply_vector3(vector))
    }

    pub fn multiply_point_into<'a>(&self, point: &Point3D, dest: &'a mut MutablePoint3D) -> &'a mut MutablePoint3D {
        dest.commit(self.multiply_point(point))
    }
}

impl Mul<Vector3> for Matrix4 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.multiply_vector3(&rhs)
    }
}

impl Mul<Point3D> for Matrix4 {
    type Output = Point3D;

    fn mul(self, rhs: Point3D) -> Point3D {
        self.multiply_point(&rhs)
    }
}

impl MutableMatrix4 {
    pub fn make_translation(&mut self, offset: &Vector3) -> &mut Self {
        self.commit(Matrix4::translation(offset))
    }

    pub fn make_rotation_x(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix4::rotation_x(degrees))
    }

    pub fn make_rotation_y(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix4::rotation_y(degrees))
    }

    pub fn make_rotation_z(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix4::rotation_z(degrees))
    }

    pub fn make_rotation(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Matrix4::rotation(axis, degrees))
    }

    pub fn make_rotation_safe(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Matrix4::rotation_safe(axis, degrees))
    }

    pub fn make_reflection(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix4::reflection(axis))
    }

    pub fn make_reflection_safe(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix4::reflection_safe(axis))
    }

    pub fn make_involution(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix4::involution(axis))
    }

    pub fn make_involution_safe(&mut self, axis: &Vector3) -> &mut Self {
        self.commit(Matrix4::involution_safe(axis))
    }

    pub fn make_scaling(&mut self, factor: f32) -> &mut Self {
        self.commit(Matrix4::scaling(factor))
    }

    pub fn make_nonuniform_scaling(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.commit(Matrix4::nonuniform_scaling(sx, sy, sz))
    }

    pub fn make_scaling_along(&mut self, axis: &Vector3, factor: f32) -> &mut Self {
        self.commit(Matrix4::scaling_along(axis, factor))
    }

    pub fn make_scaling_along_safe(&mut self, axis: &Vector3, factor: f32) -> &mut Self {
        self.commit(Matrix4::scaling_along_safe(axis, factor))
    }

    pub fn make_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        self.commit(Matrix4::perspective(fov_y, aspect, near, far))
    }

    pub fn make_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) -> &mut Self {
        self.commit(Matrix4::orthographic(width, height, near, far))
    }
}

/// Arithmetic and equality between two different 4x4 shapes, carried out
/// on the dense form.
macro_rules! impl_mixed_matrix4_ops {
    ($lhs:ty, $rhs:ty) => {
        impl std::ops::Add<$rhs> for $lhs {
            type Output = $crate::matrix4::Matrix4;

            fn add(self, rhs: $rhs) -> $crate::matrix4::Matrix4 {
                use $crate::matrix4::Matrix4Like;
                self.to_matrix4() + rhs.to_matrix4()
            }
        }

        impl std::ops::Sub<$rhs> for $lhs {
            type Output = $crate::matrix4::Matrix4;

            fn sub(self, rhs: $rhs) -> $crate::matrix4::Matrix4 {
                use $crate::matrix4::Matrix4Like;
                self.to_matrix4() - rhs.to_matrix4()
            }
        }

        impl std::ops::Mul<$rhs> for $lhs {
            type Output = $crate::matrix4::Matrix4;

            fn mul(self, rhs: $rhs) -> $crate::matrix4::Matrix4 {
                use $crate::matrix4::Matrix4Like;
                self.to_matrix4().multiply(&rhs.to_matrix4())
            }
        }

        impl PartialEq<$rhs> for $lhs {
            fn eq(&self, other: &$rhs) -> bool {
                use $crate::matrix4::Matrix4Like;
                self.to_matrix4() == other.to_matrix4()
            }
        }
    };
}

pub(crate) use impl_mixed_matrix4_ops;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::CacheState;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sample() -> Matrix4 {
        Matrix4::new(
            2.0, 0.5, -1.0, 3.0,
            1.0, 4.0, 0.0, -2.0,
            0.0, -3.0, 5.0, 1.0,
            1.5, 0.0, 2.0, 6.0,
        )
    }

    fn counter() -> (Rc<Cell<usize>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn test_identity_default() {
        assert_eq!(Matrix4::default(), Matrix4::IDENTITY);
        assert!(Matrix4::IDENTITY.is_identity());
        assert_eq!(Matrix4::IDENTITY.determinant(), 1.0);
        assert_eq!(Matrix4::IDENTITY.inverse(), Matrix4::IDENTITY);
    }

    #[test]
    fn test_determinant_expansions_agree() {
        let m = sample();
        let along_row1: f32 = (0..4).map(|col| m[(1, col)] * m.cofactor(1, col)).sum();
        let along_column3: f32 = (0..4).map(|row| m[(row, 3)] * m.cofactor(row, 3)).sum();
        assert_relative_eq!(m.determinant(), along_row1, max_relative = 1e-5);
        assert_relative_eq!(m.determinant(), along_column3, max_relative = 1e-5);
    }

    #[test]
    fn test_inverse_both_orders() {
        let m = sample();
        let inv = m.inverse();
        assert_relative_eq!(m * inv, Matrix4::IDENTITY, epsilon = 1e-4);
        assert_relative_eq!(inv * m, Matrix4::IDENTITY, epsilon = 1e-4);
    }

    #[test]
    fn test_multiply_left() {
        let a = sample();
        let b = Matrix4::rotation_x(30.0);
        assert_eq!(a.multiply_left(&b), b * a);
        assert_relative_eq!(a.multiply(&b), a * b);
    }

    #[test]
    fn test_rows_columns_and_flattening() {
        let m = sample();
        assert_eq!(m.row2(), Vector4::new(0.0, -3.0, 5.0, 1.0));
        assert_eq!(m.column3(), Vector4::new(3.0, -2.0, 1.0, 6.0));
        assert_eq!(m.to_row_major_array()[4..8], [1.0, 4.0, 0.0, -2.0]);
        assert_eq!(m.to_column_major_array()[0..4], [2.0, 1.0, 0.0, 1.5]);

        let mut dest = MutableVector4::new();
        m.column_into(1, &mut dest);
        assert_eq!(dest.copy_immutable(), m.column1());
    }

    #[test]
    fn test_submatrix() {
        let m = sample();
        let sub = m.submatrix(3, 0);
        assert_eq!(
            sub,
            Matrix3::new(
                0.5, -1.0, 3.0,
                4.0, 0.0, -2.0,
                -3.0, 5.0, 1.0,
            )
        );
    }

    #[test]
    fn test_try_submatrix_rejects_bad_indices() {
        let m = sample();
        assert_eq!(m.try_submatrix(3, 0), Ok(m.submatrix(3, 0)));
        assert!(m.try_submatrix(9, 9).is_err());
        assert!(m.try_cofactor(4, 0).is_err());

        let mut dest = MutableMatrix3::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            m.submatrix_into(0, 4, &mut dest);
        }));
        assert!(result.is_err());
        assert_eq!(dest, Matrix3::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_submatrix_out_of_range_panics() {
        sample().submatrix(9, 9);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cofactor_out_of_range_panics() {
        Matrix4::IDENTITY.cofactor(0, 4);
    }

    #[test]
    fn test_vectors_are_not_translated_points_are() {
        let t = Matrix4::translation(&Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(t * Point3D::new(1.0, 1.0, 1.0), Point3D::new(2.0, 3.0, 4.0));
        assert_eq!(t * Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_perspective_dehomogenizes_points() {
        let m = Matrix4::perspective(90.0, 1.0, 1.0, 10.0);
        let p = Point3D::new(1.0, 2.0, -4.0);
        let h = m * p.to_vector().extend(1.0);
        assert_relative_eq!(h.w(), 4.0, epsilon = 1e-6);

        let projected = m * p;
        assert_relative_eq!(projected, Point3D::new(h.x() / 4.0, h.y() / 4.0, h.z() / 4.0), epsilon = 1e-6);

        // Vectors ignore the homogeneous row entirely.
        let v = m * Vector3::new(1.0, 2.0, -4.0);
        assert_relative_eq!(v, Vector3::new(h.x(), h.y(), h.z() - m.e23()), epsilon = 1e-5);
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let m = Matrix4::perspective(60.0, 1.5, 0.5, 50.0);
        assert_relative_eq!((m * Point3D::new(0.0, 0.0, -0.5)).z(), -1.0, epsilon = 1e-5);
        assert_relative_eq!((m * Point3D::new(0.0, 0.0, -50.0)).z(), 1.0, epsilon = 1e-4);
        assert_eq!(m.e32(), -1.0);
        assert_eq!(m.e33(), 0.0);
    }

    #[test]
    fn test_orthographic_frustum() {
        let m = Matrix4::orthographic_frustum(4.0, 0.0, 6.0, 2.0, 1.0, 11.0);
        assert_relative_eq!(m * Point3D::new(2.0, 0.0, -1.0), Point3D::new(-1.0, -1.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(m * Point3D::new(6.0, 4.0, -11.0), Point3D::new(1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_about_y_by_half_turn() {
        let m = Matrix4::rotation_y(180.0);
        assert_eq!(m * Vector3::X, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(m * Vector3::Z, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_observer_counts() {
        let (count, observer) = counter();
        let mut m = MutableMatrix4::with_observer(Matrix4::IDENTITY, observer);

        m.set_elements(
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
            13.0, 14.0, 15.0, 16.0,
        );
        assert_eq!(count.get(), 1);

        for row in 0..4 {
            for col in 0..4 {
                m.set_element(row, col, (row * 4 + col) as f32);
            }
        }
        assert_eq!(count.get(), 17);

        assert!(m.try_set_element(4, 0, 1.0).is_err());
        assert_eq!(count.get(), 17);
    }

    #[test]
    fn test_every_setter_invalidates() {
        let mut m = MutableMatrix4::from_value(sample());
        let setters: [fn(&mut MutableMatrix4, f32) -> &mut MutableMatrix4; 16] = [
            MutableMatrix4::set_e00, MutableMatrix4::set_e01, MutableMatrix4::set_e02, MutableMatrix4::set_e03,
            MutableMatrix4::set_e10, MutableMatrix4::set_e11, MutableMatrix4::set_e12, MutableMatrix4::set_e13,
            MutableMatrix4::set_e20, MutableMatrix4::set_e21, MutableMatrix4::set_e22, MutableMatrix4::set_e23,
            MutableMatrix4::set_e30, MutableMatrix4::set_e31, MutableMatrix4::set_e32, MutableMatrix4::set_e33,
        ];
        for (i, setter) in setters.iter().enumerate() {
            let before = m.inverse();
            let transpose_before = m.transpose();
            assert_eq!(m.inverse_state(), CacheState::Fresh);
            setter(&mut m, 10.0 + i as f32);
            assert_eq!(m.inverse_state(), CacheState::Stale);
            assert_eq!(m.transpose_state(), CacheState::Stale);
            assert!(!Rc::ptr_eq(&before, &m.inverse()));
            assert!(!Rc::ptr_eq(&transpose_before, &m.transpose()));
            assert_eq!(m[(i / 4, i % 4)], 10.0 + i as f32);
        }
    }

    #[test]
    fn test_in_place_operations_invalidate() {
        let (count, observer) = counter();
        let mut m = MutableMatrix4::with_observer(sample(), observer);

        let cached = m.inverse();
        m += Matrix4::IDENTITY;
        assert!(!Rc::ptr_eq(&cached, &m.inverse()));

        let cached = m.inverse();
        m *= 2.0;
        assert!(!Rc::ptr_eq(&cached, &m.inverse()));

        let cached = m.transpose();
        m.set_identity();
        assert!(!Rc::ptr_eq(&cached, &m.transpose()));
        assert_eq!(*m.transpose(), Matrix4::IDENTITY);

        m.make_rotation_y(90.0).multiply_left(&Matrix4::translation(&Vector3::X));
        assert_eq!(count.get(), 5);
        assert_relative_eq!(*m.inverse() * m.copy_immutable(), Matrix4::IDENTITY, epsilon = 1e-5);
    }

    #[test]
    fn test_destination_forms_notify_destination_once() {
        let (count, observer) = counter();
        let mut dest = MutableMatrix4::with_observer(Matrix4::ZERO, observer);
        let m = sample();

        m.inverse_into(&mut dest);
        assert_relative_eq!(dest.copy_immutable(), m.inverse());
        m.transpose_into(&mut dest);
        m.multiply_into(&Matrix4::IDENTITY, &mut dest);
        assert_eq!(dest.copy_immutable(), m);
        m.scale_into(0.5, &mut dest);
        assert_eq!(count.get(), 4);

        let mut point = MutablePoint3D::new();
        Matrix4::translation(&Vector3::Y).multiply_point_into(&Point3D::ORIGIN, &mut point);
        assert_eq!(point.copy_immutable(), Point3D::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_scale_by_zero_reciprocal_is_not_guarded() {
        let m = Matrix4::IDENTITY.scale(1.0 / 0.0);
        assert!(m.e00().is_infinite());
        assert!(m.e01().is_nan());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_element_index_panics() {
        let m = Matrix4::IDENTITY;
        let value = m[(0, 4)];
        assert_eq!(value, 0.0);
    }
}
