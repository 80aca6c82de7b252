//! 2x2 matrices: planar linear maps.

use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::matrix::impl_square_matrix;
use crate::point::{MutablePoint2D, Point2D};
use crate::scalar::sin_cos_deg;
use crate::vector::{MutableVector2, Vector2};

/// A 2x2 matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix2 {
    rows: [[f32; 2]; 2],
}

impl_square_matrix!(
    Matrix2, MutableMatrix2, 2,
    vector: Vector2, MutableVector2,
    elements: [
        e00 / set_e00 = (0, 0), e01 / set_e01 = (0, 1),
        e10 / set_e10 = (1, 0), e11 / set_e11 = (1, 1),
    ],
    rows: [row0 = 0, row1 = 1],
    columns: [column0 = 0, column1 = 1]
);

impl Matrix2 {
    /// `e00 * e11 - e01 * e10`
    pub fn determinant(&self) -> f32 {
        self.e00() * self.e11() - self.e01() * self.e10()
    }

    /// The single element left after deleting `row` and `col`
    pub fn try_minor(&self, row: usize, col: usize) -> Result<f32> {
        if row < 2 && col < 2 {
            Ok(self.rows[1 - row][1 - col])
        } else {
            Err(MathError::element(row, col, 2, "Matrix2"))
        }
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn minor(&self, row: usize, col: usize) -> f32 {
        match self.try_minor(row, col) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn adjugate(&self) -> Self {
        Self::new(self.e11(), -self.e01(), -self.e10(), self.e00())
    }

    /// `adjugate / determinant`; unspecified for a singular matrix
    pub fn inverse(&self) -> Self {
        self.adjugate().scale(1.0 / self.determinant())
    }

    /// Counter-clockwise rotation by `degrees`
    pub fn rotation(degrees: f32) -> Self {
        let (s, c) = sin_cos_deg(degrees);
        Self::new(c, -s, s, c)
    }

    pub fn scaling(factor: f32) -> Self {
        Self::new(factor, 0.0, 0.0, factor)
    }

    pub fn nonuniform_scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy)
    }

    /// Scale by `factor` along a unit `axis`, `I + (factor - 1) a a^T`
    pub fn scaling_along(axis: &Vector2, factor: f32) -> Self {
        let k = factor - 1.0;
        let (x, y) = (axis.x(), axis.y());
        Self::new(1.0 + k * x * x, k * x * y, k * x * y, 1.0 + k * y * y)
    }

    pub fn scaling_along_safe(axis: &Vector2, factor: f32) -> Self {
        Self::scaling_along(&axis.normalize(), factor)
    }

    /// Reflection across the line perpendicular to a unit `axis`,
    /// `I - 2 a a^T`
    pub fn reflection(axis: &Vector2) -> Self {
        let (x, y) = (axis.x(), axis.y());
        Self::new(1.0 - 2.0 * x * x, -2.0 * x * y, -2.0 * x * y, 1.0 - 2.0 * y * y)
    }

    pub fn reflection_safe(axis: &Vector2) -> Self {
        Self::reflection(&axis.normalize())
    }

    /// Involution through a unit `axis` (a half turn about it),
    /// `2 a a^T - I`
    pub fn involution(axis: &Vector2) -> Self {
        let (x, y) = (axis.x(), axis.y());
        Self::new(2.0 * x * x - 1.0, 2.0 * x * y, 2.0 * x * y, 2.0 * y * y - 1.0)
    }

    pub fn involution_safe(axis: &Vector2) -> Self {
        Self::involution(&axis.normalize())
    }

    /// Linear image of a point (no translation exists in 2x2)
    pub fn multiply_point(&self, point: &Point2D) -> Point2D {
        Point2D::from_vector(&self.multiply_vector(&point.to_vector()))
    }

    pub fn multiply_point_into<'a>(&self, point: &Point2D, dest: &'a mut MutablePoint2D) -> &'a mut MutablePoint2D {
        dest.commit(self.multiply_point(point))
    }
}

impl Mul<Point2D> for Matrix2 {
    type Output = Point2D;

    fn mul(self, rhs: Point2D) -> Point2D {
        self.multiply_point(&rhs)
    }
}

impl MutableMatrix2 {
    pub fn make_rotation(&mut self, degrees: f32) -> &mut Self {
        self.commit(Matrix2::rotation(degrees))
    }

    pub fn make_scaling(&mut self, factor: f32) -> &mut Self {
        self.commit(Matrix2::scaling(factor))
    }

    pub fn make_nonuniform_scaling(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.commit(Matrix2::nonuniform_scaling(sx, sy))
    }

    pub fn make_scaling_along(&mut self, axis: &Vector2, factor: f32) -> &mut Self {
        self.commit(Matrix2::scaling_along(axis, factor))
    }

    pub fn make_scaling_along_safe(&mut self, axis: &Vector2, factor: f32) -> &mut Self {
        self.commit(Matrix2::scaling_along_safe(axis, factor))
    }

    pub fn make_reflection(&mut self, axis: &Vector2) -> &mut Self {
        self.commit(Matrix2::reflection(axis))
    }

    pub fn make_reflection_safe(&mut self, axis: &Vector2) -> &mut Self {
        self.commit(Matrix2::reflection_safe(axis))
    }

    pub fn make_involution(&mut self, axis: &Vector2) -> &mut Self {
        self.commit(Matrix2::involution(axis))
    }

    pub fn make_involution_safe(&mut self, axis: &Vector2) -> &mut Self {
        self.commit(Matrix2::involution_safe(axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::CacheState;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sample() -> Matrix2 {
        Matrix2::new(4.0, 7.0, 2.0, 6.0)
    }

    #[test]
    fn test_determinant_and_inverse() {
        let m = sample();
        assert_eq!(m.determinant(), 10.0);
        let inv = m.inverse();
        assert_relative_eq!(inv, Matrix2::new(0.6, -0.7, -0.2, 0.4), epsilon = 1e-6);
        assert_relative_eq!(m * inv, Matrix2::IDENTITY, epsilon = 1e-5);
        assert_relative_eq!(inv * m, Matrix2::IDENTITY, epsilon = 1e-5);
    }

    #[test]
    fn test_singular_inverse_is_not_finite() {
        let m = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        assert_eq!(m.determinant(), 0.0);
        assert!(m.inverse().to_row_major_array().iter().any(|v| !v.is_finite()));
    }

    #[test]
    fn test_transpose_and_minor() {
        let m = sample();
        assert_eq!(m.transpose(), Matrix2::new(4.0, 2.0, 7.0, 6.0));
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.minor(0, 0), 6.0);
        assert_eq!(m.minor(0, 1), 2.0);
        assert_eq!(m.minor(1, 0), 7.0);
        assert_eq!(m.try_minor(1, 1), Ok(4.0));
        assert!(m.try_minor(2, 0).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_minor_out_of_range_panics() {
        Matrix2::new(1.0, 2.0, 3.0, 4.0).minor(5, 0);
    }

    #[test]
    fn test_rotation_definition() {
        let m = Matrix2::rotation(30.0);
        let (s, c) = (0.5f32, 3f32.sqrt() / 2.0);
        assert_relative_eq!(m, Matrix2::new(c, -s, s, c), epsilon = 1e-6);
        assert_relative_eq!(Matrix2::rotation(90.0) * Vector2::X, Vector2::Y, epsilon = 1e-6);
    }

    #[test]
    fn test_reflection_and_involution() {
        let r = Matrix2::reflection_safe(&Vector2::new(0.0, 3.0));
        assert_eq!(r * Vector2::new(2.0, 5.0), Vector2::new(2.0, -5.0));
        assert_relative_eq!(r * r, Matrix2::IDENTITY);

        let inv = Matrix2::involution(&Vector2::X);
        assert_eq!(inv * Vector2::new(2.0, 5.0), Vector2::new(2.0, -5.0));
        assert_relative_eq!(inv * inv, Matrix2::IDENTITY);
    }

    #[test]
    fn test_scaling_along_axis() {
        let m = Matrix2::scaling_along_safe(&Vector2::new(1.0, 1.0), 3.0);
        let along = Vector2::new(1.0, 1.0);
        let across = Vector2::new(1.0, -1.0);
        assert_relative_eq!(m * along, along * 3.0, epsilon = 1e-6);
        assert_relative_eq!(m * across, across, epsilon = 1e-6);
    }

    #[test]
    fn test_rows_and_columns() {
        let m = sample();
        assert_eq!(m.row0(), Vector2::new(4.0, 7.0));
        assert_eq!(m.column1(), Vector2::new(7.0, 6.0));
        assert_eq!(m.row(1), m.row1());
        assert!(m.try_column(2).is_err());
        assert_eq!(m.to_column_major_array(), [4.0, 2.0, 7.0, 6.0]);
    }

    #[test]
    fn test_mutable_cache_protocol() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut m = MutableMatrix2::with_observer(sample(), move || counter.set(counter.get() + 1));

        assert_eq!(m.inverse_state(), CacheState::Stale);
        let first = m.inverse();
        let second = m.inverse();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(m.inverse_state(), CacheState::Fresh);

        m.set_e01(0.0);
        assert_eq!(count.get(), 1);
        assert_eq!(m.inverse_state(), CacheState::Stale);
        let third = m.inverse();
        assert!(!Rc::ptr_eq(&first, &third));
        assert_relative_eq!(*third, Matrix2::new(0.25, 0.0, -1.0 / 12.0, 1.0 / 6.0), epsilon = 1e-6);
    }

    #[test]
    fn test_mutable_builders() {
        let mut m = MutableMatrix2::new();
        m.make_rotation(90.0).multiply(&Matrix2::rotation(90.0));
        assert_relative_eq!(m.copy_immutable(), Matrix2::rotation(180.0), epsilon = 1e-6);
        m.make_reflection_safe(&Vector2::new(2.0, 0.0));
        assert_eq!(m.copy_immutable(), Matrix2::new(-1.0, 0.0, 0.0, 1.0));
    }
}
