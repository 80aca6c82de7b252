//! Affine 4x4 transformations.

use std::ops::{Add, Index, Mul, MulAssign, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::macros::{impl_approx_eq, mutable_type};
use crate::matrix3::Matrix3;
use crate::matrix4::{impl_mixed_matrix4_ops, Matrix4, Matrix4Like, MutableMatrix4};
use crate::point::{MutablePoint3D, Point3D};
use crate::projection::Projection;
use crate::vector::{MutableVector3, Vector3, Vector4};

const IMPLIED_ROW: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// An affine transformation: a 3x3 linear block plus a translation column.
///
/// The bottom row is always `[0, 0, 0, 1]`. Products and inverses stay
/// affine; sums, differences, scaled copies and transposes come back as
/// [`Matrix4`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transformation {
    rows: [[f32; 4]; 3],
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

macro_rules! stored_elements {
    ($($get:ident / $set:ident = ($row:literal, $col:literal)),+ $(,)?) => {
        impl Transformation {
            $(
                pub const fn $get(&self) -> f32 {
                    self.rows[$row][$col]
                }
            )+
        }

        impl MutableTransformation {
            $(
                pub fn $set(&mut self, value: f32) -> &mut Self {
                    self.update(|t| {
                        let mut rows = t.rows;
                        rows[$row][$col] = value;
                        Transformation { rows }
                    })
                }
            )+
        }
    };
}

stored_elements!(
    e00 / set_e00 = (0, 0), e01 / set_e01 = (0, 1), e02 / set_e02 = (0, 2), e03 / set_e03 = (0, 3),
    e10 / set_e10 = (1, 0), e11 / set_e11 = (1, 1), e12 / set_e12 = (1, 2), e13 / set_e13 = (1, 3),
    e20 / set_e20 = (2, 0), e21 / set_e21 = (2, 1), e22 / set_e22 = (2, 2), e23 / set_e23 = (2, 3),
);

impl Transformation {
    pub const IDENTITY: Self = Self::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]);

    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        e00: f32, e01: f32, e02: f32, e03: f32,
        e10: f32, e11: f32, e12: f32, e13: f32,
        e20: f32, e21: f32, e22: f32, e23: f32,
    ) -> Self {
        Self::from_rows([
            [e00, e01, e02, e03],
            [e10, e11, e12, e13],
            [e20, e21, e22, e23],
        ])
    }

    /// The three stored rows
    pub const fn from_rows(rows: [[f32; 4]; 3]) -> Self {
        Self { rows }
    }

    pub const fn to_rows(&self) -> [[f32; 4]; 3] {
        self.rows
    }

    /// A linear map with no translation
    pub fn from_linear(linear: &Matrix3) -> Self {
        Self::from_linear_translation(linear, &Vector3::ZERO)
    }

    pub fn from_linear_translation(linear: &Matrix3, translation: &Vector3) -> Self {
        let t = translation.to_array();
        let mut rows = [[0.0; 4]; 3];
        for (row, values) in rows.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().take(3).enumerate() {
                *value = linear[(row, col)];
            }
            values[3] = t[row];
        }
        Self { rows }
    }

    /// Moves the origin to `point`
    pub fn translation(point: &Point3D) -> Self {
        Self::new(
            1.0, 0.0, 0.0, point.x(),
            0.0, 1.0, 0.0, point.y(),
            0.0, 0.0, 1.0, point.z(),
        )
    }

    pub fn rotation_x(degrees: f32) -> Self {
        Self::from_linear(&Matrix3::rotation_x(degrees))
    }

    pub fn rotation_y(degrees: f32) -> Self {
        Self::from_linear(&Matrix3::rotation_y(degrees))
    }

    pub fn rotation_z(degrees: f32) -> Self {
        Self::from_linear(&Matrix3::rotation_z(degrees))
    }

    /// Rotation about a unit `axis`
    pub fn rotation(axis: &Vector3, degrees: f32) -> Self {
        Self::from_linear(&Matrix3::rotation(axis, degrees))
    }

    pub fn rotation_safe(axis: &Vector3, degrees: f32) -> Self {
        Self::from_linear(&Matrix3::rotation_safe(axis, degrees))
    }

    pub fn scaling(factor: f32) -> Self {
        Self::from_linear(&Matrix3::scaling(factor))
    }

    pub fn nonuniform_scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_linear(&Matrix3::nonuniform_scaling(sx, sy, sz))
    }

    /// View transformation for a camera at `eye` looking at `target`.
    ///
    /// Right-handed: the camera looks down its local -Z with `up` roughly
    /// along +Y. `up` must not be parallel to the viewing direction.
    pub fn look_at(eye: &Point3D, target: &Point3D, up: &Vector3) -> Self {
        let forward = (*target - *eye).normalize();
        let side = forward.cross(up).normalize();
        let camera_up = side.cross(&forward);
        let eye = eye.to_vector();

        Self::new(
            side.x(), side.y(), side.z(), -side.dot(&eye),
            camera_up.x(), camera_up.y(), camera_up.z(), -camera_up.dot(&eye),
            -forward.x(), -forward.y(), -forward.z(), forward.dot(&eye),
        )
    }

    /// Element at (`row`, `col`), including the implied bottom row
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        if row >= 4 || col >= 4 {
            return Err(MathError::element(row, col, 4, "Transformation"));
        }
        Ok(self[(row, col)])
    }

    /// The upper-left 3x3 block
    pub fn linear_part(&self) -> Matrix3 {
        Matrix3::from_fn(|row, col| self.rows[row][col])
    }

    /// The translation column
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }

    pub fn to_row_major_array(&self) -> [f32; 16] {
        self.to_matrix4().to_row_major_array()
    }

    pub fn to_column_major_array(&self) -> [f32; 16] {
        self.to_matrix4().to_column_major_array()
    }

    /// Determinant of the linear block; the implied row contributes 1
    pub fn determinant(&self) -> f32 {
        self.linear_part().determinant()
    }

    /// Inverse linear block with the translation carried back through it.
    ///
    /// Not guarded: a singular linear block yields infinities or NaNs.
    pub fn inverse(&self) -> Self {
        let linear = self.linear_part().inverse();
        let translation = -linear.multiply_vector(&self.translation_part());
        Self::from_linear_translation(&linear, &translation)
    }

    /// Transposing moves the translation into the bottom row, so the result
    /// is general
    pub fn transpose(&self) -> Matrix4 {
        self.to_matrix4().transpose()
    }

    pub fn scale(&self, factor: f32) -> Matrix4 {
        self.to_matrix4().scale(factor)
    }

    /// `self * other`
    pub fn multiply(&self, other: &Self) -> Self {
        let linear = self.linear_part();
        let translation = linear.multiply_vector(&other.translation_part()) + self.translation_part();
        Self::from_linear_translation(&linear.multiply(&other.linear_part()), &translation)
    }

    /// `other * self`
    pub fn multiply_left(&self, other: &Self) -> Self {
        other.multiply(self)
    }

    /// Point with implicit w = 1; the resulting w is always 1
    pub fn multiply_point(&self, p: &Point3D) -> Point3D {
        let [x, y, z] = self.rows.map(|row| row[0] * p.x() + row[1] * p.y() + row[2] * p.z() + row[3]);
        Point3D::new(x, y, z)
    }

    /// Direction with implicit w = 0, unaffected by translation
    pub fn multiply_vector3(&self, v: &Vector3) -> Vector3 {
        let [x, y, z] = self.rows.map(|row| row[0] * v.x() + row[1] * v.y() + row[2] * v.z());
        Vector3::new(x, y, z)
    }

    pub fn multiply_vector4(&self, v: &Vector4) -> Vector4 {
        let [x, y, z] = self.rows.map(|row| row[0] * v.x() + row[1] * v.y() + row[2] * v.z() + row[3] * v.w());
        Vector4::new(x, y, z, v.w())
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx::AbsDiffEq::abs_diff_eq(self, other, epsilon)
    }

    pub fn multiply_into<'a>(&self, other: &Self, dest: &'a mut MutableTransformation) -> &'a mut MutableTransformation {
        dest.commit(self.multiply(other))
    }

    pub fn multiply_left_into<'a>(
        &self,
        other: &Self,
        dest: &'a mut MutableTransformation,
    ) -> &'a mut MutableTransformation {
        dest.commit(self.multiply_left(other))
    }

    pub fn inverse_into<'a>(&self, dest: &'a mut MutableTransformation) -> &'a mut MutableTransformation {
        dest.commit(self.inverse())
    }

    pub fn transpose_into<'a>(&self, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(self.transpose())
    }

    pub fn add_into<'a>(&self, other: &Self, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(*self + *other)
    }

    pub fn subtract_into<'a>(&self, other: &Self, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(*self - *other)
    }

    pub fn scale_into<'a>(&self, factor: f32, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(self.scale(factor))
    }

    pub fn to_matrix4_into<'a>(&self, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(self.to_matrix4())
    }

    pub fn multiply_point_into<'a>(&self, p: &Point3D, dest: &'a mut MutablePoint3D) -> &'a mut MutablePoint3D {
        dest.commit(self.multiply_point(p))
    }

    pub fn multiply_vector3_into<'a>(&self, v: &Vector3, dest: &'a mut MutableVector3) -> &'a mut MutableVector3 {
        dest.commit(self.multiply_vector3(v))
    }
}

impl Matrix4Like for Transformation {
    fn element(&self, row: usize, col: usize) -> f32 {
        self[(row, col)]
    }
}

impl From<Transformation> for Matrix4 {
    fn from(transformation: Transformation) -> Self {
        transformation.to_matrix4()
    }
}

impl Index<(usize, usize)> for Transformation {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        match (row, col) {
            (0..=2, 0..=3) => &self.rows[row][col],
            (3, 0..=3) => &IMPLIED_ROW[col],
            _ => panic!("{}", MathError::element(row, col, 4, "Transformation")),
        }
    }
}

impl Add for Transformation {
    type Output = Matrix4;

    fn add(self, rhs: Self) -> Matrix4 {
        self.to_matrix4() + rhs.to_matrix4()
    }
}

impl Sub for Transformation {
    type Output = Matrix4;

    fn sub(self, rhs: Self) -> Matrix4 {
        self.to_matrix4() - rhs.to_matrix4()
    }
}

impl Mul for Transformation {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Mul<f32> for Transformation {
    type Output = Matrix4;

    fn mul(self, rhs: f32) -> Matrix4 {
        self.scale(rhs)
    }
}

impl Mul<Point3D> for Transformation {
    type Output = Point3D;

    fn mul(self, rhs: Point3D) -> Point3D {
        self.multiply_point(&rhs)
    }
}

impl Mul<Vector3> for Transformation {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.multiply_vector3(&rhs)
    }
}

impl Mul<Vector4> for Transformation {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.multiply_vector4(&rhs)
    }
}

impl_mixed_matrix4_ops!(Transformation, Matrix4);
impl_mixed_matrix4_ops!(Matrix4, Transformation);
impl_mixed_matrix4_ops!(Transformation, Projection);
impl_mixed_matrix4_ops!(Projection, Transformation);

impl_approx_eq!(Transformation, to_row_major_array);

mutable_type!(
    /// A [`Transformation`] that changes in place, notifies an observer once
    /// per change, and caches its transpose and inverse.
    MutableTransformation,
    Transformation,
    transpose: Matrix4,
    inverse: Transformation
);

impl MutableTransformation {
    #[allow(clippy::too_many_arguments)]
    pub fn set_elements(
        &mut self,
        e00: f32, e01: f32, e02: f32, e03: f32,
        e10: f32, e11: f32, e12: f32, e13: f32,
        e20: f32, e21: f32, e22: f32, e23: f32,
    ) -> &mut Self {
        self.commit(Transformation::new(
            e00, e01, e02, e03,
            e10, e11, e12, e13,
            e20, e21, e22, e23,
        ))
    }

    pub fn set_rows(&mut self, rows: [[f32; 4]; 3]) -> &mut Self {
        self.commit(Transformation::from_rows(rows))
    }

    /// Assign a stored element.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range or in the implied bottom row.
    pub fn set_element(&mut self, row: usize, col: usize, value: f32) -> &mut Self {
        match self.try_set_element(row, col, value) {
            Ok(this) => this,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_set_element(&mut self, row: usize, col: usize, value: f32) -> Result<&mut Self> {
        match (row, col) {
            (0..=2, 0..=3) => Ok(self.update(|t| {
                let mut rows = t.rows;
                rows[row][col] = value;
                Transformation { rows }
            })),
            (3, 0..=3) => Err(MathError::fixed(row, col, "MutableTransformation")),
            _ => Err(MathError::element(row, col, 4, "MutableTransformation")),
        }
    }

    /// Replace the linear block, keeping the translation
    pub fn set_linear(&mut self, linear: &Matrix3) -> &mut Self {
        self.update(|t| Transformation::from_linear_translation(linear, &t.translation_part()))
    }

    /// Replace the translation column, keeping the linear block
    pub fn set_translation(&mut self, point: &Point3D) -> &mut Self {
        self.update(|t| Transformation::from_linear_translation(&t.linear_part(), &point.to_vector()))
    }

    /// Shift the result of the map by `offset`
    pub fn translate(&mut self, offset: &Vector3) -> &mut Self {
        self.update(|t| Transformation::from_linear_translation(&t.linear_part(), &(t.translation_part() + *offset)))
    }

    pub fn set_identity(&mut self) -> &mut Self {
        self.commit(Transformation::IDENTITY)
    }

    pub fn make_translation(&mut self, point: &Point3D) -> &mut Self {
        self.commit(Transformation::translation(point))
    }

    pub fn make_rotation_x(&mut self, degrees: f32) -> &mut Self {
        self.commit(Transformation::rotation_x(degrees))
    }

    pub fn make_rotation_y(&mut self, degrees: f32) -> &mut Self {
        self.commit(Transformation::rotation_y(degrees))
    }

    pub fn make_rotation_z(&mut self, degrees: f32) -> &mut Self {
        self.commit(Transformation::rotation_z(degrees))
    }

    pub fn make_rotation(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Transformation::rotation(axis, degrees))
    }

    pub fn make_rotation_safe(&mut self, axis: &Vector3, degrees: f32) -> &mut Self {
        self.commit(Transformation::rotation_safe(axis, degrees))
    }

    pub fn make_scaling(&mut self, factor: f32) -> &mut Self {
        self.commit(Transformation::scaling(factor))
    }

    pub fn make_nonuniform_scaling(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.commit(Transformation::nonuniform_scaling(sx, sy, sz))
    }

    pub fn make_look_at(&mut self, eye: &Point3D, target: &Point3D, up: &Vector3) -> &mut Self {
        self.commit(Transformation::look_at(eye, target, up))
    }

    pub fn invert(&mut self) -> &mut Self {
        self.update(|t| t.inverse())
    }

    pub fn multiply(&mut self, other: &Transformation) -> &mut Self {
        self.update(|t| t.multiply(other))
    }

    pub fn multiply_left(&mut self, other: &Transformation) -> &mut Self {
        self.update(|t| t.multiply_left(other))
    }
}

impl MulAssign<Transformation> for MutableTransformation {
    fn mul_assign(&mut self, rhs: Transformation) {
        self.update(|t| t.multiply(&rhs));
    }
}
