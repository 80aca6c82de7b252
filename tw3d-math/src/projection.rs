//! Sparse projection matrices and the camera that builds them.

use std::ops::{Add, AddAssign, Index, Mul, MulAssign, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::macros::{impl_approx_eq, mutable_type};
use crate::matrix4::{impl_mixed_matrix4_ops, Matrix4, Matrix4Like, MutableMatrix4};
use crate::point::{MutablePoint3D, Point3D};
use crate::scalar::tan_deg;
use crate::transformation::Transformation;
use crate::vector::{MutableVector3, MutableVector4, Vector3, Vector4};

/// A 4x4 projection matrix that is zero everywhere except e00, e11, e22,
/// e23, e32 and e33.
///
/// This is the shape of every symmetric orthographic or perspective
/// projection. Off-center frusta need the e02/e12 or e03/e13 terms and are
/// built as a general [`Matrix4`] instead (see
/// [`Matrix4::perspective_frustum`] and [`Matrix4::orthographic_frustum`]).
///
/// The shape is closed under products, sums, differences, scaling,
/// transposition and inversion, so those return a `Projection`. Combining
/// it with any other 4x4 shape yields a `Matrix4`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Projection {
    e00: f32,
    e11: f32,
    e22: f32,
    e23: f32,
    e32: f32,
    e33: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Projection {
    pub const IDENTITY: Self = Self::new(1.0, 1.0, 1.0, 0.0, 0.0, 1.0);
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    pub const fn new(e00: f32, e11: f32, e22: f32, e23: f32, e32: f32, e33: f32) -> Self {
        Self {
            e00,
            e11,
            e22,
            e23,
            e32,
            e33,
        }
    }

    pub const fn e00(&self) -> f32 {
        self.e00
    }

    pub const fn e11(&self) -> f32 {
        self.e11
    }

    pub const fn e22(&self) -> f32 {
        self.e22
    }

    pub const fn e23(&self) -> f32 {
        self.e23
    }

    pub const fn e32(&self) -> f32 {
        self.e32
    }

    pub const fn e33(&self) -> f32 {
        self.e33
    }

    /// Orthographic projection of a `width` x `height` box centered on the
    /// view axis, between `near` and `far` along -Z
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let (half_width, half_height) = (width * 0.5, height * 0.5);
        Self::orthographic_complete(half_height, -half_height, half_width, -half_width, near, far)
    }

    /// Orthographic projection from explicit planes.
    ///
    /// Only the extents of the box are kept; the offset of an off-center
    /// box does not fit this shape and is dropped.
    pub fn orthographic_complete(top: f32, bottom: f32, right: f32, left: f32, near: f32, far: f32) -> Self {
        let depth = far - near;
        Self::new(
            2.0 / (right - left),
            2.0 / (top - bottom),
            -2.0 / depth,
            -(far + near) / depth,
            0.0,
            1.0,
        )
    }

    /// Perspective projection; `fov_y` is the vertical field of view in
    /// degrees and `aspect` is width over height
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = tan_deg(fov_y * 0.5) * near;
        let right = top * aspect;
        Self::perspective_complete(top, -top, right, -right, near, far)
    }

    /// Perspective projection from explicit near-plane extents.
    ///
    /// Only the extents are kept; the skew of an off-center frustum is
    /// dropped.
    pub fn perspective_complete(top: f32, bottom: f32, right: f32, left: f32, near: f32, far: f32) -> Self {
        let depth = far - near;
        Self::new(
            2.0 * near / (right - left),
            2.0 * near / (top - bottom),
            -(far + near) / depth,
            -2.0 * far * near / depth,
            -1.0,
            0.0,
        )
    }

    /// Element at (`row`, `col`), zero outside the stored pattern
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        match (row, col) {
            (0, 0) => Ok(self.e00),
            (1, 1) => Ok(self.e11),
            (2, 2) => Ok(self.e22),
            (2, 3) => Ok(self.e23),
            (3, 2) => Ok(self.e32),
            (3, 3) => Ok(self.e33),
            (r, c) if r < 4 && c < 4 => Ok(0.0),
            _ => Err(MathError::element(row, col, 4, "Projection")),
        }
    }

    pub fn to_row_major_array(&self) -> [f32; 16] {
        self.to_matrix4().to_row_major_array()
    }

    pub fn to_column_major_array(&self) -> [f32; 16] {
        self.to_matrix4().to_column_major_array()
    }

    fn depth_block_determinant(&self) -> f32 {
        self.e22 * self.e33 - self.e23 * self.e32
    }

    pub fn determinant(&self) -> f32 {
        self.e00 * self.e11 * self.depth_block_determinant()
    }

    /// Swaps e23 and e32
    pub fn transpose(&self) -> Self {
        Self::new(self.e00, self.e11, self.e22, self.e32, self.e23, self.e33)
    }

    /// Inverse of the diagonal terms and of the 2x2 depth block.
    ///
    /// Not guarded: a singular projection yields infinities or NaNs.
    pub fn inverse(&self) -> Self {
        let block = 1.0 / self.depth_block_determinant();
        Self::new(
            1.0 / self.e00,
            1.0 / self.e11,
            self.e33 * block,
            -self.e23 * block,
            -self.e32 * block,
            self.e22 * block,
        )
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.e00 * factor,
            self.e11 * factor,
            self.e22 * factor,
            self.e23 * factor,
            self.e32 * factor,
            self.e33 * factor,
        )
    }

    /// `self * other`
    pub fn multiply(&self, other: &Self) -> Self {
        let (a, b) = (self, other);
        Self::new(
            a.e00 * b.e00,
            a.e11 * b.e11,
            a.e22 * b.e22 + a.e23 * b.e32,
            a.e22 * b.e23 + a.e23 * b.e33,
            a.e32 * b.e22 + a.e33 * b.e32,
            a.e32 * b.e23 + a.e33 * b.e33,
        )
    }

    /// `other * self`
    pub fn multiply_left(&self, other: &Self) -> Self {
        other.multiply(self)
    }

    pub fn multiply_vector4(&self, v: &Vector4) -> Vector4 {
        Vector4::new(
            self.e00 * v.x(),
            self.e11 * v.y(),
            self.e22 * v.z() + self.e23 * v.w(),
            self.e32 * v.z() + self.e33 * v.w(),
        )
    }

    /// Direction with implicit w = 0; never divided
    pub fn multiply_vector3(&self, v: &Vector3) -> Vector3 {
        Vector3::new(self.e00 * v.x(), self.e11 * v.y(), self.e22 * v.z())
    }

    /// Point with implicit w = 1, divided by the computed w
    pub fn multiply_point(&self, p: &Point3D) -> Point3D {
        let w = self.e32 * p.z() + self.e33;
        Point3D::new(
            self.e00 * p.x() / w,
            self.e11 * p.y() / w,
            (self.e22 * p.z() + self.e23) / w,
        )
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx::AbsDiffEq::abs_diff_eq(self, other, epsilon)
    }

    pub fn multiply_into<'a>(&self, other: &Self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(self.multiply(other))
    }

    pub fn multiply_left_into<'a>(&self, other: &Self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(self.multiply_left(other))
    }

    pub fn transpose_into<'a>(&self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(self.transpose())
    }

    pub fn inverse_into<'a>(&self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(self.inverse())
    }

    pub fn add_into<'a>(&self, other: &Self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(*self + *other)
    }

    pub fn subtract_into<'a>(&self, other: &Self, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(*self - *other)
    }

    pub fn scale_into<'a>(&self, factor: f32, dest: &'a mut MutableProjection) -> &'a mut MutableProjection {
        dest.commit(self.scale(factor))
    }

    /// Write the dense form into a general matrix destination
    pub fn to_matrix4_into<'a>(&self, dest: &'a mut MutableMatrix4) -> &'a mut MutableMatrix4 {
        dest.commit(self.to_matrix4())
    }

    pub fn multiply_vector4_into<'a>(&self, v: &Vector4, dest: &'a mut MutableVector4) -> &'a mut MutableVector4 {
        dest.commit(self.multiply_vector4(v))
    }

    pub fn multiply_vector3_into<'a>(&self, v: &Vector3, dest: &'a mut MutableVector3) -> &'a mut MutableVector3 {
        dest.commit(self.multiply_vector3(v))
    }

    pub fn multiply_point_into<'a>(&self, p: &Point3D, dest: &'a mut MutablePoint3D) -> &'a mut MutablePoint3D {
        dest.commit(self.multiply_point(p))
    }
}

impl Matrix4Like for Projection {
    fn element(&self, row: usize, col: usize) -> f32 {
        self[(row, col)]
    }
}

impl From<Projection> for Matrix4 {
    fn from(projection: Projection) -> Self {
        projection.to_matrix4()
    }
}

impl Index<(usize, usize)> for Projection {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        match (row, col) {
            (0, 0) => &self.e00,
            (1, 1) => &self.e11,
            (2, 2) => &self.e22,
            (2, 3) => &self.e23,
            (3, 2) => &self.e32,
            (3, 3) => &self.e33,
            (r, c) if r < 4 && c < 4 => &0.0,
            _ => panic!("{}", MathError::element(row, col, 4, "Projection")),
        }
    }
}

impl Add for Projection {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.e00 + rhs.e00,
            self.e11 + rhs.e11,
            self.e22 + rhs.e22,
            self.e23 + rhs.e23,
            self.e32 + rhs.e32,
            self.e33 + rhs.e33,
        )
    }
}

impl Sub for Projection {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.e00 - rhs.e00,
            self.e11 - rhs.e11,
            self.e22 - rhs.e22,
            self.e23 - rhs.e23,
            self.e32 - rhs.e32,
            self.e33 - rhs.e33,
        )
    }
}

impl Mul for Projection {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Mul<f32> for Projection {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Mul<Vector4> for Projection {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.multiply_vector4(&rhs)
    }
}

impl Mul<Vector3> for Projection {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.multiply_vector3(&rhs)
    }
}

impl Mul<Point3D> for Projection {
    type Output = Point3D;

    fn mul(self, rhs: Point3D) -> Point3D {
        self.multiply_point(&rhs)
    }
}

impl_mixed_matrix4_ops!(Projection, Matrix4);
impl_mixed_matrix4_ops!(Matrix4, Projection);

impl_approx_eq!(Projection, to_row_major_array);

mutable_type!(
    /// A [`Projection`] that changes in place, notifies an observer once per
    /// change, and caches its transpose and inverse.
    MutableProjection,
    Projection,
    transpose: Projection,
    inverse: Projection
);

impl MutableProjection {
    /// Set all six stored elements, notifying once
    pub fn set_elements(&mut self, e00: f32, e11: f32, e22: f32, e23: f32, e32: f32, e33: f32) -> &mut Self {
        self.commit(Projection::new(e00, e11, e22, e23, e32, e33))
    }

    pub fn set_e00(&mut self, e00: f32) -> &mut Self {
        self.update(|p| Projection { e00, ..*p })
    }

    pub fn set_e11(&mut self, e11: f32) -> &mut Self {
        self.update(|p| Projection { e11, ..*p })
    }

    pub fn set_e22(&mut self, e22: f32) -> &mut Self {
        self.update(|p| Projection { e22, ..*p })
    }

    pub fn set_e23(&mut self, e23: f32) -> &mut Self {
        self.update(|p| Projection { e23, ..*p })
    }

    pub fn set_e32(&mut self, e32: f32) -> &mut Self {
        self.update(|p| Projection { e32, ..*p })
    }

    pub fn set_e33(&mut self, e33: f32) -> &mut Self {
        self.update(|p| Projection { e33, ..*p })
    }

    /// Assign a stored element.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range or outside the stored pattern.
    pub fn set_element(&mut self, row: usize, col: usize, value: f32) -> &mut Self {
        match self.try_set_element(row, col, value) {
            Ok(this) => this,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_set_element(&mut self, row: usize, col: usize, value: f32) -> Result<&mut Self> {
        match (row, col) {
            (0, 0) => Ok(self.set_e00(value)),
            (1, 1) => Ok(self.set_e11(value)),
            (2, 2) => Ok(self.set_e22(value)),
            (2, 3) => Ok(self.set_e23(value)),
            (3, 2) => Ok(self.set_e32(value)),
            (3, 3) => Ok(self.set_e33(value)),
            (r, c) if r < 4 && c < 4 => Err(MathError::fixed(row, col, "MutableProjection")),
            _ => Err(MathError::element(row, col, 4, "MutableProjection")),
        }
    }

    pub fn set_identity(&mut self) -> &mut Self {
        self.commit(Projection::IDENTITY)
    }

    pub fn set_zero(&mut self) -> &mut Self {
        self.commit(Projection::ZERO)
    }

    pub fn make_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) -> &mut Self {
        self.commit(Projection::orthographic(width, height, near, far))
    }

    pub fn make_orthographic_complete(
        &mut self,
        top: f32,
        bottom: f32,
        right: f32,
        left: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.commit(Projection::orthographic_complete(top, bottom, right, left, near, far))
    }

    pub fn make_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        self.commit(Projection::perspective(fov_y, aspect, near, far))
    }

    pub fn make_perspective_complete(
        &mut self,
        top: f32,
        bottom: f32,
        right: f32,
        left: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.commit(Projection::perspective_complete(top, bottom, right, left, near, far))
    }

    pub fn transpose_in_place(&mut self) -> &mut Self {
        self.update(|p| p.transpose())
    }

    pub fn invert(&mut self) -> &mut Self {
        self.update(|p| p.inverse())
    }

    pub fn scale(&mut self, factor: f32) -> &mut Self {
        self.update(|p| p.scale(factor))
    }

    pub fn multiply(&mut self, other: &Projection) -> &mut Self {
        self.update(|p| p.multiply(other))
    }

    pub fn multiply_left(&mut self, other: &Projection) -> &mut Self {
        self.update(|p| p.multiply_left(other))
    }
}

impl AddAssign<Projection> for MutableProjection {
    fn add_assign(&mut self, rhs: Projection) {
        self.update(|p| *p + rhs);
    }
}

impl SubAssign<Projection> for MutableProjection {
    fn sub_assign(&mut self, rhs: Projection) {
        self.update(|p| *p - rhs);
    }
}

impl MulAssign<f32> for MutableProjection {
    fn mul_assign(&mut self, rhs: f32) {
        self.update(|p| p.scale(rhs));
    }
}

impl MulAssign<Projection> for MutableProjection {
    fn mul_assign(&mut self, rhs: Projection) {
        self.update(|p| p.multiply(&rhs));
    }
}

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
pub struct Camera {
    pub position: Point3D,
    pub target: Point3D,
    pub up: Vector3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3D::new(0.0, 0.0, 5.0),
            target: Point3D::ORIGIN,
            up: Vector3::Y,
            fov: 45.0,
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Transformation {
        Transformation::look_at(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection(&self) -> Projection {
        match self.mode {
            ProjectionMode::Perspective => Projection::perspective(self.fov, self.aspect, self.near, self.far),
            ProjectionMode::Orthographic => {
                let height = self.position.distance(&self.target);
                let width = height * self.aspect;
                Projection::orthographic(width, height, self.near, self.far)
            }
        }
    }

    /// Projection times view
    pub fn view_projection(&self) -> Matrix4 {
        self.projection() * self.view_matrix()
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns `(x, y, depth)` in pixels and normalized depth, or `None`
    /// when the point is behind the camera or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3D,
        model_matrix: &Transformation,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection() * (self.view_matrix() * *model_matrix);

        // Transform to clip space
        let clip = mvp.multiply_vector(&point.to_vector().extend(1.0));

        // Prevent division by near-zero w values
        if clip.w() < 1e-6 {
            return None;
        }

        let ndc_x = clip.x() / clip.w();
        let ndc_y = clip.y() / clip.w();
        let depth = clip.z() / clip.w();

        // Clip test
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
