//! Model transforms assembled from position, rotation and scale.

use std::rc::Rc;

use tracing::trace;

use crate::matrix4::Matrix4;
use crate::observer::{CacheState, DerivedCache};
use crate::point::Point3D;
use crate::projection::Projection;
use crate::quaternion::Quaternion;
use crate::transformation::Transformation;
use crate::vector::Vector3;

/// Rotation state around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Apply rotations in order: X, then Y, then Z
    pub fn to_quaternion(&self) -> Quaternion {
        Quaternion::from_euler(self.x, self.y, self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Position, rotation and scale of a model, with the combined matrix
/// rebuilt lazily after any part changes.
///
/// The matrix is `Translation(position) * Scale(scale) * Rotation(rotation)`:
/// points are rotated first, then scaled along the world axes, then moved.
#[derive(Debug)]
pub struct Transform {
    position: Point3D,
    rotation: Quaternion,
    scale: Vector3,
    matrix: DerivedCache<Transformation>,
}

impl Transform {
    pub fn new(position: Point3D, rotation: Quaternion, scale: Vector3) -> Self {
        Self {
            position,
            rotation,
            scale,
            matrix: DerivedCache::new("Transform.matrix"),
        }
    }

    pub fn identity() -> Self {
        Self::new(Point3D::ORIGIN, Quaternion::IDENTITY, Vector3::new(1.0, 1.0, 1.0))
    }

    pub fn position(&self) -> Point3D {
        self.position
    }

    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Point3D) -> &mut Self {
        self.position = position;
        self.matrix.invalidate();
        self
    }

    pub fn set_rotation(&mut self, rotation: Quaternion) -> &mut Self {
        self.rotation = rotation;
        self.matrix.invalidate();
        self
    }

    pub fn set_euler(&mut self, rotation: &RotationState) -> &mut Self {
        self.set_rotation(rotation.to_quaternion())
    }

    pub fn set_scale(&mut self, scale: Vector3) -> &mut Self {
        self.scale = scale;
        self.matrix.invalidate();
        self
    }

    /// Move the position by `offset`
    pub fn translate(&mut self, offset: &Vector3) -> &mut Self {
        self.set_position(self.position + *offset)
    }

    /// Apply `rotation` after the current one
    pub fn rotate(&mut self, rotation: &Quaternion) -> &mut Self {
        self.set_rotation(*rotation * self.rotation)
    }

    /// The combined model matrix.
    ///
    /// Repeated reads return the same `Rc` until a part changes.
    pub fn matrix(&self) -> Rc<Transformation> {
        self.matrix.get_or_compute(|| {
            trace!(
                position = ?self.position,
                rotation = ?self.rotation,
                scale = ?self.scale,
                "rebuilding model matrix"
            );
            let translation = Transformation::translation(&self.position);
            let scale = Transformation::nonuniform_scaling(self.scale.x(), self.scale.y(), self.scale.z());
            translation * scale * self.rotation.to_transformation()
        })
    }

    pub fn matrix_state(&self) -> CacheState {
        self.matrix.state()
    }

    pub fn transform_point(&self, point: &Point3D) -> Point3D {
        self.matrix().multiply_point(point)
    }

    pub fn transform_vector(&self, vector: &Vector3) -> Vector3 {
        self.matrix().multiply_vector3(vector)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model: &Transformation, view: &Transformation, projection: &Projection) -> Matrix4 {
        *projection * (*view * *model)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Clone for Transform {
    fn clone(&self) -> Self {
        Self::new(self.position, self.rotation, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix4::Matrix4Like;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(10.0, 20.0, 30.0);
        assert!((state.x - 10.0).abs() < 1e-6);
        assert!((state.y - 20.0).abs() < 1e-6);
        assert!((state.z - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        assert_eq!(rotation.to_quaternion(), Quaternion::IDENTITY);
        assert_relative_eq!(*Transform::identity().matrix(), Transformation::IDENTITY);
    }

    #[test]
    fn test_matrix_composition_order() {
        let mut transform = Transform::identity();
        transform
            .set_position(Point3D::new(0.0, 5.0, 0.0))
            .set_rotation(Quaternion::from_axis_angle(&Vector3::Z, 90.0))
            .set_scale(Vector3::new(2.0, 1.0, 1.0));

        // X rotates onto Y, Y is left unscaled, then the point moves up.
        assert_relative_eq!(
            transform.transform_point(&Point3D::new(1.0, 0.0, 0.0)),
            Point3D::new(0.0, 6.0, 0.0),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            transform.transform_vector(&Vector3::new(0.0, 1.0, 0.0)),
            Vector3::new(-2.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_matrix_is_cached_until_changed() {
        let mut transform = Transform::identity();
        assert_eq!(transform.matrix_state(), CacheState::Stale);
        let first = transform.matrix();
        assert!(Rc::ptr_eq(&first, &transform.matrix()));
        assert_eq!(transform.matrix_state(), CacheState::Fresh);

        transform.translate(&Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.matrix_state(), CacheState::Stale);
        let second = transform.matrix();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(second.translation_part(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_euler_rotation() {
        let mut transform = Transform::identity();
        transform.set_euler(&RotationState::new(0.0, 90.0, 0.0));
        assert_relative_eq!(
            transform.transform_vector(&Vector3::new(0.0, 0.0, 1.0)),
            Vector3::new(1.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_mvp_matrix() {
        let model = Transformation::translation(&Point3D::new(0.0, 0.0, -5.0));
        let view = Transformation::IDENTITY;
        let projection = Projection::perspective(90.0, 1.0, 1.0, 10.0);
        let mvp = Transform::mvp_matrix(&model, &view, &projection);
        assert_relative_eq!(mvp, projection.to_matrix4() * model.to_matrix4());

        let clip = mvp.multiply_point(&Point3D::ORIGIN);
        assert_relative_eq!(clip.x(), 0.0);
        assert!(clip.z() > -1.0 && clip.z() < 1.0);
    }
}
