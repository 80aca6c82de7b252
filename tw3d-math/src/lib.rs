//! TW3D Math - row-major matrices, vectors, points and quaternions, with observable mutable variants

mod macros;

pub mod convert;
pub mod error;
mod matrix;
pub mod matrix2;
pub mod matrix3;
pub mod matrix4;
pub mod observer;
pub mod point;
pub mod projection;
pub mod quaternion;
pub mod scalar;
pub mod transform;
pub mod transformation;
pub mod vector;

// Re-export commonly used types
pub use error::{MathError, Result};
pub use matrix2::{Matrix2, MutableMatrix2};
pub use matrix3::{Matrix3, MutableMatrix3};
pub use matrix4::{Matrix4, Matrix4Like, MutableMatrix4};
pub use observer::{CacheState, Observer};
pub use point::{MutablePoint2D, MutablePoint3D, Point2D, Point3D};
pub use projection::{Camera, MutableProjection, Projection, ProjectionMode};
pub use quaternion::{MutableQuaternion, Quaternion};
pub use transform::{RotationState, Transform};
pub use transformation::{MutableTransformation, Transformation};
pub use vector::{
    Components, MutableVector2, MutableVector3, MutableVector4, PaddedArithmetic, Vector2, Vector3, Vector4,
};
