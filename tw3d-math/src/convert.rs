//! Conversions to and from `nalgebra`.

use crate::matrix2::Matrix2;
use crate::matrix3::Matrix3;
use crate::matrix4::{Matrix4, Matrix4Like};
use crate::point::{Point2D, Point3D};
use crate::projection::Projection;
use crate::quaternion::Quaternion;
use crate::transformation::Transformation;
use crate::vector::{Vector2, Vector3, Vector4};

macro_rules! convert_vector {
    ($ours:ident <=> $theirs:ident, [$($field:ident),+]) => {
        impl From<$ours> for nalgebra::$theirs<f32> {
            fn from(v: $ours) -> Self {
                nalgebra::$theirs::new($(v.$field()),+)
            }
        }

        impl From<nalgebra::$theirs<f32>> for $ours {
            fn from(v: nalgebra::$theirs<f32>) -> Self {
                $ours::new($(v.$field),+)
            }
        }
    };
}

convert_vector!(Vector2 <=> Vector2, [x, y]);
convert_vector!(Vector3 <=> Vector3, [x, y, z]);
convert_vector!(Vector4 <=> Vector4, [x, y, z, w]);
convert_vector!(Point2D <=> Point2, [x, y]);
convert_vector!(Point3D <=> Point3, [x, y, z]);

macro_rules! convert_matrix {
    ($ours:ident <=> $theirs:ident) => {
        impl From<$ours> for nalgebra::$theirs<f32> {
            fn from(m: $ours) -> Self {
                nalgebra::$theirs::from_fn(|row, col| m[(row, col)])
            }
        }

        impl From<nalgebra::$theirs<f32>> for $ours {
            fn from(m: nalgebra::$theirs<f32>) -> Self {
                $ours::from_fn(|row, col| m[(row, col)])
            }
        }
    };
}

convert_matrix!(Matrix2 <=> Matrix2);
convert_matrix!(Matrix3 <=> Matrix3);
convert_matrix!(Matrix4 <=> Matrix4);

impl From<Projection> for nalgebra::Matrix4<f32> {
    fn from(p: Projection) -> Self {
        p.to_matrix4().into()
    }
}

impl From<Transformation> for nalgebra::Matrix4<f32> {
    fn from(t: Transformation) -> Self {
        t.to_matrix4().into()
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.w(), q.x(), q.y(), q.z())
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Quaternion::new(q.i, q.j, q.k, q.w)
    }
}

/// Normalizes on the way in
impl From<Quaternion> for nalgebra::UnitQuaternion<f32> {
    fn from(q: Quaternion) -> Self {
        nalgebra::UnitQuaternion::from_quaternion(q.into())
    }
}

impl From<nalgebra::UnitQuaternion<f32>> for Quaternion {
    fn from(q: nalgebra::UnitQuaternion<f32>) -> Self {
        q.into_inner().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_and_point_conversion() {
        let v = Vector3::new(1.0, -2.0, 3.5);
        let na: nalgebra::Vector3<f32> = v.into();
        assert_eq!(na, nalgebra::Vector3::new(1.0, -2.0, 3.5));
        assert_eq!(Vector3::from(na), v);

        let p: nalgebra::Point2<f32> = Point2D::new(4.0, 5.0).into();
        assert_eq!(p, nalgebra::Point2::new(4.0, 5.0));
    }

    #[test]
    fn test_matrix_layout_matches() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
        let na: nalgebra::Matrix3<f32> = m.into();
        assert_eq!(na[(0, 1)], 2.0);
        assert_eq!(na[(1, 0)], 4.0);
        assert_relative_eq!(na.determinant(), m.determinant(), epsilon = 1e-4);
        assert_eq!(Matrix3::from(na), m);
    }

    #[test]
    fn test_sparse_shapes_convert_densely() {
        let p = Projection::perspective(60.0, 1.0, 0.5, 20.0);
        let na: nalgebra::Matrix4<f32> = p.into();
        assert_eq!(na[(3, 2)], -1.0);
        assert_eq!(na[(2, 3)], p.e23());

        let t = Transformation::translation(&Point3D::new(1.0, 2.0, 3.0));
        let na: nalgebra::Matrix4<f32> = t.into();
        assert_eq!(na, nalgebra::Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_quaternion_rotation_agrees() {
        let q = Quaternion::from_axis_angle(&Vector3::Y, 90.0);
        let unit: nalgebra::UnitQuaternion<f32> = q.into();
        let rotated = unit * nalgebra::Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(Vector3::from(rotated), q.rotate_vector(&Vector3::Z), epsilon = 1e-6);
        assert_relative_eq!(Quaternion::from(unit), q, epsilon = 1e-6);
    }
}
