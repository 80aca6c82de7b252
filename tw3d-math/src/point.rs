//! Affine points.

use std::ops::{Add, AddAssign, Index, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::macros::{impl_approx_eq, mutable_type};
use crate::scalar::lerp;
use crate::vector::{Components, MutableVector2, MutableVector3, Vector2, Vector3, MAX_DIMENSIONS};

/// A position in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    x: f32,
    y: f32,
}

/// A position in space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3D {
    x: f32,
    y: f32,
    z: f32,
}

macro_rules! impl_point {
    ($name:ident, $mutable:ident, $vector:ident, $mutable_vector:ident, $dims:literal,
     [$($field:ident : $idx:literal => $setter:ident),+]) => {
        impl Components for $name {
            const DIMENSIONS: usize = $dims;

            fn try_component(&self, index: usize) -> Result<f32> {
                match index {
                    $($idx => Ok(self.$field),)+
                    i if i < MAX_DIMENSIONS => Ok(0.0),
                    _ => Err(MathError::index(index, MAX_DIMENSIONS, stringify!($name))),
                }
            }

            #[inline]
            fn from_fn(mut f: impl FnMut(usize) -> f32) -> Self {
                Self { $($field: f($idx)),+ }
            }
        }

        impl $name {
            pub const ORIGIN: Self = Self { $($field: 0.0),+ };

            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> f32 {
                    self.$field
                }
            )+

            /// Component `index`; zero for `DIMENSIONS..4`, an error beyond
            pub fn get(&self, index: usize) -> Result<f32> {
                self.try_component(index)
            }

            pub const fn to_array(&self) -> [f32; $dims] {
                [$(self.$field),+]
            }

            pub const fn from_array(components: [f32; $dims]) -> Self {
                Self { $($field: components[$idx]),+ }
            }

            /// The vector from the origin to this point
            pub const fn to_vector(&self) -> $vector {
                $vector::new($(self.$field),+)
            }

            pub const fn from_vector(vector: &$vector) -> Self {
                Self::from_array(vector.to_array())
            }

            pub fn distance_squared(&self, other: &Self) -> f32 {
                (*self - *other).magnitude_squared()
            }

            pub fn distance(&self, other: &Self) -> f32 {
                (*self - *other).magnitude()
            }

            pub fn midpoint(&self, other: &Self) -> Self {
                self.lerp(other, 0.5)
            }

            pub fn lerp(&self, other: &Self, t: f32) -> Self {
                Self { $($field: lerp(self.$field, other.$field, t)),+ }
            }

            /// Scale the position about the origin
            pub fn scale(&self, factor: f32) -> Self {
                Self { $($field: self.$field * factor),+ }
            }

            pub fn abs(&self) -> Self {
                Self { $($field: self.$field.abs()),+ }
            }

            pub fn floor(&self) -> Self {
                Self { $($field: self.$field.floor()),+ }
            }

            pub fn ceil(&self) -> Self {
                Self { $($field: self.$field.ceil()),+ }
            }

            pub fn min(&self, other: &Self) -> Self {
                Self { $($field: self.$field.min(other.$field)),+ }
            }

            pub fn max(&self, other: &Self) -> Self {
                Self { $($field: self.$field.max(other.$field)),+ }
            }

            pub fn translate_into<'a>(&self, offset: &$vector, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(*self + *offset)
            }

            pub fn subtract_vector_into<'a>(&self, offset: &$vector, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(*self - *offset)
            }

            /// Write `self - other` into a vector destination
            pub fn subtract_into<'a>(&self, other: &Self, dest: &'a mut $mutable_vector) -> &'a mut $mutable_vector {
                dest.commit(*self - *other)
            }

            pub fn midpoint_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.midpoint(other))
            }

            pub fn min_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.min(other))
            }

            pub fn max_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.max(other))
            }
        }

        impl Sub for $name {
            type Output = $vector;

            #[inline]
            fn sub(self, rhs: Self) -> $vector {
                $vector::new($(self.$field - rhs.$field),+)
            }
        }

        impl Add<$vector> for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: $vector) -> Self {
                Self { $($field: self.$field + rhs.$field()),+ }
            }
        }

        impl Sub<$vector> for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: $vector) -> Self {
                Self { $($field: self.$field - rhs.$field()),+ }
            }
        }

        impl Index<usize> for $name {
            type Output = f32;

            fn index(&self, index: usize) -> &f32 {
                match index {
                    $($idx => &self.$field,)+
                    i if i < MAX_DIMENSIONS => &0.0,
                    _ => panic!("{}", MathError::index(index, MAX_DIMENSIONS, stringify!($name))),
                }
            }
        }

        impl From<[f32; $dims]> for $name {
            fn from(components: [f32; $dims]) -> Self {
                Self::from_array(components)
            }
        }

        impl From<$name> for [f32; $dims] {
            fn from(point: $name) -> Self {
                point.to_array()
            }
        }

        impl_approx_eq!($name, to_array);

        mutable_type!(
            #[doc = concat!("A [`", stringify!($name), "`] that can move in place and reports each change to an observer.")]
            $mutable,
            $name
        );

        impl $mutable {
            /// Set every coordinate, notifying once
            pub fn set(&mut self, $($field: f32),+) -> &mut Self {
                self.commit($name { $($field),+ })
            }

            $(
                pub fn $setter(&mut self, value: f32) -> &mut Self {
                    let mut next = self.value;
                    next.$field = value;
                    self.commit(next)
                }
            )+

            /// Assign coordinate `index`.
            ///
            /// # Panics
            ///
            /// Panics if `index` is outside `0..DIMENSIONS`.
            pub fn set_component(&mut self, index: usize, value: f32) -> &mut Self {
                match self.try_set_component(index, value) {
                    Ok(this) => this,
                    Err(err) => panic!("{err}"),
                }
            }

            /// Assign coordinate `index`. The zero-filled read-only range
            /// `DIMENSIONS..4` is rejected like any other bad index.
            pub fn try_set_component(&mut self, index: usize, value: f32) -> Result<&mut Self> {
                let mut next = self.value;
                match index {
                    $($idx => next.$field = value,)+
                    _ => return Err(MathError::index(index, $dims, stringify!($mutable))),
                }
                Ok(self.commit(next))
            }

            pub fn set_origin(&mut self) -> &mut Self {
                self.commit($name::ORIGIN)
            }

            pub fn scale(&mut self, factor: f32) -> &mut Self {
                self.update(|p| p.scale(factor))
            }

            pub fn abs(&mut self) -> &mut Self {
                self.update(|p| p.abs())
            }

            pub fn floor(&mut self) -> &mut Self {
                self.update(|p| p.floor())
            }

            pub fn ceil(&mut self) -> &mut Self {
                self.update(|p| p.ceil())
            }

            pub fn min_with(&mut self, other: &$name) -> &mut Self {
                self.update(|p| p.min(other))
            }

            pub fn max_with(&mut self, other: &$name) -> &mut Self {
                self.update(|p| p.max(other))
            }

            pub fn lerp_to(&mut self, other: &$name, t: f32) -> &mut Self {
                self.update(|p| p.lerp(other, t))
            }
        }

        impl AddAssign<$vector> for $mutable {
            fn add_assign(&mut self, rhs: $vector) {
                self.update(|p| *p + rhs);
            }
        }

        impl SubAssign<$vector> for $mutable {
            fn sub_assign(&mut self, rhs: $vector) {
                self.update(|p| *p - rhs);
            }
        }
    };
}

impl_point!(Point2D, MutablePoint2D, Vector2, MutableVector2, 2, [x: 0 => set_x, y: 1 => set_y]);
impl_point!(Point3D, MutablePoint3D, Vector3, MutableVector3, 3, [x: 0 => set_x, y: 1 => set_y, z: 2 => set_z]);

impl Point2D {
    pub fn extend(&self, z: f32) -> Point3D {
        Point3D::new(self.x, self.y, z)
    }
}

impl Point3D {
    pub fn truncate(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl Add<Vector2> for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Vector2) -> Point3D {
        Point3D::from_fn(|i| self.component(i) + rhs.component(i))
    }
}

impl Sub<Vector2> for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Vector2) -> Point3D {
        Point3D::from_fn(|i| self.component(i) - rhs.component(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_point_vector_algebra() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(4.0, 6.0, 3.0);

        let offset = b - a;
        assert_eq!(offset, Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(a + offset, b);
        assert_eq!(b - offset, a);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.midpoint(&b), Point3D::new(2.5, 4.0, 3.0));
    }

    #[test]
    fn test_generalized_indexing() {
        let p = Point2D::new(3.0, 4.0);
        assert_eq!(p[0], 3.0);
        assert_eq!(p[1], 4.0);
        assert_eq!(p[2], 0.0);
        assert_eq!(p[3], 0.0);
        assert_eq!(p.get(3), Ok(0.0));
        assert!(matches!(
            p.get(4),
            Err(MathError::IndexOutOfRange { index: 4, limit: 4, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_past_four_panics() {
        let p = Point3D::new(1.0, 2.0, 3.0);
        let value = p[4];
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_cross_dimension_offset() {
        let p = Point3D::new(1.0, 1.0, 1.0);
        assert_eq!(p + Vector2::new(1.0, 2.0), Point3D::new(2.0, 3.0, 1.0));
        assert_eq!(p - Vector2::new(1.0, 2.0), Point3D::new(0.0, -1.0, 1.0));
    }

    #[test]
    fn test_mutable_point() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut p = MutablePoint3D::with_observer(Point3D::ORIGIN, move || {
            counter.set(counter.get() + 1)
        });

        p.set(1.0, 2.0, 3.0);
        p += Vector3::new(1.0, 1.0, 1.0);
        p.set_z(10.0);
        assert_eq!(p.copy_immutable(), Point3D::new(2.0, 3.0, 10.0));
        assert_eq!(count.get(), 3);

        assert!(p.try_set_component(3, 1.0).is_err());
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_destination_forms() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, 2.0);
        let mut offset = MutableVector2::new();
        a.subtract_into(&b, &mut offset);
        assert_eq!(offset.copy_immutable(), Vector2::new(-2.0, -2.0));

        let mut mid = MutablePoint2D::new();
        a.midpoint_into(&b, &mut mid);
        assert_relative_eq!(mid.copy_immutable(), Point2D::new(1.0, 1.0));

        b.translate_into(&Vector2::new(1.0, 0.0), &mut mid);
        assert_eq!(mid.copy_immutable(), Point2D::new(3.0, 2.0));
    }
}
