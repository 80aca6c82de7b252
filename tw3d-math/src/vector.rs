//! Free vectors in two, three and four dimensions.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MathError, Result};
use crate::macros::{impl_approx_eq, mutable_type};
use crate::scalar::{acos_deg, lerp};

/// Largest dimension any vector or point reads through [`Components`].
pub const MAX_DIMENSIONS: usize = 4;

/// Component access shared by vectors and points.
///
/// Reads below [`MAX_DIMENSIONS`] but at or past `DIMENSIONS` yield `0.0`,
/// which is what lets a `Vector2` take part in `Vector3` arithmetic.
pub trait Components: Copy {
    const DIMENSIONS: usize;

    /// Component `index`, zero-filled up to [`MAX_DIMENSIONS`]
    fn try_component(&self, index: usize) -> Result<f32>;

    /// Build a value from its components
    fn from_fn(f: impl FnMut(usize) -> f32) -> Self;

    /// Component `index`, zero-filled up to [`MAX_DIMENSIONS`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_DIMENSIONS`.
    fn component(&self, index: usize) -> f32 {
        match self.try_component(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

/// A free vector in two dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector2 {
    x: f32,
    y: f32,
}

/// A free vector in three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    x: f32,
    y: f32,
    z: f32,
}

/// A four component vector, multiplied by 4x4 matrices as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector4 {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

macro_rules! impl_vector {
    ($name:ident, $mutable:ident, $dims:literal, [$($field:ident : $idx:literal => $setter:ident),+]) => {
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
            pub const ZERO: Self = Self { $($field: 0.0),+ };

            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }

            /// A vector with every component set to `value`
            pub const fn splat(value: f32) -> Self {
                Self { $($field: value),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> f32 {
                    self.$field
                }
            )+

            /// Component `index`, failing outside `0..DIMENSIONS`
            pub fn get(&self, index: usize) -> Result<f32> {
                match index {
                    $($idx => Ok(self.$field),)+
                    _ => Err(MathError::index(index, $dims, stringify!($name))),
                }
            }

            pub const fn to_array(&self) -> [f32; $dims] {
                [$(self.$field),+]
            }

            pub const fn from_array(components: [f32; $dims]) -> Self {
                Self { $($field: components[$idx]),+ }
            }

            pub fn dot(&self, other: &Self) -> f32 {
                0.0 $(+ self.$field * other.$field)+
            }

            pub fn magnitude_squared(&self) -> f32 {
                self.dot(self)
            }

            pub fn magnitude(&self) -> f32 {
                self.magnitude_squared().sqrt()
            }

            /// Unit vector in the same direction; the zero vector stays zero
            pub fn normalize(&self) -> Self {
                let magnitude = self.magnitude();
                if magnitude == 0.0 {
                    *self
                } else {
                    *self / magnitude
                }
            }

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

            /// Componentwise minimum
            pub fn min(&self, other: &Self) -> Self {
                Self { $($field: self.$field.min(other.$field)),+ }
            }

            /// Componentwise maximum
            pub fn max(&self, other: &Self) -> Self {
                Self { $($field: self.$field.max(other.$field)),+ }
            }

            /// Component of `self` parallel to `other`
            pub fn project_onto(&self, other: &Self) -> Self {
                other.scale(self.dot(other) / other.dot(other))
            }

            /// Component of `self` orthogonal to `other`
            pub fn reject_from(&self, other: &Self) -> Self {
                *self - self.project_onto(other)
            }

            /// Angle between the two vectors in degrees
            pub fn angle(&self, other: &Self) -> f32 {
                acos_deg(self.dot(other) / (self.magnitude() * other.magnitude()))
            }

            pub fn distance(&self, other: &Self) -> f32 {
                (*self - *other).magnitude()
            }

            pub fn lerp(&self, other: &Self, t: f32) -> Self {
                Self { $($field: lerp(self.$field, other.$field, t)),+ }
            }

            pub fn add_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(*self + *other)
            }

            pub fn subtract_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(*self - *other)
            }

            pub fn scale_into<'a>(&self, factor: f32, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.scale(factor))
            }

            pub fn min_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.min(other))
            }

            pub fn max_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.max(other))
            }

            pub fn project_onto_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.project_onto(other))
            }

            pub fn reject_from_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.reject_from(other))
            }

            pub fn normalize_into<'a>(&self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.normalize())
            }

            pub fn negate_into<'a>(&self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(-*self)
            }

            pub fn lerp_into<'a>(&self, other: &Self, t: f32, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.lerp(other, t))
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: f32) -> Self {
                self.scale(rhs)
            }
        }

        impl Mul<$name> for f32 {
            type Output = $name;

            #[inline]
            fn mul(self, rhs: $name) -> $name {
                rhs.scale(self)
            }
        }

        impl Div<f32> for $name {
            type Output = Self;

            #[inline]
            fn div(self, rhs: f32) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl Index<usize> for $name {
            type Output = f32;

            fn index(&self, index: usize) -> &f32 {
                match index {
                    $($idx => &self.$field,)+
                    _ => panic!("{}", MathError::index(index, $dims, stringify!($name))),
                }
            }
        }

        impl From<[f32; $dims]> for $name {
            fn from(components: [f32; $dims]) -> Self {
                Self::from_array(components)
            }
        }

        impl From<$name> for [f32; $dims] {
            fn from(vector: $name) -> Self {
                vector.to_array()
            }
        }

        impl_approx_eq!($name, to_array);

        mutable_type!(
            #[doc = concat!("A [`", stringify!($name), "`] that can change in place and reports each change to an observer.")]
            $mutable,
            $name
        );

        impl $mutable {
            /// Set every component, notifying once
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

            /// Assign component `index`.
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

            pub fn try_set_component(&mut self, index: usize, value: f32) -> Result<&mut Self> {
                let mut next = self.value;
                match index {
                    $($idx => next.$field = value,)+
                    _ => return Err(MathError::index(index, $dims, stringify!($mutable))),
                }
                Ok(self.commit(next))
            }

            pub fn set_zero(&mut self) -> &mut Self {
                self.commit($name::ZERO)
            }

            pub fn normalize(&mut self) -> &mut Self {
                self.update(|v| v.normalize())
            }

            pub fn negate(&mut self) -> &mut Self {
                self.update(|v| -*v)
            }

            pub fn abs(&mut self) -> &mut Self {
                self.update(|v| v.abs())
            }

            pub fn floor(&mut self) -> &mut Self {
                self.update(|v| v.floor())
            }

            pub fn ceil(&mut self) -> &mut Self {
                self.update(|v| v.ceil())
            }

            pub fn scale(&mut self, factor: f32) -> &mut Self {
                self.update(|v| v.scale(factor))
            }

            pub fn min_with(&mut self, other: &$name) -> &mut Self {
                self.update(|v| v.min(other))
            }

            pub fn max_with(&mut self, other: &$name) -> &mut Self {
                self.update(|v| v.max(other))
            }

            pub fn project_onto(&mut self, other: &$name) -> &mut Self {
                self.update(|v| v.project_onto(other))
            }

            pub fn reject_from(&mut self, other: &$name) -> &mut Self {
                self.update(|v| v.reject_from(other))
            }

            pub fn lerp_to(&mut self, other: &$name, t: f32) -> &mut Self {
                self.update(|v| v.lerp(other, t))
            }
        }

        impl AddAssign<$name> for $mutable {
            fn add_assign(&mut self, rhs: $name) {
                self.update(|v| *v + rhs);
            }
        }

        impl SubAssign<$name> for $mutable {
            fn sub_assign(&mut self, rhs: $name) {
                self.update(|v| *v - rhs);
            }
        }

        impl MulAssign<f32> for $mutable {
            fn mul_assign(&mut self, rhs: f32) {
                self.update(|v| *v * rhs);
            }
        }

        impl DivAssign<f32> for $mutable {
            fn div_assign(&mut self, rhs: f32) {
                self.update(|v| *v / rhs);
            }
        }
    };
}

impl_vector!(Vector2, MutableVector2, 2, [x: 0 => set_x, y: 1 => set_y]);
impl_vector!(Vector3, MutableVector3, 3, [x: 0 => set_x, y: 1 => set_y, z: 2 => set_z]);
impl_vector!(Vector4, MutableVector4, 4, [x: 0 => set_x, y: 1 => set_y, z: 2 => set_z, w: 3 => set_w]);

/// Destination forms of mixed-dimension addition and subtraction.
///
/// The shorter operand is zero-padded and the result is written into the
/// mutable form of the larger dimension.
pub trait PaddedArithmetic<Rhs> {
    type Destination;

    fn add_padded_into<'a>(&self, other: &Rhs, dest: &'a mut Self::Destination) -> &'a mut Self::Destination;

    fn subtract_padded_into<'a>(&self, other: &Rhs, dest: &'a mut Self::Destination) -> &'a mut Self::Destination;
}

/// Mixed-dimension addition and subtraction. The shorter operand is
/// zero-padded and the result takes the larger dimension.
macro_rules! impl_cross_dimension {
    ($small:ident, $large:ident, $large_mutable:ident) => {
        impl Add<$large> for $small {
            type Output = $large;

            fn add(self, rhs: $large) -> $large {
                $large::from_fn(|i| self.component(i) + rhs.component(i))
            }
        }

        impl Add<$small> for $large {
            type Output = $large;

            fn add(self, rhs: $small) -> $large {
                $large::from_fn(|i| self.component(i) + rhs.component(i))
            }
        }

        impl Sub<$large> for $small {
            type Output = $large;

            fn sub(self, rhs: $large) -> $large {
                $large::from_fn(|i| self.component(i) - rhs.component(i))
            }
        }

        impl Sub<$small> for $large {
            type Output = $large;

            fn sub(self, rhs: $small) -> $large {
                $large::from_fn(|i| self.component(i) - rhs.component(i))
            }
        }

        impl AddAssign<$small> for $large_mutable {
            fn add_assign(&mut self, rhs: $small) {
                self.update(|v| *v + rhs);
            }
        }

        impl SubAssign<$small> for $large_mutable {
            fn sub_assign(&mut self, rhs: $small) {
                self.update(|v| *v - rhs);
            }
        }

        impl PaddedArithmetic<$large> for $small {
            type Destination = $large_mutable;

            fn add_padded_into<'a>(&self, other: &$large, dest: &'a mut $large_mutable) -> &'a mut $large_mutable {
                dest.commit(*self + *other)
            }

            fn subtract_padded_into<'a>(&self, other: &$large, dest: &'a mut $large_mutable) -> &'a mut $large_mutable {
                dest.commit(*self - *other)
            }
        }

        impl PaddedArithmetic<$small> for $large {
            type Destination = $large_mutable;

            fn add_padded_into<'a>(&self, other: &$small, dest: &'a mut $large_mutable) -> &'a mut $large_mutable {
                dest.commit(*self + *other)
            }

            fn subtract_padded_into<'a>(&self, other: &$small, dest: &'a mut $large_mutable) -> &'a mut $large_mutable {
                dest.commit(*self - *other)
            }
        }
    };
}

impl_cross_dimension!(Vector2, Vector3, MutableVector3);
impl_cross_dimension!(Vector2, Vector4, MutableVector4);
impl_cross_dimension!(Vector3, Vector4, MutableVector4);

impl Vector2 {
    pub const X: Self = Self::new(1.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0);

    /// Counter-clockwise perpendicular
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn extend(&self, z: f32) -> Vector3 {
        Vector3::new(self.x, self.y, z)
    }
}

impl Vector3 {
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn cross_into<'a>(&self, other: &Self, dest: &'a mut MutableVector3) -> &'a mut MutableVector3 {
        dest.commit(self.cross(other))
    }

    pub fn extend(&self, w: f32) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, w)
    }

    pub fn truncate(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

impl MutableVector3 {
    /// Replace the value with `self x other`
    pub fn cross_with(&mut self, other: &Vector3) -> &mut Self {
        self.update(|v| v.cross(other))
    }
}

impl Vector4 {
    pub const X: Self = Self::new(1.0, 0.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0, 0.0);
    pub const W: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub fn truncate(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}
