//! Crate-internal macros shared by the value types.

/// Implement `approx` equality for a value type by comparing the floats
/// returned from `$components`.
macro_rules! impl_approx_eq {
    ($ty:ty, $components:ident) => {
        impl approx::AbsDiffEq for $ty {
            type Epsilon = f32;

            fn default_epsilon() -> f32 {
                f32::EPSILON
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
                self.$components()
                    .iter()
                    .zip(other.$components().iter())
                    .all(|(a, b)| approx::AbsDiffEq::abs_diff_eq(a, b, epsilon))
            }
        }

        impl approx::RelativeEq for $ty {
            fn default_max_relative() -> f32 {
                f32::EPSILON
            }

            fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
                self.$components()
                    .iter()
                    .zip(other.$components().iter())
                    .all(|(a, b)| approx::RelativeEq::relative_eq(a, b, epsilon, max_relative))
            }
        }
    };
}

/// Define the mutable counterpart of an immutable value type.
///
/// The generated type owns the value and an [`Observer`](crate::observer::Observer).
/// All writes go through `commit`, which stores the value, marks derived
/// caches stale and then notifies the observer once. The matrix form of the
/// macro also generates the cached `transpose()`/`inverse()` accessors.
macro_rules! mutable_type {
    ($(#[$meta:meta])* $name:ident, $value:ty) => {
        $(#[$meta])*
        pub struct $name {
            value: $value,
            observer: $crate::observer::Observer,
        }

        impl $name {
            /// Wrap `value` with no observer attached
            pub fn from_value(value: $value) -> Self {
                Self {
                    value,
                    observer: $crate::observer::Observer::none(),
                }
            }

            #[inline]
            fn invalidate(&mut self) {}
        }

        $crate::macros::mutable_type!(@common $name, $value);
    };

    ($(#[$meta:meta])* $name:ident, $value:ty, transpose: $transpose:ty, inverse: $inverse:ty) => {
        $(#[$meta])*
        pub struct $name {
            value: $value,
            observer: $crate::observer::Observer,
            transpose_cache: $crate::observer::DerivedCache<$transpose>,
            inverse_cache: $crate::observer::DerivedCache<$inverse>,
        }

        impl $name {
            /// Wrap `value` with no observer attached
            pub fn from_value(value: $value) -> Self {
                Self {
                    value,
                    observer: $crate::observer::Observer::none(),
                    transpose_cache: $crate::observer::DerivedCache::new(concat!(
                        stringify!($name),
                        ".transpose"
                    )),
                    inverse_cache: $crate::observer::DerivedCache::new(concat!(
                        stringify!($name),
                        ".inverse"
                    )),
                }
            }

            #[inline]
            fn invalidate(&mut self) {
                self.transpose_cache.invalidate();
                self.inverse_cache.invalidate();
            }

            /// Cached transpose.
            ///
            /// Repeated reads return the same `Rc` until the matrix changes.
            pub fn transpose(&self) -> std::rc::Rc<$transpose> {
                let value = &self.value;
                self.transpose_cache.get_or_compute(|| value.transpose())
            }

            /// Cached inverse.
            ///
            /// Repeated reads return the same `Rc` until the matrix changes.
            /// The result for a singular matrix is unspecified.
            pub fn inverse(&self) -> std::rc::Rc<$inverse> {
                let value = &self.value;
                self.inverse_cache.get_or_compute(|| value.inverse())
            }

            pub fn transpose_state(&self) -> $crate::observer::CacheState {
                self.transpose_cache.state()
            }

            pub fn inverse_state(&self) -> $crate::observer::CacheState {
                self.inverse_cache.state()
            }
        }

        $crate::macros::mutable_type!(@common $name, $value);
    };

    (@common $name:ident, $value:ty) => {
        impl $name {
            pub fn new() -> Self {
                Self::from_value(<$value>::default())
            }

            /// Wrap `value` and notify `observer` after every mutation
            pub fn with_observer(value: $value, observer: impl FnMut() + 'static) -> Self {
                let mut mutable = Self::from_value(value);
                mutable.observer.replace(observer);
                mutable
            }

            pub fn set_observer(&mut self, observer: impl FnMut() + 'static) {
                self.observer.replace(observer);
            }

            pub fn clear_observer(&mut self) {
                self.observer.clear();
            }

            pub fn has_observer(&self) -> bool {
                self.observer.is_attached()
            }

            /// The current value as an immutable copy
            #[inline]
            pub fn copy_immutable(&self) -> $value {
                self.value
            }

            /// A detached mutable copy; the observer is not carried over
            pub fn copy_mutable(&self) -> Self {
                Self::from_value(self.value)
            }

            /// Replace the whole value
            pub fn assign(&mut self, value: impl Into<$value>) -> &mut Self {
                self.commit(value.into())
            }

            pub(crate) fn commit(&mut self, value: $value) -> &mut Self {
                self.value = value;
                self.invalidate();
                self.observer.notify();
                self
            }

            #[inline]
            pub(crate) fn update(&mut self, f: impl FnOnce(&$value) -> $value) -> &mut Self {
                let value = f(&self.value);
                self.commit(value)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = $value;

            #[inline]
            fn deref(&self) -> &$value {
                &self.value
            }
        }

        impl From<$value> for $name {
            fn from(value: $value) -> Self {
                Self::from_value(value)
            }
        }

        impl From<&$name> for $value {
            fn from(mutable: &$name) -> Self {
                mutable.value
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl PartialEq<$value> for $name {
            fn eq(&self, other: &$value) -> bool {
                self.value == *other
            }
        }

        impl PartialEq<$name> for $value {
            fn eq(&self, other: &$name) -> bool {
                *self == other.value
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("value", &self.value)
                    .field("observer", &self.observer)
                    .finish()
            }
        }
    };
}

pub(crate) use impl_approx_eq;
pub(crate) use mutable_type;
