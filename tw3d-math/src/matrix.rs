//! Code shared by the general square matrices.

/// Generate the dimension-independent API of a square matrix and its
/// mutable counterpart.
macro_rules! impl_square_matrix {
    (
        $name:ident, $mutable:ident, $dims:literal,
        vector: $vector:ident, $mutable_vector:ident,
        elements: [$($e:ident / $set_e:ident = ($r:literal, $c:literal)),+ $(,)?],
        rows: [$($row:ident = $ri:literal),+],
        columns: [$($column:ident = $ci:literal),+]
    ) => {
        impl $name {
            pub const IDENTITY: Self = Self { rows: Self::identity_rows() };
            pub const ZERO: Self = Self { rows: [[0.0; $dims]; $dims] };

            const fn identity_rows() -> [[f32; $dims]; $dims] {
                let mut rows = [[0.0; $dims]; $dims];
                let mut i = 0;
                while i < $dims {
                    rows[i][i] = 1.0;
                    i += 1;
                }
                rows
            }

            /// Build from elements given row by row
            #[allow(clippy::too_many_arguments)]
            pub const fn new($($e: f32),+) -> Self {
                let mut rows = [[0.0; $dims]; $dims];
                $(rows[$r][$c] = $e;)+
                Self { rows }
            }

            #[inline]
            pub const fn from_rows(rows: [[f32; $dims]; $dims]) -> Self {
                Self { rows }
            }

            pub fn from_columns(columns: [[f32; $dims]; $dims]) -> Self {
                Self::from_fn(|row, col| columns[col][row])
            }

            pub fn from_row_vectors(rows: [$vector; $dims]) -> Self {
                Self::from_fn(|row, col| rows[row].to_array()[col])
            }

            pub fn from_column_vectors(columns: [$vector; $dims]) -> Self {
                Self::from_fn(|row, col| columns[col].to_array()[row])
            }

            /// Build element by element from `f(row, col)`
            #[inline]
            pub fn from_fn(mut f: impl FnMut(usize, usize) -> f32) -> Self {
                Self {
                    rows: std::array::from_fn(|row| std::array::from_fn(|col| f(row, col))),
                }
            }

            #[inline]
            pub const fn to_rows(&self) -> [[f32; $dims]; $dims] {
                self.rows
            }

            pub fn to_row_major_array(&self) -> [f32; $dims * $dims] {
                let mut out = [0.0; $dims * $dims];
                for (i, value) in out.iter_mut().enumerate() {
                    *value = self.rows[i / $dims][i % $dims];
                }
                out
            }

            pub fn to_column_major_array(&self) -> [f32; $dims * $dims] {
                let mut out = [0.0; $dims * $dims];
                for (i, value) in out.iter_mut().enumerate() {
                    *value = self.rows[i % $dims][i / $dims];
                }
                out
            }

            $(
                #[inline]
                pub const fn $e(&self) -> f32 {
                    self.rows[$r][$c]
                }
            )+

            /// Element at (`row`, `col`)
            pub fn get(&self, row: usize, col: usize) -> $crate::error::Result<f32> {
                if row < $dims && col < $dims {
                    Ok(self.rows[row][col])
                } else {
                    Err($crate::error::MathError::element(row, col, $dims, stringify!($name)))
                }
            }

            pub fn try_row(&self, index: usize) -> $crate::error::Result<$vector> {
                if index < $dims {
                    Ok($vector::from_array(self.rows[index]))
                } else {
                    Err($crate::error::MathError::index(index, $dims, stringify!($name)))
                }
            }

            pub fn try_column(&self, index: usize) -> $crate::error::Result<$vector> {
                if index < $dims {
                    Ok($vector::from_array(std::array::from_fn(|row| self.rows[row][index])))
                } else {
                    Err($crate::error::MathError::index(index, $dims, stringify!($name)))
                }
            }

            /// Row `index` as a vector.
            ///
            /// # Panics
            ///
            /// Panics if `index` is out of range.
            pub fn row(&self, index: usize) -> $vector {
                match self.try_row(index) {
                    Ok(row) => row,
                    Err(err) => panic!("{err}"),
                }
            }

            /// Column `index` as a vector.
            ///
            /// # Panics
            ///
            /// Panics if `index` is out of range.
            pub fn column(&self, index: usize) -> $vector {
                match self.try_column(index) {
                    Ok(column) => column,
                    Err(err) => panic!("{err}"),
                }
            }

            $(
                #[inline]
                pub fn $row(&self) -> $vector {
                    $vector::from_array(self.rows[$ri])
                }
            )+

            $(
                #[inline]
                pub fn $column(&self) -> $vector {
                    $vector::from_array(std::array::from_fn(|row| self.rows[row][$ci]))
                }
            )+

            /// Reflect across the main diagonal
            pub fn transpose(&self) -> Self {
                Self::from_fn(|row, col| self.rows[col][row])
            }

            /// Multiply every element by `factor`
            pub fn scale(&self, factor: f32) -> Self {
                Self::from_fn(|row, col| self.rows[row][col] * factor)
            }

            /// `self * other`
            pub fn multiply(&self, other: &Self) -> Self {
                Self::from_fn(|row, col| {
                    let mut sum = 0.0;
                    for k in 0..$dims {
                        sum += self.rows[row][k] * other.rows[k][col];
                    }
                    sum
                })
            }

            /// `other * self`
            pub fn multiply_left(&self, other: &Self) -> Self {
                other.multiply(self)
            }

            /// Matrix-vector product with the vector as a column
            pub fn multiply_vector(&self, vector: &$vector) -> $vector {
                let v = vector.to_array();
                $vector::from_array(std::array::from_fn(|row| {
                    let mut sum = 0.0;
                    for k in 0..$dims {
                        sum += self.rows[row][k] * v[k];
                    }
                    sum
                }))
            }

            pub fn trace(&self) -> f32 {
                (0..$dims).map(|i| self.rows[i][i]).sum()
            }

            pub fn is_identity(&self) -> bool {
                *self == Self::IDENTITY
            }

            /// Elementwise comparison with an absolute tolerance
            pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
                approx::AbsDiffEq::abs_diff_eq(self, other, epsilon)
            }

            pub fn multiply_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.multiply(other))
            }

            pub fn multiply_left_into<'a>(&self, other: &Self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.multiply_left(other))
            }

            pub fn transpose_into<'a>(&self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.transpose())
            }

            pub fn inverse_into<'a>(&self, dest: &'a mut $mutable) -> &'a mut $mutable {
                dest.commit(self.inverse())
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

            pub fn multiply_vector_into<'a>(
                &self,
                vector: &$vector,
                dest: &'a mut $mutable_vector,
            ) -> &'a mut $mutable_vector {
                dest.commit(self.multiply_vector(vector))
            }

            pub fn row_into<'a>(&self, index: usize, dest: &'a mut $mutable_vector) -> &'a mut $mutable_vector {
                dest.commit(self.row(index))
            }

            pub fn column_into<'a>(&self, index: usize, dest: &'a mut $mutable_vector) -> &'a mut $mutable_vector {
                dest.commit(self.column(index))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::IDENTITY
            }
        }

        impl From<[[f32; $dims]; $dims]> for $name {
            fn from(rows: [[f32; $dims]; $dims]) -> Self {
                Self::from_rows(rows)
            }
        }

        impl std::ops::Index<(usize, usize)> for $name {
            type Output = f32;

            fn index(&self, (row, col): (usize, usize)) -> &f32 {
                if row < $dims && col < $dims {
                    &self.rows[row][col]
                } else {
                    panic!(
                        "{}",
                        $crate::error::MathError::element(row, col, $dims, stringify!($name))
                    )
                }
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::from_fn(|row, col| self.rows[row][col] + rhs.rows[row][col])
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::from_fn(|row, col| self.rows[row][col] - rhs.rows[row][col])
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                self.scale(-1.0)
            }
        }

        impl std::ops::Mul for $name {
            type Output = Self;

            fn mul(self, rhs: Self) -> Self {
                self.multiply(&rhs)
            }
        }

        impl std::ops::Mul<f32> for $name {
            type Output = Self;

            fn mul(self, rhs: f32) -> Self {
                self.scale(rhs)
            }
        }

        impl std::ops::Mul<$name> for f32 {
            type Output = $name;

            fn mul(self, rhs: $name) -> $name {
                rhs.scale(self)
            }
        }

        impl std::ops::Div<f32> for $name {
            type Output = Self;

            fn div(self, rhs: f32) -> Self {
                Self::from_fn(|row, col| self.rows[row][col] / rhs)
            }
        }

        impl std::ops::Mul<$vector> for $name {
            type Output = $vector;

            fn mul(self, rhs: $vector) -> $vector {
                self.multiply_vector(&rhs)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                for row in &self.rows {
                    write!(f, "[")?;
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{value:>10.4}")?;
                    }
                    writeln!(f, "]")?;
                }
                Ok(())
            }
        }

        $crate::macros::impl_approx_eq!($name, to_row_major_array);

        $crate::macros::mutable_type!(
            #[doc = concat!("A [`", stringify!($name), "`] that changes in place, notifies an observer once per change, and caches its transpose and inverse.")]
            $mutable,
            $name,
            transpose: $name,
            inverse: $name
        );

        impl $mutable {
            /// Set every element (row by row), notifying once
            #[allow(clippy::too_many_arguments)]
            pub fn set_elements(&mut self, $($e: f32),+) -> &mut Self {
                self.commit($name::new($($e),+))
            }

            $(
                pub fn $set_e(&mut self, value: f32) -> &mut Self {
                    let mut next = self.value;
                    next.rows[$r][$c] = value;
                    self.commit(next)
                }
            )+

            /// Assign the element at (`row`, `col`).
            ///
            /// # Panics
            ///
            /// Panics if the position is out of range.
            pub fn set_element(&mut self, row: usize, col: usize, value: f32) -> &mut Self {
                match self.try_set_element(row, col, value) {
                    Ok(this) => this,
                    Err(err) => panic!("{err}"),
                }
            }

            pub fn try_set_element(&mut self, row: usize, col: usize, value: f32) -> $crate::error::Result<&mut Self> {
                if row >= $dims || col >= $dims {
                    return Err($crate::error::MathError::element(row, col, $dims, stringify!($mutable)));
                }
                let mut next = self.value;
                next.rows[row][col] = value;
                Ok(self.commit(next))
            }

            pub fn set_rows(&mut self, rows: [[f32; $dims]; $dims]) -> &mut Self {
                self.commit($name::from_rows(rows))
            }

            pub fn set_row(&mut self, index: usize, row: &$vector) -> &mut Self {
                if index >= $dims {
                    panic!("{}", $crate::error::MathError::index(index, $dims, stringify!($mutable)));
                }
                let mut next = self.value;
                next.rows[index] = row.to_array();
                self.commit(next)
            }

            pub fn set_column(&mut self, index: usize, column: &$vector) -> &mut Self {
                if index >= $dims {
                    panic!("{}", $crate::error::MathError::index(index, $dims, stringify!($mutable)));
                }
                let values = column.to_array();
                let mut next = self.value;
                for (row, value) in values.iter().enumerate() {
                    next.rows[row][index] = *value;
                }
                self.commit(next)
            }

            pub fn set_identity(&mut self) -> &mut Self {
                self.commit($name::IDENTITY)
            }

            pub fn set_zero(&mut self) -> &mut Self {
                self.commit($name::ZERO)
            }

            pub fn transpose_in_place(&mut self) -> &mut Self {
                self.update(|m| m.transpose())
            }

            /// Replace the value with its inverse (unspecified when singular)
            pub fn invert(&mut self) -> &mut Self {
                self.update(|m| m.inverse())
            }

            pub fn scale(&mut self, factor: f32) -> &mut Self {
                self.update(|m| m.scale(factor))
            }

            /// Replace the value with `self * other`
            pub fn multiply(&mut self, other: &$name) -> &mut Self {
                self.update(|m| m.multiply(other))
            }

            /// Replace the value with `other * self`
            pub fn multiply_left(&mut self, other: &$name) -> &mut Self {
                self.update(|m| m.multiply_left(other))
            }
        }

        impl std::ops::AddAssign<$name> for $mutable {
            fn add_assign(&mut self, rhs: $name) {
                self.update(|m| *m + rhs);
            }
        }

        impl std::ops::SubAssign<$name> for $mutable {
            fn sub_assign(&mut self, rhs: $name) {
                self.update(|m| *m - rhs);
            }
        }

        impl std::ops::MulAssign<f32> for $mutable {
            fn mul_assign(&mut self, rhs: f32) {
                self.update(|m| m.scale(rhs));
            }
        }

        impl std::ops::MulAssign<$name> for $mutable {
            fn mul_assign(&mut self, rhs: $name) {
                self.update(|m| m.multiply(&rhs));
            }
        }
    };
}

/// Cofactor expansion shared by the 3x3 and 4x4 matrices.
///
/// Requires `try_submatrix(row, col) -> Result<$minor>` on `$name` and
/// `determinant()` on `$minor`.
macro_rules! impl_cofactor_expansion {
    ($name:ident, $dims:literal) => {
        impl $name {
            /// Signed minor `(-1)^(row+col) * det(submatrix(row, col))`
            pub fn try_cofactor(&self, row: usize, col: usize) -> $crate::error::Result<f32> {
                let minor = self.try_submatrix(row, col)?.determinant();
                Ok(if (row + col) % 2 == 0 { minor } else { -minor })
            }

            /// # Panics
            ///
            /// Panics if `row` or `col` is out of range.
            pub fn cofactor(&self, row: usize, col: usize) -> f32 {
                match self.try_cofactor(row, col) {
                    Ok(value) => value,
                    Err(err) => panic!("{err}"),
                }
            }

            /// Determinant by cofactor expansion along column 0
            pub fn determinant(&self) -> f32 {
                let mut det = 0.0;
                for row in 0..$dims {
                    det += self.rows[row][0] * self.cofactor(row, 0);
                }
                det
            }

            /// Transposed cofactor matrix
            pub fn adjugate(&self) -> Self {
                Self::from_fn(|row, col| self.cofactor(col, row))
            }

            /// `adjugate / determinant`.
            ///
            /// Not guarded: a singular matrix yields infinities or NaNs.
            pub fn inverse(&self) -> Self {
                self.adjugate().scale(1.0 / self.determinant())
            }
        }
    };
}

/// Remove `skip` from `0..n`, returning the `i`-th survivor
#[inline]
pub(crate) fn skip_index(i: usize, skip: usize) -> usize {
    if i < skip {
        i
    } else {
        i + 1
    }
}

pub(crate) use impl_cofactor_expansion;
pub(crate) use impl_square_matrix;
