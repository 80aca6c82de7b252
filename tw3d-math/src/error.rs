//! Error types for checked component access.

use thiserror::Error;

/// Result type alias using [`MathError`] as the error type.
pub type Result<T> = std::result::Result<T, MathError>;

/// Errors raised by checked component and element access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// A vector, point or quaternion component index is out of range.
    #[error("component index {index} out of range for {type_name} (valid: 0..{limit})")]
    IndexOutOfRange {
        index: usize,
        limit: usize,
        type_name: &'static str,
    },

    /// A matrix element position is out of range.
    #[error("element ({row}, {col}) out of range for {type_name} (size {size}x{size})")]
    ElementOutOfRange {
        row: usize,
        col: usize,
        size: usize,
        type_name: &'static str,
    },

    /// The element is implied by the matrix shape and cannot be assigned.
    #[error("element ({row}, {col}) of {type_name} is fixed by its sparsity pattern")]
    FixedElement {
        row: usize,
        col: usize,
        type_name: &'static str,
    },
}

impl MathError {
    pub(crate) fn index(index: usize, limit: usize, type_name: &'static str) -> Self {
        MathError::IndexOutOfRange {
            index,
            limit,
            type_name,
        }
    }

    pub(crate) fn element(row: usize, col: usize, size: usize, type_name: &'static str) -> Self {
        MathError::ElementOutOfRange {
            row,
            col,
            size,
            type_name,
        }
    }

    pub(crate) fn fixed(row: usize, col: usize, type_name: &'static str) -> Self {
        MathError::FixedElement {
            row,
            col,
            type_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::index(5, 3, "Vector3");
        assert_eq!(
            err.to_string(),
            "component index 5 out of range for Vector3 (valid: 0..3)"
        );

        let err = MathError::element(4, 1, 4, "Matrix4");
        assert!(err.to_string().contains("(4, 1)"));
        assert!(err.to_string().contains("4x4"));

        let err = MathError::fixed(3, 0, "Transformation");
        assert!(err.to_string().contains("sparsity"));
    }
}
