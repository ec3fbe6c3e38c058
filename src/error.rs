use thiserror::Error;

/// Unified error type for `kmfix` operations.
#[derive(Debug, Error)]
pub enum KmError {
    /// Raised when a scalar parameter lies outside its admissible range.
    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
    },

    /// Raised when provided vectors or sequences have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension or length.
        expected: usize,
        /// The dimension or length that was actually supplied.
        found: usize,
    },

    /// Raised when a plot cannot be written to its target.
    #[error("failed to write plot: {0}")]
    Io(#[from] std::io::Error),
}

impl KmError {
    /// Helper to format a [`DimensionMismatch`](KmError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to format an [`InvalidParameter`](KmError::InvalidParameter) error.
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, KmError>;
