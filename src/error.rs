//! Error types for pooling and anomaly detection.
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`DetectorError`] that describes what was wrong with the input.

use thiserror::Error;

/// Main error type for pooling and detection operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// A requested variable does not exist in the dataset.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// A variable's (trajectory, time) shape disagrees with the time coordinate.
    #[error(
        "Shape mismatch for '{name}': expected {expected_rows}x{expected_cols}, got {rows}x{cols}"
    )]
    ShapeMismatch {
        name: String,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Feature batch width does not match the model width.
    #[error("Feature width mismatch: model expects {expected}, got {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    /// Two paired sequences have different lengths.
    #[error("Length mismatch: {left} predictions vs {right} labels")]
    LengthMismatch { left: usize, right: usize },

    /// An operation that needs at least one sample got none.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for pooling and detection operations.
pub type Result<T> = std::result::Result<T, DetectorError>;

impl DetectorError {
    /// Create an unknown variable error.
    #[must_use]
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable(name.into())
    }

    /// Create a shape mismatch error from `(rows, cols)` pairs.
    #[must_use]
    pub fn shape_mismatch(
        name: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected_rows: expected.0,
            expected_cols: expected.1,
            rows: actual.0,
            cols: actual.1,
        }
    }

    /// Create a feature width mismatch error.
    #[must_use]
    pub const fn feature_width_mismatch(expected: usize, actual: usize) -> Self {
        Self::FeatureWidthMismatch { expected, actual }
    }

    /// Create a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(left: usize, right: usize) -> Self {
        Self::LengthMismatch { left, right }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
