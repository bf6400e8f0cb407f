// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input validation errors.
//!
//! Every renderer validates its input before generating a single mark, so a failed render leaves
//! the target view exactly as it was.

use thiserror::Error;

/// Errors produced while validating chart input.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RenderError {
    /// The covariance matrix has no rows.
    #[error("covariance matrix is empty")]
    EmptyMatrix,
    /// A covariance row does not have as many entries as the matrix has rows.
    #[error("covariance matrix must be square: row {row} has {len} entries, expected {expected}")]
    NonSquareMatrix {
        /// Offending row index.
        row: usize,
        /// Entries in that row.
        len: usize,
        /// Number of rows in the matrix.
        expected: usize,
    },
    /// Two parallel inputs disagree in length.
    #[error("`{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending input field.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// A numeric input is NaN or infinite.
    #[error("`{field}` has a non-finite value at index {index}")]
    NonFinite {
        /// Name of the offending input field.
        field: &'static str,
        /// Index of the offending value.
        index: usize,
    },
    /// The requested number of histogram bins is zero.
    #[error("bin count must be positive")]
    InvalidBinCount,
    /// The confidence level is not strictly between 0 and 1.
    #[error("confidence interval {0} is outside (0, 1)")]
    InvalidConfidence(f64),
    /// The price sample is empty.
    #[error("price sample is empty")]
    EmptySample,
    /// The requested curve interpolation is not supported.
    #[error("unknown interpolation mode `{0}`")]
    UnknownInterpolation(String),
    /// A pie chart was requested without slices.
    #[error("pie chart needs at least one slice")]
    EmptySlices,
    /// A pie slice has a negative value.
    #[error("slice {index} has negative value {value}")]
    NegativeValue {
        /// Index of the offending slice.
        index: usize,
        /// The negative value.
        value: f64,
    },
    /// All pie slice values are zero.
    #[error("slice values sum to zero")]
    ZeroTotal,
}

/// Returns an error naming the first non-finite value in `values`.
pub(crate) fn check_finite(
    field: &'static str,
    values: impl IntoIterator<Item = f64>,
) -> Result<(), RenderError> {
    match values.into_iter().position(|v| !v.is_finite()) {
        Some(index) => Err(RenderError::NonFinite { field, index }),
        None => Ok(()),
    }
}

/// Returns an error if `actual` differs from `expected`.
pub(crate) fn check_len(
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), RenderError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RenderError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}
