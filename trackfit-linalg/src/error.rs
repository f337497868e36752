//! Error taxonomy for the dense numeric core.
//!
//! All failures here are deterministic input-validation or
//! mathematical-precondition failures. Nothing is retried and
//! nothing is downgraded; callers decide how to recover.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("ragged input: row {row} has {got} elements, expected {expected}")]
    InvalidShape {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("dimension mismatch: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error(
        "index out of range: rows {row_lo}..={row_hi}, cols {col_lo}..={col_hi} \
         of a {nrows}x{ncols} matrix"
    )]
    IndexOutOfRange {
        row_lo: usize,
        row_hi: usize,
        col_lo: usize,
        col_hi: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("matrix is singular")]
    Singular,

    #[error("matrix is rank deficient")]
    RankDeficient,
}
