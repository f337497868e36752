#![allow(clippy::needless_range_loop)]
//! Dense matrix operations backed by faer.
//!
//! Wraps faer's column-major Mat<f64> with the operations the
//! fitting pipeline needs: construction, sub-matrix extraction
//! (contiguous and row-gathered), arithmetic, and linear solving
//! that routes to LU or QR by shape.

use faer::Mat;

use crate::decomposition::{LuDecomposition, QrDecomposition};
use crate::error::LinalgError;

/// A dense matrix wrapper around faer's `Mat<f64>`.
///
/// Shape is fixed for the lifetime of the value. Decompositions and
/// sub-matrix extractions copy; the only aliased path into the
/// storage is `as_faer_mut`, and mutating through it is the caller's
/// explicit choice.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    inner: Mat<f64>,
}

impl DenseMatrix {
    /// Create a new dense matrix filled with zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            inner: Mat::zeros(nrows, ncols),
        }
    }

    /// Create a dense matrix by taking ownership of nested rows.
    ///
    /// Fails with `InvalidShape` if any row's length differs from the
    /// first row's. An empty outer vector yields a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LinalgError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(LinalgError::InvalidShape {
                    row: i,
                    expected: ncols,
                    got: row.len(),
                });
            }
        }
        let inner = Mat::from_fn(nrows, ncols, |i, j| rows[i][j]);
        Ok(Self { inner })
    }

    /// Create a dense matrix from a flat slice (row-major input).
    pub fn from_row_major(nrows: usize, ncols: usize, data: &[f64]) -> Self {
        assert_eq!(data.len(), nrows * ncols);
        let inner = Mat::from_fn(nrows, ncols, |i, j| data[i * ncols + j]);
        Self { inner }
    }

    /// Create an identity matrix. Rectangular shapes are allowed:
    /// ones on the main diagonal, zeros elsewhere.
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        let inner = Mat::from_fn(nrows, ncols, |i, j| if i == j { 1.0 } else { 0.0 });
        Self { inner }
    }

    /// Create from a faer matrix.
    pub fn from_faer(mat: Mat<f64>) -> Self {
        Self { inner: mat }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    /// Get element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.inner.read(row, col)
    }

    /// Set element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.inner.write(row, col, value);
    }

    /// Get a reference to the underlying faer matrix.
    pub fn as_faer(&self) -> &Mat<f64> {
        &self.inner
    }

    /// Get a mutable reference to the underlying faer matrix.
    /// Mutations through this are visible to every borrower of self.
    pub fn as_faer_mut(&mut self) -> &mut Mat<f64> {
        &mut self.inner
    }

    /// Consume self and return the underlying faer matrix.
    pub fn into_faer(self) -> Mat<f64> {
        self.inner
    }

    /// Extract row as a Vec<f64>.
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.ncols()).map(|j| self.inner.read(i, j)).collect()
    }

    /// Extract column as a Vec<f64>.
    pub fn col(&self, j: usize) -> Vec<f64> {
        (0..self.nrows()).map(|i| self.inner.read(i, j)).collect()
    }

    /// Transpose.
    pub fn transpose(&self) -> DenseMatrix {
        let inner = self.inner.transpose().to_owned();
        DenseMatrix { inner }
    }

    /// Copy the closed interval `[row_lo, row_hi] x [col_lo, col_hi]`
    /// into an independent matrix.
    ///
    /// Fails with `IndexOutOfRange` if a bound lies outside the
    /// matrix or an interval is inverted.
    pub fn copy_of_range(
        &self,
        row_lo: usize,
        row_hi: usize,
        col_lo: usize,
        col_hi: usize,
    ) -> Result<DenseMatrix, LinalgError> {
        if row_hi >= self.nrows() || col_hi >= self.ncols() || row_hi < row_lo || col_hi < col_lo
        {
            return Err(LinalgError::IndexOutOfRange {
                row_lo,
                row_hi,
                col_lo,
                col_hi,
                nrows: self.nrows(),
                ncols: self.ncols(),
            });
        }
        let inner = Mat::from_fn(row_hi - row_lo + 1, col_hi - col_lo + 1, |i, j| {
            self.inner.read(row_lo + i, col_lo + j)
        });
        Ok(DenseMatrix { inner })
    }

    /// Gather the given row indices (repeats and arbitrary order are
    /// allowed) over the closed column interval `[col_lo, col_hi]`.
    pub fn copy_of_rows(
        &self,
        rows: &[usize],
        col_lo: usize,
        col_hi: usize,
    ) -> Result<DenseMatrix, LinalgError> {
        let out_of_range = |row_lo: usize, row_hi: usize| LinalgError::IndexOutOfRange {
            row_lo,
            row_hi,
            col_lo,
            col_hi,
            nrows: self.nrows(),
            ncols: self.ncols(),
        };
        if col_hi >= self.ncols() || col_hi < col_lo {
            return Err(out_of_range(0, self.nrows().saturating_sub(1)));
        }
        for &r in rows {
            if r >= self.nrows() {
                return Err(out_of_range(r, r));
            }
        }
        let inner = Mat::from_fn(rows.len(), col_hi - col_lo + 1, |i, j| {
            self.inner.read(rows[i], col_lo + j)
        });
        Ok(DenseMatrix { inner })
    }

    /// Element-wise subtraction: self - other.
    pub fn sub(&self, other: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return Err(LinalgError::DimensionMismatch {
                left_rows: self.nrows(),
                left_cols: self.ncols(),
                right_rows: other.nrows(),
                right_cols: other.ncols(),
            });
        }
        let inner = Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self.inner.read(i, j) - other.inner.read(i, j)
        });
        Ok(DenseMatrix { inner })
    }

    /// Matrix-matrix product: self * other.
    pub fn mat_mul(&self, other: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if self.ncols() != other.nrows() {
            return Err(LinalgError::DimensionMismatch {
                left_rows: self.nrows(),
                left_cols: self.ncols(),
                right_rows: other.nrows(),
                right_cols: other.ncols(),
            });
        }
        let inner = &self.inner * &other.inner;
        Ok(DenseMatrix { inner })
    }

    /// Solve `self * X = rhs`.
    ///
    /// Routes by shape: LU with partial pivoting when self is square,
    /// QR least squares otherwise (self must then have at least as
    /// many rows as columns). Fails with `DimensionMismatch` when
    /// `rhs.nrows() != self.nrows()`.
    pub fn solve(&self, rhs: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if self.nrows() == self.ncols() {
            LuDecomposition::new(self).solve(rhs)
        } else {
            QrDecomposition::new(self).solve(rhs)
        }
    }

    /// Invert a square matrix: `solve(identity)`.
    pub fn invert(&self) -> Result<DenseMatrix, LinalgError> {
        self.solve(&DenseMatrix::identity(self.nrows(), self.nrows()))
    }
}

impl std::fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.nrows() {
            for j in 0..self.ncols() {
                if j > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{:.6}", self.inner.read(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
