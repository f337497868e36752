#![allow(clippy::needless_range_loop)]
//! Direct matrix decompositions and solvers.
//!
//! Pivoted LU (Crout-style column elimination) for square systems and
//! Householder QR for overdetermined least squares. Both factor a
//! private copy of the source matrix; the original is never touched.
//!
//! Singularity and rank checks compare the factor diagonal against
//! zero exactly, with no tolerance. A near-singular matrix with a
//! tiny nonzero pivot is therefore reported solvable and may produce
//! an unstable solution; see the tests for the boundary cases.

use crate::dense::DenseMatrix;
use crate::error::LinalgError;

/// Overflow/underflow-safe `sqrt(a^2 + b^2)`, scaling by the
/// larger-magnitude operand.
pub fn hypot(a: f64, b: f64) -> f64 {
    if a.abs() > b.abs() {
        let r = b / a;
        a.abs() * (1.0 + r * r).sqrt()
    } else if b != 0.0 {
        let r = a / b;
        b.abs() * (1.0 + r * r).sqrt()
    } else {
        0.0
    }
}

/// LU decomposition with partial pivoting: `P * A = L * U`.
///
/// The factor holds L strictly below the diagonal (unit diagonal
/// implicit) and U on and above it. The permutation vector records
/// the row interchanges applied during elimination.
pub struct LuDecomposition {
    lu: DenseMatrix,
    m: usize,
    n: usize,
    piv: Vec<usize>,
    pivsign: i32,
}

impl LuDecomposition {
    /// Factor a copy of `a` (square or tall).
    pub fn new(a: &DenseMatrix) -> Self {
        let m = a.nrows();
        let n = a.ncols();
        let mut lu = a.clone();
        let mut piv: Vec<usize> = (0..m).collect();
        let mut pivsign = 1i32;
        let mut lu_col = vec![0.0; m];

        for j in 0..n {
            for i in 0..m {
                lu_col[i] = lu.get(i, j);
            }

            // Eliminate column j against the already-finalized part of
            // each row, writing back both the factor and the buffer.
            for i in 0..m {
                let kmax = i.min(j);
                let mut s = 0.0;
                for k in 0..kmax {
                    s += lu.get(i, k) * lu_col[k];
                }
                lu_col[i] -= s;
                lu.set(i, j, lu_col[i]);
            }

            // Pivot: largest magnitude at or below the diagonal,
            // first-seen wins ties.
            let mut p = j;
            for i in (j + 1)..m {
                if lu_col[i].abs() > lu_col[p].abs() {
                    p = i;
                }
            }
            if p != j {
                for k in 0..n {
                    let t = lu.get(p, k);
                    lu.set(p, k, lu.get(j, k));
                    lu.set(j, k, t);
                }
                piv.swap(p, j);
                pivsign = -pivsign;
            }

            // L multipliers.
            if j < m && lu.get(j, j) != 0.0 {
                for i in (j + 1)..m {
                    let v = lu.get(i, j) / lu.get(j, j);
                    lu.set(i, j, v);
                }
            }
        }

        Self {
            lu,
            m,
            n,
            piv,
            pivsign,
        }
    }

    /// True iff every diagonal entry of U is nonzero (exact check).
    pub fn is_nonsingular(&self) -> bool {
        (0..self.n).all(|j| self.lu.get(j, j) != 0.0)
    }

    /// The row permutation applied during elimination.
    pub fn piv(&self) -> &[usize] {
        &self.piv
    }

    /// Determinant of the source matrix (square only): the pivot sign
    /// times the product of the U diagonal.
    pub fn det(&self) -> Result<f64, LinalgError> {
        if self.m != self.n {
            return Err(LinalgError::DimensionMismatch {
                left_rows: self.m,
                left_cols: self.n,
                right_rows: self.n,
                right_cols: self.n,
            });
        }
        let mut d = self.pivsign as f64;
        for j in 0..self.n {
            d *= self.lu.get(j, j);
        }
        Ok(d)
    }

    /// Solve `A * X = B`: gather B's rows by the permutation, forward
    /// substitute through L, back substitute through U.
    pub fn solve(&self, b: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if b.nrows() != self.m {
            return Err(LinalgError::DimensionMismatch {
                left_rows: self.m,
                left_cols: self.n,
                right_rows: b.nrows(),
                right_cols: b.ncols(),
            });
        }
        if !self.is_nonsingular() {
            return Err(LinalgError::Singular);
        }
        let nx = b.ncols();
        if nx == 0 {
            return Ok(DenseMatrix::zeros(self.n, 0));
        }

        let mut x = b.copy_of_rows(&self.piv, 0, nx - 1)?;

        // L * Y = P * B (unit lower triangular).
        for k in 0..self.n {
            for i in (k + 1)..self.n {
                for j in 0..nx {
                    let v = x.get(i, j) - x.get(k, j) * self.lu.get(i, k);
                    x.set(i, j, v);
                }
            }
        }
        // U * X = Y.
        for k in (0..self.n).rev() {
            for j in 0..nx {
                let v = x.get(k, j) / self.lu.get(k, k);
                x.set(k, j, v);
            }
            for i in 0..k {
                for j in 0..nx {
                    let v = x.get(i, j) - x.get(k, j) * self.lu.get(i, k);
                    x.set(i, j, v);
                }
            }
        }
        Ok(x)
    }
}

/// QR decomposition via Householder reflections: `A = Q * R`.
///
/// The factor holds the Householder vectors below the diagonal and
/// the partial R above it; the R diagonal is kept separately with a
/// negated sign (the convention the solve step relies on). Requires
/// at least as many rows as columns.
pub struct QrDecomposition {
    qr: DenseMatrix,
    m: usize,
    n: usize,
    rdiag: Vec<f64>,
}

impl QrDecomposition {
    /// Factor a copy of `a` (rows >= cols).
    pub fn new(a: &DenseMatrix) -> Self {
        let m = a.nrows();
        let n = a.ncols();
        let mut qr = a.clone();
        let mut rdiag = vec![0.0; n];

        for k in 0..n {
            // Stable 2-norm of the sub-column [k..m).
            let mut nrm = 0.0;
            for i in k..m {
                nrm = hypot(nrm, qr.get(i, k));
            }

            if nrm != 0.0 {
                // Sign chosen to avoid cancellation with the diagonal.
                if qr.get(k, k) < 0.0 {
                    nrm = -nrm;
                }
                for i in k..m {
                    let v = qr.get(i, k) / nrm;
                    qr.set(i, k, v);
                }
                qr.set(k, k, qr.get(k, k) + 1.0);

                // Reflect the remaining columns.
                for j in (k + 1)..n {
                    let mut s = 0.0;
                    for i in k..m {
                        s += qr.get(i, k) * qr.get(i, j);
                    }
                    s = -s / qr.get(k, k);
                    for i in k..m {
                        let v = qr.get(i, j) + s * qr.get(i, k);
                        qr.set(i, j, v);
                    }
                }
            }
            rdiag[k] = -nrm;
        }

        Self { qr, m, n, rdiag }
    }

    /// True iff every stored R diagonal entry is nonzero (exact check).
    pub fn is_full_rank(&self) -> bool {
        self.rdiag.iter().all(|&d| d != 0.0)
    }

    /// Least-squares solve of `A * X = B`: apply the stored
    /// reflections to B (forming Qt * B), back substitute through R,
    /// and return the first n rows.
    pub fn solve(&self, b: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if b.nrows() != self.m {
            return Err(LinalgError::DimensionMismatch {
                left_rows: self.m,
                left_cols: self.n,
                right_rows: b.nrows(),
                right_cols: b.ncols(),
            });
        }
        if !self.is_full_rank() {
            return Err(LinalgError::RankDeficient);
        }
        let nx = b.ncols();
        if nx == 0 || self.n == 0 {
            return Ok(DenseMatrix::zeros(self.n, nx));
        }

        let mut x = b.clone();

        // Y = Qt * B, one reflection at a time.
        for k in 0..self.n {
            for j in 0..nx {
                let mut s = 0.0;
                for i in k..self.m {
                    s += self.qr.get(i, k) * x.get(i, j);
                }
                s = -s / self.qr.get(k, k);
                for i in k..self.m {
                    let v = x.get(i, j) + s * self.qr.get(i, k);
                    x.set(i, j, v);
                }
            }
        }
        // R * X = Y.
        for k in (0..self.n).rev() {
            for j in 0..nx {
                let v = x.get(k, j) / self.rdiag[k];
                x.set(k, j, v);
            }
            for i in 0..k {
                for j in 0..nx {
                    let v = x.get(i, j) - x.get(k, j) * self.qr.get(i, k);
                    x.set(i, j, v);
                }
            }
        }
        x.copy_of_range(0, self.n - 1, 0, nx - 1)
    }
}
