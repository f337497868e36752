//! trackfit-linalg: Dense linear algebra for trackfit
//!
//! Provides the dense matrix type and the direct decompositions
//! (pivoted LU, Householder QR) used by trackfit's least-squares
//! motion-model fitting.

pub mod decomposition;
pub mod dense;
pub mod error;

pub use decomposition::{LuDecomposition, QrDecomposition};
pub use dense::DenseMatrix;
pub use error::LinalgError;
