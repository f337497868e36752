//! Error taxonomy for the fitting layer.

use thiserror::Error;
use trackfit_linalg::LinalgError;

#[derive(Error, Debug)]
pub enum FitError {
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    #[error("supplied step time {supplied} disagrees with fitted step time {fitted}")]
    InconsistentStep { supplied: f64, fitted: f64 },

    #[error("sample count mismatch: {times} time values vs {rows} observation rows")]
    SampleMismatch { times: usize, rows: usize },

    #[error("observation dimensionality {got} does not match the model's {expected}")]
    Dimensionality { expected: usize, got: usize },

    #[error("underdetermined fit: {samples} samples for {params} model parameters")]
    NotEnoughSamples { samples: usize, params: usize },
}
