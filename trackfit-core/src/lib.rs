//! trackfit-core: Motion-model fitting for trackfit
//!
//! Fits a parametric motion model (polynomial position vs. time,
//! optionally with a step discontinuity) to noisy time-series data by
//! least-squares regression, and wraps the fitted coefficients for
//! derivative evaluation and step reconciliation.

pub mod error;
pub mod fit;
pub mod model;
pub mod params;

pub use error::FitError;
pub use fit::fit_polynomial;
pub use model::{MotionModel, PolynomialModel};
pub use params::{FittedModelParameters, StepChange};
