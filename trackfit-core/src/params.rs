//! Fitted model parameters: the coefficient matrix produced by a
//! least-squares fit, bundled with the model that produced it and an
//! optional step that was removed from the data before fitting.
//!
//! A step can come from two places: the model itself (a fitted step
//! term) and the externally supplied pre-extracted step. When both
//! claim a step, their times must agree; a disagreement is reported,
//! never silently merged.

use crate::error::FitError;
use crate::model::MotionModel;
use trackfit_linalg::DenseMatrix;

/// A step discontinuity removed from the data prior to fitting:
/// the time it occurred and its size in each data dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct StepChange {
    pub time: f64,
    pub size: Vec<f64>,
}

/// The result of one fit: immutable after construction.
pub struct FittedModelParameters<'a, M: MotionModel + ?Sized> {
    model: &'a M,
    coefficients: DenseMatrix,
    ssr: f64,
    step: Option<StepChange>,
}

impl<'a, M: MotionModel + ?Sized> FittedModelParameters<'a, M> {
    /// Bundle a fitted coefficient matrix (parameters x dimensions)
    /// with its model, the sum of squared residuals, and the step
    /// that was removed from the data (if any).
    pub fn new(
        model: &'a M,
        coefficients: DenseMatrix,
        ssr: f64,
        step: Option<StepChange>,
    ) -> Self {
        if let Some(s) = &step {
            assert_eq!(s.size.len(), coefficients.ncols());
        }
        Self {
            model,
            coefficients,
            ssr,
            step,
        }
    }

    /// The fitted coefficient matrix, parameters x dimensions.
    pub fn coefficients(&self) -> &DenseMatrix {
        &self.coefficients
    }

    /// Sum of squared residuals of the fit.
    pub fn ssr(&self) -> f64 {
        self.ssr
    }

    /// Data dimensionality.
    pub fn dimensions(&self) -> usize {
        self.coefficients.ncols()
    }

    /// The reconciled step time.
    ///
    /// With no supplied step this defers to the model: its
    /// params-derived step time when it models a step, `None`
    /// otherwise. With a supplied step the supplied time wins, unless
    /// the model also models a step at a different time, which is an
    /// inconsistency.
    pub fn step_time(&self) -> Result<Option<f64>, FitError> {
        match &self.step {
            None => Ok(self
                .model
                .uses_step()
                .then(|| self.model.step_time_of(&self.coefficients))),
            Some(s) => {
                if self.model.uses_step() && self.model.step_time() != s.time {
                    Err(FitError::InconsistentStep {
                        supplied: s.time,
                        fitted: self.model.step_time(),
                    })
                } else {
                    Ok(Some(s.time))
                }
            }
        }
    }

    /// The reconciled per-dimension step size.
    ///
    /// The supplied step (if any) is the base; the model's own fitted
    /// step, stored in the last coefficient row, accumulates on top
    /// of it rather than replacing it.
    pub fn step_size(&self) -> Result<Vec<f64>, FitError> {
        let dims = self.dimensions();
        let mut size = vec![0.0; dims];
        if let Some(s) = &self.step {
            size.copy_from_slice(&s.size);
            if self.model.uses_step() && self.model.step_time() != s.time {
                return Err(FitError::InconsistentStep {
                    supplied: s.time,
                    fitted: self.model.step_time(),
                });
            }
        }
        if !self.model.uses_step() {
            return Ok(size);
        }
        let last = self.coefficients.row(self.coefficients.nrows() - 1);
        for (acc, v) in size.iter_mut().zip(last) {
            *acc += v;
        }
        Ok(size)
    }

    /// First derivative of the fitted motion at time `t`. A supplied
    /// step shifts the trajectory for every time strictly after it
    /// occurred.
    pub fn first_derivative(&self, t: f64) -> Vec<f64> {
        let mut d = self.model.first_derivative(&self.coefficients, t);
        if let Some(s) = &self.step {
            if s.time < t {
                for (di, si) in d.iter_mut().zip(&s.size) {
                    *di += si;
                }
            }
        }
        d
    }

    /// Second derivative of the fitted motion at time `t`. A supplied
    /// step contributes an impulse only when its time rounds to
    /// exactly `t`.
    pub fn second_derivative(&self, t: f64) -> Vec<f64> {
        let mut d = self.model.second_derivative(&self.coefficients, t);
        if let Some(s) = &self.step {
            if s.time.round() == t {
                for (di, si) in d.iter_mut().zip(&s.size) {
                    *di += si;
                }
            }
        }
        d
    }
}
