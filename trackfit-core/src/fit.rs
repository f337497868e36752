//! Least-squares fitting of a polynomial motion model to observed
//! positions.
//!
//! Builds the Vandermonde design matrix (plus a unit-step column when
//! the model carries a step term), removes any pre-extracted step
//! from the observations, solves the system through the shape-routed
//! dense solver, and wraps the coefficients for later querying.

use tracing::{debug, warn};

use crate::error::FitError;
use crate::model::{MotionModel, PolynomialModel};
use crate::params::{FittedModelParameters, StepChange};
use trackfit_linalg::DenseMatrix;

/// Fit `model` to `observations` (samples x dimensions) taken at
/// `times`.
///
/// If `step` is given, that discontinuity is removed from the
/// observations before fitting (rows strictly after the step time)
/// and carried into the result for reconciliation and derivative
/// evaluation.
pub fn fit_polynomial<'a>(
    model: &'a PolynomialModel,
    times: &[f64],
    observations: &DenseMatrix,
    step: Option<StepChange>,
) -> Result<FittedModelParameters<'a, PolynomialModel>, FitError> {
    let n = times.len();
    let dims = model.dimensions();
    if observations.nrows() != n {
        return Err(FitError::SampleMismatch {
            times: n,
            rows: observations.nrows(),
        });
    }
    if observations.ncols() != dims {
        return Err(FitError::Dimensionality {
            expected: dims,
            got: observations.ncols(),
        });
    }
    if let Some(s) = &step {
        if s.size.len() != dims {
            return Err(FitError::Dimensionality {
                expected: dims,
                got: s.size.len(),
            });
        }
    }
    let p = model.param_count();
    if n < p {
        return Err(FitError::NotEnoughSamples {
            samples: n,
            params: p,
        });
    }
    if n == p {
        warn!("design matrix is square: fit has no redundancy against noise");
    }

    // Remove the pre-extracted step so the smooth model fits the
    // continuous remainder.
    let mut b = observations.clone();
    if let Some(s) = &step {
        for (i, &t) in times.iter().enumerate() {
            if t > s.time {
                for j in 0..dims {
                    b.set(i, j, b.get(i, j) - s.size[j]);
                }
            }
        }
    }

    let a = design_matrix(model, times);
    let x = a.solve(&b)?;

    let residual = a.mat_mul(&x)?.sub(&b)?;
    let mut ssr = 0.0;
    for i in 0..n {
        for j in 0..dims {
            let r = residual.get(i, j);
            ssr += r * r;
        }
    }

    debug!(
        "fitted degree-{} model over {} samples ({} dims), ssr={:.6e}",
        model.degree(),
        n,
        dims,
        ssr
    );
    debug!("coefficients:\n{}", x);

    Ok(FittedModelParameters::new(model, x, ssr, step))
}

/// Vandermonde design matrix: column `k` is `t^k`; when the model
/// carries a step, the final column is the unit step at the model's
/// step time.
fn design_matrix(model: &PolynomialModel, times: &[f64]) -> DenseMatrix {
    let p = model.param_count();
    let mut a = DenseMatrix::zeros(times.len(), p);
    for (i, &t) in times.iter().enumerate() {
        let mut pw = 1.0;
        for k in 0..=model.degree() {
            a.set(i, k, pw);
            pw *= t;
        }
        if model.uses_step() {
            let h = if t > model.step_time() { 1.0 } else { 0.0 };
            a.set(i, p - 1, h);
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> DenseMatrix {
        DenseMatrix::from_row_major(values.len(), 1, values)
    }

    #[test]
    fn test_exact_quadratic_fit() {
        // y = 1 + 2t + 3t^2 sampled without noise: coefficients are
        // recovered exactly and the residual vanishes.
        let model = PolynomialModel::new(2, 1);
        let times: Vec<f64> = (0..6).map(|t| t as f64).collect();
        let obs = column(
            &times
                .iter()
                .map(|&t| 1.0 + 2.0 * t + 3.0 * t * t)
                .collect::<Vec<_>>(),
        );

        let fitted = fit_polynomial(&model, &times, &obs, None).unwrap();
        let c = fitted.coefficients();
        assert!((c.get(0, 0) - 1.0).abs() < 1e-9);
        assert!((c.get(1, 0) - 2.0).abs() < 1e-9);
        assert!((c.get(2, 0) - 3.0).abs() < 1e-9);
        assert!(fitted.ssr() < 1e-12);
    }

    #[test]
    fn test_fit_with_step_model() {
        // y = 1 + t plus a jump of 3 after t = 2.5: the step column
        // absorbs the jump and the step size reads it back out.
        let model = PolynomialModel::with_step(1, 1, 2.5);
        let times: Vec<f64> = (0..6).map(|t| t as f64).collect();
        let obs = column(
            &times
                .iter()
                .map(|&t| 1.0 + t + if t > 2.5 { 3.0 } else { 0.0 })
                .collect::<Vec<_>>(),
        );

        let fitted = fit_polynomial(&model, &times, &obs, None).unwrap();
        let c = fitted.coefficients();
        assert!((c.get(0, 0) - 1.0).abs() < 1e-9);
        assert!((c.get(1, 0) - 1.0).abs() < 1e-9);
        assert!((c.get(2, 0) - 3.0).abs() < 1e-9);
        assert_eq!(fitted.step_time().unwrap(), Some(2.5));
        let size = fitted.step_size().unwrap();
        assert!((size[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_with_pre_extracted_step() {
        // The data contains a jump that the caller already measured;
        // fitting removes it, so the smooth model sees a clean line.
        let model = PolynomialModel::new(1, 1);
        let times: Vec<f64> = (0..6).map(|t| t as f64).collect();
        let obs = column(
            &times
                .iter()
                .map(|&t| 2.0 - 0.5 * t + if t > 3.0 { 4.0 } else { 0.0 })
                .collect::<Vec<_>>(),
        );
        let step = StepChange {
            time: 3.0,
            size: vec![4.0],
        };

        let fitted = fit_polynomial(&model, &times, &obs, Some(step)).unwrap();
        let c = fitted.coefficients();
        assert!((c.get(0, 0) - 2.0).abs() < 1e-9);
        assert!((c.get(1, 0) + 0.5).abs() < 1e-9);
        assert!(fitted.ssr() < 1e-12);

        // The slope is -0.5 everywhere; the supplied step shifts the
        // first derivative only after its instant.
        let d_before = fitted.first_derivative(2.0);
        assert!((d_before[0] + 0.5).abs() < 1e-9);
        let d_after = fitted.first_derivative(5.0);
        assert!((d_after[0] - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_count_mismatch() {
        let model = PolynomialModel::new(1, 1);
        let obs = column(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            fit_polynomial(&model, &[0.0, 1.0], &obs, None),
            Err(FitError::SampleMismatch { times: 2, rows: 3 })
        ));
    }

    #[test]
    fn test_dimensionality_mismatch() {
        let model = PolynomialModel::new(1, 2);
        let obs = column(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            fit_polynomial(&model, &[0.0, 1.0, 2.0], &obs, None),
            Err(FitError::Dimensionality {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_underdetermined_fit_rejected() {
        let model = PolynomialModel::new(3, 1);
        let obs = column(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            fit_polynomial(&model, &[0.0, 1.0, 2.0], &obs, None),
            Err(FitError::NotEnoughSamples {
                samples: 3,
                params: 4
            })
        ));
    }
}
