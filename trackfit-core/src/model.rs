//! Motion models: the capability the fitted-parameter wrapper
//! consumes.
//!
//! A model knows whether it carries a step discontinuity, where that
//! step sits in time, and how to evaluate the first and second
//! derivatives of the motion it describes given a fitted coefficient
//! matrix.

use trackfit_linalg::DenseMatrix;

/// A parametric motion model.
///
/// The coefficient matrix passed to the evaluators is laid out
/// parameters x dimensions: one row per model parameter, one column
/// per data dimension. Implementations are borrowed by the fitting
/// results and must never be mutated through this trait.
pub trait MotionModel {
    /// Whether the model includes a step discontinuity term.
    fn uses_step(&self) -> bool;

    /// Step time derived from a fitted coefficient matrix.
    /// Only meaningful when `uses_step()` is true.
    fn step_time_of(&self, params: &DenseMatrix) -> f64;

    /// The model's configured (last-fitted) step time, used to check
    /// agreement with an externally supplied step.
    /// Only meaningful when `uses_step()` is true.
    fn step_time(&self) -> f64;

    /// First derivative of the modeled motion at time `t`, one entry
    /// per data dimension.
    fn first_derivative(&self, params: &DenseMatrix, t: f64) -> Vec<f64>;

    /// Second derivative of the modeled motion at time `t`.
    fn second_derivative(&self, params: &DenseMatrix, t: f64) -> Vec<f64>;
}

/// Polynomial position-vs-time model, optionally with a step term.
///
/// Coefficient layout: row `k` holds the `t^k` coefficient for each
/// dimension. When the model carries a step, one extra final row
/// holds the fitted step size per dimension; the step instant itself
/// is fixed configuration, not a fitted quantity.
#[derive(Debug, Clone)]
pub struct PolynomialModel {
    degree: usize,
    dimensions: usize,
    step_time: Option<f64>,
}

impl PolynomialModel {
    /// Polynomial of the given degree with no step term.
    pub fn new(degree: usize, dimensions: usize) -> Self {
        Self {
            degree,
            dimensions,
            step_time: None,
        }
    }

    /// Polynomial with a step discontinuity at `step_time`.
    pub fn with_step(degree: usize, dimensions: usize, step_time: f64) -> Self {
        Self {
            degree,
            dimensions,
            step_time: Some(step_time),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of rows a fitted coefficient matrix has for this model.
    pub fn param_count(&self) -> usize {
        self.degree + 1 + usize::from(self.step_time.is_some())
    }

    /// Modeled position at time `t`, one entry per dimension. The
    /// step contributes for every time strictly after the step
    /// instant.
    pub fn value(&self, params: &DenseMatrix, t: f64) -> Vec<f64> {
        let dims = params.ncols();
        let mut out = vec![0.0; dims];
        for j in 0..dims {
            let mut acc = 0.0;
            for k in (0..=self.degree).rev() {
                acc = acc * t + params.get(k, j);
            }
            out[j] = acc;
        }
        if let Some(t0) = self.step_time {
            if t0 < t {
                let last = params.nrows() - 1;
                for (j, v) in out.iter_mut().enumerate() {
                    *v += params.get(last, j);
                }
            }
        }
        out
    }
}

impl MotionModel for PolynomialModel {
    fn uses_step(&self) -> bool {
        self.step_time.is_some()
    }

    fn step_time_of(&self, _params: &DenseMatrix) -> f64 {
        // The step instant is configuration, not a fitted parameter.
        self.step_time.unwrap_or(f64::NAN)
    }

    fn step_time(&self) -> f64 {
        self.step_time.unwrap_or(f64::NAN)
    }

    fn first_derivative(&self, params: &DenseMatrix, t: f64) -> Vec<f64> {
        let dims = params.ncols();
        let mut out = vec![0.0; dims];
        for j in 0..dims {
            let mut acc = 0.0;
            for k in (1..=self.degree).rev() {
                acc = acc * t + k as f64 * params.get(k, j);
            }
            out[j] = acc;
        }
        if let Some(t0) = self.step_time {
            // The fitted step shifts the trajectory after the instant.
            if t0 < t {
                let last = params.nrows() - 1;
                for (j, v) in out.iter_mut().enumerate() {
                    *v += params.get(last, j);
                }
            }
        }
        out
    }

    fn second_derivative(&self, params: &DenseMatrix, t: f64) -> Vec<f64> {
        let dims = params.ncols();
        let mut out = vec![0.0; dims];
        for j in 0..dims {
            let mut acc = 0.0;
            for k in (2..=self.degree).rev() {
                acc = acc * t + (k * (k - 1)) as f64 * params.get(k, j);
            }
            out[j] = acc;
        }
        if let Some(t0) = self.step_time {
            // An instantaneous jump acts as an impulse: it shows up
            // only at the step instant itself.
            if t0.round() == t {
                let last = params.nrows() - 1;
                for (j, v) in out.iter_mut().enumerate() {
                    *v += params.get(last, j);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfit_linalg::DenseMatrix;

    #[test]
    fn test_quadratic_derivatives() {
        // y = 1 + 2t + 3t^2 -> y' = 2 + 6t, y'' = 6
        let model = PolynomialModel::new(2, 1);
        let params = DenseMatrix::from_row_major(3, 1, &[1.0, 2.0, 3.0]);

        let v = model.value(&params, 2.0);
        assert!((v[0] - 17.0).abs() < 1e-12);

        let d1 = model.first_derivative(&params, 2.0);
        assert!((d1[0] - 14.0).abs() < 1e-12);

        let d2 = model.second_derivative(&params, 2.0);
        assert!((d2[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_model_derivatives_vanish() {
        let model = PolynomialModel::new(0, 2);
        let params = DenseMatrix::from_row_major(1, 2, &[3.0, -4.0]);
        assert_eq!(model.first_derivative(&params, 1.5), vec![0.0, 0.0]);
        assert_eq!(model.second_derivative(&params, 1.5), vec![0.0, 0.0]);
    }

    #[test]
    fn test_step_model_layout() {
        // Linear + step at t = 2.5; step row is the last row.
        let model = PolynomialModel::with_step(1, 1, 2.5);
        assert!(model.uses_step());
        assert_eq!(model.param_count(), 3);
        let params = DenseMatrix::from_row_major(3, 1, &[1.0, 0.5, 4.0]);

        // Before the step: value is the bare polynomial.
        let before = model.value(&params, 2.0);
        assert!((before[0] - 2.0).abs() < 1e-12);
        // After: the step size is added.
        let after = model.value(&params, 3.0);
        assert!((after[0] - (2.5 + 4.0)).abs() < 1e-12);

        // First derivative picks up the step only after the instant.
        let d1_before = model.first_derivative(&params, 2.0);
        assert!((d1_before[0] - 0.5).abs() < 1e-12);
        let d1_after = model.first_derivative(&params, 3.0);
        assert!((d1_after[0] - 4.5).abs() < 1e-12);

        // Second derivative spikes at the rounded step instant only.
        let d2_at = model.second_derivative(&params, 2.0);
        assert!((d2_at[0] - 0.0).abs() < 1e-12);
        let d2_round = model.second_derivative(&params, 3.0);
        assert!((d2_round[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_times_agree() {
        let model = PolynomialModel::with_step(2, 1, 5.0);
        let params = DenseMatrix::zeros(4, 1);
        assert_eq!(model.step_time(), 5.0);
        assert_eq!(model.step_time_of(&params), 5.0);
    }
}
