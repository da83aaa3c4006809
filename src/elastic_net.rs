//! Single-output elastic net by cyclic coordinate descent.
//!
//! Minimizes `(1/2N) ||y - b0 - H w||^2 + lambda * (alpha ||w||_1 + (1 - alpha)/2 ||w||^2)`.
//! The intercept is never penalized: columns are centered first, and when
//! `standardize` is set they are also scaled to unit population variance.
//! Coefficients are reported on the original scale of `H`.
//!
//! The solve follows a geometric warm-start path from the smallest penalty
//! that zeroes every coefficient down to the requested `lambda`.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use crate::error::{ElmError, Result};

/// Floor for `alpha` when placing the start of the warm-start path
const MIN_PATH_ALPHA: f64 = 1e-3;

/// Columns whose centered mean square is below this are treated as constant
const CONSTANT_COLUMN_TOL: f64 = 1e-14;

/// Solver settings for the elastic-net readout
#[derive(Debug, Clone, PartialEq)]
pub struct ElasticNetOptions {
    /// Scale each column of H to unit variance before fitting
    pub standardize: bool,

    /// Number of penalty values on the warm-start path, the last being the target
    pub path_len: usize,

    /// Relative change in the coefficient norm that ends a path point
    pub tolerance: f64,

    /// Coordinate sweeps allowed per path point
    pub max_iterations: usize,
}

impl Default for ElasticNetOptions {
    fn default() -> Self {
        ElasticNetOptions {
            standardize: true,
            path_len: 10,
            tolerance: 1e-4,
            max_iterations: 100_000,
        }
    }
}

impl ElasticNetOptions {
    pub fn validate(&self) -> Result<()> {
        if self.path_len == 0 {
            return Err(ElmError::invalid("path_len", "must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ElmError::invalid(
                "tolerance",
                format!("must be finite and positive, got {}", self.tolerance),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ElmError::invalid("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// Result of one single-output fit
#[derive(Debug, Clone)]
pub struct ElasticNetFit {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// Total coordinate sweeps over the whole path
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub struct ElasticNet {
    pub lambda: f64,
    pub alpha: f64,
    pub options: ElasticNetOptions,
}

impl ElasticNet {
    pub fn new(lambda: f64, alpha: f64, options: ElasticNetOptions) -> Self {
        ElasticNet { lambda, alpha, options }
    }

    /// Fits `y` on the columns of `h`. Convergence failures report output 0;
    /// multi-output callers substitute the real column index.
    pub fn fit(&self, h: &Array2<f64>, y: ArrayView1<'_, f64>) -> Result<ElasticNetFit> {
        let (samples, features) = h.dim();
        if samples != y.len() {
            return Err(ElmError::shape("target length", samples, y.len()));
        }
        let n = samples as f64;

        let x_mean = h
            .mean_axis(Axis(0))
            .ok_or_else(|| ElmError::invalid("H", "must contain at least one sample"))?;
        let y_mean = y.mean().unwrap_or(0.0);

        let mut x = h - &x_mean.view().insert_axis(Axis(0));
        let y_centered = &y - y_mean;

        // curvature[j] = (1/N) ||x_j||^2 after scaling, 0 for constant columns
        let mut scale = Array1::<f64>::ones(features);
        let mut curvature = Array1::<f64>::zeros(features);
        for (j, mut column) in x.columns_mut().into_iter().enumerate() {
            let mean_square = column.dot(&column) / n;
            if mean_square < CONSTANT_COLUMN_TOL * (1.0 + x_mean[j] * x_mean[j]) {
                continue;
            }
            if self.options.standardize {
                let std_dev = mean_square.sqrt();
                column /= std_dev;
                scale[j] = std_dev;
                curvature[j] = 1.0;
            } else {
                curvature[j] = mean_square;
            }
        }

        let correlation = x.t().dot(&y_centered) / n;
        let max_correlation = correlation
            .iter()
            .zip(curvature.iter())
            .filter(|&(_, &c)| c > 0.0)
            .fold(0.0f64, |acc, (r, _)| acc.max(r.abs()));

        let mut beta = Array1::<f64>::zeros(features);
        let mut residual = y_centered;
        let mut iterations = 0;

        // Zero is the minimizer exactly when the L1 term dominates every correlation
        if self.lambda * self.alpha < max_correlation {
            // The floor only places the path start; it may end up below the target
            let lambda_start = max_correlation / self.alpha.max(MIN_PATH_ALPHA);
            let steps = if lambda_start > self.lambda { self.options.path_len } else { 1 };
            let ratio = self.lambda / lambda_start;
            for k in 1..=steps {
                let lambda = if k == steps {
                    self.lambda
                } else {
                    lambda_start * ratio.powf(k as f64 / steps as f64)
                };
                iterations += self.descend(&x, &curvature, lambda, &mut beta, &mut residual)?;
            }
        }
        debug!(features, lambda = self.lambda, max_correlation, iterations, "elastic net fit finished");

        let coefficients = beta / &scale;
        let intercept = y_mean - x_mean.dot(&coefficients);
        Ok(ElasticNetFit {
            coefficients,
            intercept,
            iterations,
        })
    }

    /// Coordinate sweeps at one penalty value, warm started from `beta`.
    /// `residual` is kept equal to `y - x beta` throughout.
    fn descend(
        &self,
        x: &Array2<f64>,
        curvature: &Array1<f64>,
        lambda: f64,
        beta: &mut Array1<f64>,
        residual: &mut Array1<f64>,
    ) -> Result<usize> {
        let n = x.nrows() as f64;
        let l1_penalty = lambda * self.alpha;
        let l2_penalty = lambda * (1.0 - self.alpha);

        for sweep in 1..=self.options.max_iterations {
            let mut change = 0.0;
            for (j, column) in x.columns().into_iter().enumerate() {
                if curvature[j] == 0.0 {
                    continue;
                }
                let old = beta[j];
                let rho = column.dot(&*residual) / n + curvature[j] * old;
                let new = soft_threshold(rho, l1_penalty) / (curvature[j] + l2_penalty);
                if new != old {
                    residual.scaled_add(old - new, &column);
                    beta[j] = new;
                    change += (new - old) * (new - old);
                }
            }

            let norm = beta.dot(&*beta).sqrt();
            if change.sqrt() <= self.options.tolerance * norm.max(f64::MIN_POSITIVE) {
                return Ok(sweep);
            }
        }

        Err(ElmError::NotConverged {
            output: 0,
            iterations: self.options.max_iterations,
        })
    }
}

/// Soft-threshold operator for the L1 proximal step
pub fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Zero-mean, unit-variance, mutually orthogonal columns (Hadamard rows 2-4)
    fn orthogonal_design() -> Array2<f64> {
        array![
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ]
    }

    fn targets(x: &Array2<f64>) -> Array1<f64> {
        x.dot(&array![3.0, -1.5, 0.2]) + 5.0
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }

    #[test]
    fn test_lasso_on_orthogonal_design_is_soft_thresholding() {
        let x = orthogonal_design();
        let y = targets(&x);

        let fit = ElasticNet::new(0.5, 1.0, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        let expected = [2.5, -1.0, 0.0];
        for (c, e) in fit.coefficients.iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-9, "coefficients {}", fit.coefficients);
        }
        assert_eq!(fit.coefficients[2], 0.0);
        assert!((fit.intercept - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_elastic_net_mixes_shrinkage() {
        let x = orthogonal_design();
        let y = targets(&x);

        let fit = ElasticNet::new(0.5, 0.5, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        // S(w, lambda * alpha) / (1 + lambda * (1 - alpha))
        let expected = [2.2, -1.0, 0.0];
        for (c, e) in fit.coefficients.iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-9, "coefficients {}", fit.coefficients);
        }
    }

    #[test]
    fn test_large_penalty_zeroes_everything() {
        let x = orthogonal_design();
        let y = targets(&x);

        let fit = ElasticNet::new(10.0, 1.0, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        assert!(fit.coefficients.iter().all(|&c| c == 0.0));
        assert!((fit.intercept - 5.0).abs() < 1e-12);
        assert_eq!(fit.iterations, 0);
    }

    #[test]
    fn test_standardization_reports_original_scale() {
        let x = orthogonal_design() * 2.0;
        let y = targets(&orthogonal_design());

        let fit = ElasticNet::new(0.5, 1.0, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        // Same standardized problem, coefficients halved by the column scale
        assert!((fit.coefficients[0] - 1.25).abs() < 1e-9);
        assert!((fit.coefficients[1] + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_alpha_is_not_zeroed_early() {
        let x = orthogonal_design().slice(ndarray::s![.., ..2]).to_owned();
        let y = x.dot(&array![1.0, 0.5]);
        let (lambda, alpha) = (1500.0, 1e-4);

        let fit = ElasticNet::new(lambda, alpha, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        let shrink = 1.0 + lambda * (1.0 - alpha);
        let expected = [
            soft_threshold(1.0, lambda * alpha) / shrink,
            soft_threshold(0.5, lambda * alpha) / shrink,
        ];
        assert!(expected[0] > 5e-4);
        for (c, e) in fit.coefficients.iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-12, "coefficients {}", fit.coefficients);
        }
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let x = array![[1.0, 0.3], [2.0, 0.3], [3.0, 0.3], [4.0, 0.3]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let fit = ElasticNet::new(0.01, 1.0, ElasticNetOptions::default())
            .fit(&x, y.view())
            .unwrap();

        assert_eq!(fit.coefficients[1], 0.0);
        assert!((fit.coefficients[0] - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_iteration_budget_is_reported() {
        let x = orthogonal_design();
        let y = targets(&x);
        let options = ElasticNetOptions {
            path_len: 1,
            max_iterations: 1,
            ..ElasticNetOptions::default()
        };

        let err = ElasticNet::new(0.5, 1.0, options).fit(&x, y.view()).unwrap_err();
        assert!(matches!(err, ElmError::NotConverged { iterations: 1, .. }));
    }

    #[test]
    fn test_options_validation() {
        assert!(ElasticNetOptions::default().validate().is_ok());
        let bad = ElasticNetOptions { tolerance: 0.0, ..ElasticNetOptions::default() };
        assert!(matches!(bad.validate(), Err(ElmError::InvalidArgument { name: "tolerance", .. })));
        let bad = ElasticNetOptions { max_iterations: 0, ..ElasticNetOptions::default() };
        assert!(matches!(bad.validate(), Err(ElmError::InvalidArgument { name: "max_iterations", .. })));
    }
}
