//! Regularized linear readout: training dispatch and prediction.

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::elastic_net::{ElasticNet, ElasticNetOptions};
use crate::error::{ElmError, Result};
use crate::ridge::solve_ridge;
use crate::utils::ensure_finite;

/// Readout regularization, resolved once from `(C, alpha)`
#[derive(Debug, Clone, PartialEq)]
pub enum Regularization {
    /// `alpha == 0`: closed-form L2 solve, no intercept
    Ridge { c: f64 },
    /// `alpha > 0`: per-output elastic net with penalty `1/C` and an intercept
    ElasticNet {
        c: f64,
        alpha: f64,
        options: ElasticNetOptions,
    },
}

impl Regularization {
    /// Validates `c` and `alpha` and picks the variant. Elastic net uses default
    /// solver options.
    pub fn from_params(c: f64, alpha: f64) -> Result<Self> {
        if !(c.is_finite() && c > 0.0) {
            return Err(ElmError::invalid(
                "regularization",
                format!("must be finite and positive, got {}", c),
            ));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ElmError::invalid(
                "alpha",
                format!("must lie in [0, 1], got {}", alpha),
            ));
        }

        if alpha == 0.0 {
            Ok(Regularization::Ridge { c })
        } else {
            Ok(Regularization::ElasticNet {
                c,
                alpha,
                options: ElasticNetOptions::default(),
            })
        }
    }

    pub fn c(&self) -> f64 {
        match self {
            Regularization::Ridge { c } | Regularization::ElasticNet { c, .. } => *c,
        }
    }

    pub fn alpha(&self) -> f64 {
        match self {
            Regularization::Ridge { .. } => 0.0,
            Regularization::ElasticNet { alpha, .. } => *alpha,
        }
    }

    fn validate(&self) -> Result<()> {
        let resolved = Regularization::from_params(self.c(), self.alpha())?;
        if std::mem::discriminant(&resolved) != std::mem::discriminant(self) {
            return Err(ElmError::invalid(
                "alpha",
                "an elastic net readout needs alpha > 0",
            ));
        }
        if let Regularization::ElasticNet { options, .. } = self {
            options.validate()?;
        }
        Ok(())
    }
}

/// Trained readout state
#[derive(Debug, Clone)]
pub struct Readout {
    /// `hidden_neurons x outputs`
    pub output_weight: Array2<f64>,
    /// One offset per output, present only for elastic-net readouts
    pub intercept: Option<Array1<f64>>,
}

impl Readout {
    pub fn hidden_neurons(&self) -> usize {
        self.output_weight.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.output_weight.ncols()
    }

    /// `H . W`, plus the intercept row on every sample when present.
    pub fn predict(&self, h: &Array2<f64>) -> Result<Array2<f64>> {
        if h.ncols() != self.hidden_neurons() {
            return Err(ElmError::shape("H columns", self.hidden_neurons(), h.ncols()));
        }
        let mut prediction = h.dot(&self.output_weight);
        if let Some(intercept) = &self.intercept {
            prediction += &intercept.view().insert_axis(Axis(0));
        }
        Ok(prediction)
    }
}

/// Trains the output weights mapping hidden output `h` (`N x L`) to `y` (`N x m`).
///
/// All argument checks run before any matrix work; `h` and `y` are not modified.
pub fn train_readout(h: &Array2<f64>, y: &Array2<f64>, regularization: &Regularization) -> Result<Readout> {
    regularization.validate()?;
    if h.nrows() == 0 {
        return Err(ElmError::invalid("H", "must contain at least one sample"));
    }
    if h.ncols() == 0 {
        return Err(ElmError::invalid("H", "must have at least one hidden neuron"));
    }
    if y.nrows() != h.nrows() {
        return Err(ElmError::shape("Y rows", h.nrows(), y.nrows()));
    }
    if y.ncols() == 0 {
        return Err(ElmError::invalid("Y", "must have at least one output column"));
    }
    ensure_finite("H", h)?;
    ensure_finite("Y", y)?;

    match regularization {
        Regularization::Ridge { c } => Ok(Readout {
            output_weight: solve_ridge(h, y, *c)?,
            intercept: None,
        }),
        Regularization::ElasticNet { c, alpha, options } => {
            let solver = ElasticNet::new(1.0 / c, *alpha, options.clone());
            let mut output_weight = Array2::zeros((h.ncols(), y.ncols()));
            let mut intercept = Array1::zeros(y.ncols());

            for (output, target) in y.columns().into_iter().enumerate() {
                let fit = solver.fit(h, target).map_err(|e| match e {
                    ElmError::NotConverged { iterations, .. } => {
                        ElmError::NotConverged { output, iterations }
                    }
                    other => other,
                })?;
                debug!(output, iterations = fit.iterations, "elastic net output fitted");
                output_weight.column_mut(output).assign(&fit.coefficients);
                intercept[output] = fit.intercept;
            }

            if output_weight.iter().any(|v| !v.is_finite()) || intercept.iter().any(|v| !v.is_finite()) {
                return Err(ElmError::Numerical(
                    "elastic net produced NaN or infinite weights".to_string(),
                ));
            }
            Ok(Readout {
                output_weight,
                intercept: Some(intercept),
            })
        }
    }
}
