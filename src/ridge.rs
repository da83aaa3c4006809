//! Closed-form ridge readout.
//!
//! `W = (I/C + H^T H)^-1 H^T Y` when there are at least as many samples as
//! hidden neurons, otherwise the dual `W = H^T (I/C + H H^T)^-1 Y`. Both
//! minimize `||H W - Y||^2 + ||W||^2 / C`; the branch only decides whether an
//! `L x L` or an `N x N` system is solved.

use ndarray::Array2;
use tracing::debug;

use crate::error::Result;
use crate::linalg::solve_spd;

/// Which Gram matrix the ridge solve factorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidgeForm {
    /// `L x L` feature Gram matrix, used when `N >= L`
    Primal,
    /// `N x N` sample Gram matrix, used when `N < L`
    Dual,
}

impl RidgeForm {
    pub fn for_shape(samples: usize, hidden_neurons: usize) -> Self {
        if samples >= hidden_neurons {
            RidgeForm::Primal
        } else {
            RidgeForm::Dual
        }
    }
}

/// Ridge output weights (`L x m`) for hidden output `h` (`N x L`) and targets `y` (`N x m`).
///
/// Shapes and `c` are assumed validated by the caller.
pub fn solve_ridge(h: &Array2<f64>, y: &Array2<f64>, c: f64) -> Result<Array2<f64>> {
    let (samples, hidden) = h.dim();
    let form = RidgeForm::for_shape(samples, hidden);
    debug!(samples, hidden, outputs = y.ncols(), ?form, "solving ridge readout");

    match form {
        RidgeForm::Primal => {
            let mut gram = h.t().dot(h);
            add_to_diagonal(&mut gram, 1.0 / c);
            solve_spd(&gram, &h.t().dot(y))
        }
        RidgeForm::Dual => {
            let mut gram = h.dot(&h.t());
            add_to_diagonal(&mut gram, 1.0 / c);
            let coefficients = solve_spd(&gram, y)?;
            Ok(h.t().dot(&coefficients))
        }
    }
}

fn add_to_diagonal(matrix: &mut Array2<f64>, value: f64) {
    matrix.diag_mut().mapv_inplace(|d| d + value);
}
