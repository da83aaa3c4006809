//! Dense solves for the regularized normal equations.
//!
//! Both ridge formulations produce a symmetric positive-definite system
//! `A X = B`, so Cholesky is tried first. LU with partial pivoting only runs
//! when a Cholesky pivot turns non-positive in floating point.

use ndarray::{s, Array2};
use tracing::warn;

use crate::error::{ElmError, Result};

/// Solves `A X = B` for symmetric positive-definite `A`.
pub fn solve_spd(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(ElmError::shape("system matrix", format!("{}x{}", n, n), format!("{}x{}", n, a.ncols())));
    }
    if n != b.nrows() {
        return Err(ElmError::shape("right-hand side rows", n, b.nrows()));
    }

    let solution = match cholesky(a) {
        Some(l) => {
            let ratio = pivot_ratio(&l);
            if ratio < f64::EPSILON {
                return Err(ElmError::Numerical(format!(
                    "regularized matrix is ill-conditioned (pivot ratio {:e})",
                    ratio
                )));
            }
            cholesky_substitute(&l, b)
        }
        None => {
            warn!(n, "matrix is not numerically positive definite, falling back to LU");
            lu_solve(a, b)?
        }
    };

    if solution.iter().any(|v| !v.is_finite()) {
        return Err(ElmError::Numerical("solution contains NaN or infinite values".to_string()));
    }
    Ok(solution)
}

/// Lower-triangular `L` with `A = L L^T`, or `None` if a pivot is not positive.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum = l.slice(s![i, ..j]).dot(&l.slice(s![j, ..j]));
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > 0.0) || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Squared ratio of the smallest to largest Cholesky diagonal entry
fn pivot_ratio(l: &Array2<f64>) -> f64 {
    let (min, max) = l
        .diag()
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &d| (lo.min(d), hi.max(d)));
    if max == 0.0 {
        return 0.0;
    }
    (min / max).powi(2)
}

fn cholesky_substitute(l: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let n = l.nrows();

    // Forward substitution: L * Y = B
    let mut y = Array2::<f64>::zeros(b.raw_dim());
    for i in 0..n {
        let sum = l.slice(s![i, ..i]).dot(&y.slice(s![..i, ..]));
        let mut row = y.row_mut(i);
        row.assign(&(&b.row(i) - &sum));
        row /= l[[i, i]];
    }

    // Backward substitution: L^T * X = Y
    let mut x = Array2::<f64>::zeros(b.raw_dim());
    for i in (0..n).rev() {
        let sum = l.slice(s![i + 1.., i]).dot(&x.slice(s![i + 1.., ..]));
        let mut row = x.row_mut(i);
        row.assign(&(&y.row(i) - &sum));
        row /= l[[i, i]];
    }
    x
}

/// Gaussian elimination with partial pivoting on every column of `b`.
fn lu_solve(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut x = b.clone();

    let scale = a.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = n as f64 * f64::EPSILON * scale;

    for col in 0..n {
        let mut pivot_row = col;
        for row in col + 1..n {
            if m[[row, col]].abs() > m[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if !(m[[pivot_row, col]].abs() > tolerance) {
            return Err(ElmError::Numerical(
                "regularized matrix is singular to machine precision".to_string(),
            ));
        }

        if pivot_row != col {
            for k in 0..n {
                m.swap([col, k], [pivot_row, k]);
            }
            for k in 0..x.ncols() {
                x.swap([col, k], [pivot_row, k]);
            }
        }

        let pivot = m.row(col).to_owned();
        let pivot_rhs = x.row(col).to_owned();
        for row in col + 1..n {
            let factor = m[[row, col]] / pivot[col];
            if factor != 0.0 {
                m.row_mut(row).scaled_add(-factor, &pivot);
                x.row_mut(row).scaled_add(-factor, &pivot_rhs);
            }
        }
    }

    for i in (0..n).rev() {
        let sum = m.slice(s![i, i + 1..]).dot(&x.slice(s![i + 1.., ..]));
        let mut row = x.row_mut(i);
        row -= &sum;
        row /= m[[i, i]];
    }
    Ok(x)
}
