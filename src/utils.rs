use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::error::{ElmError, Result};

/// Rejects matrices holding NaN or infinite entries
pub fn ensure_finite<S: Data<Elem = f64>>(name: &'static str, values: &ArrayBase<S, Ix2>) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ElmError::NonFinite { name })
    }
}

/// Column index of the largest entry in each row. Ties go to the first column.
pub fn argmax_rows<S: Data<Elem = f64>>(values: &ArrayBase<S, Ix2>) -> Vec<usize> {
    values
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (j, &v)| if v > best.1 { (j, v) } else { best })
                .0
        })
        .collect()
}

/// One-hot target matrix for classification, one row per label
pub fn one_hot(labels: &[usize], classes: usize) -> Result<Array2<f64>> {
    if classes == 0 {
        return Err(ElmError::invalid("classes", "must be a positive integer"));
    }
    let mut targets = Array2::zeros((labels.len(), classes));
    for (i, &label) in labels.iter().enumerate() {
        if label >= classes {
            return Err(ElmError::invalid(
                "labels",
                format!("label {} at row {} is not below {} classes", label, i, classes),
            ));
        }
        targets[[i, label]] = 1.0;
    }
    Ok(targets)
}
