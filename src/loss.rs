use ndarray::Array2;

use crate::error::{ElmError, Result};
use crate::utils::argmax_rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    MeanSquaredError,
    RootMeanSquaredError,
    /// Fraction of rows whose argmax differs, for one-hot classification targets
    MisclassificationRate,
}

impl Loss {
    pub fn calculate(&self, prediction: &Array2<f64>, target: &Array2<f64>) -> Result<f64> {
        if prediction.dim() != target.dim() {
            return Err(ElmError::shape(
                "prediction",
                format!("{:?}", target.dim()),
                format!("{:?}", prediction.dim()),
            ));
        }
        if prediction.is_empty() {
            return Err(ElmError::invalid("prediction", "must not be empty"));
        }

        match self {
            Loss::MeanSquaredError => Ok(mean_squared_error(prediction, target)),
            Loss::RootMeanSquaredError => Ok(mean_squared_error(prediction, target).sqrt()),
            Loss::MisclassificationRate => {
                let wrong = argmax_rows(prediction)
                    .into_iter()
                    .zip(argmax_rows(target))
                    .filter(|(p, t)| p != t)
                    .count();
                Ok(wrong as f64 / prediction.nrows() as f64)
            }
        }
    }
}

fn mean_squared_error(prediction: &Array2<f64>, target: &Array2<f64>) -> f64 {
    (prediction - target).mapv(|e| e * e).mean().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_losses() {
        let target = array![[1.0], [2.0], [3.0], [4.0]];
        let prediction = array![[1.0], [2.0], [3.0], [6.0]];

        assert_eq!(Loss::MeanSquaredError.calculate(&prediction, &target).unwrap(), 1.0);
        assert_eq!(Loss::RootMeanSquaredError.calculate(&prediction, &target).unwrap(), 1.0);
        assert_eq!(Loss::MeanSquaredError.calculate(&target, &target).unwrap(), 0.0);
    }

    #[test]
    fn test_misclassification_rate() {
        let target = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let prediction = array![[0.9, 0.1], [0.4, 0.6], [0.2, 0.8], [0.3, 0.7]];

        let rate = Loss::MisclassificationRate.calculate(&prediction, &target).unwrap();
        assert!((rate - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Loss::MeanSquaredError
            .calculate(&Array2::zeros((2, 1)), &Array2::zeros((3, 1)))
            .unwrap_err();
        assert!(matches!(err, ElmError::ShapeMismatch { what: "prediction", .. }));
    }
}
