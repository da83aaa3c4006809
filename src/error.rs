//! Error types for training and prediction

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElmError>;

/// Coarse classification of an [`ElmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad hyperparameter, shape or value supplied by the caller.
    InvalidArgument,
    /// Operation not valid in the model's current state.
    InvalidState,
    /// The solver could not produce finite, well-conditioned weights.
    Numerical,
}

#[derive(Error, Debug)]
pub enum ElmError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("`{name}` contains NaN or infinite values")]
    NonFinite { name: &'static str },

    #[error("model is not trained")]
    NotTrained,

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("elastic net for output {output} did not converge after {iterations} sweeps")]
    NotConverged { output: usize, iterations: usize },
}

impl ElmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ElmError::InvalidArgument { .. }
            | ElmError::ShapeMismatch { .. }
            | ElmError::NonFinite { .. } => ErrorKind::InvalidArgument,
            ElmError::NotTrained => ErrorKind::InvalidState,
            ElmError::Numerical(_) | ElmError::NotConverged { .. } => ErrorKind::Numerical,
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ElmError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(what: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        ElmError::ShapeMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
