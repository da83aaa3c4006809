//! Extreme learning machines with a ridge or elastic-net readout.
//!
//! Inputs are lifted by a fixed random hidden layer into `H`; only the linear
//! readout from `H` to the targets is trained. With `alpha == 0` the readout
//! is the closed-form ridge solution, picking the primal or dual form by
//! problem shape. With `alpha > 0` every output is fitted by an elastic net
//! with its own intercept.

mod activation;
mod elastic_net;
mod error;
mod hidden;
mod hyperparameters;
mod linalg;
mod loss;
mod model;
mod readout;
mod ridge;
mod utils;

pub use activation::Activation;
pub use elastic_net::{soft_threshold, ElasticNet, ElasticNetFit, ElasticNetOptions};
pub use error::{ElmError, ErrorKind, Result};
pub use hidden::{FeatureMapper, HiddenLayer, WeightInit};
pub use hyperparameters::ElmConfig;
pub use linalg::solve_spd;
pub use loss::Loss;
pub use model::Elm;
pub use readout::{train_readout, Readout, Regularization};
pub use ridge::{solve_ridge, RidgeForm};
pub use utils::{argmax_rows, ensure_finite, one_hot};
