use std::fmt::Debug;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::activation::Activation;
use crate::error::{ElmError, Result};
use crate::hyperparameters::ElmConfig;
use crate::utils::ensure_finite;

/// Produces the hidden-layer representation H consumed by the readout.
pub trait FeatureMapper: Debug {
    fn input_neurons(&self) -> usize;
    fn hidden_neurons(&self) -> usize;

    /// Maps an `N x input_neurons` sample matrix to `N x hidden_neurons`.
    fn map(&self, x: &Array2<f64>) -> Result<Array2<f64>>;
}

/// Weight initialization strategies for the fixed hidden layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightInit {
    /// Weights uniform in [-1, 1], biases uniform in [0, 1]
    #[default]
    Uniform,

    /// Xavier/Glorot uniform weights, zero biases
    Xavier,

    /// He normal weights, zero biases
    HeNormal,
}

/// Randomly initialized, never trained, hidden layer
#[derive(Debug, Clone)]
pub struct HiddenLayer {
    /// `input_neurons x hidden_neurons`
    pub input_weight: Array2<f64>,
    /// One bias per hidden neuron
    pub bias: Array1<f64>,
    pub activation: Activation,
}

impl HiddenLayer {
    /// Draws a hidden layer from `config`, seeded when `config.seed` is set.
    pub fn from_config(config: &ElmConfig) -> Result<Self> {
        match config.seed {
            Some(seed) => Self::from_config_with_rng(config, &mut StdRng::seed_from_u64(seed)),
            None => Self::from_config_with_rng(config, &mut rand::rng()),
        }
    }

    /// Same as [`HiddenLayer::from_config`] but draws from a caller supplied
    /// random stream; `config.seed` is ignored.
    pub fn from_config_with_rng<R: Rng + ?Sized>(config: &ElmConfig, rng: &mut R) -> Result<Self> {
        Self::random(
            config.input_neurons,
            config.hidden_neurons,
            config.activation,
            config.weight_init,
            rng,
        )
    }

    pub fn random<R: Rng + ?Sized>(
        inputs: usize,
        neurons: usize,
        activation: Activation,
        weight_init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if inputs == 0 {
            return Err(ElmError::invalid("input_neurons", "must be a positive integer"));
        }
        if neurons == 0 {
            return Err(ElmError::invalid("hidden_neurons", "must be a positive integer"));
        }
        let dist_err = |e: rand::distr::uniform::Error| ElmError::invalid("weight_init", e.to_string());

        let (input_weight, bias) = match weight_init {
            WeightInit::Uniform => {
                let weight_dist = Uniform::new_inclusive(-1.0, 1.0).map_err(dist_err)?;
                let bias_dist = Uniform::new_inclusive(0.0, 1.0).map_err(dist_err)?;
                let weights = Array2::from_shape_fn((inputs, neurons), |_| weight_dist.sample(rng));
                let bias = Array1::from_shape_fn(neurons, |_| bias_dist.sample(rng));
                (weights, bias)
            }
            WeightInit::Xavier => {
                let scale = (6.0 / (inputs + neurons) as f64).sqrt();
                let weight_dist = Uniform::new_inclusive(-scale, scale).map_err(dist_err)?;
                let weights = Array2::from_shape_fn((inputs, neurons), |_| weight_dist.sample(rng));
                (weights, Array1::zeros(neurons))
            }
            WeightInit::HeNormal => {
                let std_dev = (2.0 / inputs as f64).sqrt();
                let normal_dist = Normal::new(0.0, std_dev)
                    .map_err(|e| ElmError::invalid("weight_init", e.to_string()))?;
                let weights = Array2::from_shape_fn((inputs, neurons), |_| normal_dist.sample(rng));
                (weights, Array1::zeros(neurons))
            }
        };

        Ok(HiddenLayer {
            input_weight,
            bias,
            activation,
        })
    }

    /// Builds a layer from explicit parameters, e.g. ones persisted elsewhere.
    pub fn from_parts(input_weight: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Result<Self> {
        if input_weight.is_empty() {
            return Err(ElmError::invalid("input_weight", "must have at least one row and column"));
        }
        if bias.len() != input_weight.ncols() {
            return Err(ElmError::shape("bias length", input_weight.ncols(), bias.len()));
        }
        ensure_finite("input_weight", &input_weight)?;
        if bias.iter().any(|v| !v.is_finite()) {
            return Err(ElmError::NonFinite { name: "bias" });
        }
        Ok(HiddenLayer {
            input_weight,
            bias,
            activation,
        })
    }
}

impl FeatureMapper for HiddenLayer {
    fn input_neurons(&self) -> usize {
        self.input_weight.nrows()
    }

    fn hidden_neurons(&self) -> usize {
        self.input_weight.ncols()
    }

    fn map(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_neurons() {
            return Err(ElmError::shape("X columns", self.input_neurons(), x.ncols()));
        }
        // x is (samples x inputs), input_weight is (inputs x neurons)
        let preactivation = x.dot(&self.input_weight) + &self.bias.view().insert_axis(Axis(0));
        Ok(self.activation.apply_array(preactivation))
    }
}
