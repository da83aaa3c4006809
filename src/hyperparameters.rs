use crate::activation::Activation;
use crate::elastic_net::ElasticNetOptions;
use crate::error::{ElmError, Result};
use crate::hidden::WeightInit;
use crate::readout::Regularization;

/// Hyperparameters for an extreme learning machine
#[derive(Debug, Clone)]
pub struct ElmConfig {
    /// Number of input features, required
    pub input_neurons: usize,

    /// Width of the random hidden layer
    pub hidden_neurons: usize,

    /// Regularization parameter C; the penalty strength is 1/C
    pub regularization: f64,

    /// Elastic-net mixing: 0 is ridge, 1 is lasso
    pub alpha: f64,

    pub activation: Activation,

    pub weight_init: WeightInit,

    /// Seed for the hidden layer draw, `None` uses the thread rng
    pub seed: Option<u64>,

    /// Solver settings used when `alpha > 0`
    pub elastic_net: ElasticNetOptions,
}

impl ElmConfig {
    pub fn new(input_neurons: usize) -> Self {
        ElmConfig {
            input_neurons,
            hidden_neurons: 1000,
            regularization: 1000.0,
            alpha: 0.0,
            activation: Activation::default(),
            weight_init: WeightInit::default(),
            seed: None,
            elastic_net: ElasticNetOptions::default(),
        }
    }

    pub fn with_hidden_neurons(mut self, hidden_neurons: usize) -> Self {
        self.hidden_neurons = hidden_neurons;
        self
    }

    pub fn with_regularization(mut self, c: f64) -> Self {
        self.regularization = c;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = weight_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_elastic_net(mut self, options: ElasticNetOptions) -> Self {
        self.elastic_net = options;
        self
    }

    /// Checks every field, reporting the first invalid one
    pub fn validate(&self) -> Result<()> {
        if self.input_neurons == 0 {
            return Err(ElmError::invalid("input_neurons", "must be a positive integer"));
        }
        if self.hidden_neurons == 0 {
            return Err(ElmError::invalid("hidden_neurons", "must be a positive integer"));
        }
        self.regularization().map(|_| ())
    }

    /// Resolves the readout regularization once, before any training
    pub fn regularization(&self) -> Result<Regularization> {
        let regularization = Regularization::from_params(self.regularization, self.alpha)?;
        match regularization {
            Regularization::Ridge { .. } => Ok(regularization),
            Regularization::ElasticNet { c, alpha, .. } => {
                self.elastic_net.validate()?;
                Ok(Regularization::ElasticNet {
                    c,
                    alpha,
                    options: self.elastic_net.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hyperparameters() {
        let config = ElmConfig::new(4);

        assert_eq!(config.input_neurons, 4);
        assert_eq!(config.hidden_neurons, 1000);
        assert_eq!(config.regularization, 1000.0);
        assert_eq!(config.alpha, 0.0);
        assert!(matches!(config.activation, Activation::Sigmoid));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_regularization_variant() {
        let ridge = ElmConfig::new(2).regularization().unwrap();
        assert!(matches!(ridge, Regularization::Ridge { c } if c == 1000.0));

        let lasso = ElmConfig::new(2)
            .with_alpha(1.0)
            .with_regularization(2.0)
            .regularization()
            .unwrap();
        assert!(matches!(lasso, Regularization::ElasticNet { c, alpha, .. } if c == 2.0 && alpha == 1.0));
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let err = ElmConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "input_neurons", .. }));

        let err = ElmConfig::new(3).with_hidden_neurons(0).validate().unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "hidden_neurons", .. }));

        let err = ElmConfig::new(3).with_regularization(0.0).validate().unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "regularization", .. }));

        let err = ElmConfig::new(3).with_alpha(1.5).validate().unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "alpha", .. }));

        let options = ElasticNetOptions { path_len: 0, ..ElasticNetOptions::default() };
        let err = ElmConfig::new(3)
            .with_alpha(0.5)
            .with_elastic_net(options)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "path_len", .. }));
    }
}
