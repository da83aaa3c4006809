use ndarray::{Array1, Array2};
use rand::Rng;
use tracing::{debug_span, info};

use crate::error::{ElmError, Result};
use crate::hidden::{FeatureMapper, HiddenLayer};
use crate::hyperparameters::ElmConfig;
use crate::loss::Loss;
use crate::readout::{train_readout, Readout, Regularization};
use crate::utils::{argmax_rows, ensure_finite};

/// Extreme learning machine: a fixed random feature mapping followed by a
/// regularized linear readout.
///
/// The model is untrained until [`Elm::train`] succeeds. Training takes
/// `&mut self`, so sharing one model between threads that train requires
/// external locking; prediction only reads.
#[derive(Debug, Clone)]
pub struct Elm<M: FeatureMapper = HiddenLayer> {
    mapper: M,
    regularization: Regularization,
    readout: Option<Readout>,
}

impl Elm<HiddenLayer> {
    /// Validates `config` and draws the hidden layer, seeded by `config.seed` if set.
    pub fn new(config: ElmConfig) -> Result<Self> {
        config.validate()?;
        let regularization = config.regularization()?;
        Ok(Elm::with_mapper(HiddenLayer::from_config(&config)?, regularization))
    }

    /// Like [`Elm::new`] but draws the hidden layer from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: ElmConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let regularization = config.regularization()?;
        Ok(Elm::with_mapper(
            HiddenLayer::from_config_with_rng(&config, rng)?,
            regularization,
        ))
    }
}

impl<M: FeatureMapper> Elm<M> {
    pub fn with_mapper(mapper: M, regularization: Regularization) -> Self {
        Elm {
            mapper,
            regularization,
            readout: None,
        }
    }

    /// Fits the readout on samples `x` (`N x input_neurons`) and targets `y` (`N x m`).
    ///
    /// The stored readout is only replaced once training succeeds, so a
    /// failure leaves the model as it was.
    pub fn train(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
        let _span = debug_span!("elm_train", samples = x.nrows(), outputs = y.ncols()).entered();

        self.check_input(x)?;
        if y.nrows() != x.nrows() {
            return Err(ElmError::shape("Y rows", x.nrows(), y.nrows()));
        }
        ensure_finite("Y", y)?;

        let h = self.mapper.map(x)?;
        let readout = train_readout(&h, y, &self.regularization)?;

        info!(
            samples = x.nrows(),
            hidden_neurons = self.mapper.hidden_neurons(),
            outputs = readout.outputs(),
            alpha = self.regularization.alpha(),
            "readout trained"
        );
        self.readout = Some(readout);
        Ok(())
    }

    /// Predicted outputs (`K x m`) for samples `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let _span = debug_span!("elm_predict", samples = x.nrows()).entered();

        let readout = self.readout.as_ref().ok_or(ElmError::NotTrained)?;
        self.check_input(x)?;
        readout.predict(&self.mapper.map(x)?)
    }

    /// Row-wise argmax of the prediction, for models trained on one-hot targets.
    pub fn predict_classes(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        Ok(argmax_rows(&self.predict(x)?))
    }

    pub fn evaluate(&self, x: &Array2<f64>, y: &Array2<f64>, loss: Loss) -> Result<f64> {
        loss.calculate(&self.predict(x)?, y)
    }

    /// Hidden-layer output for `x`, as consumed by the readout.
    pub fn hidden_output(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        self.mapper.map(x)
    }

    pub fn is_trained(&self) -> bool {
        self.readout.is_some()
    }

    pub fn readout(&self) -> Option<&Readout> {
        self.readout.as_ref()
    }

    pub fn output_weight(&self) -> Option<&Array2<f64>> {
        self.readout.as_ref().map(|r| &r.output_weight)
    }

    pub fn intercept(&self) -> Option<&Array1<f64>> {
        self.readout.as_ref().and_then(|r| r.intercept.as_ref())
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn regularization(&self) -> &Regularization {
        &self.regularization
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.mapper.input_neurons() {
            return Err(ElmError::shape("X columns", self.mapper.input_neurons(), x.ncols()));
        }
        if x.nrows() == 0 {
            return Err(ElmError::invalid("X", "must contain at least one sample"));
        }
        ensure_finite("X", x)
    }
}
