//! Nutrient regressor
//!
//! A small feed-forward network mapping the five product nutrients
//! (`energia, proteinas, grasas, carbohidratos, fibra`) to one score.
//! Training is seeded so identical inputs give identical models.

pub mod checkpoint;
pub mod model;

use std::sync::{Mutex, PoisonError};

use burn::backend::Autodiff;
use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor, TensorData};
use burn_ndarray::{NdArray, NdArrayDevice};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use model::Regressor;

/// CPU backend used for prediction and checkpoints
pub type InferenceBackend = NdArray;
type TrainingBackend = Autodiff<NdArray>;

/// The ndarray backend keeps one process-wide RNG; seeding and weight
/// initialisation must not interleave across threads.
static BACKEND_RNG: Mutex<()> = Mutex::new(());

/// Width of a regressor input row
pub const INPUT_WIDTH: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum TrainError {
    #[error("No training data")]
    EmptyData,

    #[error("Got {inputs} input rows but {labels} labels")]
    LengthMismatch { inputs: usize, labels: usize },

    #[error("Row {row} has {found} values, expected {expected}")]
    WrongWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} contains a non-finite value")]
    NonFinite { row: usize },

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}

pub type TrainResult<T> = Result<T, TrainError>;

/// Architecture and optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorConfig {
    pub input_width: usize,
    pub hidden_layers: Vec<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub seed: u64,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            input_width: INPUT_WIDTH,
            hidden_layers: vec![64, 32],
            epochs: 100,
            batch_size: 5,
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            seed: 42,
        }
    }
}

impl RegressorConfig {
    pub(crate) fn validate(&self) -> TrainResult<()> {
        if self.input_width == 0 {
            return Err(TrainError::InvalidConfig("input_width must be positive".into()));
        }
        if self.hidden_layers.iter().any(|&units| units == 0) {
            return Err(TrainError::InvalidConfig("hidden layers need at least one unit".into()));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(TrainError::InvalidConfig(
                "epochs and batch_size must be positive".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig("learning_rate must be positive".into()));
        }
        Ok(())
    }

    fn adam(&self) -> AdamConfig {
        AdamConfig::new()
            .with_beta_1(self.beta1 as f32)
            .with_beta_2(self.beta2 as f32)
            .with_epsilon(self.epsilon as f32)
    }
}

/// What a training run produced besides the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub config: RegressorConfig,
    /// Mean squared error per epoch
    pub loss_history: Vec<f64>,
    pub trained_at: DateTime<Utc>,
}

/// A fitted network with its training history
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: Regressor<InferenceBackend>,
    summary: TrainingSummary,
}

impl TrainedModel {
    pub fn predict(&self, row: &[f64]) -> TrainResult<f64> {
        check_row(0, row, self.summary.config.input_width)?;
        self.predict_batch(&[row.to_vec()])?
            .first()
            .copied()
            .ok_or_else(|| TrainError::Checkpoint("model produced no output".to_string()))
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> TrainResult<Vec<f64>> {
        let width = self.summary.config.input_width;
        for (i, row) in rows.iter().enumerate() {
            check_row(i, row, width)?;
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let device = NdArrayDevice::default();
        let indices: Vec<usize> = (0..rows.len()).collect();
        let input = feature_tensor::<InferenceBackend>(rows, &indices, width, &device);
        let output = self.model.forward(input).into_data();
        Ok(output.iter::<f32>().map(f64::from).collect())
    }

    pub fn loss_history(&self) -> &[f64] {
        &self.summary.loss_history
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.summary.loss_history.last().copied()
    }

    pub fn config(&self) -> &RegressorConfig {
        &self.summary.config
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    pub fn model(&self) -> &Regressor<InferenceBackend> {
        &self.model
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.summary.trained_at
    }
}

fn check_row(row: usize, values: &[f64], expected: usize) -> TrainResult<()> {
    if values.len() != expected {
        return Err(TrainError::WrongWidth {
            row,
            expected,
            found: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(TrainError::NonFinite { row });
    }
    Ok(())
}

/// Fit a regressor with mini-batch Adam on mean squared error
pub fn train(inputs: &[Vec<f64>], labels: &[f64], config: &RegressorConfig) -> TrainResult<TrainedModel> {
    config.validate()?;
    if inputs.is_empty() {
        return Err(TrainError::EmptyData);
    }
    if inputs.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            inputs: inputs.len(),
            labels: labels.len(),
        });
    }
    for (i, row) in inputs.iter().enumerate() {
        check_row(i, row, config.input_width)?;
    }
    if let Some(row) = labels.iter().position(|l| !l.is_finite()) {
        return Err(TrainError::NonFinite { row });
    }

    let device = NdArrayDevice::default();
    let mut model = seeded_model::<TrainingBackend>(config, &device);
    let mut optimizer = config
        .adam()
        .init::<TrainingBackend, Regressor<TrainingBackend>>();
    let loss_fn = MseLoss::new();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    let mut loss_history = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        order.shuffle(&mut rng);
        let mut squared_error = 0.0;
        for batch in order.chunks(config.batch_size) {
            let x = feature_tensor::<TrainingBackend>(inputs, batch, config.input_width, &device);
            let y = label_tensor::<TrainingBackend>(labels, batch, &device);
            let loss = loss_fn.forward(model.forward(x), y, Reduction::Mean);
            squared_error += loss.clone().into_scalar().elem::<f64>() * batch.len() as f64;
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }
        let loss = squared_error / inputs.len() as f64;
        tracing::debug!("epoch {}/{}: loss {:.4}", epoch + 1, config.epochs, loss);
        loss_history.push(loss);
    }

    tracing::info!(
        "Trained regressor on {} rows for {} epochs (final loss {:.4})",
        inputs.len(),
        config.epochs,
        loss_history.last().copied().unwrap_or(f64::NAN)
    );

    Ok(TrainedModel {
        model: model.valid(),
        summary: TrainingSummary {
            config: config.clone(),
            loss_history,
            trained_at: Utc::now(),
        },
    })
}

/// He-uniform weights drawn from the backend RNG seeded with `config.seed`
fn seeded_model<B: Backend>(config: &RegressorConfig, device: &B::Device) -> Regressor<B> {
    let _guard = BACKEND_RNG.lock().unwrap_or_else(PoisonError::into_inner);
    B::seed(config.seed);
    Regressor::new(
        config.input_width,
        &config.hidden_layers,
        model::he_uniform(),
        device,
    )
}

/// `[indices.len(), width]` tensor of the selected rows
fn feature_tensor<B: Backend>(
    rows: &[Vec<f64>],
    indices: &[usize],
    width: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let values: Vec<f32> = indices
        .iter()
        .flat_map(|&i| rows[i].iter().map(|&v| v as f32))
        .collect();
    Tensor::from_data(TensorData::new(values, [indices.len(), width]), device)
}

/// `[indices.len(), 1]` tensor of the selected labels
fn label_tensor<B: Backend>(labels: &[f64], indices: &[usize], device: &B::Device) -> Tensor<B, 2> {
    let values: Vec<f32> = indices.iter().map(|&i| labels[i] as f32).collect();
    Tensor::from_data(TensorData::new(values, [indices.len(), 1]), device)
}

/// Demonstration data set used when no product data is supplied
pub fn sample_training_set() -> (Vec<Vec<f64>>, Vec<f64>) {
    let inputs = vec![
        vec![200.0, 5.0, 10.0, 50.0, 3.0],
        vec![250.0, 7.0, 12.0, 55.0, 4.0],
        vec![180.0, 4.0, 8.0, 45.0, 2.0],
        vec![220.0, 6.0, 11.0, 52.0, 3.0],
    ];
    let labels = vec![250.0, 300.0, 230.0, 270.0];
    (inputs, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_decreases_on_sample_set() {
        let (inputs, labels) = sample_training_set();
        let model = train(&inputs, &labels, &RegressorConfig::default()).unwrap();
        let history = model.loss_history();
        assert_eq!(history.len(), 100);
        assert!(history[history.len() - 1] < history[0]);
    }

    #[test]
    fn test_training_is_reproducible() {
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            epochs: 10,
            ..RegressorConfig::default()
        };
        let a = train(&inputs, &labels, &config).unwrap();
        let b = train(&inputs, &labels, &config).unwrap();
        assert_eq!(a.loss_history(), b.loss_history());
        assert_eq!(a.predict_batch(&inputs).unwrap(), b.predict_batch(&inputs).unwrap());
    }

    #[test]
    fn test_rejects_bad_data() {
        let config = RegressorConfig::default();
        assert_eq!(train(&[], &[], &config).unwrap_err(), TrainError::EmptyData);
        assert_eq!(
            train(&[vec![1.0; 5]], &[1.0, 2.0], &config).unwrap_err(),
            TrainError::LengthMismatch { inputs: 1, labels: 2 }
        );
        assert_eq!(
            train(&[vec![1.0; 5], vec![1.0; 4]], &[1.0, 2.0], &config).unwrap_err(),
            TrainError::WrongWidth { row: 1, expected: 5, found: 4 }
        );
        assert_eq!(
            train(&[vec![1.0, f64::NAN, 1.0, 1.0, 1.0]], &[1.0], &config).unwrap_err(),
            TrainError::NonFinite { row: 0 }
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            batch_size: 0,
            ..RegressorConfig::default()
        };
        assert!(matches!(
            train(&inputs, &labels, &config),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_predict_checks_width() {
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            epochs: 2,
            ..RegressorConfig::default()
        };
        let model = train(&inputs, &labels, &config).unwrap();
        assert!(model.predict(&inputs[0]).unwrap().is_finite());
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(TrainError::WrongWidth { expected: 5, found: 2, .. })
        ));
        assert_eq!(model.predict_batch(&inputs).unwrap().len(), 4);
    }

    #[test]
    fn test_uses_configured_architecture() {
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            epochs: 1,
            ..RegressorConfig::default()
        };
        let model = train(&inputs, &labels, &config).unwrap();
        assert_eq!(model.model().layer_shapes(), vec![(5, 64), (64, 32), (32, 1)]);
        assert_eq!(model.loss_history().len(), 1);
    }

    #[test]
    fn test_summary_survives_json() {
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            epochs: 3,
            ..RegressorConfig::default()
        };
        let model = train(&inputs, &labels, &config).unwrap();
        let json = serde_json::to_string(model.summary()).unwrap();
        let restored: TrainingSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, model.summary());
    }
}
