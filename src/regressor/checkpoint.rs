//! JSON checkpoints for trained regressors
//!
//! Weights go through burn's pretty-JSON recorder; the training summary
//! (configuration, loss history, timestamp) sits beside them as
//! `<name>.meta.json`.

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::nn::Initializer;
use burn::record::{FullPrecisionSettings, PrettyJsonFileRecorder};
use burn_ndarray::NdArrayDevice;

use super::model::Regressor;
use super::{InferenceBackend, TrainError, TrainResult, TrainedModel, TrainingSummary};
use crate::store;

fn recorder() -> PrettyJsonFileRecorder<FullPrecisionSettings> {
    PrettyJsonFileRecorder::<FullPrecisionSettings>::new()
}

/// Sidecar holding the training summary of the checkpoint at `path`
pub fn summary_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Write weights to `path` and the summary next to it
pub fn save_checkpoint(model: &TrainedModel, path: &Path) -> TrainResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TrainError::Checkpoint(e.to_string()))?;
    }
    model
        .model
        .clone()
        .save_file(path.to_path_buf(), &recorder())
        .map_err(|e| TrainError::Checkpoint(e.to_string()))?;
    store::save_json(&summary_path(path), &model.summary)
        .map_err(|e| TrainError::Checkpoint(e.to_string()))?;
    tracing::info!("Saved regressor checkpoint to {}", path.display());
    Ok(())
}

/// Rebuild the architecture recorded in the summary and load its weights
pub fn load_checkpoint(path: &Path) -> TrainResult<TrainedModel> {
    let summary: TrainingSummary = store::load_json(&summary_path(path))
        .map_err(|e| TrainError::Checkpoint(e.to_string()))?;
    summary.config.validate()?;

    let device = NdArrayDevice::default();
    let model = Regressor::<InferenceBackend>::new(
        summary.config.input_width,
        &summary.config.hidden_layers,
        Initializer::Zeros,
        &device,
    )
    .load_file(path.to_path_buf(), &recorder(), &device)
    .map_err(|e| TrainError::Checkpoint(e.to_string()))?;

    tracing::debug!("Loaded regressor checkpoint from {}", path.display());
    Ok(TrainedModel { model, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressor::{sample_training_set, train, RegressorConfig};
    use tempfile::TempDir;

    #[test]
    fn test_checkpoint_restores_predictions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("regressor.json");
        let (inputs, labels) = sample_training_set();
        let config = RegressorConfig {
            epochs: 3,
            ..RegressorConfig::default()
        };
        let model = train(&inputs, &labels, &config).unwrap();
        save_checkpoint(&model, &path).unwrap();
        assert!(path.exists());
        assert!(dir.path().join("models").join("regressor.meta.json").exists());

        let restored = load_checkpoint(&path).unwrap();
        assert_eq!(restored.summary(), model.summary());
        let before = model.predict(&inputs[1]).unwrap();
        let after = restored.predict(&inputs[1]).unwrap();
        assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load_checkpoint(&dir.path().join("regressor.json"));
        assert!(matches!(result, Err(TrainError::Checkpoint(_))));
    }
}
