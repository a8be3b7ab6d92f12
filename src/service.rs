use crate::{
    Result,
    model::{self, PredictError, Regressor},
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tracing::debug;

/// Input columns in the order the model was fitted on.
pub const FEATURES: [&str; 2] = ["temperature", "humidity"];

/// Owns the loaded model and turns request values into predictions.
///
/// Cheap to clone; clones share the same read-only model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn Regressor>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self { model }
    }

    /// Loads the artifact at `path`. Fails if it does not accept exactly the
    /// columns in [`FEATURES`].
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let artifact = model::load(path, FEATURES.len()).await?;
        Ok(Self::new(Arc::new(artifact)))
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    /// Builds the single-row feature vector `[[temperature, humidity]]` and
    /// returns the first model output.
    pub fn predict(
        &self,
        temperature: &Value,
        humidity: &Value,
    ) -> std::result::Result<f64, PredictError> {
        let row = vec![
            feature_value(FEATURES[0], temperature)?,
            feature_value(FEATURES[1], humidity)?,
        ];
        debug!("Running inference on {:?}", row);

        let outputs = self.model.predict(&[row])?;
        outputs.first().copied().ok_or(PredictError::EmptyPrediction)
    }
}

fn feature_value(name: &str, value: &Value) -> std::result::Result<f64, PredictError> {
    value.as_f64().ok_or_else(|| PredictError::InvalidFeature {
        name: name.to_string(),
        value: value.to_string(),
    })
}
