use thiserror::Error;

/// Failure raised while building a feature row or running inference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("invalid value for feature '{name}': expected a number, got {value}")]
    InvalidFeature { name: String, value: String },

    #[error("feature vector has {actual} columns but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model returned no prediction")]
    EmptyPrediction,

    #[error("model produced a non-finite prediction: {0}")]
    NonFinite(f64),

    #[error("model is corrupt: {0}")]
    CorruptModel(String),
}

/// A pre-fitted model mapping fixed-width numeric rows to scalar outputs.
pub trait Regressor: Send + Sync {
    /// Short identifier of the estimator family, e.g. `linear`.
    fn kind(&self) -> &str;

    /// Human readable name; defaults to the estimator kind.
    fn name(&self) -> &str {
        self.kind()
    }

    /// Ordered input feature names.
    fn features(&self) -> &[String];

    fn n_features(&self) -> usize {
        self.features().len()
    }

    /// Runs inference on every row, returning one output per row.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError>;
}

pub(crate) fn check_row(row: &[f64], expected: usize) -> Result<(), PredictError> {
    if row.len() != expected {
        return Err(PredictError::ShapeMismatch {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(value: f64) -> Result<f64, PredictError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictError::NonFinite(value))
    }
}
