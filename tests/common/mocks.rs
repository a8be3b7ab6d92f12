use climate_predict::model::{PredictError, Regressor};
use std::sync::{Arc, Mutex};

/// Mock model that always fails with the configured error
#[derive(Debug)]
pub struct FailingModel {
    pub error: PredictError,
    pub features: Vec<String>,
}

impl FailingModel {
    pub fn new(error: PredictError) -> Self {
        Self {
            error,
            features: vec!["temperature".to_string(), "humidity".to_string()],
        }
    }
}

impl Regressor for FailingModel {
    fn kind(&self) -> &str {
        "failing"
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        Err(self.error.clone())
    }
}

/// Mock model that records every row it sees and returns the row sum
#[derive(Debug, Default)]
pub struct RecordingModel {
    pub rows: Arc<Mutex<Vec<Vec<f64>>>>,
    pub features: Vec<String>,
}

impl RecordingModel {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            features: vec!["temperature".to_string(), "humidity".to_string()],
        }
    }

    pub fn seen(&self) -> Vec<Vec<f64>> {
        self.rows.lock().unwrap().clone()
    }
}

impl Regressor for RecordingModel {
    fn kind(&self) -> &str {
        "recording"
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        self.rows.lock().unwrap().extend(rows.iter().cloned());
        Ok(rows.iter().map(|row| row.iter().sum()).collect())
    }
}
