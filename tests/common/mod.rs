#![allow(dead_code)]

pub mod mocks;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use climate_predict::{
    model::ModelArtifact,
    server::{self, AppState},
    service::PredictionService,
};
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// prediction = 1.0 + 2.0 * temperature + 0.5 * humidity
pub const LINEAR_MODEL_JSON: &str = r#"{
    "kind": "linear",
    "name": "test-linear",
    "features": ["temperature", "humidity"],
    "coefficients": [2.0, 0.5],
    "intercept": 1.0,
    "trained_at": "2024-03-25T12:00:00Z"
}"#;

/// Two stumps: temperature <= 24.5 -> 10 else 20; humidity <= 50 -> 0 else 40.
pub const FOREST_MODEL_JSON: &str = r#"{
    "kind": "forest",
    "features": ["temperature", "humidity"],
    "trees": [
        { "nodes": [
            { "feature": 0, "threshold": 24.5, "left": 1, "right": 2 },
            { "value": 10.0 },
            { "value": 20.0 }
        ] },
        { "nodes": [
            { "feature": 1, "threshold": 50, "left": 1, "right": 2 },
            { "value": 0.0 },
            { "value": 40.0 }
        ] }
    ]
}"#;

pub fn linear_expected(temperature: f64, humidity: f64) -> f64 {
    1.0 + (2.0 * temperature + 0.5 * humidity)
}

pub fn service_from_json(json: &str) -> PredictionService {
    let artifact = ModelArtifact::from_json(json).expect("test artifact must be valid");
    PredictionService::new(Arc::new(artifact))
}

pub fn create_test_app() -> Router {
    app_with_service(service_from_json(LINEAR_MODEL_JSON))
}

pub fn app_with_service(service: PredictionService) -> Router {
    server::router(AppState::new(service))
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write an artifact file into `dir` and return its path
pub async fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, content)
        .await
        .expect("Failed to write test file");
    path
}

/// POST a raw JSON body to `/predict`
pub async fn post_predict(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
