use super::types::{ErrorResponse, HealthResponse, PredictionResponse};
use crate::{model::PredictError, service::PredictionService};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

pub const MISSING_FIELDS_MESSAGE: &str = "Please provide both temperature and humidity";

#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self { service }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Inference(PredictError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// An absent body, a missing JSON content type and unparsable JSON are all
// treated as a bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::BadRequest(msg) => msg,
            Self::Inference(e) => e.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let span = info_span!("predict", request_id = %Uuid::new_v4());
    let _enter = span.enter();

    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    // A non-object body has no keys, so both fields read as absent.
    let temperature = body.get("temperature").filter(|v| !v.is_null());
    let humidity = body.get("humidity").filter(|v| !v.is_null());

    let (Some(temperature), Some(humidity)) = (temperature, humidity) else {
        info!("Request is missing temperature or humidity");
        return Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()));
    };

    match state.service.predict(temperature, humidity) {
        Ok(prediction) => {
            info!("Prediction for ({}, {}): {}", temperature, humidity, prediction);
            Ok(Json(PredictionResponse { prediction }))
        }
        Err(e) => {
            error!("Inference failed for ({}, {}): {}", temperature, humidity, e);
            Err(ApiError::Inference(e))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.service.model();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: model.name().to_string(),
        features: model.features().to_vec(),
    })
}
