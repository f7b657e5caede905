use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PredictError;
use crate::models::PatientRecord;
use crate::service::PredictionService;

#[derive(Clone)]
pub struct AppState {
    pub service: Option<Arc<PredictionService>>,
}

impl AppState {
    pub fn new(service: Option<PredictionService>) -> Self {
        AppState {
            service: service.map(Arc::new),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "cardio risk service listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn status_for(err: &PredictError) -> StatusCode {
    match err {
        PredictError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn unavailable() -> Response {
    let err = PredictError::Unavailable("model artifacts failed to load".to_string());
    error_response(status_for(&err), err.to_string())
}

async fn home() -> impl IntoResponse {
    Json(json!({ "message": "Cardio Risk Prediction API is running." }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let Some(service) = state.service else {
        warn!(%request_id, "prediction requested while model unavailable");
        return unavailable();
    };
    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => {
            warn!(%request_id, reason = %rejection.body_text(), "malformed prediction body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match service.predict(&record) {
        Ok(report) => {
            info!(
                %request_id,
                risk = report.risk_prediction,
                probability = report.risk_probability,
                "prediction served"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(err) => {
            warn!(%request_id, error = %err, "prediction rejected");
            error_response(status_for(&err), err.to_string())
        }
    }
}

async fn model_info(State(state): State<AppState>) -> Response {
    let Some(service) = state.service else {
        return unavailable();
    };
    (StatusCode::OK, Json(service.model_info())).into_response()
}
