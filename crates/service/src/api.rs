//! HTTP API over the prediction engine
//!
//! Health and metrics endpoints plus thin JSON handlers for the engine
//! operations. All decision logic lives in the engine crate.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use foreman_engine::{
    ComponentStatus, EngineError, ForecastFactors, PredictionEngine, ScheduleConstraints,
    Timeframe, WorkTask,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
}

impl AppState {
    pub fn new(engine: Arc<PredictionEngine>) -> Self {
        Self { engine }
    }
}

fn error_response(err: EngineError) -> (StatusCode, String) {
    let status = match &err {
        EngineError::EquipmentNotFound(_)
        | EngineError::UnknownModel(_)
        | EngineError::NoModelForType(_) => StatusCode::NOT_FOUND,
        EngineError::ModelNotLoaded(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::ShapeMismatch { .. } | EngineError::InvalidTrainingSet(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Health check: 200 while operational, 503 when a component failed.
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.engine.health().health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

/// Readiness check: 200 once warm-up finished.
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.engine.health().readiness().await;
    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(readiness))
}

/// Prometheus metrics exposition.
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.registry().list().await)
}

async fn predict_maintenance(
    State(state): State<Arc<AppState>>,
    Path(equipment_id): Path<String>,
) -> impl IntoResponse {
    match state.engine.predict_maintenance(&equipment_id).await {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn generate_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.engine.generate_alerts().await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn optimize_assignments(
    State(state): State<Arc<AppState>>,
    Json(tasks): Json<Vec<WorkTask>>,
) -> impl IntoResponse {
    match state.engine.optimize_assignments(&tasks).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub constraints: ScheduleConstraints,
}

async fn optimize_schedules(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleRequest>,
) -> impl IntoResponse {
    let pool = match state.engine.workforce_pool().await {
        Ok(pool) => pool,
        Err(err) => return error_response(err).into_response(),
    };
    let schedules = state
        .engine
        .optimize_schedules(&pool, &request.constraints)
        .await;
    (StatusCode::OK, Json(schedules)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub timeframe: Timeframe,
    pub factors: ForecastFactors,
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .predict_workforce_needs(request.timeframe, &request.factors)
        .await
    {
        Ok(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/v1/models", get(list_models))
        .route("/v1/maintenance/:equipment_id", get(predict_maintenance))
        .route("/v1/alerts", get(generate_alerts))
        .route("/v1/workforce/assignments", post(optimize_assignments))
        .route("/v1/workforce/schedules", post(optimize_schedules))
        .route("/v1/workforce/forecast", post(forecast))
        .with_state(state)
}

/// Start the API server.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
