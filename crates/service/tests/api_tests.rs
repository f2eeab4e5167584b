//! Integration tests for the service API surface
//!
//! Builds a small engine over the in-memory store and drives the routes
//! with tower's oneshot, mirroring how the binary wires them.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use foreman_engine::{
    ComponentStatus, EngineConfig, EquipmentSnapshot, EquipmentType, InMemoryStore,
    MaintenanceKind, MaintenanceRecord, PredictionEngine, TrainingOptions, WorkTask,
};
use tower::ServiceExt;

#[derive(Clone)]
struct AppState {
    engine: Arc<PredictionEngine>,
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.engine.health().health().await;
    let status = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.engine.health().readiness().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

async fn predict_maintenance(
    State(state): State<Arc<AppState>>,
    Path(equipment_id): Path<String>,
) -> impl IntoResponse {
    match state.engine.predict_maintenance(&equipment_id).await {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn optimize_assignments(
    State(state): State<Arc<AppState>>,
    Json(tasks): Json<Vec<WorkTask>>,
) -> impl IntoResponse {
    match state.engine.optimize_assignments(&tasks).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/v1/maintenance/:equipment_id", get(predict_maintenance))
        .route("/v1/workforce/assignments", post(optimize_assignments))
        .with_state(state)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn test_engine(initialize: bool) -> Arc<PredictionEngine> {
    let store = InMemoryStore::new();
    store
        .add_equipment(EquipmentSnapshot {
            id: "EX-01".to_string(),
            name: "Excavator 01".to_string(),
            equipment_type: EquipmentType::Excavator,
            purchase_date: date(2019, 5, 1),
            usage_hours: 9_500.0,
            usage_distance_km: 20_000.0,
            service_interval_hours: Some(500.0),
            active: true,
            maintenance_history: vec![
                MaintenanceRecord {
                    date: date(2024, 3, 1),
                    kind: MaintenanceKind::Preventive,
                    cost: 1_000.0,
                    downtime_hours: 8.0,
                    description: "service".to_string(),
                },
                MaintenanceRecord {
                    date: date(2024, 8, 1),
                    kind: MaintenanceKind::Repair,
                    cost: 2_500.0,
                    downtime_hours: 12.0,
                    description: "repair".to_string(),
                },
            ],
            usage_history: vec![],
        })
        .await;

    let config = EngineConfig {
        synthetic_rows: 200,
        training: TrainingOptions {
            epochs: 20,
            ..TrainingOptions::default()
        },
        ..EngineConfig::default()
    };
    let engine = Arc::new(PredictionEngine::new(Arc::new(store), config));
    if initialize {
        engine.initialize().await.unwrap();
    }
    engine
}

async fn setup_app(initialize: bool) -> Router {
    let engine = test_engine(initialize).await;
    create_test_router(Arc::new(AppState { engine }))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthz_ok_after_initialize() {
    let app = setup_app(true).await;

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_gated_on_warmup() {
    let cold = setup_app(false).await;
    let response = cold
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let warm = setup_app(true).await;
    let response = warm
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_maintenance_prediction_endpoint() {
    let app = setup_app(true).await;

    let response = app
        .oneshot(
            Request::get("/v1/maintenance/EX-01")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["equipment_id"], "EX-01");
    let risk = json["risk_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&risk));
    assert!(json["priority"].is_string());
    assert!(json["recommendations"].is_array());
}

#[tokio::test]
async fn test_unknown_equipment_is_404() {
    let app = setup_app(true).await;

    let response = app
        .oneshot(
            Request::get("/v1/maintenance/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_assignment_batch_is_vacuously_complete() {
    let app = setup_app(true).await;

    let response = app
        .oneshot(
            Request::post("/v1/workforce/assignments")
                .header("content-type", "application/json")
                .body(Body::from("[]"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["completion_rate"], 1.0);
    assert_eq!(json["assignments"].as_array().unwrap().len(), 0);
}
