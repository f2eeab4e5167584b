//! Prediction and optimization engine for the Foreman platform
//!
//! This crate provides the core functionality for:
//! - A registry of trainable numeric prediction models
//! - Feature engineering from equipment and workforce history, with a
//!   synthetic fallback for cold starts
//! - Predictive equipment maintenance (risk scores, priorities, alerts)
//! - Workforce optimization (assignments, schedules, demand forecasts)
//! - Health checks and observability
//!
//! Construct one [`PredictionEngine`] at process start, call
//! [`PredictionEngine::initialize`] once, and pass it by reference to every
//! call site.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod health;
pub mod maintenance;
pub mod models;
pub mod observability;
pub mod registry;
pub mod store;
pub mod workforce;

pub use config::{EngineConfig, RiskWeights, TrainingOptions};
pub use engine::{maintenance_model_id, PredictionEngine};
pub use error::{EngineError, Result};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{metrics, EngineMetrics};
pub use registry::{Architecture, ModelInfo, ModelMetrics, ModelRegistry, TaskKind, TrainingSet};
pub use store::{InMemoryStore, OpsStore};
