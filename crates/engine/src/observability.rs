//! Observability infrastructure for the prediction engine
//!
//! Prometheus metrics behind a process-global handle; structured logging
//! goes through `tracing` at the call sites.

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for training runs (seconds).
const TRAINING_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Histogram buckets for single predictions (seconds).
const PREDICTION_BUCKETS: &[f64] = &[
    0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

static GLOBAL_METRICS: OnceLock<EngineMetrics> = OnceLock::new();

/// Engine metrics registered once per process.
pub struct EngineMetrics {
    training_seconds: Histogram,
    prediction_seconds: Histogram,
    models_registered: IntGauge,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    training_errors_total: IntCounter,
    alerts_total: IntCounter,
    assignments_total: IntCounter,
}

impl EngineMetrics {
    fn new() -> Self {
        Self {
            training_seconds: register_histogram!(
                "foreman_engine_training_seconds",
                "Wall time of model training runs",
                TRAINING_BUCKETS.to_vec()
            )
            .expect("Failed to register training_seconds"),

            prediction_seconds: register_histogram!(
                "foreman_engine_prediction_seconds",
                "Wall time of single model predictions",
                PREDICTION_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_seconds"),

            models_registered: register_int_gauge!(
                "foreman_engine_models_registered",
                "Number of models currently registered"
            )
            .expect("Failed to register models_registered"),

            predictions_total: register_int_counter!(
                "foreman_engine_predictions_total",
                "Total predictions served"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "foreman_engine_prediction_errors_total",
                "Total prediction failures"
            )
            .expect("Failed to register prediction_errors_total"),

            training_errors_total: register_int_counter!(
                "foreman_engine_training_errors_total",
                "Total training failures"
            )
            .expect("Failed to register training_errors_total"),

            alerts_total: register_int_counter!(
                "foreman_engine_alerts_total",
                "Total maintenance alerts generated"
            )
            .expect("Failed to register alerts_total"),

            assignments_total: register_int_counter!(
                "foreman_engine_assignments_total",
                "Total work assignments produced"
            )
            .expect("Failed to register assignments_total"),
        }
    }

    pub fn observe_training(&self, seconds: f64) {
        self.training_seconds.observe(seconds);
    }

    pub fn observe_prediction(&self, seconds: f64) {
        self.prediction_seconds.observe(seconds);
    }

    pub fn set_models_registered(&self, count: i64) {
        self.models_registered.set(count);
    }

    pub fn inc_predictions(&self) {
        self.predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.prediction_errors_total.inc();
    }

    pub fn inc_training_errors(&self) {
        self.training_errors_total.inc();
    }

    pub fn add_alerts(&self, count: u64) {
        self.alerts_total.inc_by(count);
    }

    pub fn add_assignments(&self, count: u64) {
        self.assignments_total.inc_by(count);
    }
}

/// Process-global metrics handle, registered on first use.
pub fn metrics() -> &'static EngineMetrics {
    GLOBAL_METRICS.get_or_init(EngineMetrics::new)
}
