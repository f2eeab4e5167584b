//! Engine configuration
//!
//! Every threshold the decision layers depend on lives here so tests can
//! exercise both the real and synthetic paths deterministically.

use std::time::Duration;

/// Default number of historical units below which a type falls back to
/// synthetic training.
pub const DEFAULT_SYNTHETIC_THRESHOLD: usize = 5;

/// Default number of synthetic rows generated per cold-start model.
pub const DEFAULT_SYNTHETIC_ROWS: usize = 1000;

/// Weights of the composite maintenance risk score.
#[derive(Debug, Clone)]
pub struct RiskWeights {
    /// Weight of time pressure, `max(0, 1 - days/horizon)`.
    pub time_pressure: f32,
    /// Cap of the age-pressure contribution.
    pub age: f32,
    /// Cap of the usage-ratio contribution (applies only when a service
    /// interval is known).
    pub usage: f32,
    /// Flat bonus for equipment types flagged critical.
    pub critical_type_bonus: f32,
    /// Days over which time pressure decays to zero.
    pub horizon_days: f32,
    /// Age at which age pressure saturates.
    pub expected_life_months: f32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            time_pressure: 0.4,
            age: 0.3,
            usage: 0.2,
            critical_type_bonus: 0.1,
            horizon_days: 90.0,
            expected_life_months: 120.0,
        }
    }
}

/// Hyperparameters for a registry training run.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    /// Fraction of rows held out for validation, in (0, 1).
    pub validation_split: f32,
    /// Consecutive epochs without validation improvement before stopping.
    pub patience: usize,
    pub learning_rate: f32,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 60,
            batch_size: 32,
            validation_split: 0.2,
            patience: 5,
            learning_rate: 0.01,
        }
    }
}

/// Tunables for the prediction and optimization engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum real historical units per equipment type before training on
    /// real data; below this the synthetic generator is used.
    pub synthetic_history_threshold: usize,
    /// Rows generated per synthetic training set.
    pub synthetic_rows: usize,
    /// Minimum fitness score for a candidate to receive an assignment.
    pub assignment_score_threshold: f32,
    /// Minimum fitness score for a worker to receive a schedule.
    pub schedule_score_threshold: f32,
    /// Nominal confidence reported for regression-family predictions.
    /// A known approximation, not a calibrated value.
    pub regression_confidence: f32,
    /// Maintenance-event gaps longer than this are discarded as outliers.
    pub max_event_gap_days: f32,
    /// Amplitude of the random jitter feature in assignment scoring.
    pub assignment_jitter: f32,
    /// Seed for weight init, shuffling, synthetic data, and jitter.
    pub rng_seed: u64,
    /// Alerts for the same (equipment, kind) within this window are
    /// suppressed.
    pub alert_dedup_window: Duration,
    pub risk: RiskWeights,
    pub training: TrainingOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synthetic_history_threshold: DEFAULT_SYNTHETIC_THRESHOLD,
            synthetic_rows: DEFAULT_SYNTHETIC_ROWS,
            assignment_score_threshold: 0.6,
            schedule_score_threshold: 0.5,
            regression_confidence: 0.8,
            max_event_gap_days: 365.0,
            assignment_jitter: 0.02,
            rng_seed: 7,
            alert_dedup_window: Duration::from_secs(15 * 60),
            risk: RiskWeights::default(),
            training: TrainingOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration with jitter disabled, for deterministic tests.
    pub fn deterministic() -> Self {
        Self {
            assignment_jitter: 0.0,
            ..Self::default()
        }
    }
}
