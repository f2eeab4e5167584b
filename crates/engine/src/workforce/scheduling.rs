//! Shift scheduling
//!
//! Scores each worker with the schedule-fitness model and emits a shift
//! sized to the constraint window and the worker's weekly capacity.

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::features::schedule_features;
use crate::models::{Candidate, ScheduleConstraints, ShiftKind, ShiftSchedule};
use crate::registry::ModelRegistry;

/// Registry id of the schedule-fitness model.
pub const SCHEDULE_MODEL_ID: &str = "workforce-schedule";

fn shift_start(shift: ShiftKind) -> NaiveTime {
    match shift {
        ShiftKind::Day => NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        ShiftKind::Night => NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
    }
}

/// Produces a schedule per worker whose fitness clears the threshold.
/// Workers the model scores below it, and unavailable workers, are skipped.
pub async fn optimize_schedules(
    registry: &ModelRegistry,
    config: &EngineConfig,
    workers: &[Candidate],
    constraints: &ScheduleConstraints,
) -> Vec<ShiftSchedule> {
    let mut schedules = Vec::new();

    for worker in workers.iter().filter(|w| w.is_available()) {
        let features = schedule_features(worker, constraints);
        let prediction = match registry.predict(SCHEDULE_MODEL_ID, &features).await {
            Ok(p) => p,
            Err(e) => {
                warn!(worker_id = %worker.id(), error = %e, "schedule scoring failed, skipping worker");
                continue;
            }
        };

        let score = prediction
            .values
            .first()
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        if score < config.schedule_score_threshold {
            debug!(worker_id = %worker.id(), score, "below schedule threshold");
            continue;
        }

        // Preference inferred from the worker's profile; unknown leans day.
        let shift = worker.shift_preference().unwrap_or(ShiftKind::Day);
        let hours = constraints
            .shift_length_hours
            .min(worker.max_hours_per_week() / 5.0);
        let start = shift_start(shift);

        schedules.push(ShiftSchedule {
            worker_id: worker.id().to_string(),
            worker_name: worker.name().to_string(),
            worker_kind: worker.kind(),
            shift,
            date: constraints.date,
            start_time: start,
            end_time: start + chrono::Duration::minutes((hours * 60.0) as i64),
            assignments: Vec::new(),
            total_hours: hours,
            utilization: (hours / constraints.shift_length_hours).clamp(0.0, 1.0),
            efficiency_score: score,
        });
    }

    balance_coverage(schedules, constraints)
}

/// Extension point for 24-hour-coverage balancing. The baseline design
/// deliberately passes schedules through unchanged; deployments with
/// round-the-clock sites override the distribution here.
fn balance_coverage(
    schedules: Vec<ShiftSchedule>,
    _constraints: &ScheduleConstraints,
) -> Vec<ShiftSchedule> {
    schedules
}
