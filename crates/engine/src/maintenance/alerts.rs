//! Alert classification and deduplication
//!
//! Classifies maintenance predictions into alert kinds and suppresses
//! repeats for the same (equipment, kind) within a configurable window.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::{AlertKind, AlertSeverity, MaintenanceAlert, MaintenancePrediction, Priority};

/// Classification rules:
/// - IMMEDIATE: CRITICAL priority with three days or less
/// - SCHEDULE: HIGH priority with seven days or less
/// - MONITOR: composite risk above 0.6
///
/// Anything else produces no alert. The OPTIMIZE kind stays reserved for
/// caller-side utilization advisories.
pub fn classify(prediction: &MaintenancePrediction) -> Option<(AlertKind, AlertSeverity)> {
    if prediction.priority == Priority::Critical && prediction.days_until_maintenance <= 3.0 {
        Some((AlertKind::Immediate, AlertSeverity::Critical))
    } else if prediction.priority == Priority::High && prediction.days_until_maintenance <= 7.0 {
        Some((AlertKind::Schedule, AlertSeverity::Warning))
    } else if prediction.risk_score > 0.6 {
        Some((AlertKind::Monitor, AlertSeverity::Warning))
    } else {
        None
    }
}

fn message_for(kind: AlertKind, prediction: &MaintenancePrediction) -> String {
    match kind {
        AlertKind::Immediate => format!(
            "{}: maintenance required within {:.0} day(s), risk {:.2}, likely {} failure. Estimated cost {:.0}.",
            prediction.equipment_name,
            prediction.days_until_maintenance.max(0.0),
            prediction.risk_score,
            prediction.failure_type,
            prediction.estimated_cost,
        ),
        AlertKind::Schedule => format!(
            "{}: book maintenance within {:.0} day(s), risk {:.2}. Watch: {}.",
            prediction.equipment_name,
            prediction.days_until_maintenance,
            prediction.risk_score,
            prediction.critical_components.join(", "),
        ),
        AlertKind::Monitor => format!(
            "{}: elevated risk {:.2}, next maintenance predicted in {:.0} day(s).",
            prediction.equipment_name,
            prediction.risk_score,
            prediction.days_until_maintenance,
        ),
        AlertKind::Optimize => format!(
            "{}: review utilization against the maintenance plan.",
            prediction.equipment_name,
        ),
    }
}

/// Alert builder with per (equipment, kind) deduplication.
pub struct AlertBuilder {
    dedup_window: Duration,
    recent: RwLock<HashMap<(String, AlertKind), Instant>>,
}

impl AlertBuilder {
    pub fn new(dedup_window: Duration) -> Self {
        Self {
            dedup_window,
            recent: RwLock::new(HashMap::new()),
        }
    }

    fn should_suppress(&self, equipment_id: &str, kind: AlertKind) -> bool {
        let recent = self.recent.read().unwrap();
        recent
            .get(&(equipment_id.to_string(), kind))
            .map(|last| last.elapsed() < self.dedup_window)
            .unwrap_or(false)
    }

    fn record(&self, equipment_id: &str, kind: AlertKind) {
        let mut recent = self.recent.write().unwrap();
        recent.insert((equipment_id.to_string(), kind), Instant::now());
        let window = self.dedup_window;
        recent.retain(|_, last| last.elapsed() < window);
    }

    /// Builds an alert for the prediction, unless no rule matches or an
    /// identical alert fired within the dedup window.
    pub fn build(&self, prediction: &MaintenancePrediction) -> Option<MaintenanceAlert> {
        let (kind, severity) = classify(prediction)?;
        if self.should_suppress(&prediction.equipment_id, kind) {
            return None;
        }
        self.record(&prediction.equipment_id, kind);

        Some(MaintenanceAlert {
            equipment_id: prediction.equipment_id.clone(),
            kind,
            message: message_for(kind, prediction),
            severity,
            generated_at: chrono::Utc::now().timestamp(),
            acknowledged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureType;

    fn prediction(priority: Priority, days: f32, risk: f32) -> MaintenancePrediction {
        MaintenancePrediction {
            equipment_id: "EX-01".to_string(),
            equipment_name: "Excavator 01".to_string(),
            risk_score: risk,
            predicted_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            days_until_maintenance: days,
            failure_type: FailureType::HydraulicSystem,
            confidence: 0.8,
            recommendations: vec![],
            critical_components: vec!["hydraulic pump".to_string()],
            estimated_cost: 3000.0,
            priority,
            generated_at: 0,
        }
    }

    #[test]
    fn test_classification_rules() {
        assert_eq!(
            classify(&prediction(Priority::Critical, 2.0, 0.9)),
            Some((AlertKind::Immediate, AlertSeverity::Critical))
        );
        assert_eq!(
            classify(&prediction(Priority::High, 6.0, 0.5)),
            Some((AlertKind::Schedule, AlertSeverity::Warning))
        );
        assert_eq!(
            classify(&prediction(Priority::Medium, 20.0, 0.65)),
            Some((AlertKind::Monitor, AlertSeverity::Warning))
        );
        assert_eq!(classify(&prediction(Priority::Low, 60.0, 0.2)), None);
    }

    #[test]
    fn test_critical_priority_far_out_still_monitors_on_risk() {
        // CRITICAL via risk but more than three days away falls through to
        // the risk rule.
        let p = prediction(Priority::Critical, 10.0, 0.85);
        assert_eq!(
            classify(&p),
            Some((AlertKind::Monitor, AlertSeverity::Warning))
        );
    }

    #[test]
    fn test_deduplication_window() {
        let builder = AlertBuilder::new(Duration::from_millis(80));
        let p = prediction(Priority::Critical, 1.0, 0.95);

        assert!(builder.build(&p).is_some());
        assert!(builder.build(&p).is_none());

        std::thread::sleep(Duration::from_millis(120));
        assert!(builder.build(&p).is_some());
    }

    #[test]
    fn test_different_kinds_not_deduplicated() {
        let builder = AlertBuilder::new(Duration::from_secs(60));
        let immediate = prediction(Priority::Critical, 1.0, 0.95);
        let monitor = prediction(Priority::Medium, 30.0, 0.7);

        assert!(builder.build(&immediate).is_some());
        assert!(builder.build(&monitor).is_some());
    }

    #[test]
    fn test_alert_message_carries_context() {
        let builder = AlertBuilder::new(Duration::from_secs(60));
        let alert = builder
            .build(&prediction(Priority::Critical, 2.0, 0.9))
            .unwrap();
        assert!(alert.message.contains("Excavator 01"));
        assert!(alert.message.contains("0.90"));
        assert!(!alert.acknowledged);
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }
}
