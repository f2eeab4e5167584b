//! Maintenance risk synthesis
//!
//! Converts a raw "days until maintenance" model output into a risk score,
//! priority tier, failure-type guess, critical-component list, cost
//! estimate, and recommendation strings. Everything in this module is a
//! deterministic rule layer on top of the model output.

use chrono::NaiveDate;

use crate::config::RiskWeights;
use crate::models::{EquipmentSnapshot, EquipmentType, FailureType, Priority};

use crate::features::months_between;

/// Base cost of a maintenance visit before type and condition multipliers.
const BASE_MAINTENANCE_COST: f32 = 1200.0;

/// Cap of the age-based cost multiplier.
const MAX_AGE_COST_MULTIPLIER: f32 = 1.5;

/// Composite risk score in [0, 1].
///
/// Weighted sum of time pressure, age pressure, usage-ratio pressure (only
/// when a service interval is known), plus a flat bonus for critical
/// equipment types.
pub fn risk_score(
    days_until: f32,
    age_months: f32,
    hours_since_service: f32,
    service_interval_hours: Option<f32>,
    equipment_type: EquipmentType,
    weights: &RiskWeights,
) -> f32 {
    let time_pressure =
        (1.0 - days_until / weights.horizon_days).max(0.0) * weights.time_pressure;

    let age_pressure = (age_months / weights.expected_life_months).min(1.0) * weights.age;

    let usage_pressure = match service_interval_hours {
        Some(interval) if interval > 0.0 => {
            (hours_since_service / interval).min(1.0) * weights.usage
        }
        _ => 0.0,
    };

    let critical_bonus = if equipment_type.is_critical() {
        weights.critical_type_bonus
    } else {
        0.0
    };

    (time_pressure + age_pressure + usage_pressure + critical_bonus).clamp(0.0, 1.0)
}

/// Priority tier from risk and time-to-event. The day boundaries are
/// absolute: three days or less forces CRITICAL regardless of risk.
pub fn priority_for(risk: f32, days_until: f32) -> Priority {
    if risk > 0.8 || days_until <= 3.0 {
        Priority::Critical
    } else if risk > 0.6 || days_until <= 7.0 {
        Priority::High
    } else if risk > 0.4 || days_until <= 14.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Likely failure mode by equipment type and usage thresholds.
pub fn failure_type(equipment_type: EquipmentType, usage_hours: f32, distance_km: f32) -> FailureType {
    match equipment_type {
        EquipmentType::Excavator if usage_hours > 8_000.0 => FailureType::HydraulicSystem,
        EquipmentType::Excavator => FailureType::GeneralWear,
        EquipmentType::DumpTruck if distance_km > 100_000.0 => FailureType::Engine,
        EquipmentType::DumpTruck => FailureType::Powertrain,
        EquipmentType::DrillRig if usage_hours > 6_000.0 => FailureType::HydraulicSystem,
        EquipmentType::DrillRig => FailureType::Powertrain,
        EquipmentType::Loader if usage_hours > 9_000.0 => FailureType::Powertrain,
        EquipmentType::Loader => FailureType::GeneralWear,
        EquipmentType::Crane if usage_hours > 7_000.0 => FailureType::StructuralFatigue,
        EquipmentType::Crane => FailureType::Electrical,
        EquipmentType::Grader if distance_km > 60_000.0 => FailureType::Powertrain,
        EquipmentType::Grader => FailureType::GeneralWear,
    }
}

/// Components worth inspecting first, by type and wear state.
pub fn critical_components(
    equipment_type: EquipmentType,
    usage_hours: f32,
    distance_km: f32,
) -> Vec<String> {
    let list: &[&str] = match equipment_type {
        EquipmentType::Excavator if usage_hours > 8_000.0 => {
            &["hydraulic pump", "boom cylinders", "slew ring"]
        }
        EquipmentType::Excavator => &["track chains", "bucket teeth"],
        EquipmentType::DumpTruck if distance_km > 100_000.0 => {
            &["engine", "turbocharger", "brake system"]
        }
        EquipmentType::DumpTruck => &["suspension", "tires"],
        EquipmentType::DrillRig if usage_hours > 6_000.0 => {
            &["rotary head", "hydraulic hoses", "compressor"]
        }
        EquipmentType::DrillRig => &["drill string", "mast rollers"],
        EquipmentType::Loader if usage_hours > 9_000.0 => {
            &["transmission", "torque converter", "axles"]
        }
        EquipmentType::Loader => &["bucket edge", "lift arms"],
        EquipmentType::Crane if usage_hours > 7_000.0 => {
            &["boom sections", "hoist rope", "slew bearing"]
        }
        EquipmentType::Crane => &["limit switches", "wiring harness"],
        EquipmentType::Grader if distance_km > 60_000.0 => {
            &["tandem drive", "circle turn", "moldboard"]
        }
        EquipmentType::Grader => &["blade edge", "scarifier"],
    };
    list.iter().map(|s| s.to_string()).collect()
}

fn type_cost_multiplier(equipment_type: EquipmentType) -> f32 {
    match equipment_type {
        EquipmentType::DumpTruck => 1.4,
        EquipmentType::Excavator => 1.6,
        EquipmentType::DrillRig => 1.8,
        EquipmentType::Loader => 1.2,
        EquipmentType::Crane => 1.7,
        EquipmentType::Grader => 1.1,
    }
}

/// Cost estimate: base × type multiplier × risk uplift × age multiplier.
pub fn estimated_cost(equipment_type: EquipmentType, risk: f32, age_months: f32) -> f32 {
    let age_multiplier = (1.0 + age_months / 240.0).min(MAX_AGE_COST_MULTIPLIER);
    BASE_MAINTENANCE_COST * type_cost_multiplier(equipment_type) * (1.0 + 0.5 * risk) * age_multiplier
}

/// Ordered advisory strings. Fully deterministic given the same inputs.
pub fn recommendations(
    eq: &EquipmentSnapshot,
    days_until: f32,
    risk: f32,
    hours_since_service: f32,
    components: &[String],
) -> Vec<String> {
    let mut out = Vec::new();

    if days_until <= 3.0 {
        out.push(format!(
            "Schedule immediate maintenance: predicted failure window within {:.0} day(s)",
            days_until.max(0.0)
        ));
    } else if days_until <= 7.0 {
        out.push(format!(
            "Book a service slot this week: {:.0} day(s) to predicted maintenance",
            days_until
        ));
    }

    if risk > 0.6 {
        out.push(format!(
            "Increase monitoring frequency: composite risk {:.2}",
            risk
        ));
    }

    if let Some(interval) = eq.service_interval_hours {
        if interval > 0.0 && hours_since_service > interval {
            out.push(format!(
                "Service overdue by {:.0} operating hour(s)",
                hours_since_service - interval
            ));
        }
    }

    if !components.is_empty() {
        out.push(format!("Inspect first: {}", components.join(", ")));
    }

    out
}

/// Age of the unit in months as of the given date.
pub fn age_months(eq: &EquipmentSnapshot, as_of: NaiveDate) -> f32 {
    months_between(eq.purchase_date, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> RiskWeights {
        RiskWeights::default()
    }

    #[test]
    fn test_risk_score_clamped_to_unit_interval() {
        // Everything maxed out: would exceed 1.0 without the clamp.
        let risk = risk_score(
            0.0,
            500.0,
            10_000.0,
            Some(100.0),
            EquipmentType::DrillRig,
            &weights(),
        );
        assert_eq!(risk, 1.0);

        let risk = risk_score(400.0, 0.0, 0.0, None, EquipmentType::Grader, &weights());
        assert_eq!(risk, 0.0);
    }

    #[test]
    fn test_usage_pressure_needs_known_interval() {
        let with = risk_score(
            60.0,
            12.0,
            450.0,
            Some(500.0),
            EquipmentType::Loader,
            &weights(),
        );
        let without = risk_score(60.0, 12.0, 450.0, None, EquipmentType::Loader, &weights());
        assert!(with > without);
    }

    #[test]
    fn test_critical_type_bonus() {
        let critical = risk_score(60.0, 12.0, 0.0, None, EquipmentType::Excavator, &weights());
        let ordinary = risk_score(60.0, 12.0, 0.0, None, EquipmentType::Loader, &weights());
        assert!((critical - ordinary - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_priority_boundaries_are_exact() {
        // Three days alone forces CRITICAL regardless of risk.
        assert_eq!(priority_for(0.0, 3.0), Priority::Critical);
        assert_eq!(priority_for(0.0, 3.1), Priority::High); // <=7 days
        assert_eq!(priority_for(0.81, 60.0), Priority::Critical);
        assert_eq!(priority_for(0.8, 60.0), Priority::High);
        assert_eq!(priority_for(0.61, 60.0), Priority::High);
        assert_eq!(priority_for(0.5, 60.0), Priority::Medium);
        assert_eq!(priority_for(0.1, 14.0), Priority::Medium);
        assert_eq!(priority_for(0.1, 60.0), Priority::Low);
    }

    #[test]
    fn test_failure_type_thresholds() {
        assert_eq!(
            failure_type(EquipmentType::Excavator, 9_000.0, 0.0),
            FailureType::HydraulicSystem
        );
        assert_eq!(
            failure_type(EquipmentType::Excavator, 2_000.0, 0.0),
            FailureType::GeneralWear
        );
        assert_eq!(
            failure_type(EquipmentType::DumpTruck, 0.0, 150_000.0),
            FailureType::Engine
        );
        assert_eq!(
            failure_type(EquipmentType::DumpTruck, 0.0, 20_000.0),
            FailureType::Powertrain
        );
    }

    #[test]
    fn test_estimated_cost_scales_with_risk_and_age() {
        let young_low = estimated_cost(EquipmentType::Loader, 0.0, 0.0);
        let young_high = estimated_cost(EquipmentType::Loader, 1.0, 0.0);
        let old_high = estimated_cost(EquipmentType::Loader, 1.0, 480.0);

        assert!((young_high / young_low - 1.5).abs() < 1e-5);
        // Age multiplier caps at 1.5x.
        assert!((old_high / young_high - MAX_AGE_COST_MULTIPLIER).abs() < 1e-5);
    }

    #[test]
    fn test_recommendations_are_ordered_and_deterministic() {
        let eq = EquipmentSnapshot {
            id: "DT-01".to_string(),
            name: "Dump truck 01".to_string(),
            equipment_type: EquipmentType::DumpTruck,
            purchase_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            usage_hours: 12_000.0,
            usage_distance_km: 150_000.0,
            service_interval_hours: Some(500.0),
            active: true,
            maintenance_history: vec![],
            usage_history: vec![],
        };
        let components = critical_components(EquipmentType::DumpTruck, 12_000.0, 150_000.0);

        let first = recommendations(&eq, 2.0, 0.9, 800.0, &components);
        let second = recommendations(&eq, 2.0, 0.9, 800.0, &components);
        assert_eq!(first, second);

        assert!(first[0].contains("immediate"));
        assert!(first.iter().any(|r| r.contains("overdue")));
        assert!(first.last().unwrap().starts_with("Inspect first"));
    }
}
