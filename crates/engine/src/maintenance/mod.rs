//! Maintenance risk prediction
//!
//! Stateless per-call pipeline: model output in, business decision out.
//! The model supplies "days until maintenance"; this module layers the
//! deterministic risk/priority/cost/recommendation rules on top.

mod alerts;
mod risk;

pub use alerts::{classify, AlertBuilder};
pub use risk::{
    age_months, critical_components, estimated_cost, failure_type, priority_for, recommendations,
    risk_score,
};

use chrono::NaiveDate;

use crate::config::RiskWeights;
use crate::features::equipment::hours_since_last_service;
use crate::models::{EquipmentSnapshot, MaintenancePrediction};

/// Builds a full maintenance prediction from the raw model output.
///
/// Deterministic: the same snapshot and model output always produce the
/// same tier, failure type, and recommendation list.
pub fn synthesize_prediction(
    eq: &EquipmentSnapshot,
    days_until: f32,
    confidence: f32,
    as_of: NaiveDate,
    weights: &RiskWeights,
) -> MaintenancePrediction {
    let days_until = days_until.max(0.0);
    let age = age_months(eq, as_of);
    let hours_since_service = hours_since_last_service(eq, as_of);

    let risk = risk_score(
        days_until,
        age,
        hours_since_service,
        eq.service_interval_hours,
        eq.equipment_type,
        weights,
    );
    let priority = priority_for(risk, days_until);
    let failure = failure_type(eq.equipment_type, eq.usage_hours, eq.usage_distance_km);
    let components = critical_components(eq.equipment_type, eq.usage_hours, eq.usage_distance_km);
    let cost = estimated_cost(eq.equipment_type, risk, age);
    let advice = recommendations(eq, days_until, risk, hours_since_service, &components);

    MaintenancePrediction {
        equipment_id: eq.id.clone(),
        equipment_name: eq.name.clone(),
        risk_score: risk,
        predicted_date: as_of + chrono::Duration::days(days_until.round() as i64),
        days_until_maintenance: days_until,
        failure_type: failure,
        confidence,
        recommendations: advice,
        critical_components: components,
        estimated_cost: cost,
        priority,
        generated_at: chrono::Utc::now().timestamp(),
    }
}
