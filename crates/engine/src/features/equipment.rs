//! Equipment feature extraction
//!
//! Builds fixed-width vectors from an equipment unit's maintenance and
//! usage history, both for inference (current state) and for training
//! (one row per adjacent maintenance-event pair, labeled with the days
//! until the next event).

use chrono::NaiveDate;

use crate::models::{EquipmentSnapshot, MaintenanceKind, MaintenanceRecord, UsageSession};

use super::{months_between, sanitize, season_index};

/// Feature order contract for equipment maintenance models.
pub const EQUIPMENT_FEATURES: &[&str] = &[
    "age_months",
    "total_usage_hours",
    "total_distance_km",
    "hours_since_service",
    "avg_daily_usage_hours",
    "fuel_intensity",
    "maintenance_frequency",
    "recent_cost_trend",
    "season_index",
    "operating_conditions",
    "operator_experience",
    "engine_age_proxy",
    "hydraulic_age_proxy",
    "transmission_age_proxy",
    "repair_events",
    "emergency_events",
    "preventive_ratio",
    "downtime_hours",
];

/// Neutral stand-in for operating-condition and operator-experience
/// signals the platform does not collect yet.
const PLACEHOLDER_SIGNAL: f32 = 0.5;

/// Usage totals over a slice of sessions.
struct UsageTotals {
    hours: f32,
    distance_km: f32,
    fuel_liters: f32,
}

fn usage_up_to(sessions: &[UsageSession], cutoff: NaiveDate) -> UsageTotals {
    let mut totals = UsageTotals {
        hours: 0.0,
        distance_km: 0.0,
        fuel_liters: 0.0,
    };
    for s in sessions.iter().filter(|s| s.date <= cutoff) {
        totals.hours += s.hours;
        totals.distance_km += s.distance_km;
        totals.fuel_liters += s.fuel_liters;
    }
    totals
}

fn usage_between(sessions: &[UsageSession], after: Option<NaiveDate>, cutoff: NaiveDate) -> f32 {
    sessions
        .iter()
        .filter(|s| s.date <= cutoff && after.map(|a| s.date > a).unwrap_or(true))
        .map(|s| s.hours)
        .sum()
}

/// Difference between the mean cost of the most recent three events and the
/// overall mean, relative to the overall mean.
fn recent_cost_trend(history: &[MaintenanceRecord]) -> f32 {
    if history.is_empty() {
        return 0.0;
    }
    let overall: f32 = history.iter().map(|r| r.cost).sum::<f32>() / history.len() as f32;
    let recent_slice = &history[history.len().saturating_sub(3)..];
    let recent: f32 = recent_slice.iter().map(|r| r.cost).sum::<f32>() / recent_slice.len() as f32;
    if overall <= f32::EPSILON {
        return 0.0;
    }
    (recent - overall) / overall
}

fn build_features(
    eq: &EquipmentSnapshot,
    history: &[MaintenanceRecord],
    as_of: NaiveDate,
    total_hours: f32,
    total_distance_km: f32,
    total_fuel: f32,
    hours_since_service: f32,
) -> Vec<f32> {
    let age_months = months_between(eq.purchase_date, as_of);
    let age_days = (as_of - eq.purchase_date).num_days().max(1) as f32;

    let avg_daily_usage = total_hours / age_days;
    let fuel_intensity = if total_hours > 0.0 {
        total_fuel / total_hours
    } else {
        0.0
    };
    let maintenance_frequency = history.len() as f32 / age_months.max(1.0);

    let repair_events = history
        .iter()
        .filter(|r| r.kind == MaintenanceKind::Repair)
        .count() as f32;
    let emergency_events = history
        .iter()
        .filter(|r| r.kind == MaintenanceKind::Emergency)
        .count() as f32;
    let preventive_events = history
        .iter()
        .filter(|r| r.kind == MaintenanceKind::Preventive)
        .count() as f32;
    let preventive_ratio = if history.is_empty() {
        0.0
    } else {
        preventive_events / history.len() as f32
    };
    let downtime_hours: f32 = history.iter().map(|r| r.downtime_hours).sum();

    sanitize(vec![
        age_months,
        total_hours,
        total_distance_km,
        hours_since_service,
        avg_daily_usage,
        fuel_intensity,
        maintenance_frequency,
        recent_cost_trend(history),
        season_index(as_of),
        PLACEHOLDER_SIGNAL,
        PLACEHOLDER_SIGNAL,
        // Component-age proxies scaled from overall age; replaced once
        // per-component meters exist.
        age_months * 0.9,
        age_months * 0.8,
        age_months * 0.85,
        repair_events,
        emergency_events,
        preventive_ratio,
        downtime_hours,
    ])
}

/// Operating hours accumulated since the unit's last maintenance event,
/// or its lifetime hours when it has never been serviced.
pub fn hours_since_last_service(eq: &EquipmentSnapshot, as_of: NaiveDate) -> f32 {
    match eq.maintenance_history.last().map(|r| r.date) {
        Some(date) => usage_between(&eq.usage_history, Some(date), as_of),
        None => eq.usage_hours,
    }
}

/// Current-state feature vector for one equipment unit, used at inference.
pub fn snapshot_features(eq: &EquipmentSnapshot, as_of: NaiveDate) -> Vec<f32> {
    let hours_since_service = hours_since_last_service(eq, as_of);

    build_features(
        eq,
        &eq.maintenance_history,
        as_of,
        eq.usage_hours,
        eq.usage_distance_km,
        usage_up_to(&eq.usage_history, as_of).fuel_liters,
        hours_since_service,
    )
}

/// Training rows from one unit's history: one row per adjacent
/// maintenance-event pair, labeled with the days until the next event.
/// Pairs with non-positive or longer-than-`max_gap_days` gaps are dropped
/// as outliers.
pub fn training_rows(eq: &EquipmentSnapshot, max_gap_days: f32) -> Vec<(Vec<f32>, f32)> {
    let history = &eq.maintenance_history;
    let mut rows = Vec::new();

    for window in history.windows(2) {
        let (current, next) = (&window[0], &window[1]);
        let gap_days = (next.date - current.date).num_days() as f32;
        if gap_days <= 0.0 || gap_days > max_gap_days {
            continue;
        }

        let as_of = current.date;
        let seen: Vec<MaintenanceRecord> = history
            .iter()
            .filter(|r| r.date <= as_of)
            .cloned()
            .collect();

        let totals = usage_up_to(&eq.usage_history, as_of);
        let previous_service = seen
            .len()
            .checked_sub(2)
            .and_then(|i| seen.get(i))
            .map(|r| r.date);
        let hours_into_event = usage_between(&eq.usage_history, previous_service, as_of);

        let features = build_features(
            eq,
            &seen,
            as_of,
            totals.hours,
            totals.distance_km,
            totals.fuel_liters,
            hours_into_event,
        );
        rows.push((features, gap_days));
    }
    rows
}
