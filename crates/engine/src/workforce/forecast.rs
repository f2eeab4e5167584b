//! Workforce-need forecasting
//!
//! Predicts a recommended headcount from demand features, then layers the
//! deterministic rules: demand-pressure floor, per-skill gap analysis, the
//! fixed employee:contractor mix, and the cost projection.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::forecast_features;
use crate::models::{
    Candidate, ForecastFactors, RoleShare, SkillGap, Timeframe, WorkforceForecast,
};
use crate::registry::ModelRegistry;

/// Registry id of the workforce-forecast model.
pub const FORECAST_MODEL_ID: &str = "workforce-forecast";

/// Employee share of the recommended mix; the remainder goes to
/// contractors.
const EMPLOYEE_MIX: f32 = 0.7;

/// Utilization above this forces the headcount above the current level.
const PRESSURE_UTILIZATION: f32 = 0.85;
/// Deadline count above this forces the headcount above the current level.
const PRESSURE_DEADLINES: usize = 5;

/// Fraction of the recommended headcount every cataloged skill should
/// cover.
const SKILL_COVERAGE_RATIO: f32 = 0.1;

/// Planning cost rates per hour for the projection.
const EMPLOYEE_PLAN_RATE: f32 = 45.0;
const CONTRACTOR_PLAN_RATE: f32 = 65.0;

fn role_breakdown() -> Vec<RoleShare> {
    vec![
        RoleShare {
            role: "operators".to_string(),
            share: 0.5,
        },
        RoleShare {
            role: "technicians".to_string(),
            share: 0.3,
        },
        RoleShare {
            role: "supervisors".to_string(),
            share: 0.2,
        },
    ]
}

fn holders_of(skill: &str, workforce: &[Candidate]) -> u32 {
    let needle = skill.to_lowercase();
    workforce
        .iter()
        .filter(|w| {
            w.skills()
                .iter()
                .any(|s| s.name.to_lowercase().contains(&needle))
        })
        .count() as u32
}

/// Forecasts workforce needs for the timeframe.
pub async fn predict_workforce_needs(
    registry: &ModelRegistry,
    config: &EngineConfig,
    factors: &ForecastFactors,
    timeframe: Timeframe,
    workforce: &[Candidate],
    skill_catalog: &[String],
) -> Result<WorkforceForecast> {
    let features = forecast_features(factors, timeframe);
    let prediction = registry.predict(FORECAST_MODEL_ID, &features).await?;
    let raw = prediction.scalar()?;

    let current_headcount = workforce.len() as u32;
    let mut recommended = raw.round().max(1.0) as u32;

    // Sustained pressure must always grow the workforce, whatever the
    // model says.
    if factors.current_utilization > PRESSURE_UTILIZATION
        || factors.project_deadlines > PRESSURE_DEADLINES
    {
        let floor = current_headcount + (current_headcount / 10).max(1);
        recommended = recommended.max(floor);
    }

    debug!(raw, recommended, current_headcount, "headcount forecast");

    let per_skill = ((recommended as f32 * SKILL_COVERAGE_RATIO).ceil() as u32).max(1);
    let mut skill_gaps: Vec<SkillGap> = skill_catalog
        .iter()
        .filter_map(|skill| {
            let available = holders_of(skill, workforce);
            let shortfall = per_skill.saturating_sub(available);
            (shortfall > 0).then(|| SkillGap {
                skill: skill.clone(),
                required: per_skill,
                available,
                shortfall,
            })
        })
        .collect();
    skill_gaps.sort_by(|a, b| b.shortfall.cmp(&a.shortfall).then(a.skill.cmp(&b.skill)));

    let employees_needed = (recommended as f32 * EMPLOYEE_MIX).round() as u32;
    let contractors_needed = recommended - employees_needed.min(recommended);

    let projected_cost = (employees_needed as f32 * EMPLOYEE_PLAN_RATE
        + contractors_needed as f32 * CONTRACTOR_PLAN_RATE)
        * timeframe.hours();

    Ok(WorkforceForecast {
        timeframe,
        recommended_headcount: recommended,
        current_headcount,
        employees_needed,
        contractors_needed,
        role_breakdown: role_breakdown(),
        skill_gaps,
        projected_cost,
        confidence: prediction.confidence,
        generated_at: chrono::Utc::now().timestamp(),
    })
}
