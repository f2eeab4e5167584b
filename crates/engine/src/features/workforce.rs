//! Workforce feature extraction
//!
//! Vectors for the three workforce models: assignment fitness, schedule
//! fitness, and workforce-need forecasting.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;

use crate::models::{
    Candidate, ForecastFactors, Priority, ScheduleConstraints, ShiftKind, Skill, Timeframe,
    WorkTask, WorkerKind,
};

use super::sanitize;

/// Feature order contract for the assignment-fitness model.
pub const ASSIGNMENT_FEATURES: &[&str] = &[
    "skill_match",
    "experience_score",
    "cost_score",
    "availability",
    "priority_weight",
    "normalized_hours",
    "employee_flag",
    "location_compat",
    "shift_compat",
    "equipment_compat",
    "workload_balance",
    "reliability",
    "urgency",
    "jitter",
];

/// Feature order contract for the schedule-fitness model.
pub const SCHEDULE_FEATURES: &[&str] = &[
    "day_preference",
    "night_preference",
    "max_hours",
    "avg_daily_hours",
    "burnout_risk",
    "skill_value",
    "shift_length",
    "coverage_required",
    "efficiency",
    "reliability",
];

/// Feature order contract for the workforce-forecast model.
pub const FORECAST_FEATURES: &[&str] = &[
    "current_utilization",
    "seasonality",
    "deadline_pressure",
    "maintenance_load",
    "weather_impact",
    "avg_workload",
    "peak_workload",
    "timeframe_weight",
    "demand_pressure",
];

/// Fraction of a task's required skill tags found among the candidate's
/// skill names, matched as case-insensitive substrings. An empty
/// requirement list matches fully.
pub fn skill_match(required: &[String], skills: &[Skill]) -> f32 {
    if required.is_empty() {
        return 1.0;
    }
    let names: Vec<String> = skills.iter().map(|s| s.name.to_lowercase()).collect();
    let found = required
        .iter()
        .filter(|tag| {
            let tag = tag.to_lowercase();
            names.iter().any(|name| name.contains(&tag))
        })
        .count();
    found as f32 / required.len() as f32
}

fn priority_weight(priority: Priority) -> f32 {
    match priority {
        Priority::Low => 0.25,
        Priority::Medium => 0.5,
        Priority::High => 0.75,
        Priority::Critical => 1.0,
    }
}

fn shift_compat(task: Option<ShiftKind>, worker: Option<ShiftKind>) -> f32 {
    match (task, worker) {
        (None, _) => 1.0,
        (Some(_), None) => 0.7,
        (Some(t), Some(w)) if t == w => 1.0,
        _ => 0.3,
    }
}

/// Candidate fitness features for one task. `jitter` is the amplitude of a
/// uniform random nudge; zero disables it for deterministic runs.
pub fn assignment_features(
    task: &WorkTask,
    candidate: &Candidate,
    as_of: NaiveDate,
    jitter: f32,
    rng: &mut StdRng,
) -> Vec<f32> {
    let skill = skill_match(&task.required_skills, candidate.skills());

    let experience = candidate.experience_years();
    let experience_score = if task.preferred_experience_years > 0.0 {
        (experience / task.preferred_experience_years).min(1.0)
    } else {
        (experience / 10.0).min(1.0)
    };

    let rate = candidate.cost_per_hour(task.priority);
    let cost_score = 1.0 - (rate / 100.0).clamp(0.0, 1.0);

    let availability = if candidate.is_available() { 1.0 } else { 0.0 };
    let normalized_hours = (task.estimated_hours / 160.0).clamp(0.0, 1.0);
    let employee_flag = match candidate.kind() {
        WorkerKind::Employee => 1.0,
        WorkerKind::Contractor => 0.0,
    };

    // Worker locations are not collected yet; any located task gets a
    // neutral compatibility.
    let location_compat = if task.location.is_none() { 1.0 } else { 0.8 };

    let equipment_compat = match task.required_equipment {
        None => 1.0,
        Some(eq) => {
            let tag = eq.as_str().replace('_', " ");
            let qualified = candidate
                .skills()
                .iter()
                .any(|s| s.name.to_lowercase().contains(&tag));
            if qualified {
                1.0
            } else {
                0.5
            }
        }
    };

    let reliability = match candidate.kind() {
        WorkerKind::Employee => 0.8,
        WorkerKind::Contractor => 0.7,
    };

    let urgency = match task.deadline {
        Some(deadline) => {
            let days = (deadline - as_of).num_days() as f32;
            (1.0 - days / 30.0).clamp(0.0, 1.0)
        }
        None => 0.3,
    };

    let nudge = if jitter > 0.0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0.0
    };

    sanitize(vec![
        skill,
        experience_score,
        cost_score,
        availability,
        priority_weight(task.priority),
        normalized_hours,
        employee_flag,
        location_compat,
        shift_compat(task.shift_preference, candidate.shift_preference()),
        equipment_compat,
        0.5, // workload balance: per-worker load tracking not wired in yet
        reliability,
        urgency,
        nudge,
    ])
}

/// Schedule fitness features for one worker under the given constraints.
pub fn schedule_features(candidate: &Candidate, constraints: &ScheduleConstraints) -> Vec<f32> {
    // Preference inferred from the worker's profile; unknown leans day.
    let (day_pref, night_pref) = match candidate.shift_preference() {
        Some(ShiftKind::Day) => (1.0, 0.0),
        Some(ShiftKind::Night) => (0.0, 1.0),
        None => (0.6, 0.4),
    };

    let max_hours = candidate.max_hours_per_week();
    let avg_daily_hours = max_hours / 5.0;
    let burnout_risk = ((max_hours - 40.0) / 20.0).clamp(0.0, 1.0);

    let skills = candidate.skills();
    let skill_value = if skills.is_empty() {
        0.0
    } else {
        skills.iter().map(|s| s.level as f32).sum::<f32>() / (skills.len() as f32 * 5.0)
    };

    sanitize(vec![
        day_pref,
        night_pref,
        (max_hours / 60.0).clamp(0.0, 1.0),
        (avg_daily_hours / 12.0).clamp(0.0, 1.0),
        burnout_risk,
        skill_value,
        (constraints.shift_length_hours / 12.0).clamp(0.0, 1.0),
        if constraints.require_full_coverage {
            1.0
        } else {
            0.0
        },
        0.75, // efficiency: historical per-worker throughput not wired in yet
        0.8,  // reliability placeholder
    ])
}

/// Demand features for the workforce-need forecast.
pub fn forecast_features(factors: &ForecastFactors, timeframe: Timeframe) -> Vec<f32> {
    let deadline_pressure = factors.project_deadlines as f32 / 10.0;
    let maintenance_load = factors.scheduled_maintenance as f32 / 10.0;
    let demand_pressure = factors.current_utilization * (1.0 + deadline_pressure);

    sanitize(vec![
        factors.current_utilization,
        factors.seasonality,
        deadline_pressure,
        maintenance_load,
        factors.weather_impact,
        factors.historical_avg_workload / 100.0,
        factors.historical_peak_workload / 100.0,
        timeframe.weight(),
        demand_pressure,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, EquipmentType};
    use rand::SeedableRng;

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            category: "trade".to_string(),
            level: 4,
            verified: true,
            years_experience: 6.0,
        }
    }

    fn employee(skills: Vec<Skill>) -> Candidate {
        Candidate::Employee(Employee {
            id: "e1".to_string(),
            name: "Avery".to_string(),
            skills,
            hourly_rate: Some(42.0),
            max_hours_per_week: 40.0,
            shift_preference: Some(ShiftKind::Day),
            active: true,
        })
    }

    fn task(required: &[&str]) -> WorkTask {
        WorkTask {
            id: "t1".to_string(),
            name: "Weld supports".to_string(),
            priority: Priority::High,
            estimated_hours: 24.0,
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_experience_years: 5.0,
            deadline: None,
            location: None,
            required_equipment: None,
            shift_preference: None,
            min_workers: 1,
            max_workers: 1,
            budget: None,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn test_skill_match_is_case_insensitive_substring() {
        let skills = vec![skill("MIG Welding"), skill("rigging")];
        assert_eq!(skill_match(&["welding".to_string()], &skills), 1.0);
        assert_eq!(
            skill_match(&["welding".to_string(), "surveying".to_string()], &skills),
            0.5
        );
        assert_eq!(skill_match(&[], &skills), 1.0);
    }

    #[test]
    fn test_assignment_features_match_contract_width() {
        let mut rng = StdRng::seed_from_u64(1);
        let features = assignment_features(
            &task(&["welding"]),
            &employee(vec![skill("welding")]),
            as_of(),
            0.0,
            &mut rng,
        );
        assert_eq!(features.len(), ASSIGNMENT_FEATURES.len());
        assert!(features.iter().all(|v| v.is_finite()));
        // skill_match leads the vector and is exact here.
        assert_eq!(features[0], 1.0);
        // Zero jitter keeps the vector fully deterministic.
        assert_eq!(features[ASSIGNMENT_FEATURES.len() - 1], 0.0);
    }

    #[test]
    fn test_urgency_rises_as_deadline_nears() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut near = task(&[]);
        near.deadline = Some(as_of() + chrono::Duration::days(2));
        let mut far = task(&[]);
        far.deadline = Some(as_of() + chrono::Duration::days(29));

        let urgency_idx = ASSIGNMENT_FEATURES
            .iter()
            .position(|&n| n == "urgency")
            .unwrap();
        let candidate = employee(vec![skill("welding")]);
        let near_f = assignment_features(&near, &candidate, as_of(), 0.0, &mut rng);
        let far_f = assignment_features(&far, &candidate, as_of(), 0.0, &mut rng);
        assert!(near_f[urgency_idx] > far_f[urgency_idx]);
    }

    #[test]
    fn test_equipment_compat_checks_skill_names() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut with_eq = task(&[]);
        with_eq.required_equipment = Some(EquipmentType::DumpTruck);

        let idx = ASSIGNMENT_FEATURES
            .iter()
            .position(|&n| n == "equipment_compat")
            .unwrap();
        let qualified = employee(vec![skill("dump truck operation")]);
        let unqualified = employee(vec![skill("welding")]);
        let q = assignment_features(&with_eq, &qualified, as_of(), 0.0, &mut rng);
        let u = assignment_features(&with_eq, &unqualified, as_of(), 0.0, &mut rng);
        assert_eq!(q[idx], 1.0);
        assert_eq!(u[idx], 0.5);
    }

    #[test]
    fn test_schedule_features_match_contract_width() {
        let constraints = ScheduleConstraints {
            date: as_of(),
            shift_length_hours: 8.0,
            require_full_coverage: false,
        };
        let features = schedule_features(&employee(vec![skill("welding")]), &constraints);
        assert_eq!(features.len(), SCHEDULE_FEATURES.len());
        assert!(features.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_forecast_features_match_contract_width() {
        let factors = ForecastFactors {
            current_utilization: 0.95,
            seasonality: 0.5,
            project_deadlines: 8,
            scheduled_maintenance: 3,
            weather_impact: 0.2,
            historical_avg_workload: 60.0,
            historical_peak_workload: 90.0,
        };
        let features = forecast_features(&factors, Timeframe::Weekly);
        assert_eq!(features.len(), FORECAST_FEATURES.len());
        assert!(features.iter().all(|v| v.is_finite()));
    }
}
