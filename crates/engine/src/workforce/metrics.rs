//! Aggregate optimization metrics and advisory strings
//!
//! Folds assignments and schedules into summary metrics, then derives
//! recommendation/warning strings from threshold crossings. Empty inputs
//! resolve vacuously: no tasks means a completion rate of 1.0.

use std::collections::HashSet;

use crate::models::{OptimizationResult, ShiftSchedule, WorkAssignment, WorkTask, WorkerKind};

/// Utilization above this marks a schedule as overloaded for risk scoring.
const OVERLOAD_UTILIZATION: f32 = 0.9;
/// Skill match below this marks an assignment as weak for risk scoring.
const WEAK_SKILL_MATCH: f32 = 0.5;
/// Mean hourly cost above this adds the flat cost-risk contribution.
const COSTLY_RATE: f32 = 80.0;
/// Weekly hours above this trigger an overtime warning.
const OVERTIME_HOURS: f32 = 45.0;

fn mean<I: Iterator<Item = f32>>(iter: I) -> Option<f32> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in iter {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f32)
}

/// Builds the aggregate result from a run's raw outputs.
pub fn summarize(
    tasks: &[WorkTask],
    assignments: Vec<WorkAssignment>,
    schedules: Vec<ShiftSchedule>,
) -> OptimizationResult {
    let total_cost: f32 = assignments.iter().map(|a| a.total_cost).sum();

    // Vacuously perfect when nothing was produced to average over.
    let average_skill_match = mean(assignments.iter().map(|a| a.skill_match)).unwrap_or(1.0);
    let utilization_rate = mean(schedules.iter().map(|s| s.utilization)).unwrap_or(1.0);

    let completion_rate = if tasks.is_empty() {
        1.0
    } else {
        let staffed: HashSet<&str> = assignments.iter().map(|a| a.task_id.as_str()).collect();
        tasks.iter().filter(|t| staffed.contains(t.id.as_str())).count() as f32
            / tasks.len() as f32
    };

    let overloaded_share = if schedules.is_empty() {
        0.0
    } else {
        schedules
            .iter()
            .filter(|s| s.utilization > OVERLOAD_UTILIZATION)
            .count() as f32
            / schedules.len() as f32
    };
    let weak_skill_share = if assignments.is_empty() {
        0.0
    } else {
        assignments
            .iter()
            .filter(|a| a.skill_match < WEAK_SKILL_MATCH)
            .count() as f32
            / assignments.len() as f32
    };
    let mean_rate = mean(assignments.iter().map(|a| a.cost_per_hour)).unwrap_or(0.0);
    let cost_risk = if mean_rate > COSTLY_RATE { 0.3 } else { 0.0 };

    let risk_score =
        (0.4 * overloaded_share + 0.3 * weak_skill_share + cost_risk).clamp(0.0, 1.0);

    let mut recommendations = Vec::new();
    if utilization_rate < 0.7 {
        recommendations.push(format!(
            "Workforce utilization is {:.0}%: consolidate shifts or reduce contractor hours",
            utilization_rate * 100.0
        ));
    }
    if average_skill_match < 0.8 {
        recommendations.push(format!(
            "Average skill match is {:.0}%: consider targeted training or hiring",
            average_skill_match * 100.0
        ));
    }
    let contractor_share = if assignments.is_empty() {
        0.0
    } else {
        assignments
            .iter()
            .filter(|a| a.worker_kind == WorkerKind::Contractor)
            .count() as f32
            / assignments.len() as f32
    };
    if contractor_share > 0.4 {
        recommendations.push(format!(
            "Contractors hold {:.0}% of assignments: evaluate converting recurring roles to employees",
            contractor_share * 100.0
        ));
    }

    let mut warnings = Vec::new();
    if risk_score > 0.8 {
        warnings.push(format!(
            "Operational risk {:.2} is critical: rebalance workload before committing this plan",
            risk_score
        ));
    } else if risk_score > 0.6 {
        warnings.push(format!("Operational risk {:.2} is elevated", risk_score));
    }
    for schedule in schedules.iter().filter(|s| s.total_hours * 5.0 > OVERTIME_HOURS) {
        warnings.push(format!(
            "{} is scheduled for {:.0}h/week, above the {OVERTIME_HOURS:.0}h ceiling",
            schedule.worker_name,
            schedule.total_hours * 5.0
        ));
    }
    for task in tasks {
        let staffed = assignments
            .iter()
            .filter(|a| a.task_id == task.id)
            .count() as u32;
        if staffed > 0 && staffed < task.min_workers {
            warnings.push(format!(
                "Task {} staffed with {staffed} of {} minimum workers",
                task.id, task.min_workers
            ));
        }
    }

    OptimizationResult {
        assignments,
        schedules,
        total_cost,
        average_skill_match,
        utilization_rate,
        completion_rate,
        risk_score,
        recommendations,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, ShiftKind};
    use chrono::{NaiveDate, NaiveTime};

    fn task(id: &str, min_workers: u32) -> WorkTask {
        WorkTask {
            id: id.to_string(),
            name: id.to_string(),
            priority: Priority::Medium,
            estimated_hours: 16.0,
            required_skills: vec![],
            preferred_experience_years: 0.0,
            deadline: None,
            location: None,
            required_equipment: None,
            shift_preference: None,
            min_workers,
            max_workers: 2,
            budget: None,
        }
    }

    fn assignment(task_id: &str, skill: f32, rate: f32, kind: WorkerKind) -> WorkAssignment {
        WorkAssignment {
            task_id: task_id.to_string(),
            worker_id: "w".to_string(),
            worker_name: "Worker".to_string(),
            worker_kind: kind,
            assigned_hours: 8.0,
            skill_match: skill,
            cost_per_hour: rate,
            total_cost: rate * 8.0,
            confidence: 0.8,
            reasoning: vec![],
        }
    }

    fn schedule(utilization: f32, hours: f32) -> ShiftSchedule {
        ShiftSchedule {
            worker_id: "w".to_string(),
            worker_name: "Worker".to_string(),
            worker_kind: WorkerKind::Employee,
            shift: ShiftKind::Day,
            date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            assignments: vec![],
            total_hours: hours,
            utilization,
            efficiency_score: 0.8,
        }
    }

    #[test]
    fn test_empty_inputs_resolve_vacuously() {
        let result = summarize(&[], vec![], vec![]);
        assert_eq!(result.completion_rate, 1.0);
        assert_eq!(result.average_skill_match, 1.0);
        assert_eq!(result.utilization_rate, 1.0);
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.total_cost, 0.0);
        assert!(result.assignments.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_completion_rate_counts_distinct_staffed_tasks() {
        let tasks = vec![task("a", 1), task("b", 1), task("c", 1), task("d", 1)];
        let assignments = vec![
            assignment("a", 1.0, 45.0, WorkerKind::Employee),
            assignment("a", 0.9, 45.0, WorkerKind::Employee),
            assignment("b", 1.0, 45.0, WorkerKind::Employee),
        ];
        let result = summarize(&tasks, assignments, vec![]);
        assert_eq!(result.completion_rate, 0.5);
    }

    #[test]
    fn test_full_staffing_has_unit_completion() {
        let tasks = vec![task("a", 1), task("b", 1)];
        let assignments = vec![
            assignment("a", 1.0, 45.0, WorkerKind::Employee),
            assignment("b", 1.0, 45.0, WorkerKind::Employee),
        ];
        let result = summarize(&tasks, assignments, vec![]);
        assert_eq!(result.completion_rate, 1.0);
        assert!((0.0..=1.0).contains(&result.completion_rate));
    }

    #[test]
    fn test_risk_score_composition() {
        // Both schedules overloaded, both assignments weak, costly rates:
        // 0.4 + 0.3 + 0.3, clamped to 1.0.
        let tasks = vec![task("a", 1)];
        let assignments = vec![
            assignment("a", 0.2, 95.0, WorkerKind::Contractor),
            assignment("a", 0.3, 95.0, WorkerKind::Contractor),
        ];
        let schedules = vec![schedule(0.95, 8.0), schedule(0.92, 8.0)];
        let result = summarize(&tasks, assignments, schedules);
        assert_eq!(result.risk_score, 1.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("critical")));
    }

    #[test]
    fn test_contractor_share_recommendation() {
        let tasks = vec![task("a", 1)];
        let assignments = vec![
            assignment("a", 1.0, 65.0, WorkerKind::Contractor),
            assignment("a", 1.0, 45.0, WorkerKind::Employee),
        ];
        let result = summarize(&tasks, assignments, vec![]);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("Contractors hold")));
    }

    #[test]
    fn test_overtime_warning() {
        let result = summarize(&[], vec![], vec![schedule(1.0, 10.0)]);
        assert!(result.warnings.iter().any(|w| w.contains("50h/week")));
    }

    #[test]
    fn test_understaffed_task_warning() {
        let tasks = vec![task("a", 3)];
        let assignments = vec![assignment("a", 1.0, 45.0, WorkerKind::Employee)];
        let result = summarize(&tasks, assignments, vec![]);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("1 of 3 minimum")));
    }
}
