//! Task assignment optimization
//!
//! For each task: build the candidate pool, score every candidate with the
//! assignment-fitness model, keep scores above the configured threshold,
//! sort by score (stable, descending), and staff up to the task's worker
//! limit. Per-task failures are logged and skipped so a batch always
//! returns partial results.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::features::{assignment_features, skill_match};
use crate::models::{Candidate, Priority, WorkAssignment, WorkTask, WorkerKind};
use crate::registry::ModelRegistry;

/// Registry id of the assignment-fitness model.
pub const ASSIGNMENT_MODEL_ID: &str = "workforce-assignment";

struct ScoredCandidate<'a> {
    candidate: &'a Candidate,
    score: f32,
    skill: f32,
}

/// Produces assignments for every task in the batch.
pub async fn optimize_assignments(
    registry: &ModelRegistry,
    config: &EngineConfig,
    tasks: &[WorkTask],
    pool: &[Candidate],
    as_of: NaiveDate,
    rng: &mut StdRng,
) -> Vec<WorkAssignment> {
    let mut assignments = Vec::new();

    for task in tasks {
        match assign_task(registry, config, task, pool, as_of, rng).await {
            Ok(mut task_assignments) => assignments.append(&mut task_assignments),
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "assignment failed, skipping task");
            }
        }
    }

    assignments
}

async fn assign_task(
    registry: &ModelRegistry,
    config: &EngineConfig,
    task: &WorkTask,
    pool: &[Candidate],
    as_of: NaiveDate,
    rng: &mut StdRng,
) -> crate::error::Result<Vec<WorkAssignment>> {
    let candidates: Vec<&Candidate> = pool.iter().filter(|c| c.is_available()).collect();
    if candidates.is_empty() {
        debug!(task_id = %task.id, "no available candidates");
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<f32>> = candidates
        .iter()
        .map(|&c| assignment_features(task, c, as_of, config.assignment_jitter, rng))
        .collect();
    let predictions = registry.predict_batch(ASSIGNMENT_MODEL_ID, &rows).await?;

    let mut scored: Vec<ScoredCandidate<'_>> = candidates
        .iter()
        .copied()
        .zip(predictions.iter())
        .filter_map(|(candidate, prediction)| {
            let score = prediction.values.first().copied()?.clamp(0.0, 1.0);
            if score > config.assignment_score_threshold {
                Some(ScoredCandidate {
                    candidate,
                    score,
                    skill: skill_match(&task.required_skills, candidate.skills()),
                })
            } else {
                None
            }
        })
        .collect();

    // Stable sort on score only; equal scores keep pool order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(task.max_workers.max(1) as usize);

    if scored.is_empty() {
        debug!(task_id = %task.id, "no candidate cleared the score threshold");
        return Ok(Vec::new());
    }

    let assigned_hours = task.estimated_hours / scored.len() as f32;
    let assignments = scored
        .into_iter()
        .map(|s| {
            let rate = s.candidate.cost_per_hour(task.priority);
            let mut reasoning = vec![
                format!("covers {:.0}% of required skills", s.skill * 100.0),
                format!("fitness score {:.2}", s.score),
                format!("cost {rate:.2}/h"),
            ];
            if task.priority == Priority::Critical
                && s.candidate.kind() == WorkerKind::Contractor
            {
                reasoning.push("emergency rate applied for critical task".to_string());
            }

            WorkAssignment {
                task_id: task.id.clone(),
                worker_id: s.candidate.id().to_string(),
                worker_name: s.candidate.name().to_string(),
                worker_kind: s.candidate.kind(),
                assigned_hours,
                skill_match: s.skill,
                cost_per_hour: rate,
                total_cost: rate * assigned_hours,
                confidence: s.score,
                reasoning,
            }
        })
        .collect();

    Ok(assignments)
}
