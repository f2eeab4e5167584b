//! Training sets and the fitting loop
//!
//! Fits a network with mini-batch gradient descent, a held-out validation
//! split, and early stopping that restores the best-seen weights.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::TrainingOptions;
use crate::error::{EngineError, Result};

use super::network::FeedForward;
use super::TaskKind;

/// Labeled examples as parallel arrays, with names kept for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSet {
    pub features: Vec<Vec<f32>>,
    pub labels: Vec<Vec<f32>>,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
}

impl TrainingSet {
    pub fn new(
        features: Vec<Vec<f32>>,
        labels: Vec<Vec<f32>>,
        feature_names: &[&str],
        target_names: &[&str],
    ) -> Self {
        Self {
            features,
            labels,
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            target_names: target_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds a set from scalar labels, the common single-output case.
    pub fn from_scalar_labels(
        rows: Vec<(Vec<f32>, f32)>,
        feature_names: &[&str],
        target_name: &str,
    ) -> Self {
        let mut features = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for (row, label) in rows {
            features.push(row);
            labels.push(vec![label]);
        }
        Self::new(features, labels, feature_names, &[target_name])
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Enforces the parallel-array contract: non-empty, uniform row widths
    /// matching the name lists, all values finite.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(EngineError::InvalidTrainingSet("no rows".to_string()));
        }
        if self.features.len() != self.labels.len() {
            return Err(EngineError::InvalidTrainingSet(format!(
                "{} feature rows but {} label rows",
                self.features.len(),
                self.labels.len()
            )));
        }

        let width = self.feature_names.len();
        let label_width = self.target_names.len();
        for (i, row) in self.features.iter().enumerate() {
            if row.len() != width {
                return Err(EngineError::InvalidTrainingSet(format!(
                    "row {i} has width {}, expected {width}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(EngineError::InvalidTrainingSet(format!(
                    "row {i} contains a non-finite value"
                )));
            }
        }
        for (i, label) in self.labels.iter().enumerate() {
            if label.len() != label_width {
                return Err(EngineError::InvalidTrainingSet(format!(
                    "label {i} has width {}, expected {label_width}",
                    label.len()
                )));
            }
            if label.iter().any(|v| !v.is_finite()) {
                return Err(EngineError::InvalidTrainingSet(format!(
                    "label {i} contains a non-finite value"
                )));
            }
        }
        Ok(())
    }

    pub fn feature_width(&self) -> usize {
        self.feature_names.len()
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train_loss: f32,
    pub val_loss: f32,
    /// Validation accuracy for classification models; a monotone proxy
    /// `1 / (1 + val_loss)` for regression-family models.
    pub accuracy: f32,
    pub epochs_run: usize,
    pub stopped_early: bool,
}

/// Fits `net` in place and reports metrics.
///
/// The caller validates the set and shape beforehand; this function only
/// runs the numeric loop.
pub fn fit(
    net: &mut FeedForward,
    set: &TrainingSet,
    options: &TrainingOptions,
    rng: &mut StdRng,
) -> ModelMetrics {
    let mut indices: Vec<usize> = (0..set.len()).collect();
    indices.shuffle(rng);

    let val_len = ((set.len() as f32 * options.validation_split) as usize).min(set.len() - 1);
    let (val_idx, train_idx) = indices.split_at(val_len);

    let gather = |idx: &[usize]| -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        (
            idx.iter().map(|&i| set.features[i].clone()).collect(),
            idx.iter().map(|&i| set.labels[i].clone()).collect(),
        )
    };
    let (val_rows, val_targets) = gather(val_idx);
    let (mut train_rows, mut train_targets) = gather(train_idx);

    // With too few rows for a split, validate on the training data itself.
    let (val_rows, val_targets) = if val_rows.is_empty() {
        (train_rows.clone(), train_targets.clone())
    } else {
        (val_rows, val_targets)
    };

    net.fit_scaler(&train_rows);

    let batch = options.batch_size.max(1);
    let mut best_net = net.clone();
    let mut best_val = f32::INFINITY;
    let mut stale_epochs = 0;
    let mut epochs_run = 0;
    let mut stopped_early = false;

    for _ in 0..options.epochs {
        epochs_run += 1;

        // Reshuffle example order each epoch.
        let mut order: Vec<usize> = (0..train_rows.len()).collect();
        order.shuffle(rng);
        let rows: Vec<Vec<f32>> = order.iter().map(|&i| train_rows[i].clone()).collect();
        let targets: Vec<Vec<f32>> = order.iter().map(|&i| train_targets[i].clone()).collect();
        train_rows = rows;
        train_targets = targets;

        for (chunk_rows, chunk_targets) in train_rows
            .chunks(batch)
            .zip(train_targets.chunks(batch))
        {
            net.train_batch(chunk_rows, chunk_targets, options.learning_rate);
        }

        let val_loss = net.mean_loss(&val_rows, &val_targets);
        if val_loss < best_val {
            best_val = val_loss;
            best_net = net.clone();
            stale_epochs = 0;
        } else {
            stale_epochs += 1;
            if stale_epochs >= options.patience {
                stopped_early = true;
                break;
            }
        }
    }

    *net = best_net;

    let train_loss = net.mean_loss(&train_rows, &train_targets);
    let val_loss = net.mean_loss(&val_rows, &val_targets);
    let accuracy = match net.task() {
        TaskKind::Classification => classification_accuracy(net, &val_rows, &val_targets),
        _ => 1.0 / (1.0 + val_loss),
    };

    ModelMetrics {
        train_loss,
        val_loss,
        accuracy,
        epochs_run,
        stopped_early,
    }
}

fn classification_accuracy(net: &FeedForward, rows: &[Vec<f32>], targets: &[Vec<f32>]) -> f32 {
    if rows.is_empty() {
        return 0.0;
    }
    let correct = rows
        .iter()
        .zip(targets.iter())
        .filter(|(row, target)| argmax(&net.forward(row)) == argmax(target))
        .count();
    correct as f32 / rows.len() as f32
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
