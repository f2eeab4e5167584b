//! Model registry and trainer
//!
//! Owns every trainable model in the process. Entries are isolated behind
//! per-model locks: training takes a model's write lock while predictions
//! against other models proceed on their own entries.

mod network;
mod persist;
mod training;

pub use network::{Activation, FeedForward, SEQUENCE_STEPS};
pub use persist::ModelSnapshot;
pub use training::{ModelMetrics, TrainingSet};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, TrainingOptions};
use crate::error::{EngineError, Result};
use crate::models::PredictionResult;
use crate::observability::metrics;

/// Inference slower than this is logged, mirroring the latency target the
/// decision layers are sized for.
const MAX_INFERENCE_MS: u128 = 5;

/// Learning task a model is trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Regression,
    Classification,
    Timeseries,
    AnomalyDetection,
}

/// Network capacity tag. Tags only change internal layer composition; the
/// feature-vector contract and calling convention are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Simple,
    Deep,
    Lstm,
    Cnn,
}

impl Architecture {
    /// Hidden layer widths for this tag. The `lstm`/`cnn` tags run their
    /// stacks over the sequence-padded input (see [`SEQUENCE_STEPS`]).
    pub fn hidden_plan(&self) -> Vec<usize> {
        match self {
            Architecture::Simple => vec![16],
            Architecture::Deep => vec![64, 32, 16],
            Architecture::Lstm => vec![48, 24],
            Architecture::Cnn => vec![32, 32],
        }
    }
}

/// Public metadata for a registered model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub task: TaskKind,
    pub architecture: Architecture,
    pub input_width: usize,
    pub output_width: usize,
    /// Bumped on every successful training run.
    pub version: u32,
    pub accuracy: Option<f32>,
    pub last_trained: Option<i64>,
    /// True once the model has trained weights; prediction requires it.
    pub loaded: bool,
}

/// A registered model: metadata plus its trainable network.
struct ModelEntry {
    info: ModelInfo,
    network: FeedForward,
}

/// Registry of trainable prediction models, keyed by model id.
pub struct ModelRegistry {
    entries: DashMap<String, Arc<RwLock<ModelEntry>>>,
    regression_confidence: f32,
    rng: Mutex<StdRng>,
}

impl ModelRegistry {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            entries: DashMap::new(),
            regression_confidence: config.regression_confidence,
            rng: Mutex::new(StdRng::seed_from_u64(config.rng_seed)),
        }
    }

    fn entry(&self, model_id: &str) -> Result<Arc<RwLock<ModelEntry>>> {
        self.entries
            .get(model_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::UnknownModel(model_id.to_string()))
    }

    fn fork_rng(&self) -> StdRng {
        let seed: u64 = self.rng.lock().unwrap().gen();
        StdRng::seed_from_u64(seed)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.entries.contains_key(model_id)
    }

    /// Registers a model with freshly initialized (untrained) weights.
    ///
    /// Idempotent: re-registering an existing id returns its current
    /// metadata untouched, so warm-up can be re-run safely.
    pub async fn create_model(
        &self,
        model_id: &str,
        name: &str,
        task: TaskKind,
        architecture: Architecture,
        input_width: usize,
        output_width: usize,
    ) -> Result<ModelInfo> {
        if let Some(existing) = self.entries.get(model_id) {
            debug!(model_id, "model already registered, keeping existing entry");
            return Ok(existing.read().await.info.clone());
        }

        let mut rng = self.fork_rng();
        let network = FeedForward::new(architecture, task, input_width, output_width, &mut rng);
        let info = ModelInfo {
            id: model_id.to_string(),
            name: name.to_string(),
            task,
            architecture,
            input_width,
            output_width,
            version: 0,
            accuracy: None,
            last_trained: None,
            loaded: false,
        };

        self.entries.insert(
            model_id.to_string(),
            Arc::new(RwLock::new(ModelEntry {
                info: info.clone(),
                network,
            })),
        );
        metrics().set_models_registered(self.entries.len() as i64);
        info!(model_id, ?task, ?architecture, input_width, "model registered");
        Ok(info)
    }

    /// Trains a model on the given set with early stopping.
    ///
    /// Weights and metadata commit together under the entry's write lock;
    /// a validation failure leaves both untouched.
    pub async fn train(
        &self,
        model_id: &str,
        set: &TrainingSet,
        options: &TrainingOptions,
    ) -> Result<ModelMetrics> {
        let entry = self.entry(model_id)?;
        set.validate()?;

        let mut guard = entry.write().await;
        if set.feature_width() != guard.info.input_width {
            metrics().inc_training_errors();
            return Err(EngineError::ShapeMismatch {
                expected: guard.info.input_width,
                actual: set.feature_width(),
            });
        }
        if set.target_names.len() != guard.info.output_width {
            metrics().inc_training_errors();
            return Err(EngineError::InvalidTrainingSet(format!(
                "label width {} does not match model output width {}",
                set.target_names.len(),
                guard.info.output_width
            )));
        }

        let start = Instant::now();
        let mut candidate = guard.network.clone();
        let mut rng = self.fork_rng();
        let result = training::fit(&mut candidate, set, options, &mut rng);

        guard.network = candidate;
        guard.info.version += 1;
        guard.info.accuracy = Some(result.accuracy);
        guard.info.last_trained = Some(chrono::Utc::now().timestamp());
        guard.info.loaded = true;

        let elapsed = start.elapsed();
        metrics().observe_training(elapsed.as_secs_f64());
        info!(
            model_id,
            rows = set.len(),
            epochs = result.epochs_run,
            stopped_early = result.stopped_early,
            val_loss = result.val_loss,
            elapsed_ms = elapsed.as_millis() as u64,
            "training complete"
        );
        Ok(result)
    }

    /// Runs inference on a single feature vector.
    pub async fn predict(&self, model_id: &str, input: &[f32]) -> Result<PredictionResult> {
        let entry = self.entry(model_id)?;
        let guard = entry.read().await;
        let result = self.predict_locked(model_id, &guard, input)?;
        Ok(result)
    }

    /// Runs inference on a batch of rows, returning one result per row in
    /// input order.
    pub async fn predict_batch(
        &self,
        model_id: &str,
        rows: &[Vec<f32>],
    ) -> Result<Vec<PredictionResult>> {
        let entry = self.entry(model_id)?;
        let guard = entry.read().await;
        rows.iter()
            .map(|row| self.predict_locked(model_id, &guard, row))
            .collect()
    }

    fn predict_locked(
        &self,
        model_id: &str,
        entry: &ModelEntry,
        input: &[f32],
    ) -> Result<PredictionResult> {
        if !entry.info.loaded {
            metrics().inc_prediction_errors();
            return Err(EngineError::ModelNotLoaded(model_id.to_string()));
        }
        if input.len() != entry.info.input_width {
            metrics().inc_prediction_errors();
            return Err(EngineError::ShapeMismatch {
                expected: entry.info.input_width,
                actual: input.len(),
            });
        }

        let start = Instant::now();
        let values = entry.network.forward(input);
        let confidence = match entry.info.task {
            TaskKind::Classification => values
                .iter()
                .fold(0.0_f32, |a, &b| a.max(b))
                .clamp(0.0, 1.0),
            _ => self.regression_confidence,
        };
        let explanation = (confidence < 0.5)
            .then(|| "low confidence: treat this prediction as indicative only".to_string());

        let elapsed = start.elapsed();
        metrics().observe_prediction(elapsed.as_secs_f64());
        metrics().inc_predictions();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                model_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        }

        Ok(PredictionResult {
            values,
            confidence,
            explanation,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Persists a model's architecture and weights to `path`.
    pub async fn save(&self, model_id: &str, path: &Path) -> Result<()> {
        let entry = self.entry(model_id)?;
        let guard = entry.read().await;
        let snapshot = ModelSnapshot {
            info: guard.info.clone(),
            network: guard.network.clone(),
        };
        persist::save_snapshot(&snapshot, path)?;
        info!(model_id, path = %path.display(), "model saved");
        Ok(())
    }

    /// Loads a model snapshot from `path`, replacing any entry with the
    /// same id.
    pub async fn load(&self, path: &Path) -> Result<ModelInfo> {
        let snapshot = persist::load_snapshot(path)?;
        let info = snapshot.info.clone();
        self.entries.insert(
            info.id.clone(),
            Arc::new(RwLock::new(ModelEntry {
                info: info.clone(),
                network: snapshot.network,
            })),
        );
        metrics().set_models_registered(self.entries.len() as i64);
        info!(model_id = %info.id, path = %path.display(), "model loaded");
        Ok(info)
    }

    pub async fn get(&self, model_id: &str) -> Result<ModelInfo> {
        let entry = self.entry(model_id)?;
        let guard = entry.read().await;
        Ok(guard.info.clone())
    }

    /// Metadata for every registered model, ordered by id.
    pub async fn list(&self) -> Vec<ModelInfo> {
        // Clone the entry handles first: holding a map shard guard across
        // an await point could deadlock against a concurrent insert.
        let entries: Vec<Arc<RwLock<ModelEntry>>> =
            self.entries.iter().map(|e| e.value().clone()).collect();

        let mut infos = Vec::with_capacity(entries.len());
        for entry in entries {
            infos.push(entry.read().await.info.clone());
        }
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }
}
