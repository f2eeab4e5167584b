//! Engine façade
//!
//! One `PredictionEngine` is constructed at process start and passed by
//! reference to every call site; there is no global singleton. It wires the
//! model registry, the data store, and the decision layers, and owns the
//! idempotent warm-up that guarantees every model is trained (synthetic
//! fallback included) before the first prediction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::features::{
    snapshot_features, training_rows, SyntheticGenerator, ASSIGNMENT_FEATURES, EQUIPMENT_FEATURES,
    FORECAST_FEATURES, SCHEDULE_FEATURES,
};
use crate::health::{components, HealthRegistry};
use crate::maintenance::{synthesize_prediction, AlertBuilder};
use crate::models::{
    Candidate, EquipmentSnapshot, EquipmentType, ForecastFactors, MaintenanceAlert,
    MaintenancePrediction, OptimizationResult, ScheduleConstraints, ShiftSchedule, Timeframe,
    WorkTask, WorkforceForecast,
};
use crate::observability::metrics;
use crate::registry::{Architecture, ModelRegistry, TaskKind, TrainingSet};
use crate::store::{workforce_pool, OpsStore};
use crate::workforce::{
    self, ASSIGNMENT_MODEL_ID, FORECAST_MODEL_ID, SCHEDULE_MODEL_ID,
};

/// Registry id of the maintenance model for an equipment type.
pub fn maintenance_model_id(equipment_type: EquipmentType) -> String {
    format!("maintenance-{}", equipment_type.as_str())
}

/// The prediction and optimization engine.
///
/// All operations are request-scoped; the only cross-call state is the
/// registry's trained weights, rebuildable via [`PredictionEngine::initialize`].
pub struct PredictionEngine {
    registry: ModelRegistry,
    store: Arc<dyn OpsStore>,
    config: EngineConfig,
    alerts: AlertBuilder,
    health: HealthRegistry,
    rng: Mutex<StdRng>,
    initialized: AtomicBool,
}

impl PredictionEngine {
    pub fn new(store: Arc<dyn OpsStore>, config: EngineConfig) -> Self {
        Self {
            registry: ModelRegistry::new(&config),
            store,
            alerts: AlertBuilder::new(config.alert_dedup_window),
            health: HealthRegistry::new(),
            rng: Mutex::new(StdRng::seed_from_u64(config.rng_seed)),
            config,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    fn fork_rng(&self) -> StdRng {
        let seed: u64 = self.rng.lock().unwrap().gen();
        StdRng::seed_from_u64(seed)
    }

    /// Idempotent warm-up: registers and trains every per-type maintenance
    /// model plus the three workforce models. Types with fewer real
    /// historical units than the configured threshold train on synthetic
    /// data so a cold deployment can predict from day one.
    pub async fn initialize(&self) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            debug!("engine already initialized");
            return Ok(());
        }

        for name in [
            components::MODEL_REGISTRY,
            components::STORE,
            components::MAINTENANCE,
            components::WORKFORCE,
        ] {
            self.health.register(name).await;
        }

        let fleet = self.store.all_equipment().await?;
        for equipment_type in EquipmentType::ALL {
            self.initialize_maintenance_model(equipment_type, &fleet)
                .await?;
        }
        self.initialize_workforce_models().await?;

        self.initialized.store(true, Ordering::SeqCst);
        self.health.set_ready(true).await;
        info!(models = self.registry.list().await.len(), "engine initialized");
        Ok(())
    }

    async fn initialize_maintenance_model(
        &self,
        equipment_type: EquipmentType,
        fleet: &[EquipmentSnapshot],
    ) -> Result<()> {
        let model_id = maintenance_model_id(equipment_type);
        let info = self
            .registry
            .create_model(
                &model_id,
                &format!("Maintenance outlook: {equipment_type}"),
                TaskKind::Regression,
                Architecture::Deep,
                EQUIPMENT_FEATURES.len(),
                1,
            )
            .await?;
        if info.loaded {
            debug!(%model_id, "model already trained, skipping warm-up");
            return Ok(());
        }

        let units: Vec<&EquipmentSnapshot> = fleet
            .iter()
            .filter(|eq| eq.equipment_type == equipment_type)
            .collect();
        let rows: Vec<(Vec<f32>, f32)> = units
            .iter()
            .flat_map(|&eq| training_rows(eq, self.config.max_event_gap_days))
            .collect();
        let units_with_history = units
            .iter()
            .filter(|eq| eq.maintenance_history.len() >= 2)
            .count();

        let set = if units_with_history < self.config.synthetic_history_threshold
            || rows.is_empty()
        {
            // Soft condition, not an error: cold start never blocks operation.
            warn!(
                %equipment_type,
                units_with_history,
                threshold = self.config.synthetic_history_threshold,
                "insufficient history, training on synthetic data"
            );
            let seed: u64 = self.rng.lock().unwrap().gen();
            SyntheticGenerator::new(seed, self.config.synthetic_rows)
                .equipment_set(equipment_type)
        } else {
            info!(%equipment_type, rows = rows.len(), "training on real history");
            TrainingSet::from_scalar_labels(rows, EQUIPMENT_FEATURES, "days_to_maintenance")
        };

        self.registry
            .train(&model_id, &set, &self.config.training)
            .await?;
        Ok(())
    }

    async fn initialize_workforce_models(&self) -> Result<()> {
        let specs = [
            (
                ASSIGNMENT_MODEL_ID,
                "Assignment fitness",
                TaskKind::Regression,
                Architecture::Simple,
                ASSIGNMENT_FEATURES.len(),
            ),
            (
                SCHEDULE_MODEL_ID,
                "Schedule fitness",
                TaskKind::Regression,
                Architecture::Simple,
                SCHEDULE_FEATURES.len(),
            ),
            (
                FORECAST_MODEL_ID,
                "Workforce forecast",
                TaskKind::Timeseries,
                Architecture::Lstm,
                FORECAST_FEATURES.len(),
            ),
        ];

        for (model_id, name, task, architecture, width) in specs {
            let info = self
                .registry
                .create_model(model_id, name, task, architecture, width, 1)
                .await?;
            if info.loaded {
                continue;
            }

            // The platform keeps no labeled workforce history yet, so the
            // workforce models always cold-start on synthetic sets.
            warn!(model_id, "no labeled workforce history, training on synthetic data");
            let seed: u64 = self.rng.lock().unwrap().gen();
            let mut generator = SyntheticGenerator::new(seed, self.config.synthetic_rows);
            let set = match model_id {
                ASSIGNMENT_MODEL_ID => generator.assignment_set(),
                SCHEDULE_MODEL_ID => generator.schedule_set(),
                _ => generator.forecast_set(),
            };
            self.registry
                .train(model_id, &set, &self.config.training)
                .await?;
        }
        Ok(())
    }

    /// Maintenance outlook for one equipment unit.
    pub async fn predict_maintenance(&self, equipment_id: &str) -> Result<MaintenancePrediction> {
        let eq = self
            .store
            .equipment(equipment_id)
            .await?
            .ok_or_else(|| EngineError::EquipmentNotFound(equipment_id.to_string()))?;

        let model_id = maintenance_model_id(eq.equipment_type);
        if !self.registry.contains(&model_id) {
            return Err(EngineError::NoModelForType(
                eq.equipment_type.as_str().to_string(),
            ));
        }

        let as_of = chrono::Utc::now().date_naive();
        let features = snapshot_features(&eq, as_of);
        let prediction = self.registry.predict(&model_id, &features).await?;
        let days_until = prediction.scalar()?;

        Ok(synthesize_prediction(
            &eq,
            days_until,
            prediction.confidence,
            as_of,
            &self.config.risk,
        ))
    }

    /// Runs the per-unit pipeline over every active unit and classifies the
    /// results into alerts. Per-unit failures are logged and skipped; the
    /// batch always returns partial results.
    pub async fn generate_alerts(&self) -> Result<Vec<MaintenanceAlert>> {
        let mut alerts = Vec::new();

        for eq in self.store.all_equipment().await? {
            if !eq.active {
                continue;
            }
            match self.predict_maintenance(&eq.id).await {
                Ok(prediction) => {
                    if let Some(alert) = self.alerts.build(&prediction) {
                        alerts.push(alert);
                    }
                }
                Err(e) => {
                    warn!(equipment_id = %eq.id, error = %e, "alert generation skipped unit");
                }
            }
        }

        metrics().add_alerts(alerts.len() as u64);
        Ok(alerts)
    }

    /// Active employees and available contractors as one candidate pool.
    pub async fn workforce_pool(&self) -> Result<Vec<Candidate>> {
        workforce_pool(self.store.as_ref()).await
    }

    /// Staffs every task in the batch and reports aggregate metrics.
    pub async fn optimize_assignments(&self, tasks: &[WorkTask]) -> Result<OptimizationResult> {
        let pool = self.workforce_pool().await?;
        let as_of = chrono::Utc::now().date_naive();
        let mut rng = self.fork_rng();

        let assignments = workforce::optimize_assignments(
            &self.registry,
            &self.config,
            tasks,
            &pool,
            as_of,
            &mut rng,
        )
        .await;

        metrics().add_assignments(assignments.len() as u64);
        Ok(workforce::summarize(tasks, assignments, Vec::new()))
    }

    /// Shift schedules for the given workers under the constraints.
    pub async fn optimize_schedules(
        &self,
        workers: &[Candidate],
        constraints: &ScheduleConstraints,
    ) -> Vec<ShiftSchedule> {
        workforce::optimize_schedules(&self.registry, &self.config, workers, constraints).await
    }

    /// Workforce-need forecast for the timeframe.
    pub async fn predict_workforce_needs(
        &self,
        timeframe: Timeframe,
        factors: &ForecastFactors,
    ) -> Result<WorkforceForecast> {
        let pool = self.workforce_pool().await?;
        let catalog = self.store.skill_catalog().await?;
        workforce::predict_workforce_needs(
            &self.registry,
            &self.config,
            factors,
            timeframe,
            &pool,
            &catalog,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AlertKind, Employee, MaintenanceKind, MaintenanceRecord, Priority, Skill, UsageSession,
    };
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    fn quick_config() -> EngineConfig {
        EngineConfig {
            synthetic_rows: 300,
            assignment_jitter: 0.0,
            ..EngineConfig::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn worn_excavator(id: &str) -> EquipmentSnapshot {
        EquipmentSnapshot {
            id: id.to_string(),
            name: format!("Excavator {id}"),
            equipment_type: EquipmentType::Excavator,
            purchase_date: date(2015, 1, 1),
            usage_hours: 12_000.0,
            usage_distance_km: 30_000.0,
            service_interval_hours: Some(400.0),
            active: true,
            maintenance_history: vec![
                MaintenanceRecord {
                    date: date(2024, 1, 10),
                    kind: MaintenanceKind::Preventive,
                    cost: 900.0,
                    downtime_hours: 6.0,
                    description: "service".to_string(),
                },
                MaintenanceRecord {
                    date: date(2024, 4, 2),
                    kind: MaintenanceKind::Repair,
                    cost: 3200.0,
                    downtime_hours: 18.0,
                    description: "hydraulic hose".to_string(),
                },
            ],
            usage_history: (0..24)
                .map(|i| UsageSession {
                    date: date(2024, 1, 1) + chrono::Duration::days(i * 15),
                    hours: 120.0,
                    distance_km: 40.0,
                    fuel_liters: 1500.0,
                })
                .collect(),
        }
    }

    fn welder(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Welder {id}"),
            skills: vec![Skill {
                name: "welding".to_string(),
                category: "trade".to_string(),
                level: 4,
                verified: true,
                years_experience: 6.0,
            }],
            hourly_rate: Some(44.0),
            max_hours_per_week: 40.0,
            shift_preference: None,
            active: true,
        }
    }

    async fn engine_with_sparse_fleet() -> PredictionEngine {
        let store = InMemoryStore::new();
        // One excavator only: every type is below the 5-unit threshold.
        store.add_equipment(worn_excavator("EX-01")).await;
        store.add_employee(welder("e1")).await;
        store.register_skill("welding").await;

        let engine = PredictionEngine::new(Arc::new(store), quick_config());
        engine.initialize().await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_initialize_trains_every_type_despite_sparse_history() {
        let engine = engine_with_sparse_fleet().await;

        for equipment_type in EquipmentType::ALL {
            let info = engine
                .registry()
                .get(&maintenance_model_id(equipment_type))
                .await
                .unwrap();
            assert!(info.loaded, "{equipment_type} model not trained");
        }
        for model_id in [ASSIGNMENT_MODEL_ID, SCHEDULE_MODEL_ID, FORECAST_MODEL_ID] {
            assert!(engine.registry().get(model_id).await.unwrap().loaded);
        }
        assert!(engine.health().readiness().await.ready);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let engine = engine_with_sparse_fleet().await;
        let version_before = engine
            .registry()
            .get(ASSIGNMENT_MODEL_ID)
            .await
            .unwrap()
            .version;

        engine.initialize().await.unwrap();

        let version_after = engine
            .registry()
            .get(ASSIGNMENT_MODEL_ID)
            .await
            .unwrap()
            .version;
        assert_eq!(version_before, version_after);
    }

    #[tokio::test]
    async fn test_predict_maintenance_is_repeatable() {
        let engine = engine_with_sparse_fleet().await;

        let first = engine.predict_maintenance("EX-01").await.unwrap();
        let second = engine.predict_maintenance("EX-01").await.unwrap();

        assert_eq!(first.priority, second.priority);
        assert_eq!(first.failure_type, second.failure_type);
        assert_eq!(first.risk_score, second.risk_score);
        assert!((0.0..=1.0).contains(&first.risk_score));
        assert_eq!(first.equipment_id, "EX-01");
    }

    #[tokio::test]
    async fn test_unknown_equipment_is_a_typed_error() {
        let engine = engine_with_sparse_fleet().await;
        let err = engine.predict_maintenance("missing").await.unwrap_err();
        assert!(matches!(err, EngineError::EquipmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_no_model_for_type_before_initialize() {
        let store = InMemoryStore::new();
        store.add_equipment(worn_excavator("EX-01")).await;
        let engine = PredictionEngine::new(Arc::new(store), quick_config());

        let err = engine.predict_maintenance("EX-01").await.unwrap_err();
        assert!(matches!(err, EngineError::NoModelForType(_)));
    }

    #[tokio::test]
    async fn test_generate_alerts_returns_partial_results() {
        let engine = engine_with_sparse_fleet().await;
        // The worn excavator predicts well into the risk range; whether it
        // alerts depends on the model, but the batch must not fail.
        let alerts = engine.generate_alerts().await.unwrap();
        for alert in &alerts {
            assert!(!alert.acknowledged);
            assert!(matches!(
                alert.kind,
                AlertKind::Immediate | AlertKind::Schedule | AlertKind::Monitor
            ));
        }
    }

    #[tokio::test]
    async fn test_welding_task_gets_exactly_one_assignment() {
        let engine = engine_with_sparse_fleet().await;
        let tasks = vec![WorkTask {
            id: "t1".to_string(),
            name: "Weld supports".to_string(),
            priority: Priority::High,
            estimated_hours: 16.0,
            required_skills: vec!["welding".to_string()],
            preferred_experience_years: 3.0,
            deadline: None,
            location: None,
            required_equipment: None,
            shift_preference: None,
            min_workers: 1,
            max_workers: 1,
            budget: None,
        }];

        let result = engine.optimize_assignments(&tasks).await.unwrap();
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].skill_match, 1.0);
        assert_eq!(result.completion_rate, 1.0);
    }

    #[tokio::test]
    async fn test_empty_task_list_is_vacuously_complete() {
        let engine = engine_with_sparse_fleet().await;
        let result = engine.optimize_assignments(&[]).await.unwrap();
        assert!(result.assignments.is_empty());
        assert_eq!(result.completion_rate, 1.0);
    }

    #[tokio::test]
    async fn test_pressured_forecast_grows_headcount() {
        let engine = engine_with_sparse_fleet().await;
        let factors = ForecastFactors {
            current_utilization: 0.95,
            seasonality: 0.5,
            project_deadlines: 8,
            scheduled_maintenance: 2,
            weather_impact: 0.1,
            historical_avg_workload: 60.0,
            historical_peak_workload: 90.0,
        };

        let forecast = engine
            .predict_workforce_needs(Timeframe::Weekly, &factors)
            .await
            .unwrap();
        assert!(forecast.recommended_headcount > forecast.current_headcount);
    }

    #[tokio::test]
    async fn test_schedules_for_store_pool() {
        let engine = engine_with_sparse_fleet().await;
        let pool = engine.workforce_pool().await.unwrap();
        let constraints = ScheduleConstraints {
            date: date(2025, 5, 5),
            shift_length_hours: 8.0,
            require_full_coverage: false,
        };

        let schedules = engine.optimize_schedules(&pool, &constraints).await;
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].total_hours <= 8.0);
    }
}
