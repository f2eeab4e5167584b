//! Core data models for the prediction and optimization engine

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Equipment categories the engine trains per-type maintenance models for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    DumpTruck,
    Excavator,
    DrillRig,
    Loader,
    Crane,
    Grader,
}

impl EquipmentType {
    /// Every type the engine manages, in registration order.
    pub const ALL: [EquipmentType; 6] = [
        EquipmentType::DumpTruck,
        EquipmentType::Excavator,
        EquipmentType::DrillRig,
        EquipmentType::Loader,
        EquipmentType::Crane,
        EquipmentType::Grader,
    ];

    /// Types whose failure carries an elevated operational risk.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            EquipmentType::DumpTruck | EquipmentType::Excavator | EquipmentType::DrillRig
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::DumpTruck => "dump_truck",
            EquipmentType::Excavator => "excavator",
            EquipmentType::DrillRig => "drill_rig",
            EquipmentType::Loader => "loader",
            EquipmentType::Crane => "crane",
            EquipmentType::Grader => "grader",
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a historical maintenance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceKind {
    Preventive,
    Repair,
    Emergency,
    Inspection,
}

/// One completed maintenance event in an equipment unit's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub date: NaiveDate,
    pub kind: MaintenanceKind,
    pub cost: f32,
    pub downtime_hours: f32,
    pub description: String,
}

/// One recorded usage session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSession {
    pub date: NaiveDate,
    pub hours: f32,
    pub distance_km: f32,
    pub fuel_liters: f32,
}

/// Read-only equipment state fetched from the data store per prediction
/// call. The engine never mutates a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    pub id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub purchase_date: NaiveDate,
    pub usage_hours: f32,
    pub usage_distance_km: f32,
    /// Recommended hours between services, when the manufacturer publishes one.
    pub service_interval_hours: Option<f32>,
    pub active: bool,
    /// Chronologically ordered, oldest first.
    pub maintenance_history: Vec<MaintenanceRecord>,
    /// Chronologically ordered, oldest first.
    pub usage_history: Vec<UsageSession>,
}

/// Ordinal urgency bucket shared by maintenance predictions and work tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Failure mode guessed by the rule layer on top of the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    HydraulicSystem,
    Engine,
    Powertrain,
    Electrical,
    StructuralFatigue,
    GeneralWear,
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureType::HydraulicSystem => "hydraulic system",
            FailureType::Engine => "engine",
            FailureType::Powertrain => "powertrain",
            FailureType::Electrical => "electrical",
            FailureType::StructuralFatigue => "structural fatigue",
            FailureType::GeneralWear => "general wear",
        };
        f.write_str(s)
    }
}

/// Derived, ephemeral maintenance outlook for one equipment unit.
///
/// Created fresh on every call; never persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePrediction {
    pub equipment_id: String,
    pub equipment_name: String,
    /// Composite urgency in [0, 1].
    pub risk_score: f32,
    pub predicted_date: NaiveDate,
    pub days_until_maintenance: f32,
    pub failure_type: FailureType,
    pub confidence: f32,
    pub recommendations: Vec<String>,
    pub critical_components: Vec<String>,
    pub estimated_cost: f32,
    pub priority: Priority,
    pub generated_at: i64,
}

/// Alert classification produced by batch alert generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    Immediate,
    Schedule,
    Monitor,
    Optimize,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertKind::Immediate => "IMMEDIATE",
            AlertKind::Schedule => "SCHEDULE",
            AlertKind::Monitor => "MONITOR",
            AlertKind::Optimize => "OPTIMIZE",
        };
        f.write_str(s)
    }
}

/// Severity attached to a generated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// User-facing maintenance alert. The acknowledgment flag is caller-owned;
/// the engine always emits alerts unacknowledged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceAlert {
    pub equipment_id: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub generated_at: i64,
    pub acknowledged: bool,
}

/// One skill held by a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: String,
    /// Proficiency level, 1 (novice) through 5 (expert).
    pub level: u8,
    pub verified: bool,
    pub years_experience: f32,
}

/// Day/night shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftKind {
    Day,
    Night,
}

/// Directly employed worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub skills: Vec<Skill>,
    pub hourly_rate: Option<f32>,
    pub max_hours_per_week: f32,
    pub shift_preference: Option<ShiftKind>,
    pub active: bool,
}

/// External contractor with rate tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contractor {
    pub id: String,
    pub name: String,
    pub skills: Vec<Skill>,
    pub hourly_rate: Option<f32>,
    pub day_rate: Option<f32>,
    pub emergency_rate: Option<f32>,
    pub max_hours_per_week: f32,
    pub shift_preference: Option<ShiftKind>,
    pub available: bool,
}

/// Worker classification carried on derived results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Employee,
    Contractor,
}

/// Fallback hourly rate for employees with no recorded rate.
pub const DEFAULT_EMPLOYEE_RATE: f32 = 45.0;
/// Fallback hourly rate for contractors with no recorded rate.
pub const DEFAULT_CONTRACTOR_RATE: f32 = 65.0;
/// Fallback emergency hourly rate for contractors.
pub const DEFAULT_EMERGENCY_RATE: f32 = 80.0;

/// Assignment candidate: an employee or a contractor, resolved by pattern
/// match rather than property sniffing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Candidate {
    Employee(Employee),
    Contractor(Contractor),
}

impl Candidate {
    pub fn id(&self) -> &str {
        match self {
            Candidate::Employee(e) => &e.id,
            Candidate::Contractor(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Candidate::Employee(e) => &e.name,
            Candidate::Contractor(c) => &c.name,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        match self {
            Candidate::Employee(_) => WorkerKind::Employee,
            Candidate::Contractor(_) => WorkerKind::Contractor,
        }
    }

    pub fn skills(&self) -> &[Skill] {
        match self {
            Candidate::Employee(e) => &e.skills,
            Candidate::Contractor(c) => &c.skills,
        }
    }

    /// Effective hourly cost for a task of the given priority.
    ///
    /// Contractors bill their emergency rate on CRITICAL tasks. Missing rate
    /// data falls back to the fixed defaults (45 employee, 65 contractor,
    /// 80 contractor-emergency).
    pub fn cost_per_hour(&self, priority: Priority) -> f32 {
        match self {
            Candidate::Employee(e) => e.hourly_rate.unwrap_or(DEFAULT_EMPLOYEE_RATE),
            Candidate::Contractor(c) => {
                if priority == Priority::Critical {
                    c.emergency_rate.unwrap_or(DEFAULT_EMERGENCY_RATE)
                } else {
                    c.hourly_rate
                        .or(c.day_rate.map(|d| d / 8.0))
                        .unwrap_or(DEFAULT_CONTRACTOR_RATE)
                }
            }
        }
    }

    pub fn max_hours_per_week(&self) -> f32 {
        match self {
            Candidate::Employee(e) => e.max_hours_per_week,
            Candidate::Contractor(c) => c.max_hours_per_week,
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            Candidate::Employee(e) => e.active,
            Candidate::Contractor(c) => c.available,
        }
    }

    pub fn shift_preference(&self) -> Option<ShiftKind> {
        match self {
            Candidate::Employee(e) => e.shift_preference,
            Candidate::Contractor(c) => c.shift_preference,
        }
    }

    /// Deepest recorded experience across the candidate's skills, in years.
    pub fn experience_years(&self) -> f32 {
        self.skills()
            .iter()
            .map(|s| s.years_experience)
            .fold(0.0, f32::max)
    }
}

/// Caller-supplied unit of work to staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTask {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    pub estimated_hours: f32,
    pub required_skills: Vec<String>,
    pub preferred_experience_years: f32,
    pub deadline: Option<NaiveDate>,
    pub location: Option<String>,
    pub required_equipment: Option<EquipmentType>,
    pub shift_preference: Option<ShiftKind>,
    pub min_workers: u32,
    pub max_workers: u32,
    pub budget: Option<f32>,
}

/// Derived task-to-worker assignment; ownership transfers to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkAssignment {
    pub task_id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub worker_kind: WorkerKind,
    pub assigned_hours: f32,
    /// Fraction of required skill tags the worker covers, in [0, 1].
    pub skill_match: f32,
    pub cost_per_hour: f32,
    pub total_cost: f32,
    pub confidence: f32,
    pub reasoning: Vec<String>,
}

/// Derived single-day shift for one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub worker_id: String,
    pub worker_name: String,
    pub worker_kind: WorkerKind,
    pub shift: ShiftKind,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub assignments: Vec<String>,
    pub total_hours: f32,
    /// Fraction of available daily capacity consumed, in [0, 1].
    pub utilization: f32,
    pub efficiency_score: f32,
}

/// Constraint parameters for shift scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConstraints {
    pub date: NaiveDate,
    pub shift_length_hours: f32,
    /// When set, the balancing pass is expected to fill both shifts.
    pub require_full_coverage: bool,
}

/// Aggregate output of an assignment optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub assignments: Vec<WorkAssignment>,
    pub schedules: Vec<ShiftSchedule>,
    pub total_cost: f32,
    pub average_skill_match: f32,
    pub utilization_rate: f32,
    /// Fraction of distinct tasks that received at least one assignment.
    /// Defined as 1.0 for an empty task list (vacuous truth).
    pub completion_rate: f32,
    pub risk_score: f32,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Working hours the horizon spans (8 / 40 / 160).
    pub fn hours(&self) -> f32 {
        match self {
            Timeframe::Daily => 8.0,
            Timeframe::Weekly => 40.0,
            Timeframe::Monthly => 160.0,
        }
    }

    /// Relative weight used as a model feature.
    pub fn weight(&self) -> f32 {
        match self {
            Timeframe::Daily => 0.2,
            Timeframe::Weekly => 0.5,
            Timeframe::Monthly => 1.0,
        }
    }
}

/// Demand drivers supplied by the caller for workforce forecasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFactors {
    /// Current workforce utilization in [0, 1].
    pub current_utilization: f32,
    /// Seasonal demand index in [0, 1].
    pub seasonality: f32,
    pub project_deadlines: usize,
    pub scheduled_maintenance: usize,
    /// Expected weather impact in [0, 1].
    pub weather_impact: f32,
    pub historical_avg_workload: f32,
    pub historical_peak_workload: f32,
}

/// Shortfall for one skill in the forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub required: u32,
    pub available: u32,
    pub shortfall: u32,
}

/// Share of the recommended headcount assigned to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleShare {
    pub role: String,
    pub share: f32,
}

/// Workforce-need forecast for a timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceForecast {
    pub timeframe: Timeframe,
    pub recommended_headcount: u32,
    pub current_headcount: u32,
    pub employees_needed: u32,
    pub contractors_needed: u32,
    pub role_breakdown: Vec<RoleShare>,
    pub skill_gaps: Vec<SkillGap>,
    pub projected_cost: f32,
    pub confidence: f32,
    pub generated_at: i64,
}

/// Raw model output with confidence, returned by the model registry.
///
/// `predict` returns one result per input row; batch calls return a vector
/// of results in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub values: Vec<f32>,
    /// In [0, 1]. Max class probability for classification models, a
    /// configured nominal value for regression-family models.
    pub confidence: f32,
    pub explanation: Option<String>,
    pub generated_at: i64,
}

impl PredictionResult {
    /// First output value, for single-output regression models.
    pub fn scalar(&self) -> Result<f32> {
        self.values.first().copied().ok_or(EngineError::ShapeMismatch {
            expected: 1,
            actual: 0,
        })
    }
}
