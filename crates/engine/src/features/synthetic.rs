//! Synthetic training data
//!
//! Cold-start fallback: when a model has too little real history, a seeded
//! generator produces plausible labeled rows from per-type baseline ranges
//! and a hand-specified label formula. This trades accuracy for "cold start
//! never blocks operation"; models retrain on real rows as history
//! accumulates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::EquipmentType;
use crate::registry::TrainingSet;

use super::equipment::EQUIPMENT_FEATURES;
use super::workforce::{ASSIGNMENT_FEATURES, FORECAST_FEATURES, SCHEDULE_FEATURES};

/// Average days per month used to relate ages and usage rates.
const DAYS_PER_MONTH: f32 = 30.4;

/// Plausible operating ranges for one equipment type.
struct TypeBaseline {
    max_hours: f32,
    max_distance_km: f32,
    /// Baseline maintenance interval in days.
    interval_days: f32,
    nominal_daily_hours: f32,
}

fn baseline(equipment_type: EquipmentType) -> TypeBaseline {
    match equipment_type {
        EquipmentType::DumpTruck => TypeBaseline {
            max_hours: 20_000.0,
            max_distance_km: 500_000.0,
            interval_days: 90.0,
            nominal_daily_hours: 10.0,
        },
        EquipmentType::Excavator => TypeBaseline {
            max_hours: 15_000.0,
            max_distance_km: 50_000.0,
            interval_days: 75.0,
            nominal_daily_hours: 9.0,
        },
        EquipmentType::DrillRig => TypeBaseline {
            max_hours: 12_000.0,
            max_distance_km: 20_000.0,
            interval_days: 60.0,
            nominal_daily_hours: 8.0,
        },
        EquipmentType::Loader => TypeBaseline {
            max_hours: 18_000.0,
            max_distance_km: 80_000.0,
            interval_days: 90.0,
            nominal_daily_hours: 9.0,
        },
        EquipmentType::Crane => TypeBaseline {
            max_hours: 16_000.0,
            max_distance_km: 30_000.0,
            interval_days: 120.0,
            nominal_daily_hours: 7.0,
        },
        EquipmentType::Grader => TypeBaseline {
            max_hours: 15_000.0,
            max_distance_km: 100_000.0,
            interval_days: 100.0,
            nominal_daily_hours: 8.0,
        },
    }
}

/// Seeded generator for synthetic training sets.
pub struct SyntheticGenerator {
    rng: StdRng,
    rows: usize,
}

impl SyntheticGenerator {
    pub fn new(seed: u64, rows: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            rows,
        }
    }

    /// Synthetic maintenance-interval rows for one equipment type.
    ///
    /// Label formula: the type's baseline interval shortened by age,
    /// usage intensity, and accumulated service debt, plus noise.
    pub fn equipment_set(&mut self, equipment_type: EquipmentType) -> TrainingSet {
        let base = baseline(equipment_type);
        let mut rows = Vec::with_capacity(self.rows);

        for _ in 0..self.rows {
            let rng = &mut self.rng;
            let age_months = rng.gen_range(3.0..120.0_f32);
            let intensity = rng.gen_range(0.3..1.5_f32);
            let daily_hours = base.nominal_daily_hours * intensity;
            let total_hours = (daily_hours * DAYS_PER_MONTH * age_months).min(base.max_hours);
            let total_km = base.max_distance_km * (total_hours / base.max_hours)
                * rng.gen_range(0.8..1.2_f32);

            let interval_hours = base.nominal_daily_hours * base.interval_days;
            let hours_since_service = rng.gen_range(0.0..1.3_f32) * interval_hours;
            let service_debt = hours_since_service / interval_hours;

            let events = (age_months / (base.interval_days / DAYS_PER_MONTH)).max(1.0);
            let repair_events = (events * rng.gen_range(0.1..0.4_f32)).round();
            let emergency_events = (events * rng.gen_range(0.0..0.15_f32)).round();

            let features = vec![
                age_months,
                total_hours,
                total_km,
                hours_since_service,
                daily_hours,
                rng.gen_range(8.0..16.0_f32),
                DAYS_PER_MONTH / base.interval_days * rng.gen_range(0.7..1.3_f32),
                rng.gen_range(-0.3..0.5_f32),
                rng.gen_range(0.0..1.0_f32),
                0.5,
                0.5,
                age_months * 0.9,
                age_months * 0.8,
                age_months * 0.85,
                repair_events,
                emergency_events,
                rng.gen_range(0.4..0.9_f32),
                repair_events * 6.0 + emergency_events * 12.0,
            ];
            debug_assert_eq!(features.len(), EQUIPMENT_FEATURES.len());

            let age_norm = age_months / 120.0;
            let intensity_norm = (intensity - 0.3) / 1.2;
            let label = base.interval_days
                * (1.15
                    - 0.30 * age_norm
                    - 0.25 * intensity_norm
                    - 0.25 * service_debt.min(1.2))
                + rng.gen_range(-0.1..0.1_f32) * base.interval_days;
            let label = label.clamp(3.0, base.interval_days * 1.5);

            rows.push((features, label));
        }

        TrainingSet::from_scalar_labels(rows, EQUIPMENT_FEATURES, "days_to_maintenance")
    }

    /// Synthetic assignment-fitness rows.
    ///
    /// Label: skill match dominates, then availability, experience, cost
    /// and compatibility, matching how dispatchers actually rank crews.
    pub fn assignment_set(&mut self) -> TrainingSet {
        let mut rows = Vec::with_capacity(self.rows);

        for _ in 0..self.rows {
            let rng = &mut self.rng;
            let skill = rng.gen_range(0.0..=1.0_f32);
            let experience = rng.gen_range(0.0..=1.0_f32);
            let cost = rng.gen_range(0.0..=1.0_f32);
            let availability = if rng.gen_bool(0.8) { 1.0 } else { 0.0 };
            let priority = [0.25, 0.5, 0.75, 1.0][rng.gen_range(0..4)];
            let hours = rng.gen_range(0.0..=1.0_f32);
            let employee = if rng.gen_bool(0.6) { 1.0 } else { 0.0 };
            let location = if rng.gen_bool(0.5) { 1.0 } else { 0.8 };
            let shift = [1.0, 0.7, 0.3][rng.gen_range(0..3)];
            let equipment = if rng.gen_bool(0.7) { 1.0 } else { 0.5 };
            let reliability = if employee > 0.5 { 0.8 } else { 0.7 };
            let urgency = rng.gen_range(0.0..=1.0_f32);
            let jitter = rng.gen_range(-0.02..=0.02_f32);

            let features = vec![
                skill,
                experience,
                cost,
                availability,
                priority,
                hours,
                employee,
                location,
                shift,
                equipment,
                0.5,
                reliability,
                urgency,
                jitter,
            ];
            debug_assert_eq!(features.len(), ASSIGNMENT_FEATURES.len());

            let label = (0.45 * skill
                + 0.25 * availability
                + 0.10 * experience
                + 0.08 * cost
                + 0.06 * shift
                + 0.04 * equipment
                + 0.02 * urgency
                + rng.gen_range(-0.02..=0.02_f32))
            .clamp(0.0, 1.0);

            rows.push((features, label));
        }

        TrainingSet::from_scalar_labels(rows, ASSIGNMENT_FEATURES, "fitness")
    }

    /// Synthetic schedule-fitness rows.
    pub fn schedule_set(&mut self) -> TrainingSet {
        let mut rows = Vec::with_capacity(self.rows);

        for _ in 0..self.rows {
            let rng = &mut self.rng;
            let day = [1.0, 0.0, 0.6][rng.gen_range(0..3)];
            let night = if day == 1.0 {
                0.0
            } else if day == 0.0 {
                1.0
            } else {
                0.4
            };
            let max_hours = rng.gen_range(0.4..=1.0_f32);
            let avg_daily = rng.gen_range(0.3..=0.9_f32);
            let burnout = rng.gen_range(0.0..=1.0_f32);
            let skill_value = rng.gen_range(0.2..=1.0_f32);
            let shift_length = rng.gen_range(0.5..=1.0_f32);
            let coverage = if rng.gen_bool(0.3) { 1.0 } else { 0.0 };

            let features = vec![
                day,
                night,
                max_hours,
                avg_daily,
                burnout,
                skill_value,
                shift_length,
                coverage,
                0.75,
                0.8,
            ];
            debug_assert_eq!(features.len(), SCHEDULE_FEATURES.len());

            let label = (0.30 * day.max(night)
                + 0.25 * (1.0 - burnout)
                + 0.25 * skill_value
                + 0.20 * 0.8
                + rng.gen_range(-0.03..=0.03_f32))
            .clamp(0.0, 1.0);

            rows.push((features, label));
        }

        TrainingSet::from_scalar_labels(rows, SCHEDULE_FEATURES, "fitness")
    }

    /// Synthetic workforce-demand rows. Labels are headcounts.
    pub fn forecast_set(&mut self) -> TrainingSet {
        let mut rows = Vec::with_capacity(self.rows);

        for _ in 0..self.rows {
            let rng = &mut self.rng;
            let utilization = rng.gen_range(0.3..=1.0_f32);
            let seasonality = rng.gen_range(0.0..=1.0_f32);
            let deadline_pressure = rng.gen_range(0.0..=1.2_f32);
            let maintenance_load = rng.gen_range(0.0..=1.0_f32);
            let weather = rng.gen_range(0.0..=0.8_f32);
            let avg_workload = rng.gen_range(0.2..=1.0_f32);
            let peak_workload = (avg_workload * rng.gen_range(1.0..=1.4_f32)).min(1.5);
            let timeframe = [0.2, 0.5, 1.0][rng.gen_range(0..3)];
            let demand = utilization * (1.0 + deadline_pressure);

            let features = vec![
                utilization,
                seasonality,
                deadline_pressure,
                maintenance_load,
                weather,
                avg_workload,
                peak_workload,
                timeframe,
                demand,
            ];
            debug_assert_eq!(features.len(), FORECAST_FEATURES.len());

            let label = (6.0
                + 22.0 * utilization
                + 14.0 * deadline_pressure
                + 8.0 * maintenance_load
                + 5.0 * weather
                + 12.0 * avg_workload
                + rng.gen_range(-2.0..=2.0_f32))
            .max(1.0);

            rows.push((features, label));
        }

        TrainingSet::from_scalar_labels(rows, FORECAST_FEATURES, "recommended_headcount")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_sets_validate_for_every_type() {
        let mut gen = SyntheticGenerator::new(5, 200);
        for equipment_type in EquipmentType::ALL {
            let set = gen.equipment_set(equipment_type);
            assert_eq!(set.len(), 200);
            set.validate().unwrap();
        }
    }

    #[test]
    fn test_equipment_labels_stay_in_plausible_range() {
        let mut gen = SyntheticGenerator::new(5, 500);
        let set = gen.equipment_set(EquipmentType::DrillRig);
        for label in &set.labels {
            assert!(label[0] >= 3.0);
            assert!(label[0] <= 60.0 * 1.5);
        }
    }

    #[test]
    fn test_workforce_sets_validate() {
        let mut gen = SyntheticGenerator::new(9, 300);
        gen.assignment_set().validate().unwrap();
        gen.schedule_set().validate().unwrap();
        gen.forecast_set().validate().unwrap();
    }

    #[test]
    fn test_fitness_labels_bounded() {
        let mut gen = SyntheticGenerator::new(9, 300);
        for set in [gen.assignment_set(), gen.schedule_set()] {
            for label in &set.labels {
                assert!((0.0..=1.0).contains(&label[0]));
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_rows() {
        let set_a = SyntheticGenerator::new(21, 50).assignment_set();
        let set_b = SyntheticGenerator::new(21, 50).assignment_set();
        assert_eq!(set_a.features, set_b.features);
        assert_eq!(set_a.labels, set_b.labels);
    }
}
