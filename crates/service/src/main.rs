//! Foreman service - prediction and optimization engine over HTTP
//!
//! Loads configuration, seeds the demo store, warms up the engine (every
//! model trained, synthetic fallback included), and serves the JSON API
//! with health and metrics endpoints.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use foreman_engine::{
    Contractor, Employee, EngineConfig, EquipmentSnapshot, EquipmentType, InMemoryStore,
    MaintenanceKind, MaintenanceRecord, PredictionEngine, ShiftKind, Skill, UsageSession,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs with env-filterable levels.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = SERVICE_VERSION, "Starting foreman-service");

    let service_config = config::ServiceConfig::load()?;

    let store = InMemoryStore::new();
    if service_config.demo_data {
        seed_demo_data(&store).await;
        info!("Demo data seeded");
    }

    let engine_config = EngineConfig {
        synthetic_rows: service_config.synthetic_rows,
        rng_seed: service_config.rng_seed,
        ..EngineConfig::default()
    };
    let engine = Arc::new(PredictionEngine::new(Arc::new(store), engine_config));

    info!("Warming up prediction models");
    engine.initialize().await?;

    let state = Arc::new(api::AppState::new(engine));
    api::serve(service_config.api_port, state).await
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid demo date")
}

fn skill(name: &str, category: &str, level: u8, years: f32) -> Skill {
    Skill {
        name: name.to_string(),
        category: category.to_string(),
        level,
        verified: true,
        years_experience: years,
    }
}

/// A small fleet and crew so the API is explorable out of the box.
async fn seed_demo_data(store: &InMemoryStore) {
    let units = [
        ("DT-01", "Dump truck 01", EquipmentType::DumpTruck, 2019, 14_000.0, 210_000.0),
        ("DT-02", "Dump truck 02", EquipmentType::DumpTruck, 2022, 6_000.0, 80_000.0),
        ("EX-01", "Excavator 01", EquipmentType::Excavator, 2018, 11_000.0, 24_000.0),
        ("DR-01", "Drill rig 01", EquipmentType::DrillRig, 2020, 7_500.0, 9_000.0),
        ("LD-01", "Loader 01", EquipmentType::Loader, 2021, 5_200.0, 31_000.0),
        ("CR-01", "Crane 01", EquipmentType::Crane, 2017, 9_800.0, 12_000.0),
        ("GR-01", "Grader 01", EquipmentType::Grader, 2023, 2_100.0, 18_000.0),
    ];

    for (id, name, equipment_type, year, hours, km) in units {
        let purchase = date(year, 3, 1);
        store
            .add_equipment(EquipmentSnapshot {
                id: id.to_string(),
                name: name.to_string(),
                equipment_type,
                purchase_date: purchase,
                usage_hours: hours,
                usage_distance_km: km,
                service_interval_hours: Some(500.0),
                active: true,
                maintenance_history: vec![
                    MaintenanceRecord {
                        date: date(2024, 2, 12),
                        kind: MaintenanceKind::Preventive,
                        cost: 1_100.0,
                        downtime_hours: 8.0,
                        description: "scheduled service".to_string(),
                    },
                    MaintenanceRecord {
                        date: date(2024, 7, 30),
                        kind: MaintenanceKind::Repair,
                        cost: 2_900.0,
                        downtime_hours: 16.0,
                        description: "wear repair".to_string(),
                    },
                ],
                usage_history: (0..18)
                    .map(|i| UsageSession {
                        date: date(2024, 1, 8) + chrono::Duration::days(i * 20),
                        hours: 140.0,
                        distance_km: if km > 50_000.0 { 2_400.0 } else { 60.0 },
                        fuel_liters: 1_700.0,
                    })
                    .collect(),
            })
            .await;
    }

    let employees = [
        ("E-100", "Ade Okafor", vec![skill("welding", "fabrication", 4, 7.0)], 46.0, Some(ShiftKind::Day)),
        ("E-101", "Mia Lindqvist", vec![skill("excavator operation", "operations", 5, 9.0)], 48.0, Some(ShiftKind::Day)),
        ("E-102", "Tomas Rivera", vec![skill("dump truck driving", "operations", 3, 4.0)], 41.0, Some(ShiftKind::Night)),
        ("E-103", "Keisha Brown", vec![skill("electrical", "maintenance", 4, 6.0), skill("rigging", "fabrication", 3, 3.0)], 45.0, None),
    ];
    for (id, name, skills, rate, pref) in employees {
        store
            .add_employee(Employee {
                id: id.to_string(),
                name: name.to_string(),
                skills,
                hourly_rate: Some(rate),
                max_hours_per_week: 40.0,
                shift_preference: pref,
                active: true,
            })
            .await;
    }

    let contractors = [
        ("C-200", "Borealis Drilling", vec![skill("drill rig operation", "operations", 5, 12.0)], 68.0, 95.0),
        ("C-201", "Harbor Crane Services", vec![skill("crane operation", "operations", 4, 8.0)], 72.0, 110.0),
    ];
    for (id, name, skills, rate, emergency) in contractors {
        store
            .add_contractor(Contractor {
                id: id.to_string(),
                name: name.to_string(),
                skills,
                hourly_rate: Some(rate),
                day_rate: None,
                emergency_rate: Some(emergency),
                max_hours_per_week: 50.0,
                shift_preference: None,
                available: true,
            })
            .await;
    }

    for name in [
        "welding",
        "rigging",
        "electrical",
        "excavator operation",
        "dump truck driving",
        "drill rig operation",
        "crane operation",
    ] {
        store.register_skill(name).await;
    }
}
