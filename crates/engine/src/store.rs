//! Data-store collaborator
//!
//! The engine consumes read-only snapshots through this trait; persistence
//! itself lives outside the core. The in-memory implementation backs tests
//! and the demo service.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{Candidate, Contractor, Employee, EquipmentSnapshot};

/// Read-only view of the platform's operational data.
#[async_trait]
pub trait OpsStore: Send + Sync {
    /// Snapshot for one equipment unit, if it exists.
    async fn equipment(&self, equipment_id: &str) -> Result<Option<EquipmentSnapshot>>;

    /// All equipment units, active and inactive.
    async fn all_equipment(&self) -> Result<Vec<EquipmentSnapshot>>;

    async fn employees(&self) -> Result<Vec<Employee>>;

    async fn contractors(&self) -> Result<Vec<Contractor>>;

    /// Names of every skill registered on the platform.
    async fn skill_catalog(&self) -> Result<Vec<String>>;
}

/// Active employees and available contractors as one candidate pool.
pub async fn workforce_pool(store: &dyn OpsStore) -> Result<Vec<Candidate>> {
    let mut pool: Vec<Candidate> = store
        .employees()
        .await?
        .into_iter()
        .filter(|e| e.active)
        .map(Candidate::Employee)
        .collect();
    pool.extend(
        store
            .contractors()
            .await?
            .into_iter()
            .filter(|c| c.available)
            .map(Candidate::Contractor),
    );
    Ok(pool)
}

#[derive(Default)]
struct StoreData {
    equipment: HashMap<String, EquipmentSnapshot>,
    employees: Vec<Employee>,
    contractors: Vec<Contractor>,
    skills: Vec<String>,
}

/// In-memory store for tests and the demo service.
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_equipment(&self, snapshot: EquipmentSnapshot) {
        let mut data = self.data.write().await;
        data.equipment.insert(snapshot.id.clone(), snapshot);
    }

    pub async fn add_employee(&self, employee: Employee) {
        self.data.write().await.employees.push(employee);
    }

    pub async fn add_contractor(&self, contractor: Contractor) {
        self.data.write().await.contractors.push(contractor);
    }

    pub async fn register_skill(&self, name: impl Into<String>) {
        let name = name.into();
        let mut data = self.data.write().await;
        if !data.skills.contains(&name) {
            data.skills.push(name);
        }
    }
}

#[async_trait]
impl OpsStore for InMemoryStore {
    async fn equipment(&self, equipment_id: &str) -> Result<Option<EquipmentSnapshot>> {
        Ok(self.data.read().await.equipment.get(equipment_id).cloned())
    }

    async fn all_equipment(&self) -> Result<Vec<EquipmentSnapshot>> {
        let data = self.data.read().await;
        let mut units: Vec<EquipmentSnapshot> = data.equipment.values().cloned().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(units)
    }

    async fn employees(&self) -> Result<Vec<Employee>> {
        Ok(self.data.read().await.employees.clone())
    }

    async fn contractors(&self) -> Result<Vec<Contractor>> {
        Ok(self.data.read().await.contractors.clone())
    }

    async fn skill_catalog(&self) -> Result<Vec<String>> {
        Ok(self.data.read().await.skills.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EquipmentType;
    use chrono::NaiveDate;

    fn snapshot(id: &str) -> EquipmentSnapshot {
        EquipmentSnapshot {
            id: id.to_string(),
            name: format!("Unit {id}"),
            equipment_type: EquipmentType::Loader,
            purchase_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            usage_hours: 100.0,
            usage_distance_km: 50.0,
            service_interval_hours: None,
            active: true,
            maintenance_history: vec![],
            usage_history: vec![],
        }
    }

    #[tokio::test]
    async fn test_equipment_lookup() {
        let store = InMemoryStore::new();
        store.add_equipment(snapshot("L-01")).await;

        assert!(store.equipment("L-01").await.unwrap().is_some());
        assert!(store.equipment("L-02").await.unwrap().is_none());
        assert_eq!(store.all_equipment().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_workforce_pool_filters_unavailable() {
        let store = InMemoryStore::new();
        store
            .add_employee(Employee {
                id: "e1".to_string(),
                name: "Active".to_string(),
                skills: vec![],
                hourly_rate: None,
                max_hours_per_week: 40.0,
                shift_preference: None,
                active: true,
            })
            .await;
        store
            .add_employee(Employee {
                id: "e2".to_string(),
                name: "Inactive".to_string(),
                skills: vec![],
                hourly_rate: None,
                max_hours_per_week: 40.0,
                shift_preference: None,
                active: false,
            })
            .await;
        store
            .add_contractor(Contractor {
                id: "c1".to_string(),
                name: "Busy".to_string(),
                skills: vec![],
                hourly_rate: None,
                day_rate: None,
                emergency_rate: None,
                max_hours_per_week: 50.0,
                shift_preference: None,
                available: false,
            })
            .await;

        let pool = workforce_pool(&store).await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id(), "e1");
    }

    #[tokio::test]
    async fn test_skill_catalog_deduplicates() {
        let store = InMemoryStore::new();
        store.register_skill("welding").await;
        store.register_skill("welding").await;
        store.register_skill("rigging").await;
        assert_eq!(store.skill_catalog().await.unwrap().len(), 2);
    }
}
