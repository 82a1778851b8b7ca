use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::models::patient::{PatientChanges, PatientRow};
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;

/// In-memory storage for patient rows, keyed by patient id in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryPatientRepository {
    rows: Arc<Mutex<IndexMap<String, PatientRow>>>,
}

impl InMemoryPatientRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with rows. Later rows win on duplicate ids.
    pub fn with_rows(rows: Vec<PatientRow>) -> Self {
        let map = rows
            .into_iter()
            .map(|row| (row.patient_id.clone(), row))
            .collect();
        Self {
            rows: Arc::new(Mutex::new(map)),
        }
    }
}

#[async_trait]
impl PatientRepositoryTrait for InMemoryPatientRepository {
    async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError> {
        let mut store = self.rows.lock()?;
        if store.contains_key(&row.patient_id) {
            return Err(RepositoryError::DuplicateKey(row.patient_id.clone()));
        }
        store.insert(row.patient_id.clone(), row.clone());
        Ok(())
    }

    async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError> {
        let store = self.rows.lock()?;
        Ok(store.get(patient_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError> {
        let store = self.rows.lock()?;
        Ok(store.values().cloned().collect())
    }

    async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError> {
        let mut store = self.rows.lock()?;
        let row = store
            .get_mut(patient_id)
            .ok_or_else(|| RepositoryError::NotFound(patient_id.to_string()))?;
        changes.apply_to(row);
        Ok(())
    }

    async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError> {
        let mut store = self.rows.lock()?;
        // shift_remove keeps the remaining rows in insertion order
        store
            .shift_remove(patient_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(patient_id.to_string()))
    }

    async fn describe(&self) -> Result<String, RepositoryError> {
        let store = self.rows.lock()?;
        Ok(format!("In-memory patient store ({} records)", store.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::patient::tests::{assert_repository_contract, sample_row};

    #[tokio::test]
    async fn test_in_memory_contract() {
        let repo = InMemoryPatientRepository::new();
        assert_repository_contract(&repo).await;
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryPatientRepository::new();
        let handle = repo.clone();
        handle.insert(&sample_row("P010", "Dev", 50)).await.unwrap();

        assert!(repo.find_by_id("P010").await.unwrap().is_some());
        assert_eq!(repo.describe().await.unwrap(), "In-memory patient store (1 records)");
    }
}
