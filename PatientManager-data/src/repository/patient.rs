use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::database::{initialize_sqlite_pool, DatabaseConfig, DatabaseType};
use crate::models::patient::{PatientChanges, PatientRow};
use super::errors::RepositoryError;
use super::in_memory::InMemoryPatientRepository;
use super::json_file::JsonFilePatientRepository;
use super::sqlite::SqlitePatientRepository;

/// Persistence gateway for patient records.
///
/// Every mutating call is atomic for its single row: either the whole
/// change is visible afterwards or none of it is. Implementations never
/// derive fields; callers hand over complete values.
#[async_trait]
pub trait PatientRepositoryTrait: Send + Sync {
    /// Store a new row. Fails with `DuplicateKey` if the patient id is taken.
    async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError>;

    /// Point lookup by patient id
    async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError>;

    /// Every stored row, in insertion order
    async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError>;

    /// Apply column changes to an existing row. Fails with `NotFound` if absent.
    async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError>;

    /// Remove a row. Fails with `NotFound` if absent.
    async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError>;

    /// Human-readable description of the backing store, used by health checks
    async fn describe(&self) -> Result<String, RepositoryError>;
}

#[async_trait]
impl<T: PatientRepositoryTrait + ?Sized> PatientRepositoryTrait for Arc<T> {
    async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError> {
        (**self).insert(row).await
    }

    async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError> {
        (**self).find_by_id(patient_id).await
    }

    async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError> {
        (**self).list_all().await
    }

    async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError> {
        (**self).update(patient_id, changes).await
    }

    async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError> {
        (**self).delete(patient_id).await
    }

    async fn describe(&self) -> Result<String, RepositoryError> {
        (**self).describe().await
    }
}

/// Build the repository selected by the configuration
pub fn create_repository(config: &DatabaseConfig) -> Result<Arc<dyn PatientRepositoryTrait>, RepositoryError> {
    let repository: Arc<dyn PatientRepositoryTrait> = match config.db_type {
        DatabaseType::Sqlite => {
            let pool = initialize_sqlite_pool(config)?;
            Arc::new(SqlitePatientRepository::new(pool))
        },
        DatabaseType::JsonFile => Arc::new(JsonFilePatientRepository::open(&config.json_path)?),
        DatabaseType::Memory => Arc::new(InMemoryPatientRepository::new()),
    };

    info!("Patient repository ready ({:?})", config.db_type);
    Ok(repository)
}

/// Test doubles and shared repository checks
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::io;

    /// Build a storage row with fixed measurements
    pub fn sample_row(patient_id: &str, name: &str, age: i32) -> PatientRow {
        PatientRow {
            patient_id: patient_id.to_string(),
            name: name.to_string(),
            city: "Pune".to_string(),
            age,
            gender: "Male".to_string(),
            height: 175.5,
            weight: 70.2,
            bmi: 22.79,
            verdict: "Normal weight".to_string(),
        }
    }

    /// Behaviour every backend must share
    pub async fn assert_repository_contract<R: PatientRepositoryTrait>(repo: &R) {
        assert!(repo.list_all().await.unwrap().is_empty(), "store should start empty");

        repo.insert(&sample_row("P003", "Chitra", 40)).await.unwrap();
        repo.insert(&sample_row("P001", "Arjun", 22)).await.unwrap();
        repo.insert(&sample_row("P002", "Bela", 31)).await.unwrap();

        // Duplicate insert fails and leaves the original untouched
        let mut duplicate = sample_row("P001", "Impostor", 99);
        duplicate.city = "Nowhere".to_string();
        let err = repo.insert(&duplicate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateKey(ref id) if id == "P001"), "got {err:?}");
        let original = repo.find_by_id("P001").await.unwrap().unwrap();
        assert_eq!(original.name, "Arjun");
        assert_eq!(original.city, "Pune");

        // Insertion order is preserved
        let ids: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|r| r.patient_id).collect();
        assert_eq!(ids, vec!["P003", "P001", "P002"]);

        // Partial update changes only supplied columns
        let changes = PatientChanges {
            weight: Some(90.0),
            bmi: Some(29.22),
            verdict: Some("Overweight".to_string()),
            ..PatientChanges::default()
        };
        repo.update("P002", &changes).await.unwrap();
        let updated = repo.find_by_id("P002").await.unwrap().unwrap();
        assert_eq!(updated.weight, 90.0);
        assert_eq!(updated.bmi, 29.22);
        assert_eq!(updated.verdict, "Overweight");
        assert_eq!(updated.height, 175.5);
        assert_eq!(updated.name, "Bela");

        let err = repo.update("P404", &changes).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)), "got {err:?}");

        // Delete
        repo.delete("P003").await.unwrap();
        assert!(repo.find_by_id("P003").await.unwrap().is_none());
        let err = repo.delete("P003").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)), "got {err:?}");
        assert_eq!(repo.list_all().await.unwrap().len(), 2);

        assert!(!repo.describe().await.unwrap().is_empty());
    }

    /// In-memory repository that can be told to fail every call
    #[derive(Debug, Default)]
    pub struct MockPatientRepository {
        inner: InMemoryPatientRepository,
        should_fail: bool,
    }

    impl MockPatientRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined rows
        pub fn with_rows(rows: Vec<PatientRow>) -> Self {
            Self {
                inner: InMemoryPatientRepository::with_rows(rows),
                should_fail: false,
            }
        }

        /// Configure the mock to fail every storage call
        pub fn with_failure(mut self) -> Self {
            self.should_fail = true;
            self
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.should_fail {
                Err(RepositoryError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "storage unavailable - mock is configured to fail",
                )))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl PatientRepositoryTrait for MockPatientRepository {
        async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError> {
            self.check()?;
            self.inner.insert(row).await
        }

        async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError> {
            self.check()?;
            self.inner.find_by_id(patient_id).await
        }

        async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError> {
            self.check()?;
            self.inner.list_all().await
        }

        async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError> {
            self.check()?;
            self.inner.update(patient_id, changes).await
        }

        async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError> {
            self.check()?;
            self.inner.delete(patient_id).await
        }

        async fn describe(&self) -> Result<String, RepositoryError> {
            self.check()?;
            Ok("Mock patient repository".to_string())
        }
    }

}
