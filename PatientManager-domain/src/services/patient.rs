use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::entities::conversions;
use crate::entities::patient::{CreatePatientRequest, PatientRecord, UpdatePatientRequest};
use crate::services::sort::{sort_records, SortConfig, SortDirection, SortError};
use crate::services::validation::{check_measurements, validate_create, validate_update, ValidationError};
use patient_manager_data::repository::{PatientRepositoryTrait, RepositoryError};

/// Patient service errors
#[derive(Debug, Error)]
pub enum PatientServiceError {
    /// Caller input failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A patient with this id already exists
    #[error("Patient already exists: {0}")]
    DuplicateKey(String),

    /// Not found error
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// Malformed sort parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<SortError> for PatientServiceError {
    fn from(err: SortError) -> Self {
        PatientServiceError::InvalidArgument(err.to_string())
    }
}

/// Trait for patient service operations
#[async_trait]
pub trait PatientServiceTrait: Send + Sync {
    /// Validate, derive and store a new patient
    async fn create_patient(&self, request: CreatePatientRequest) -> Result<PatientRecord, PatientServiceError>;

    /// Get a patient by id
    async fn get_patient(&self, patient_id: &str) -> Result<PatientRecord, PatientServiceError>;

    /// Get every patient in storage order
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, PatientServiceError>;

    /// Apply a partial update and return the refreshed record
    async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
    ) -> Result<PatientRecord, PatientServiceError>;

    /// Delete a patient by id
    async fn delete_patient(&self, patient_id: &str) -> Result<(), PatientServiceError>;

    /// All patients ordered by `sort_by` in direction `order` ("asc" or "desc")
    async fn sort_patients(&self, sort_by: &str, order: &str) -> Result<Vec<PatientRecord>, PatientServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
    sort_config: SortConfig,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    /// Create a new patient service with the default sort allow-list
    pub fn new(repository: R) -> Self {
        Self::with_sort_config(repository, SortConfig::default())
    }

    pub fn with_sort_config(repository: R, sort_config: SortConfig) -> Self {
        Self {
            repository,
            sort_config,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> PatientServiceError {
        match err {
            RepositoryError::NotFound(id) => PatientServiceError::NotFound(id),
            RepositoryError::DuplicateKey(id) => PatientServiceError::DuplicateKey(id),
            _ => {
                error!("Patient storage failure: {}", err);
                PatientServiceError::Repository(err.to_string())
            },
        }
    }

    async fn load(&self, patient_id: &str) -> Result<PatientRecord, PatientServiceError> {
        let row = self
            .repository
            .find_by_id(patient_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| PatientServiceError::NotFound(patient_id.to_string()))?;

        conversions::convert_to_domain_record(row).map_err(|e| {
            error!("Stored patient {} is unreadable: {}", patient_id, e);
            PatientServiceError::Repository(e.to_string())
        })
    }

    async fn load_all(&self) -> Result<Vec<PatientRecord>, PatientServiceError> {
        let rows = self
            .repository
            .list_all()
            .await
            .map_err(|e| self.map_repo_error(e))?;

        rows.into_iter()
            .map(|row| {
                conversions::convert_to_domain_record(row)
                    .map_err(|e| PatientServiceError::Repository(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait> PatientServiceTrait for PatientService<R> {
    async fn create_patient(&self, request: CreatePatientRequest) -> Result<PatientRecord, PatientServiceError> {
        let new_patient = validate_create(request)?;
        let record = PatientRecord::new(new_patient);

        self.repository
            .insert(&conversions::convert_to_data_row(&record))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Created patient {} (bmi {}, {})", record.patient_id, record.bmi, record.verdict);
        Ok(record)
    }

    async fn get_patient(&self, patient_id: &str) -> Result<PatientRecord, PatientServiceError> {
        self.load(patient_id).await
    }

    async fn list_patients(&self) -> Result<Vec<PatientRecord>, PatientServiceError> {
        self.load_all().await
    }

    async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
    ) -> Result<PatientRecord, PatientServiceError> {
        let mut record = self.load(patient_id).await?;
        let update = validate_update(request)?;
        check_measurements(
            update.height.unwrap_or(record.height),
            update.weight.unwrap_or(record.weight),
        )?;
        let metrics = record.apply(&update);

        let changes = conversions::convert_to_data_changes(&update, &metrics);
        self.repository
            .update(patient_id, &changes)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let refreshed = self.load(patient_id).await?;
        info!("Updated patient {} (bmi {}, {})", patient_id, refreshed.bmi, refreshed.verdict);
        Ok(refreshed)
    }

    async fn delete_patient(&self, patient_id: &str) -> Result<(), PatientServiceError> {
        self.load(patient_id).await?;
        self.repository
            .delete(patient_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Deleted patient {}", patient_id);
        Ok(())
    }

    async fn sort_patients(&self, sort_by: &str, order: &str) -> Result<Vec<PatientRecord>, PatientServiceError> {
        let field = self.sort_config.resolve_field(sort_by)?;
        let direction: SortDirection = order.parse()?;

        let mut records = self.load_all().await?;
        sort_records(&mut records, field, direction);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::Verdict;
    use crate::services::sort::SortField;
    use patient_manager_data::repository::tests::MockPatientRepository;
    use patient_manager_data::repository::{InMemoryPatientRepository, JsonFilePatientRepository};

    fn create_request(patient_id: &str, name: &str, age: i32, height: f64, weight: f64) -> CreatePatientRequest {
        CreatePatientRequest {
            patient_id: Some(patient_id.to_string()),
            name: Some(name.to_string()),
            city: Some("Mumbai".to_string()),
            age: Some(age),
            gender: Some("Male".to_string()),
            height: Some(height),
            weight: Some(weight),
        }
    }

    fn service() -> PatientService<InMemoryPatientRepository> {
        PatientService::new(InMemoryPatientRepository::new())
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let service = service();
        let created = service
            .create_patient(create_request("P001", "Arjun", 30, 175.5, 70.2))
            .await
            .unwrap();

        assert_eq!(created.bmi, 22.79);
        assert_eq!(created.verdict, Verdict::NormalWeight);
        assert_eq!(service.get_patient("P001").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_original() {
        let service = service();
        service
            .create_patient(create_request("P001", "Arjun", 30, 175.5, 70.2))
            .await
            .unwrap();

        let err = service
            .create_patient(create_request("P001", "Someone Else", 50, 160.0, 45.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PatientServiceError::DuplicateKey(ref id) if id == "P001"));
        assert_eq!(service.get_patient("P001").await.unwrap().name, "Arjun");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_without_storing() {
        let service = service();
        let mut request = create_request("P001", "Arjun", 30, 175.5, 70.2);
        request.height = Some(0.0);

        let err = service.create_patient(request).await.unwrap_err();
        assert!(matches!(
            err,
            PatientServiceError::Validation(ValidationError::InvalidRange { field: "height", .. })
        ));
        assert!(service.list_patients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_recomputes_derived_fields() {
        let service = service();
        service
            .create_patient(create_request("P002", "Bela", 41, 160.0, 45.0))
            .await
            .unwrap();

        let updated = service
            .update_patient(
                "P002",
                UpdatePatientRequest {
                    weight: Some(80.0),
                    ..UpdatePatientRequest::default()
                },
            )
            .await
            .unwrap();

        // 80 / 1.6^2 = 31.25
        assert_eq!(updated.bmi, 31.25);
        assert_eq!(updated.verdict, Verdict::Obese);
        assert_eq!(updated.height, 160.0);
        assert_eq!(updated.name, "Bela");
        assert_eq!(service.get_patient("P002").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_without_measurements_keeps_metrics_consistent() {
        let service = service();
        let created = service
            .create_patient(create_request("P003", "Chitra", 29, 170.0, 90.0))
            .await
            .unwrap();

        let updated = service
            .update_patient(
                "P003",
                UpdatePatientRequest {
                    city: Some("Chennai".to_string()),
                    ..UpdatePatientRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.city, "Chennai");
        assert_eq!(updated.bmi, created.bmi);
        assert_eq!(updated.verdict, created.verdict);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let service = service();
        let err = service
            .update_patient("P404", UpdatePatientRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PatientServiceError::NotFound(_)));

        service
            .create_patient(create_request("P001", "Arjun", 30, 175.5, 70.2))
            .await
            .unwrap();
        let err = service
            .update_patient(
                "P001",
                UpdatePatientRequest {
                    gender: Some("Robot".to_string()),
                    ..UpdatePatientRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PatientServiceError::Validation(ValidationError::InvalidEnum { .. })));
        assert_eq!(service.get_patient("P001").await.unwrap().gender.as_str(), "Male");
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        service
            .create_patient(create_request("P001", "Arjun", 30, 175.5, 70.2))
            .await
            .unwrap();

        service.delete_patient("P001").await.unwrap();
        assert!(matches!(
            service.get_patient("P001").await,
            Err(PatientServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_patient("P001").await,
            Err(PatientServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sort_patients() {
        let service = service();
        service.create_patient(create_request("P1", "Meera", 40, 170.0, 70.0)).await.unwrap();
        service.create_patient(create_request("P2", "Arun", 25, 170.0, 70.0)).await.unwrap();
        service.create_patient(create_request("P3", "Kiran", 33, 170.0, 70.0)).await.unwrap();

        let by_age: Vec<String> = service
            .sort_patients("age", "desc")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.patient_id)
            .collect();
        assert_eq!(by_age, vec!["P1", "P3", "P2"]);

        let by_name: Vec<String> = service
            .sort_patients("name", "asc")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(by_name, vec!["Arun", "Kiran", "Meera"]);

        assert!(matches!(
            service.sort_patients("age", "up").await,
            Err(PatientServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.sort_patients("bmi", "asc").await,
            Err(PatientServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_sort_honours_configured_fields() {
        let service = PatientService::with_sort_config(
            InMemoryPatientRepository::new(),
            SortConfig::new(vec![SortField::Bmi]),
        );
        service.create_patient(create_request("P1", "Meera", 40, 170.0, 90.0)).await.unwrap();
        service.create_patient(create_request("P2", "Arun", 25, 170.0, 50.0)).await.unwrap();

        let sorted = service.sort_patients("bmi", "asc").await.unwrap();
        assert_eq!(sorted[0].patient_id, "P2");
        assert!(service.sort_patients("age", "asc").await.is_err());
    }

    #[tokio::test]
    async fn test_overflowing_measurements_never_reach_the_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonFilePatientRepository::open(dir.path().join("patients.json")).unwrap();
        let service = PatientService::new(repository);
        service
            .create_patient(create_request("P001", "Arjun", 30, 175.5, 70.2))
            .await
            .unwrap();

        let err = service
            .create_patient(create_request("P002", "Bela", 41, 1e-200, 45.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatientServiceError::Validation(ValidationError::UnrepresentableBmi { .. })
        ));

        let err = service
            .update_patient(
                "P001",
                UpdatePatientRequest {
                    height: Some(1e-200),
                    ..UpdatePatientRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PatientServiceError::Validation(ValidationError::UnrepresentableBmi { .. })
        ));

        let patients = service.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].height, 175.5);
        assert_eq!(patients[0].bmi, 22.79);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let service = PatientService::new(MockPatientRepository::new().with_failure());
        assert!(matches!(
            service.list_patients().await,
            Err(PatientServiceError::Repository(_))
        ));
    }
}
