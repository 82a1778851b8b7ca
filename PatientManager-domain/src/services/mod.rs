// Domain services
// Business rules for patient records: derivation, validation, ordering and orchestration.

pub mod metrics;
pub mod patient;
pub mod sort;
pub mod validation;

// Re-export service traits and commonly used types
pub use metrics::derive_body_metrics;
pub use patient::{PatientService, PatientServiceError, PatientServiceTrait};
pub use sort::{SortConfig, SortDirection, SortError, SortField};
pub use validation::ValidationError;

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use crate::testing::create_mock_patient_service;
