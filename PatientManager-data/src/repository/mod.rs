// Repository module structure
pub mod errors;
mod in_memory;
mod json_file;
mod patient;
mod sqlite;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryPatientRepository;
pub use json_file::JsonFilePatientRepository;
pub use patient::{create_repository, PatientRepositoryTrait};
pub use sqlite::SqlitePatientRepository;

// Re-export test doubles for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use patient::tests;
