// Storage models
pub mod patient;

pub use patient::{PatientChanges, PatientRow};
