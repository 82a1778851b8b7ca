pub mod health;
pub mod patient;
pub mod root;

// Re-export handlers for easier imports
pub use health::health_check;
pub use patient::{
    create_patient, delete_patient, get_patient, list_patients, sort_patients, update_patient,
    PatientServiceHandle,
};
pub use root::{about, root};
