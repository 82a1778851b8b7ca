use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use patient_manager_domain::entities::PatientRecord;

/// Public representation of a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    /// Unique identifier, e.g. "P001"
    pub patient_id: String,

    pub name: String,

    pub city: String,

    /// Age in years
    pub age: i32,

    /// Male, Female or Other
    pub gender: String,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Body mass index, two decimals
    pub bmi: f64,

    /// Underweight, Normal weight, Overweight or Obese
    pub verdict: String,
}

impl From<PatientRecord> for Patient {
    fn from(record: PatientRecord) -> Self {
        Self {
            gender: record.gender.to_string(),
            verdict: record.verdict.to_string(),
            patient_id: record.patient_id,
            name: record.name,
            city: record.city,
            age: record.age,
            height: record.height,
            weight: record.weight,
            bmi: record.bmi,
        }
    }
}

/// Single patient body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientEnvelope {
    pub patient: Patient,
}

/// Patient collection body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientListResponse {
    pub patients: Vec<Patient>,
}

impl From<Vec<PatientRecord>> for PatientListResponse {
    fn from(records: Vec<PatientRecord>) -> Self {
        Self {
            patients: records.into_iter().map(Patient::from).collect(),
        }
    }
}

/// Body returned after a create or update
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientMutationResponse {
    pub message: String,
    pub patient: Patient,
}

/// Query parameters for `/sort-patients`
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SortQueryParams {
    /// Field to sort by (default: age)
    pub sort_by: Option<String>,

    /// Sort direction, asc or desc (default: asc)
    pub order: Option<String>,
}
