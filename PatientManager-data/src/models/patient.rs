use serde::{Deserialize, Serialize};

/// Storage model for a patient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRow {
    /// External identifier, unique across the store
    pub patient_id: String,

    /// Full name
    pub name: String,

    /// City of residence
    pub city: String,

    /// Age in years
    pub age: i32,

    /// Gender as stored text (Male, Female, Other)
    pub gender: String,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Body mass index stored alongside the measurements
    pub bmi: f64,

    /// Verdict derived from the stored BMI
    pub verdict: String,
}

/// Column changes for an existing row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub verdict: Option<String>,
}

impl PatientChanges {
    /// Apply the supplied columns to a row in place
    pub fn apply_to(&self, row: &mut PatientRow) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(city) = &self.city {
            row.city = city.clone();
        }
        if let Some(age) = self.age {
            row.age = age;
        }
        if let Some(gender) = &self.gender {
            row.gender = gender.clone();
        }
        if let Some(height) = self.height {
            row.height = height;
        }
        if let Some(weight) = self.weight {
            row.weight = weight;
        }
        if let Some(bmi) = self.bmi {
            row.bmi = bmi;
        }
        if let Some(verdict) = &self.verdict {
            row.verdict = verdict.clone();
        }
    }
}
