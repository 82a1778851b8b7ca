use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::services::metrics::derive_body_metrics;

/// Text that does not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Patient gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(ParseEnumError {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BMI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Verdict {
    /// BMI below 18.5
    Underweight,

    /// BMI from 18.5 up to 25
    #[serde(rename = "Normal weight")]
    NormalWeight,

    /// BMI from 25 up to 30
    Overweight,

    /// BMI of 30 and above
    Obese,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::NormalWeight => "Normal weight",
            Verdict::Overweight => "Overweight",
            Verdict::Obese => "Obese",
        }
    }
}

impl FromStr for Verdict {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Underweight" => Ok(Verdict::Underweight),
            "Normal weight" => Ok(Verdict::NormalWeight),
            "Overweight" => Ok(Verdict::Overweight),
            "Obese" => Ok(Verdict::Obese),
            _ => Err(ParseEnumError {
                kind: "verdict",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values computed from height and weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub verdict: Verdict,
}

/// A patient as exposed by the domain.
///
/// `bmi` and `verdict` are only ever produced by [`derive_body_metrics`],
/// through [`PatientRecord::new`] or [`PatientRecord::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PatientRecord {
    /// External identifier, immutable after creation
    pub patient_id: String,

    /// Full name
    pub name: String,

    /// City of residence
    pub city: String,

    /// Age in years
    pub age: i32,

    pub gender: Gender,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Body mass index, rounded to two decimals
    pub bmi: f64,

    pub verdict: Verdict,
}

impl PatientRecord {
    /// Build a record from validated input, deriving bmi and verdict
    pub fn new(patient: NewPatient) -> Self {
        let metrics = derive_body_metrics(patient.height, patient.weight);
        Self {
            patient_id: patient.patient_id,
            name: patient.name,
            city: patient.city,
            age: patient.age,
            gender: patient.gender,
            height: patient.height,
            weight: patient.weight,
            bmi: metrics.bmi,
            verdict: metrics.verdict,
        }
    }

    /// Merge a partial update and recompute the derived fields
    pub fn apply(&mut self, update: &PatientUpdate) -> BodyMetrics {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(city) = &update.city {
            self.city = city.clone();
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }

        let metrics = derive_body_metrics(self.height, self.weight);
        self.bmi = metrics.bmi;
        self.verdict = metrics.verdict;
        metrics
    }
}

/// Fully validated input for a new patient
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub patient_id: String,
    pub name: String,
    pub city: String,
    pub age: i32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
}

/// Validated partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

/// Request payload for creating a patient
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatePatientRequest {
    /// Unique identifier, e.g. "P001"
    #[validate(length(min = 1))]
    pub patient_id: Option<String>,

    /// Full name
    #[validate(length(min = 1))]
    pub name: Option<String>,

    /// City of residence
    #[validate(length(min = 1))]
    pub city: Option<String>,

    /// Age in years
    pub age: Option<i32>,

    /// One of Male, Female, Other
    pub gender: Option<String>,

    /// Height in centimeters, greater than 0
    pub height: Option<f64>,

    /// Weight in kilograms, greater than 0
    pub weight: Option<f64>,
}

/// Request payload for a partial update. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdatePatientRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub city: Option<String>,

    pub age: Option<i32>,

    /// One of Male, Female, Other
    pub gender: Option<String>,

    /// Height in centimeters, greater than 0
    pub height: Option<f64>,

    /// Weight in kilograms, greater than 0
    pub weight: Option<f64>,
}
