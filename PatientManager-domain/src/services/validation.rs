use std::collections::HashSet;

use thiserror::Error;
use validator::Validate;

use crate::entities::patient::{
    CreatePatientRequest, Gender, NewPatient, PatientUpdate, UpdatePatientRequest,
};
use crate::services::metrics::calculate_bmi;

/// First problem found in a patient payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("Invalid value for {field}: '{value}' (expected one of Male, Female, Other)")]
    InvalidEnum { field: &'static str, value: String },

    #[error("{field} must be greater than 0, got {value}")]
    InvalidRange { field: &'static str, value: f64 },

    #[error("height {height} and weight {weight} do not give a finite BMI")]
    UnrepresentableBmi { height: f64, weight: f64 },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) | ValidationError::EmptyField(field) => field,
            ValidationError::InvalidEnum { field, .. } | ValidationError::InvalidRange { field, .. } => field,
            ValidationError::UnrepresentableBmi { .. } => "bmi",
        }
    }
}

/// Fields rejected by the derived length rules
fn empty_fields<T: Validate>(payload: &T) -> HashSet<&'static str> {
    match payload.validate() {
        Ok(()) => HashSet::new(),
        Err(errors) => errors.field_errors().into_keys().collect(),
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

fn check_text(
    value: Option<String>,
    field: &'static str,
    empty: &HashSet<&'static str>,
) -> Result<Option<String>, ValidationError> {
    if value.is_some() && empty.contains(field) {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(value)
}

fn check_gender(value: Option<String>) -> Result<Option<Gender>, ValidationError> {
    value
        .map(|raw| {
            raw.parse::<Gender>().map_err(|e| ValidationError::InvalidEnum {
                field: "gender",
                value: e.value,
            })
        })
        .transpose()
}

fn check_positive(value: Option<f64>, field: &'static str) -> Result<Option<f64>, ValidationError> {
    match value {
        // NaN fails the comparison too
        Some(v) if !(v > 0.0) => Err(ValidationError::InvalidRange { field, value: v }),
        other => Ok(other),
    }
}

/// Validate a create payload. Every field is required.
pub fn validate_create(request: CreatePatientRequest) -> Result<NewPatient, ValidationError> {
    let empty = empty_fields(&request);

    let patient_id = required(check_text(request.patient_id, "patient_id", &empty)?, "patient_id")?;
    let name = required(check_text(request.name, "name", &empty)?, "name")?;
    let city = required(check_text(request.city, "city", &empty)?, "city")?;
    let age = required(request.age, "age")?;
    let gender = required(check_gender(request.gender)?, "gender")?;
    let height = required(check_positive(request.height, "height")?, "height")?;
    let weight = required(check_positive(request.weight, "weight")?, "weight")?;
    check_measurements(height, weight)?;

    Ok(NewPatient {
        patient_id,
        name,
        city,
        age,
        gender,
        height,
        weight,
    })
}

/// Positive measurements can still overflow the BMI (e.g. a height of 1e-200 cm).
/// Run this on the final height and weight before anything is stored.
pub fn check_measurements(height: f64, weight: f64) -> Result<(), ValidationError> {
    if calculate_bmi(height, weight).is_finite() {
        Ok(())
    } else {
        Err(ValidationError::UnrepresentableBmi { height, weight })
    }
}

/// Validate a partial update. Only supplied fields are checked.
pub fn validate_update(request: UpdatePatientRequest) -> Result<PatientUpdate, ValidationError> {
    let empty = empty_fields(&request);

    Ok(PatientUpdate {
        name: check_text(request.name, "name", &empty)?,
        city: check_text(request.city, "city", &empty)?,
        age: request.age,
        gender: check_gender(request.gender)?,
        height: check_positive(request.height, "height")?,
        weight: check_positive(request.weight, "weight")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreatePatientRequest {
        CreatePatientRequest {
            patient_id: Some("P001".to_string()),
            name: Some("Ananya Verma".to_string()),
            city: Some("Guwahati".to_string()),
            age: Some(28),
            gender: Some("Female".to_string()),
            height: Some(165.0),
            weight: Some(90.0),
        }
    }

    #[test]
    fn test_valid_create_request() {
        let patient = validate_create(valid_request()).unwrap();
        assert_eq!(patient.patient_id, "P001");
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.height, 165.0);
    }

    #[test]
    fn test_missing_field() {
        let request = CreatePatientRequest {
            city: None,
            ..valid_request()
        };
        assert_eq!(validate_create(request), Err(ValidationError::MissingField("city")));
    }

    #[test]
    fn test_empty_text_field() {
        let request = CreatePatientRequest {
            name: Some(String::new()),
            ..valid_request()
        };
        assert_eq!(validate_create(request), Err(ValidationError::EmptyField("name")));
    }

    #[test]
    fn test_invalid_gender() {
        let request = CreatePatientRequest {
            gender: Some("Unknown".to_string()),
            ..valid_request()
        };
        let err = validate_create(request).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEnum {
                field: "gender",
                value: "Unknown".to_string()
            }
        );
        assert_eq!(err.field(), "gender");
    }

    #[test]
    fn test_non_positive_measurements() {
        let request = CreatePatientRequest {
            height: Some(0.0),
            ..valid_request()
        };
        assert!(matches!(
            validate_create(request),
            Err(ValidationError::InvalidRange { field: "height", .. })
        ));

        let request = CreatePatientRequest {
            weight: Some(-3.5),
            ..valid_request()
        };
        assert!(matches!(
            validate_create(request),
            Err(ValidationError::InvalidRange { field: "weight", .. })
        ));
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let request = CreatePatientRequest {
            name: None,
            gender: Some("robot".to_string()),
            weight: Some(0.0),
            ..valid_request()
        };
        assert_eq!(validate_create(request), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_age_is_not_range_checked() {
        let request = CreatePatientRequest {
            age: Some(-1),
            ..valid_request()
        };
        assert_eq!(validate_create(request).unwrap().age, -1);
    }

    #[test]
    fn test_measurements_must_give_a_finite_bmi() {
        let request = CreatePatientRequest {
            height: Some(1e-200),
            ..valid_request()
        };
        let err = validate_create(request).unwrap_err();
        assert!(matches!(err, ValidationError::UnrepresentableBmi { .. }));
        assert_eq!(err.field(), "bmi");

        let request = CreatePatientRequest {
            weight: Some(1e308),
            ..valid_request()
        };
        assert!(matches!(
            validate_create(request),
            Err(ValidationError::UnrepresentableBmi { .. })
        ));

        assert_eq!(check_measurements(165.0, 90.0), Ok(()));
    }

    #[test]
    fn test_update_checks_only_supplied_fields() {
        let update = validate_update(UpdatePatientRequest {
            weight: Some(60.0),
            ..UpdatePatientRequest::default()
        })
        .unwrap();
        assert_eq!(update.weight, Some(60.0));
        assert_eq!(update.height, None);

        let empty = validate_update(UpdatePatientRequest::default()).unwrap();
        assert_eq!(empty, PatientUpdate::default());
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let err = validate_update(UpdatePatientRequest {
            city: Some(String::new()),
            height: Some(-1.0),
            ..UpdatePatientRequest::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("city"));

        let err = validate_update(UpdatePatientRequest {
            gender: Some("female".to_string()),
            ..UpdatePatientRequest::default()
        })
        .unwrap_err();
        assert_eq!(err.field(), "gender");
    }
}
