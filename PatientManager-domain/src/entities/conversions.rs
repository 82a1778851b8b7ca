use patient_manager_data::models::{PatientChanges, PatientRow};

use crate::entities::patient::{BodyMetrics, ParseEnumError, PatientRecord, PatientUpdate};

// Conversion functions between domain entities and storage rows,
// named convert_to_[target_layer]_[model_name]

/// Convert a stored row to a domain record.
///
/// Fails if the stored gender or verdict text is not a known variant.
pub fn convert_to_domain_record(row: PatientRow) -> Result<PatientRecord, ParseEnumError> {
    Ok(PatientRecord {
        gender: row.gender.parse()?,
        verdict: row.verdict.parse()?,
        patient_id: row.patient_id,
        name: row.name,
        city: row.city,
        age: row.age,
        height: row.height,
        weight: row.weight,
        bmi: row.bmi,
    })
}

/// Convert a domain record to a full storage row
pub fn convert_to_data_row(record: &PatientRecord) -> PatientRow {
    PatientRow {
        patient_id: record.patient_id.clone(),
        name: record.name.clone(),
        city: record.city.clone(),
        age: record.age,
        gender: record.gender.as_str().to_string(),
        height: record.height,
        weight: record.weight,
        bmi: record.bmi,
        verdict: record.verdict.as_str().to_string(),
    }
}

/// Column changes for a partial update: the supplied fields plus both derived values
pub fn convert_to_data_changes(update: &PatientUpdate, metrics: &BodyMetrics) -> PatientChanges {
    PatientChanges {
        name: update.name.clone(),
        city: update.city.clone(),
        age: update.age,
        gender: update.gender.map(|g| g.as_str().to_string()),
        height: update.height,
        weight: update.weight,
        bmi: Some(metrics.bmi),
        verdict: Some(metrics.verdict.as_str().to_string()),
    }
}
