use std::cmp::Ordering;
use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::entities::patient::PatientRecord;

/// Rejected sort arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("Invalid sort field '{field}'. Allowed fields: {allowed}")]
    InvalidField { field: String, allowed: String },

    #[error("Invalid sort order '{0}'. Use 'asc' or 'desc'")]
    InvalidDirection(String),
}

/// Record attributes that can be ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Storage row position, i.e. insertion order
    Id,
    PatientId,
    Name,
    City,
    Age,
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Id,
        SortField::PatientId,
        SortField::Name,
        SortField::City,
        SortField::Age,
        SortField::Height,
        SortField::Weight,
        SortField::Bmi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::PatientId => "patient_id",
            SortField::Name => "name",
            SortField::City => "city",
            SortField::Age => "age",
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }

    fn compare(&self, a: &PatientRecord, b: &PatientRecord) -> Ordering {
        match self {
            // position is not part of the record
            SortField::Id => Ordering::Equal,
            SortField::PatientId => a.patient_id.cmp(&b.patient_id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::City => a.city.cmp(&b.city),
            SortField::Age => a.age.cmp(&b.age),
            SortField::Height => a.height.total_cmp(&b.height),
            SortField::Weight => a.weight.total_cmp(&b.weight),
            SortField::Bmi => a.bmi.total_cmp(&b.bmi),
        }
    }
}

impl FromStr for SortField {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SortError::InvalidField {
                field: s.to_string(),
                allowed: join_fields(&SortField::ALL),
            })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(SortError::InvalidDirection(s.to_string())),
        }
    }
}

fn join_fields(fields: &[SortField]) -> String {
    fields.iter().map(SortField::as_str).collect::<Vec<_>>().join(", ")
}

/// Which fields callers may sort by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    allowed: Vec<SortField>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            allowed: vec![SortField::Age, SortField::Name],
        }
    }
}

impl SortConfig {
    /// Allow exactly these fields. An empty list falls back to the default.
    pub fn new(allowed: Vec<SortField>) -> Self {
        if allowed.is_empty() {
            return Self::default();
        }
        Self { allowed }
    }

    /// Read `SORTABLE_FIELDS` (comma-separated field names)
    pub fn from_env() -> Result<Self, SortError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SortError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup("SORTABLE_FIELDS") else {
            return Ok(Self::default());
        };

        let allowed = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<SortField>)
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self::new(allowed);
        info!("Sortable fields: {}", config.allowed_names());
        Ok(config)
    }

    pub fn allowed(&self) -> &[SortField] {
        &self.allowed
    }

    pub fn allowed_names(&self) -> String {
        join_fields(&self.allowed)
    }

    /// Resolve a caller-supplied field name against the allow-list
    pub fn resolve_field(&self, name: &str) -> Result<SortField, SortError> {
        let invalid = || SortError::InvalidField {
            field: name.to_string(),
            allowed: self.allowed_names(),
        };

        let field = name.parse::<SortField>().map_err(|_| invalid())?;
        if self.allowed.contains(&field) {
            Ok(field)
        } else {
            Err(invalid())
        }
    }
}

/// Stable in-place sort; equal keys keep their existing order in both directions.
///
/// `records` must arrive in storage order, which is what `SortField::Id` orders by.
pub fn sort_records(records: &mut [PatientRecord], field: SortField, direction: SortDirection) {
    if field == SortField::Id {
        if direction == SortDirection::Desc {
            records.reverse();
        }
        return;
    }

    records.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::{Gender, NewPatient};

    fn record(patient_id: &str, name: &str, age: i32, height: f64) -> PatientRecord {
        PatientRecord::new(NewPatient {
            patient_id: patient_id.to_string(),
            name: name.to_string(),
            city: "Delhi".to_string(),
            age,
            gender: Gender::Other,
            height,
            weight: 70.0,
        })
    }

    fn ids(records: &[PatientRecord]) -> Vec<&str> {
        records.iter().map(|r| r.patient_id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_age_both_directions() {
        let mut records = vec![
            record("P1", "Meera", 40, 160.0),
            record("P2", "Arun", 25, 170.0),
            record("P3", "Kiran", 33, 180.0),
        ];

        sort_records(&mut records, SortField::Age, SortDirection::Asc);
        assert_eq!(ids(&records), vec!["P2", "P3", "P1"]);

        sort_records(&mut records, SortField::Age, SortDirection::Desc);
        assert_eq!(ids(&records), vec!["P1", "P3", "P2"]);
    }

    #[test]
    fn test_ties_keep_storage_order() {
        let mut records = vec![
            record("P1", "Meera", 30, 160.0),
            record("P2", "Arun", 25, 170.0),
            record("P3", "Kiran", 30, 180.0),
        ];

        sort_records(&mut records, SortField::Age, SortDirection::Desc);
        assert_eq!(ids(&records), vec!["P1", "P3", "P2"]);
    }

    #[test]
    fn test_float_fields_sort_numerically() {
        let mut records = vec![
            record("P1", "A", 30, 99.5),
            record("P2", "B", 30, 180.0),
            record("P3", "C", 30, 150.25),
        ];

        sort_records(&mut records, SortField::Height, SortDirection::Asc);
        assert_eq!(ids(&records), vec!["P1", "P3", "P2"]);

        // Shorter patients have the higher BMI at equal weight
        sort_records(&mut records, SortField::Bmi, SortDirection::Desc);
        assert_eq!(ids(&records), vec!["P1", "P3", "P2"]);
    }

    #[test]
    fn test_sort_by_storage_position() {
        let mut records = vec![
            record("P9", "Meera", 40, 160.0),
            record("P1", "Arun", 25, 170.0),
            record("P5", "Kiran", 33, 180.0),
        ];

        sort_records(&mut records, SortField::Id, SortDirection::Asc);
        assert_eq!(ids(&records), vec!["P9", "P1", "P5"]);

        sort_records(&mut records, SortField::Id, SortDirection::Desc);
        assert_eq!(ids(&records), vec!["P5", "P1", "P9"]);

        assert_eq!("id".parse::<SortField>().unwrap(), SortField::Id);
    }

    #[test]
    fn test_default_allow_list() {
        let config = SortConfig::default();
        assert_eq!(config.resolve_field("age").unwrap(), SortField::Age);
        assert_eq!(config.resolve_field("name").unwrap(), SortField::Name);
        assert!(matches!(
            config.resolve_field("height"),
            Err(SortError::InvalidField { .. })
        ));
        assert!(config.resolve_field("shoe_size").is_err());
        assert!(config.resolve_field("id").is_err());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(
            "sideways".parse::<SortDirection>(),
            Err(SortError::InvalidDirection("sideways".to_string()))
        );
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SortConfig::from_lookup(|name| {
            (name == "SORTABLE_FIELDS").then(|| "bmi, height,patient_id".to_string())
        })
        .unwrap();
        assert_eq!(config.allowed(), &[SortField::Bmi, SortField::Height, SortField::PatientId]);
        assert!(config.resolve_field("age").is_err());

        let config = SortConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, SortConfig::default());

        assert!(SortConfig::from_lookup(|_| Some("age,colour".to_string())).is_err());
    }
}
