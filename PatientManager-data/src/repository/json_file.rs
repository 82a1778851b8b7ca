use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::patient::{PatientChanges, PatientRow};
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;

/// On-disk layout: `{"patients": {"<patient_id>": {...}}}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct PatientDocument {
    #[serde(default)]
    patients: IndexMap<String, PatientRow>,
}

/// Patient storage in a single JSON document.
///
/// Every call reads the document, applies its change and writes the whole
/// document back through a temporary file and a rename, so readers never
/// observe a half-written file. The mutex serializes access within this
/// process only.
#[derive(Debug)]
pub struct JsonFilePatientRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePatientRepository {
    /// Open (or prepare) the document at `path`.
    ///
    /// An existing document is parsed once up front so a corrupt file is
    /// reported at startup rather than on the first request.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        info!("Opening JSON patient document at: {}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let repository = Self {
            path,
            lock: Mutex::new(()),
        };
        let document = repository.load()?;
        debug!("JSON document holds {} patients", document.patients.len());

        Ok(repository)
    }

    fn load(&self) -> Result<PatientDocument, RepositoryError> {
        load_document(&self.path)
    }

    fn save(&self, document: &PatientDocument) -> Result<(), RepositoryError> {
        let tmp_path = temp_path_for(&self.path);
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn load_document(path: &Path) -> Result<PatientDocument, RepositoryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PatientDocument::default()),
        Err(e) => return Err(e.into()),
    };

    if file.metadata()?.len() == 0 {
        return Ok(PatientDocument::default());
    }

    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "patients.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl PatientRepositoryTrait for JsonFilePatientRepository {
    async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock()?;
        let mut document = self.load()?;
        if document.patients.contains_key(&row.patient_id) {
            return Err(RepositoryError::DuplicateKey(row.patient_id.clone()));
        }
        document.patients.insert(row.patient_id.clone(), row.clone());
        self.save(&document)
    }

    async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError> {
        let _guard = self.lock.lock()?;
        let mut document = self.load()?;
        Ok(document.patients.shift_remove(patient_id))
    }

    async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError> {
        let _guard = self.lock.lock()?;
        let document = self.load()?;
        Ok(document.patients.into_values().collect())
    }

    async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock()?;
        let mut document = self.load()?;
        let row = document
            .patients
            .get_mut(patient_id)
            .ok_or_else(|| RepositoryError::NotFound(patient_id.to_string()))?;
        changes.apply_to(row);
        self.save(&document)
    }

    async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock()?;
        let mut document = self.load()?;
        if document.patients.shift_remove(patient_id).is_none() {
            return Err(RepositoryError::NotFound(patient_id.to_string()));
        }
        self.save(&document)
    }

    async fn describe(&self) -> Result<String, RepositoryError> {
        let _guard = self.lock.lock()?;
        let document = self.load()?;
        Ok(format!(
            "JSON document at {} ({} records)",
            self.path.display(),
            document.patients.len()
        ))
    }
}
