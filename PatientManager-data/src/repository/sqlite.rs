use async_trait::async_trait;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use crate::database::{get_connection_info, SqlitePool};
use crate::models::patient::{PatientChanges, PatientRow};
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;

const SELECT_COLUMNS: &str =
    "SELECT patient_id, name, city, age, gender, height, weight, bmi, verdict FROM patients";

/// SQLite-backed patient storage
#[derive(Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
}

impl SqlitePatientRepository {
    /// Wrap an initialized pool. The schema must already be in place.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        height: row.get(5)?,
        weight: row.get(6)?,
        bmi: row.get(7)?,
        verdict: row.get(8)?,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl PatientRepositoryTrait for SqlitePatientRepository {
    async fn insert(&self, row: &PatientRow) -> Result<(), RepositoryError> {
        debug!("Inserting patient into SQLite: {}", row.patient_id);

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let result = tx.execute(
            "INSERT INTO patients
             (patient_id, name, city, age, gender, height, weight, bmi, verdict)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.patient_id,
                row.name,
                row.city,
                row.age,
                row.gender,
                row.height,
                row.weight,
                row.bmi,
                row.verdict,
            ],
        );

        match result {
            Ok(_) => {
                tx.commit()?;
                Ok(())
            },
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::DuplicateKey(row.patient_id.clone())),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    async fn find_by_id(&self, patient_id: &str) -> Result<Option<PatientRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                &format!("{} WHERE patient_id = ?1", SELECT_COLUMNS),
                params![patient_id],
                map_patient_row,
            )
            .optional()?;
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<PatientRow>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], map_patient_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn update(&self, patient_id: &str, changes: &PatientChanges) -> Result<(), RepositoryError> {
        debug!("Updating patient in SQLite: {}", patient_id);

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        // COALESCE keeps the stored value wherever no change was supplied
        let affected = tx.execute(
            "UPDATE patients SET
                name = COALESCE(?2, name),
                city = COALESCE(?3, city),
                age = COALESCE(?4, age),
                gender = COALESCE(?5, gender),
                height = COALESCE(?6, height),
                weight = COALESCE(?7, weight),
                bmi = COALESCE(?8, bmi),
                verdict = COALESCE(?9, verdict)
             WHERE patient_id = ?1",
            params![
                patient_id,
                changes.name,
                changes.city,
                changes.age,
                changes.gender,
                changes.height,
                changes.weight,
                changes.bmi,
                changes.verdict,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound(patient_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    async fn delete(&self, patient_id: &str) -> Result<(), RepositoryError> {
        debug!("Deleting patient from SQLite: {}", patient_id);

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let affected = tx.execute("DELETE FROM patients WHERE patient_id = ?1", params![patient_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(patient_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    async fn describe(&self) -> Result<String, RepositoryError> {
        Ok(get_connection_info(&self.pool)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_in_memory_sqlite_pool, initialize_sqlite_pool, DatabaseConfig};
    use crate::repository::patient::tests::{assert_repository_contract, sample_row};

    #[tokio::test]
    async fn test_sqlite_contract() {
        let pool = initialize_in_memory_sqlite_pool().unwrap();
        let repo = SqlitePatientRepository::new(pool);
        assert_repository_contract(&repo).await;
    }

    #[tokio::test]
    async fn test_rows_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            sqlite_path: dir.path().join("patients.db"),
            ..DatabaseConfig::default()
        };

        {
            let repo = SqlitePatientRepository::new(initialize_sqlite_pool(&config).unwrap());
            repo.insert(&sample_row("P001", "Arjun", 22)).await.unwrap();
        }

        let reopened = SqlitePatientRepository::new(initialize_sqlite_pool(&config).unwrap());
        let row = reopened.find_by_id("P001").await.unwrap().unwrap();
        assert_eq!(row, sample_row("P001", "Arjun", 22));
    }

    #[test]
    fn test_unique_violation_detection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');").unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
