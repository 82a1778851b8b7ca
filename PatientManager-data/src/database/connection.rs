//! Database connection module for the Patient Manager service
//!
//! Storage backends:
//! - SQLite (default), pooled through r2d2
//! - JSON document file
//! - In-memory (volatile, used for tests and demos)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Shared SQLite connection pool
pub type SqlitePool = Arc<r2d2::Pool<SqliteConnectionManager>>;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
    /// Single JSON document on disk
    JsonFile,
    /// Process memory, lost on restart
    Memory,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "json" | "json_file" => Ok(DatabaseType::JsonFile),
            "memory" | "in_memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Storage backend (sqlite, json, memory)
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: PathBuf,
    /// Path to the JSON document
    pub json_path: PathBuf,
    /// Maximum number of pooled SQLite connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: PathBuf::from("./data/patients.db"),
            json_path: PathBuf::from("./data/patients.json"),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to [`DatabaseConfig::default`]; set but
    /// unparsable numeric values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_type = match lookup("DB_TYPE") {
            Some(value) => value.parse::<DatabaseType>()?,
            None => defaults.db_type,
        };

        let sqlite_path = lookup("DB_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.sqlite_path);

        let json_path = lookup("DB_JSON_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.json_path);

        let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS")?
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = parse_var(&lookup, "DB_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.timeout_seconds);

        match db_type {
            DatabaseType::Sqlite => info!("Using SQLite database at: {}", sqlite_path.display()),
            DatabaseType::JsonFile => info!("Using JSON document at: {}", json_path.display()),
            DatabaseType::Memory => info!("Using in-memory storage; records will not survive a restart"),
        }

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            json_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, DatabaseError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DatabaseError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Initialize a file-backed SQLite connection pool and bootstrap the schema
pub fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let sqlite_path = &config.sqlite_path;
    info!("Initializing SQLite database at: {}", sqlite_path.display());

    // Create parent directory if it doesn't exist
    if let Some(parent) = sqlite_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::Pool(e)
        })?;

    run_migrations(&pool)?;
    info!("SQLite connection pool created successfully");

    Ok(Arc::new(pool))
}

/// Initialize an in-memory SQLite database.
///
/// Every in-memory connection is its own database, so the pool holds exactly one.
pub fn initialize_in_memory_sqlite_pool() -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(manager)?;

    run_migrations(&pool)?;
    info!("In-memory SQLite database initialized successfully");

    Ok(Arc::new(pool))
}

/// Run database migrations on a pooled connection
fn run_migrations(pool: &r2d2::Pool<SqliteConnectionManager>) -> Result<(), DatabaseError> {
    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
}

/// Describe the database behind a pool for health reporting
pub fn get_connection_info(pool: &SqlitePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;

    // Third column of `PRAGMA database_list` is the file; empty for in-memory databases
    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;
    let location = if path.is_empty() {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", Path::new(&path).display())
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}
