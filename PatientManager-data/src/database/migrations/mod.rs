// Schema bootstrap for the SQLite backend.
// Tables are created idempotently; there is no versioned migration history.

mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;
