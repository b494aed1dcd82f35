//! SQLite pool setup, schema migration and the column conversions shared by the repositories.
//!
//! UUIDs are stored as hyphenated TEXT, instants as INTEGER epoch milliseconds, calendar dates
//! as `YYYY-MM-DD` TEXT and durations as INTEGER seconds.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::constants::{DEFAULT_STAFF_ROLES, DEFAULT_STAFF_STATUSES, DEFAULT_TASK_STATUSES};
use crate::{CoreConfig, ServiceError, ServiceResult};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        date_of_birth TEXT,
        gender TEXT NOT NULL DEFAULT '',
        phone_number TEXT NOT NULL UNIQUE,
        address TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS medical_records (
        id TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
        record_date INTEGER NOT NULL,
        staff_id TEXT NOT NULL,
        diagnosis TEXT NOT NULL,
        treatment TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_medical_records_patient ON medical_records(patient_id)",
    "CREATE TABLE IF NOT EXISTS staff_roles (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS staff_statuses (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS task_statuses (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS staff (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        phone_number TEXT NOT NULL UNIQUE,
        address TEXT NOT NULL DEFAULT '',
        role_id TEXT NOT NULL REFERENCES staff_roles(name),
        status_id TEXT NOT NULL REFERENCES staff_statuses(name),
        specialization TEXT NOT NULL DEFAULT '',
        nurse_type TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_staff_role_status ON staff(role_id, status_id)",
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        priority INTEGER NOT NULL DEFAULT 0,
        start_time INTEGER NOT NULL,
        end_time INTEGER NOT NULL,
        status_id TEXT NOT NULL REFERENCES task_statuses(name),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS schedule_entries (
        staff_id TEXT NOT NULL REFERENCES staff(id) ON DELETE CASCADE,
        task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        PRIMARY KEY (staff_id, task_id)
    )",
    "CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL,
        doctor_id TEXT NOT NULL,
        appointment_time INTEGER NOT NULL,
        duration_seconds INTEGER NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        place TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_appointments_doctor_time ON appointments(doctor_id, appointment_time)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id)",
];

/// Opens a connection pool for the configured database.
///
/// Foreign keys are enforced and file databases are created when missing.
pub async fn connect(cfg: &CoreConfig) -> ServiceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(cfg.database_url())?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections())
        .connect_with(options)
        .await?;

    tracing::debug!(url = cfg.database_url(), "database pool ready");
    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
///
/// The pool holds exactly one connection that never expires, since every new SQLite memory
/// connection would otherwise see an empty database.
pub async fn connect_in_memory() -> ServiceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Creates any missing tables and indexes. Safe to run repeatedly.
pub async fn migrate(pool: &SqlitePool) -> ServiceResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = SCHEMA.len(), "schema migrated");
    Ok(())
}

/// How many lookup rows `seed_lookups` inserted per table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub staff_roles: u64,
    pub staff_statuses: u64,
    pub task_statuses: u64,
}

/// Inserts the default roles and statuses, leaving existing names untouched.
pub async fn seed_lookups(pool: &SqlitePool) -> ServiceResult<SeedReport> {
    async fn seed(
        pool: &SqlitePool,
        table: &str,
        rows: &[(&str, &str)],
    ) -> ServiceResult<u64> {
        let sql = format!("INSERT OR IGNORE INTO {table} (name, description) VALUES (?, ?)");
        let mut inserted = 0;
        for (name, description) in rows {
            inserted += sqlx::query(&sql)
                .bind(*name)
                .bind(*description)
                .execute(pool)
                .await?
                .rows_affected();
        }
        Ok(inserted)
    }

    let report = SeedReport {
        staff_roles: seed(pool, "staff_roles", DEFAULT_STAFF_ROLES).await?,
        staff_statuses: seed(pool, "staff_statuses", DEFAULT_STAFF_STATUSES).await?,
        task_statuses: seed(pool, "task_statuses", DEFAULT_TASK_STATUSES).await?,
    };
    tracing::info!(?report, "lookup tables seeded");
    Ok(report)
}

pub(crate) fn to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

pub(crate) fn from_millis(column: &str, millis: i64) -> ServiceResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| ServiceError::Internal(format!("stored {column} is out of range")))
}

pub(crate) fn parse_stored_uuid(column: &str, value: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| ServiceError::Internal(format!("stored {column} is not a valid UUID")))
}

pub(crate) fn parse_stored_date(column: &str, value: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServiceError::Internal(format!("stored {column} is not a valid date")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Maps a unique-constraint failure to `Conflict`, passing other errors through.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::Conflict(message.into())
        }
        _ => ServiceError::Database(err),
    }
}
