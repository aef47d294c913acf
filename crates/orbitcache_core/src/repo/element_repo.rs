//! Element store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keep the latest element set per catalog id in `latest_tles`.
//! - Provide ordered bulk retrieval for propagation queries.
//!
//! # Invariants
//! - `catalog_id` is the primary key; refreshes overwrite, never duplicate.
//! - An upsert batch runs in one IMMEDIATE transaction and rolls back on the
//!   first failing record.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::element::{ElementRecord, ElementValidationError, TleEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const TABLE: &str = "latest_tles";
const COLUMNS: [&str; 5] = ["catalog_id", "name", "line1", "line2", "fetched_at_utc"];

const UPSERT_SQL: &str = "INSERT INTO latest_tles (
        catalog_id,
        name,
        line1,
        line2,
        fetched_at_utc
    ) VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(catalog_id) DO UPDATE SET
        name = excluded.name,
        line1 = excluded.line1,
        line2 = excluded.line2,
        fetched_at_utc = excluded.fetched_at_utc;";

const SELECT_SQL: &str = "SELECT
    catalog_id,
    name,
    line1,
    line2,
    fetched_at_utc
FROM latest_tles
ORDER BY catalog_id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for element persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation {
        catalog_id: u32,
        source: ElementValidationError,
    },
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { catalog_id, source } => {
                write!(f, "invalid element set for catalog id {catalog_id}: {source}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted element data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the latest-element cache.
pub trait ElementRepository {
    /// Inserts or overwrites every entry, stamping each with `fetched_at`.
    ///
    /// Returns the number of entries written. Either the whole batch is
    /// committed or nothing is.
    fn upsert_latest(
        &mut self,
        entries: &[TleEntry],
        fetched_at: DateTime<Utc>,
    ) -> RepoResult<usize>;

    /// Loads records ordered by ascending catalog id.
    ///
    /// `limit == 0` means unbounded.
    fn load_latest(&self, limit: u32) -> RepoResult<Vec<ElementRecord>>;

    /// Number of cached records.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed element repository.
pub struct SqliteElementRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteElementRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Connections that were not bootstrapped through `open_db` are rejected.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ElementRepository for SqliteElementRepository<'_> {
    fn upsert_latest(
        &mut self,
        entries: &[TleEntry],
        fetched_at: DateTime<Utc>,
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        match upsert_in_tx(self.conn, entries, fetched_at) {
            Ok(written) => {
                info!(
                    "event=elements_upsert module=repo status=ok count={} duration_ms={}",
                    written,
                    started_at.elapsed().as_millis()
                );
                Ok(written)
            }
            Err(err) => {
                error!(
                    "event=elements_upsert module=repo status=error count={} duration_ms={} error={}",
                    entries.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn load_latest(&self, limit: u32) -> RepoResult<Vec<ElementRecord>> {
        let started_at = Instant::now();
        // SQLite treats a negative LIMIT as unbounded.
        let sql_limit = if limit == 0 { -1 } else { i64::from(limit) };
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} LIMIT ?1;"))?;
        let mut rows = stmt.query([sql_limit])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        info!(
            "event=elements_load module=repo status=ok limit={} count={} duration_ms={}",
            limit,
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(records)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM latest_tles;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn upsert_in_tx(
    conn: &mut Connection,
    entries: &[TleEntry],
    fetched_at: DateTime<Utc>,
) -> RepoResult<usize> {
    let fetched_at_text = format_fetched_at(fetched_at);
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    {
        let mut stmt = tx.prepare(UPSERT_SQL)?;
        for entry in entries {
            entry.validate().map_err(|source| RepoError::Validation {
                catalog_id: entry.catalog_id,
                source,
            })?;
            stmt.execute(params![
                i64::from(entry.catalog_id),
                entry.name.as_str(),
                entry.line1.as_str(),
                entry.line2.as_str(),
                fetched_at_text.as_str(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(entries.len())
}

/// Formats a refresh timestamp the way it is stored in `fetched_at_utc`.
pub fn format_fetched_at(fetched_at: DateTime<Utc>) -> String {
    fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<ElementRecord> {
    let raw_id: i64 = row.get("catalog_id")?;
    let catalog_id = u32::try_from(raw_id).map_err(|_| {
        RepoError::InvalidData(format!(
            "catalog id `{raw_id}` out of range in latest_tles.catalog_id"
        ))
    })?;

    let fetched_text: String = row.get("fetched_at_utc")?;
    let fetched_at = DateTime::parse_from_rfc3339(&fetched_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{fetched_text}` in latest_tles.fetched_at_utc"
            ))
        })?
        .with_timezone(&Utc);

    let line1: String = row.get("line1")?;
    let line2: String = row.get("line2")?;
    let record = ElementRecord {
        catalog_id,
        name: row.get("name")?,
        line1: line1.trim().to_string(),
        line2: line2.trim().to_string(),
        fetched_at,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("catalog id {catalog_id}: {err}")))?;
    Ok(record)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TABLE)? {
        return Err(RepoError::MissingRequiredTable(TABLE));
    }
    for column in COLUMNS {
        if !table_has_column(conn, TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
