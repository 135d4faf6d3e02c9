use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::cache::StabilityCache;
use crate::db::{BaselineOrigin, BaselineRecord, RunFailureRecord, TranslationRunRecord};
use crate::model::FailureKind;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Failure reasons are stored as a JSON array.
    #[error("Failed to encode failure reasons: {0}")]
    Json(#[from] serde_json::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed project database.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert or replace baseline rows, keyed by function name.
    pub fn upsert_baseline(&self, records: &[BaselineRecord]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO baseline_entries
                    (name, body_hash, approved_body, signature_fingerprint, origin, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(name) DO UPDATE SET
                    body_hash = excluded.body_hash,
                    approved_body = excluded.approved_body,
                    signature_fingerprint = excluded.signature_fingerprint,
                    origin = excluded.origin,
                    updated_at = excluded.updated_at
                "#,
            )?;
            for record in records {
                stmt.execute(params![
                    record.name,
                    record.body_hash,
                    record.approved_body,
                    record.signature_fingerprint,
                    record.origin.as_str(),
                    record.updated_at
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// List baseline rows ordered by function name.
    pub fn list_baseline(&self) -> DbResult<Vec<BaselineRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, body_hash, approved_body, signature_fingerprint, origin, updated_at
            FROM baseline_entries
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let origin: String = row.get(4)?;
            Ok(BaselineRecord {
                name: row.get(0)?,
                body_hash: row.get(1)?,
                approved_body: row.get(2)?,
                signature_fingerprint: row.get(3)?,
                origin: BaselineOrigin::parse(&origin).ok_or(rusqlite::Error::InvalidQuery)?,
                updated_at: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Immutable snapshot of the baseline for one run.
    pub fn load_cache_snapshot(&self) -> DbResult<StabilityCache> {
        let records = self.list_baseline()?;
        Ok(StabilityCache::from_entries(records.iter().map(BaselineRecord::to_cache_entry)))
    }

    /// Insert a run record together with its failures; returns the run id.
    pub fn insert_translation_run(
        &self,
        record: &TranslationRunRecord,
        failures: &[RunFailureRecord],
    ) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO translation_runs
                (manifest, manifest_hash, total, translated, reused, failed, workers, dry_run,
                 started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.manifest,
                record.manifest_hash,
                record.total as i64,
                record.translated as i64,
                record.reused as i64,
                record.failed as i64,
                record.workers as i64,
                if record.dry_run { 1 } else { 0 },
                record.started_at,
                record.finished_at
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO run_failures
                    (run_id, function, kind, reasons, original_source, rewritten_source)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for failure in failures {
                let reasons = serde_json::to_string(&failure.reasons)?;
                stmt.execute(params![
                    run_id,
                    failure.function,
                    failure.kind.as_str(),
                    reasons,
                    failure.original_source,
                    failure.rewritten_source
                ])?;
            }
        }

        tx.commit()?;
        Ok(run_id)
    }

    /// List translation runs (ordered by id).
    pub fn list_translation_runs(&self) -> DbResult<Vec<TranslationRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, manifest, manifest_hash, total, translated, reused, failed, workers, dry_run,
                   started_at, finished_at
            FROM translation_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TranslationRunRecord {
                id: Some(row.get(0)?),
                manifest: row.get(1)?,
                manifest_hash: row.get(2)?,
                total: row.get::<_, i64>(3)? as usize,
                translated: row.get::<_, i64>(4)? as usize,
                reused: row.get::<_, i64>(5)? as usize,
                failed: row.get::<_, i64>(6)? as usize,
                workers: row.get::<_, i64>(7)? as usize,
                dry_run: row.get::<_, i64>(8)? != 0,
                started_at: row.get(9)?,
                finished_at: row.get(10)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Id of the most recent run, if any.
    pub fn latest_run_id(&self) -> DbResult<Option<i64>> {
        let mut stmt =
            self.conn.prepare("SELECT id FROM translation_runs ORDER BY id DESC LIMIT 1")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    /// Failures recorded for one run, in insertion order.
    pub fn list_run_failures(&self, run_id: i64) -> DbResult<Vec<RunFailureRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT function, kind, reasons, original_source, rewritten_source
            FROM run_failures
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            let kind: String = row.get(1)?;
            let reasons: String = row.get(2)?;
            Ok((
                row.get::<_, String>(0)?,
                kind,
                reasons,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (function, kind, reasons, original_source, rewritten_source) = row?;
            out.push(RunFailureRecord {
                function,
                kind: FailureKind::parse(&kind).ok_or(rusqlite::Error::InvalidQuery)?,
                reasons: serde_json::from_str(&reasons)?,
                original_source,
                rewritten_source,
            });
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: baseline_entries
/// - 2: translation_runs and run_failures
/// - 3: dry_run column on translation_runs (guarded in code)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS baseline_entries (
                name                  TEXT PRIMARY KEY,
                body_hash             TEXT NOT NULL,
                approved_body         TEXT NOT NULL,
                signature_fingerprint TEXT,
                origin                TEXT NOT NULL,
                updated_at            TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS translation_runs (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                manifest      TEXT NOT NULL,
                manifest_hash TEXT NOT NULL,
                total         INTEGER NOT NULL,
                translated    INTEGER NOT NULL,
                reused        INTEGER NOT NULL,
                failed        INTEGER NOT NULL,
                workers       INTEGER NOT NULL,
                started_at    TEXT NOT NULL,
                finished_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS run_failures (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id           INTEGER NOT NULL,
                function         TEXT NOT NULL,
                kind             TEXT NOT NULL,
                reasons          TEXT NOT NULL,
                original_source  TEXT NOT NULL,
                rewritten_source TEXT
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
        current_version = 2;
    }

    if current_version < 3 {
        let has_column = column_exists(conn, "translation_runs", "dry_run")?;
        if !has_column {
            conn.execute(
                "ALTER TABLE translation_runs ADD COLUMN dry_run INTEGER NOT NULL DEFAULT 0;",
                [],
            )?;
        }
        conn.execute("PRAGMA user_version = 3;", [])?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let pragma = format!("PRAGMA table_info({table});");
    let mut stmt = conn.prepare(&pragma)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in rows {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
