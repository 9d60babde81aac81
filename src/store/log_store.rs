use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::{debug, info};

use crate::helpers::time::{from_db_timestamp, now_utc, to_db_timestamp};
use crate::store::log_entry::{LogEntry, NewLogEntry};
use crate::store::query::{LogFilter, LogPage, LogSort, PageRequest};
use crate::store::schema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("log store lock poisoned")]
    Poisoned,
    #[error("invalid log row {id}: {reason}")]
    InvalidRow { id: i64, reason: String },
    #[error("subject id {0} exceeds the largest storable id")]
    SubjectOutOfRange(u64),
}

pub type StoreResult<T> = Result<T, StoreError>;

const SELECT_COLUMNS: &str =
    "SELECT id, subject_id, url, notification_type, status_code, message, notified_at FROM notification_log";

/// Unicode-aware lowercasing, registered on every connection.
const CASEFOLD_FN: &str = "casefold";

// ?1 is the already folded term; instr() matches it literally.
const SEARCH_CLAUSE: &str = " WHERE (instr(casefold(url), ?1) > 0 \
    OR instr(casefold(message), ?1) > 0 \
    OR instr(CAST(subject_id AS TEXT), ?1) > 0 \
    OR instr(casefold(status_code), ?1) > 0 \
    OR instr(casefold(notification_type), ?1) > 0)";

/// Append-only store of dispatch attempts on SQLite.
#[derive(Debug)]
pub struct LogStore {
    conn: Mutex<Connection>,
}

impl LogStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!("opened log store at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.create_scalar_function(
            CASEFOLD_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
        )?;
        schema::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn schema_version(&self) -> StoreResult<i64> {
        let conn = self.conn()?;
        Ok(schema::schema_version(&conn)?)
    }

    /// Insert one entry; returns the assigned id.
    pub fn append(&self, entry: NewLogEntry) -> StoreResult<i64> {
        let subject_id =
            i64::try_from(entry.subject_id).map_err(|_| StoreError::SubjectOutOfRange(entry.subject_id))?;
        let notified_at = entry.notified_at.unwrap_or_else(now_utc);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notification_log (subject_id, url, notification_type, status_code, message, notified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                subject_id,
                entry.url,
                entry.notification_type.as_str(),
                entry.status_code,
                entry.message,
                to_db_timestamp(&notified_at),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, status = %entry.status_code, "log entry recorded");
        Ok(id)
    }

    /// Filtered, sorted page plus the total number of matching rows.
    pub fn query(&self, filter: &LogFilter, sort: LogSort, page: PageRequest) -> StoreResult<LogPage> {
        let conn = self.conn()?;

        let mut args: Vec<Value> = Vec::with_capacity(3);
        let where_sql = match filter.term() {
            Some(term) => {
                args.push(Value::Text(term.to_lowercase()));
                SEARCH_CLAUSE
            }
            None => "",
        };

        let total_count: i64 = conn.query_row(
            &format!("SELECT COUNT(id) FROM notification_log{}", where_sql),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let limit_pos = args.len() + 1;
        let items_sql = format!(
            "{}{} ORDER BY {} {}, id {} LIMIT ?{} OFFSET ?{}",
            SELECT_COLUMNS,
            where_sql,
            sort.column.sql(),
            sort.direction.sql(),
            sort.direction.sql(),
            limit_pos,
            limit_pos + 1,
        );
        args.push(Value::Integer(i64::try_from(page.limit()).unwrap_or(i64::MAX)));
        args.push(Value::Integer(i64::try_from(page.offset).unwrap_or(i64::MAX)));

        let mut stmt = conn.prepare(&items_sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), read_row)?;
        let items = rows
            .map(|row| row.map_err(StoreError::from).and_then(RawRow::into_entry))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(LogPage { items, total_count: total_count as u64 })
    }

    pub fn count(&self) -> StoreResult<u64> {
        let total: i64 = self
            .conn()?
            .query_row("SELECT COUNT(id) FROM notification_log", [], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// Most recent entry (highest id) for a subject.
    pub fn latest_for_subject(&self, subject_id: u64) -> StoreResult<Option<LogEntry>> {
        // never stored, see `append`
        let Ok(subject_id) = i64::try_from(subject_id) else {
            return Ok(None);
        };
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!("{} WHERE subject_id = ?1 ORDER BY id DESC LIMIT 1", SELECT_COLUMNS),
                params![subject_id],
                read_row,
            )
            .optional()?;
        raw.map(RawRow::into_entry).transpose()
    }

    pub fn delete_all(&self) -> StoreResult<usize> {
        let deleted = self.conn()?.execute("DELETE FROM notification_log", [])?;
        info!(deleted, "all log entries deleted");
        Ok(deleted)
    }

    /// Drop the table entirely (uninstall).
    pub fn drop_all(&self) -> StoreResult<()> {
        self.conn()?
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", schema::LOG_TABLE))?;
        info!("log table dropped");
        Ok(())
    }

    /// Keep only the highest id per subject (subject 0 is its own group).
    pub fn delete_all_but_latest_per_subject(&self) -> StoreResult<usize> {
        Ok(self.conn()?.execute(
            "DELETE FROM notification_log
             WHERE id NOT IN (SELECT MAX(id) FROM notification_log GROUP BY subject_id)",
            [],
        )?)
    }

    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        Ok(self.conn()?.execute(
            "DELETE FROM notification_log WHERE notified_at < ?1",
            params![to_db_timestamp(&cutoff)],
        )?)
    }

    /// Keep the `keep` newest entries, deleting the rest oldest-first
    /// (by `notified_at`, ties by `id`). Single statement, so a concurrent
    /// run cannot double-delete.
    pub fn delete_beyond_newest(&self, keep: u64) -> StoreResult<usize> {
        Ok(self.conn()?.execute(
            "DELETE FROM notification_log WHERE id IN (
                SELECT id FROM notification_log
                ORDER BY notified_at ASC, id ASC
                LIMIT max(0, (SELECT COUNT(id) FROM notification_log) - ?1)
             )",
            params![i64::try_from(keep).unwrap_or(i64::MAX)],
        )?)
    }
}

struct RawRow {
    id: i64,
    subject_id: i64,
    url: String,
    notification_type: String,
    status_code: String,
    message: String,
    notified_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        url: row.get(2)?,
        notification_type: row.get(3)?,
        status_code: row.get(4)?,
        message: row.get(5)?,
        notified_at: row.get(6)?,
    })
}

impl RawRow {
    fn into_entry(self) -> StoreResult<LogEntry> {
        let id = self.id;
        let notification_type = self
            .notification_type
            .parse()
            .map_err(|reason| StoreError::InvalidRow { id, reason })?;
        let notified_at = from_db_timestamp(&self.notified_at).ok_or_else(|| StoreError::InvalidRow {
            id,
            reason: format!("bad timestamp '{}'", self.notified_at),
        })?;
        let subject_id = u64::try_from(self.subject_id).map_err(|_| StoreError::InvalidRow {
            id,
            reason: format!("negative subject id {}", self.subject_id),
        })?;

        Ok(LogEntry {
            id,
            subject_id,
            url: self.url,
            notification_type,
            status_code: self.status_code,
            message: self.message,
            notified_at,
        })
    }
}
