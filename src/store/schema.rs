use rusqlite::Connection;

pub const LOG_TABLE: &str = "notification_log";
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_LOG_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS notification_log (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        subject_id        INTEGER NOT NULL DEFAULT 0,
        url               TEXT    NOT NULL,
        notification_type TEXT    NOT NULL,
        status_code       TEXT    NOT NULL,
        message           TEXT    NOT NULL DEFAULT '',
        notified_at       TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_notification_log_subject_id ON notification_log (subject_id);
    CREATE INDEX IF NOT EXISTS idx_notification_log_notified_at ON notification_log (notified_at);
";

/// Create the log table and indexes if missing; idempotent.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_LOG_TABLE)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}
