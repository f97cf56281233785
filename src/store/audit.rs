//! Operation history kept inside the store file.
//!
//! Every mutation writes one `audit_log` row in the same transaction as
//! the change itself, so the history never disagrees with the data.
//! Rows carry record ids and operation names only, never field contents.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::schema::parse_timestamp;
use crate::errors::Result;

pub const OP_CREATE: &str = "create";
pub const OP_INSERT: &str = "insert";
pub const OP_UPDATE: &str = "update";
pub const OP_DELETE: &str = "delete";
pub const OP_CONSUME_BACKUP_CODE: &str = "consume-backup-code";
pub const OP_CHANGE_PASSWORD: &str = "change-password";

/// A single history entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub record_id: Option<i64>,
    pub details: Option<String>,
}

/// Append an entry.  Call with the mutation's transaction.
pub fn record(
    conn: &Connection,
    operation: &str,
    record_id: Option<i64>,
    details: Option<&str>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO audit_log (timestamp, operation, record_id, details)
         VALUES (?1, ?2, ?3, ?4)",
        params![now, operation, record_id, details],
    )?;
    Ok(())
}

/// The `limit` most recent entries, newest first.
pub fn query(conn: &Connection, limit: usize) -> Result<Vec<AuditEntry>> {
    let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(
        "SELECT id, timestamp, operation, record_id, details
         FROM audit_log
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit_i64], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<i64>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, timestamp, operation, record_id, details) = row?;
        entries.push(AuditEntry {
            id,
            timestamp: parse_timestamp(&timestamp)?,
            operation,
            record_id,
            details,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn record_and_query_roundtrip() {
        let conn = conn();
        record(&conn, OP_INSERT, Some(1), None).unwrap();
        record(&conn, OP_INSERT, Some(2), None).unwrap();
        record(&conn, OP_DELETE, Some(1), Some("removed")).unwrap();

        let entries = query(&conn, 10).unwrap();
        assert_eq!(entries.len(), 3);

        // Most recent first.
        assert_eq!(entries[0].operation, OP_DELETE);
        assert_eq!(entries[0].record_id, Some(1));
        assert_eq!(entries[0].details.as_deref(), Some("removed"));
        assert_eq!(entries[2].record_id, Some(1));
    }

    #[test]
    fn query_respects_limit() {
        let conn = conn();
        for i in 0..10 {
            record(&conn, OP_UPDATE, Some(i), None).unwrap();
        }
        assert_eq!(query(&conn, 3).unwrap().len(), 3);
    }

    #[test]
    fn empty_log_returns_empty() {
        assert!(query(&conn(), 10).unwrap().is_empty());
    }
}
