//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The desk service calls store methods and never executes SQL directly.

use crate::{
    error::DeskResult,
    escalation::{EscalationPriority, EscalationStatus},
    event::EventLogEntry,
    session::AgentRole,
    ticket::{TicketPriority, TicketStatus},
};
use rusqlite::{
    params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    Connection, ToSql,
};

mod agent;
mod escalation;
mod ticket;
mod transfer;

pub struct DeskStore {
    conn: Connection,
}

impl DeskStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_transfers.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_tickets.sql"))?;
        Ok(())
    }

    /// Run `f` in one transaction. Commits on `Ok`; any `Err` rolls back
    /// every write `f` made, so a failed mutation leaves nothing behind.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> DeskResult<T>) -> DeskResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (occurred_at, actor, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.occurred_at, entry.actor, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    /// The whole log in append order.
    pub fn events(&self) -> DeskResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, occurred_at, actor, event_type, payload
             FROM event_log ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    occurred_at: row.get(1)?,
                    actor: row.get(2)?,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, event_type: &str) -> DeskResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE event_type = ?1",
            params![event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// Enum columns are stored as their wire strings.
macro_rules! text_column {
    ($($ty:ty),+ $(,)?) => {$(
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )+};
}

text_column!(
    AgentRole,
    TicketStatus,
    TicketPriority,
    EscalationPriority,
    EscalationStatus,
);
