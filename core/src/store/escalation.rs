use super::DeskStore;
use crate::{
    error::DeskResult,
    escalation::{EscalationFilter, EscalationRequest, EscalationStatus, EscalationTicket},
    types::{AgentId, EscalationId, Timestamp},
};
use rusqlite::{params, OptionalExtension};

const ESCALATION_COLUMNS: &str = "escalation_id, ticket_key, source_ticket_id, transfer_id,
    summary, description, priority, status, assignee, created_by, resolution,
    resolved_at, created_at, updated_at";

fn escalation_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<EscalationTicket> {
    Ok(EscalationTicket {
        id: row.get(0)?,
        ticket_key: row.get(1)?,
        source_ticket_id: row.get(2)?,
        transfer_id: row.get(3)?,
        summary: row.get(4)?,
        description: row.get(5)?,
        priority: row.get(6)?,
        status: row.get(7)?,
        assignee: row.get(8)?,
        created_by: row.get(9)?,
        resolution: row.get(10)?,
        resolved_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

impl DeskStore {
    // ── Escalation ────────────────────────────────────────────────

    pub fn insert_escalation(
        &self,
        ticket_key: &str,
        req: &EscalationRequest,
        created_by: AgentId,
        created_at: Timestamp,
    ) -> DeskResult<EscalationId> {
        self.conn.execute(
            "INSERT INTO escalation (
                ticket_key, source_ticket_id, transfer_id, summary, description,
                priority, status, assignee, created_by, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                ticket_key,
                req.source_ticket_id,
                req.transfer_id,
                &req.summary,
                &req.description,
                req.priority,
                EscalationStatus::ToDo,
                req.assignee.as_deref(),
                created_by,
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_escalation(&self, escalation_id: EscalationId) -> DeskResult<Option<EscalationTicket>> {
        self.conn
            .query_row(
                &format!("SELECT {ESCALATION_COLUMNS} FROM escalation WHERE escalation_id = ?1"),
                params![escalation_id],
                escalation_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn escalation_count(&self) -> DeskResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM escalation", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn escalation_count_with_status(&self, status: EscalationStatus) -> DeskResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM escalation WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Newest first.
    pub fn list_escalations(&self, filter: &EscalationFilter) -> DeskResult<Vec<EscalationTicket>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ESCALATION_COLUMNS} FROM escalation
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, escalation_id DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![filter.status, filter.limit, filter.offset],
            escalation_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// `resolved_at` of None leaves any stored resolution time in place.
    pub fn set_escalation_status(
        &self,
        escalation_id: EscalationId,
        status: EscalationStatus,
        resolved_at: Option<Timestamp>,
        at: Timestamp,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE escalation
             SET status = ?1, resolved_at = COALESCE(?2, resolved_at), updated_at = ?3
             WHERE escalation_id = ?4",
            params![status, resolved_at, at, escalation_id],
        )?;
        Ok(())
    }
}
