use super::DeskStore;
use crate::{
    error::DeskResult,
    ticket::{NewSupportTicket, SupportTicket, TicketFilter, TicketStatus},
    types::{AgentId, Timestamp, TicketId, TransferId},
};
use rusqlite::{params, OptionalExtension};

const TICKET_COLUMNS: &str = "ticket_id, ticket_number, customer_name, customer_email,
    subject, description, status, priority, transfer_reference, transfer_id,
    assigned_agent, resolution_notes, created_at, updated_at";

fn ticket_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<SupportTicket> {
    Ok(SupportTicket {
        id: row.get(0)?,
        ticket_number: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        subject: row.get(4)?,
        description: row.get(5)?,
        status: row.get(6)?,
        priority: row.get(7)?,
        transfer_reference: row.get(8)?,
        transfer_id: row.get(9)?,
        assigned_agent: row.get(10)?,
        resolution_notes: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

impl DeskStore {
    // ── Support ticket ────────────────────────────────────────────

    pub fn insert_ticket(
        &self,
        ticket_number: &str,
        t: &NewSupportTicket,
        status: TicketStatus,
        transfer_id: Option<TransferId>,
        created_at: Timestamp,
    ) -> DeskResult<TicketId> {
        self.conn.execute(
            "INSERT INTO support_ticket (
                ticket_number, customer_name, customer_email, subject, description,
                status, priority, transfer_reference, transfer_id, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                ticket_number,
                &t.customer_name,
                &t.customer_email,
                &t.subject,
                &t.description,
                status,
                t.priority,
                t.transfer_reference.as_deref(),
                transfer_id,
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_ticket(&self, ticket_id: TicketId) -> DeskResult<Option<SupportTicket>> {
        self.conn
            .query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM support_ticket WHERE ticket_id = ?1"),
                params![ticket_id],
                ticket_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn ticket_number_exists(&self, ticket_number: &str) -> DeskResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM support_ticket WHERE ticket_number = ?1",
            params![ticket_number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Newest first; ties broken by id so the order is total.
    pub fn list_tickets(&self, filter: &TicketFilter) -> DeskResult<Vec<SupportTicket>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_ticket
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR priority = ?2)
               AND (?3 IS NULL OR assigned_agent = ?3)
             ORDER BY created_at DESC, ticket_id DESC
             LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt.query_map(
            params![
                filter.status,
                filter.priority,
                filter.assigned_to,
                filter.limit,
                filter.offset,
            ],
            ticket_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn assign_ticket(
        &self,
        ticket_id: TicketId,
        agent_id: AgentId,
        status: TicketStatus,
        at: Timestamp,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE support_ticket SET assigned_agent = ?1, status = ?2, updated_at = ?3
             WHERE ticket_id = ?4",
            params![agent_id, status, at, ticket_id],
        )?;
        Ok(())
    }

    /// `resolution_notes` of None leaves the stored notes untouched.
    pub fn set_ticket_status(
        &self,
        ticket_id: TicketId,
        status: TicketStatus,
        resolution_notes: Option<&str>,
        at: Timestamp,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE support_ticket
             SET status = ?1, resolution_notes = COALESCE(?2, resolution_notes), updated_at = ?3
             WHERE ticket_id = ?4",
            params![status, resolution_notes, at, ticket_id],
        )?;
        Ok(())
    }

    pub fn ticket_count_with_status(&self, status: TicketStatus) -> DeskResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM support_ticket WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
