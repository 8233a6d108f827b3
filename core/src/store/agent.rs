use super::DeskStore;
use crate::{
    config::AgentFixture,
    error::DeskResult,
    session::AgentProfile,
    types::{AgentId, Timestamp},
};
use rusqlite::{params, OptionalExtension};

const AGENT_COLUMNS: &str = "a.agent_id, a.username, a.email, a.full_name, a.role, a.is_admin, a.is_active";

fn agent_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentProfile> {
    Ok(AgentProfile {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        is_admin: row.get::<_, i32>(5)? != 0,
        is_active: row.get::<_, i32>(6)? != 0,
    })
}

impl DeskStore {
    // ── Agent ─────────────────────────────────────────────────────

    pub fn insert_agent(&self, agent: &AgentFixture, created_at: Timestamp) -> DeskResult<AgentId> {
        self.conn.execute(
            "INSERT INTO agent (username, email, full_name, role, is_admin, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &agent.username,
                &agent.email,
                &agent.full_name,
                agent.role,
                if agent.is_admin { 1i32 } else { 0i32 },
                if agent.is_active { 1i32 } else { 0i32 },
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn agent_count(&self) -> DeskResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM agent", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_agent(&self, agent_id: AgentId) -> DeskResult<Option<AgentProfile>> {
        self.conn
            .query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agent a WHERE a.agent_id = ?1"),
                params![agent_id],
                agent_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn agent_by_username(&self, username: &str) -> DeskResult<Option<AgentProfile>> {
        self.conn
            .query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agent a WHERE a.username = ?1"),
                params![username],
                agent_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    // ── Session ───────────────────────────────────────────────────

    pub fn insert_session(&self, token: &str, agent_id: AgentId, issued_at: Timestamp) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO session (token, agent_id, issued_at) VALUES (?1, ?2, ?3)",
            params![token, agent_id, issued_at],
        )?;
        Ok(())
    }

    /// The active agent holding a live (unrevoked) token.
    pub fn agent_for_token(&self, token: &str) -> DeskResult<Option<AgentProfile>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {AGENT_COLUMNS} FROM session s
                     JOIN agent a ON a.agent_id = s.agent_id
                     WHERE s.token = ?1 AND s.revoked_at IS NULL AND a.is_active = 1"
                ),
                params![token],
                agent_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Returns false when the token was unknown or already revoked.
    pub fn revoke_session(&self, token: &str, revoked_at: Timestamp) -> DeskResult<bool> {
        let changed = self.conn.execute(
            "UPDATE session SET revoked_at = ?1 WHERE token = ?2 AND revoked_at IS NULL",
            params![revoked_at, token],
        )?;
        Ok(changed > 0)
    }
}
