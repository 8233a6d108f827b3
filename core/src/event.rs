//! Audit events.
//!
//! RULE: Every mutation the desk applies is recorded as one DeskEvent
//! in the event log, in the order it happened.

use crate::{
    escalation::EscalationStatus,
    ticket::TicketStatus,
    types::{AgentId, EscalationId, FormId, Timestamp, TicketId, TransferId},
};
use serde::{Deserialize, Serialize};

/// Variants are appended over time. Never remove or reorder them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // ── Sessions ───────────────────────────────────
    AgentLoggedIn {
        agent_id: AgentId,
    },
    AgentLoggedOut {
        agent_id: AgentId,
    },

    // ── Support tickets ────────────────────────────
    TicketCreated {
        ticket_id: TicketId,
        ticket_number: String,
        transfer_id: Option<TransferId>,
    },
    TicketAssigned {
        ticket_id: TicketId,
        agent_id: AgentId,
    },
    TicketStatusChanged {
        ticket_id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    },

    // ── Verification forms ─────────────────────────
    FormVerified {
        form_id: FormId,
        transfer_id: TransferId,
        verified: bool,
    },

    // ── Escalations ────────────────────────────────
    EscalationCreated {
        escalation_id: EscalationId,
        ticket_key: String,
        source_ticket_id: TicketId,
        transfer_id: TransferId,
    },
    EscalationStatusChanged {
        escalation_id: EscalationId,
        from: EscalationStatus,
        to: EscalationStatus,
    },

    // ── Transfers ──────────────────────────────────
    TransferUpdated {
        transfer_id: TransferId,
        from_status: String,
        to_status: String,
    },
}

impl DeskEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AgentLoggedIn { .. }           => "agent_logged_in",
            Self::AgentLoggedOut { .. }          => "agent_logged_out",
            Self::TicketCreated { .. }           => "ticket_created",
            Self::TicketAssigned { .. }          => "ticket_assigned",
            Self::TicketStatusChanged { .. }     => "ticket_status_changed",
            Self::FormVerified { .. }            => "form_verified",
            Self::EscalationCreated { .. }       => "escalation_created",
            Self::EscalationStatusChanged { .. } => "escalation_status_changed",
            Self::TransferUpdated { .. }         => "transfer_updated",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub occurred_at: Timestamp,
    pub actor: Option<AgentId>,
    pub event_type: String,
    pub payload: String, // JSON-serialized DeskEvent
}
