//! Escalation tickets (the JIRA side of the desk) and the pre-filled
//! draft an agent edits before submitting one.

use crate::{
    config::DeskSettings,
    error::UnknownVariant,
    format::format_currency,
    ticket::default_page_size,
    transfer::TransferRecord,
    types::{AgentId, EscalationId, Timestamp, TicketId, TransferId},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Tracker priority. Deliberately a different vocabulary from
/// `TicketPriority`; the two are never converted into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscalationPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl EscalationPriority {
    pub const ALL: [EscalationPriority; 4] =
        [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl FromStr for EscalationPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "escalation priority", value: s.to_string() })
    }
}

impl fmt::Display for EscalationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscalationStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl EscalationStatus {
    pub const ALL: [EscalationStatus; 3] = [Self::ToDo, Self::InProgress, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// "Start Progress" action. Offered only from To Do.
    pub fn start_progress(&self) -> Option<EscalationStatus> {
        match self {
            Self::ToDo => Some(Self::InProgress),
            _ => None,
        }
    }

    /// "Mark Done" action. Offered only from In Progress.
    pub fn mark_done(&self) -> Option<EscalationStatus> {
        match self {
            Self::InProgress => Some(Self::Done),
            _ => None,
        }
    }
}

impl FromStr for EscalationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "escalation status", value: s.to_string() })
    }
}

impl fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationTicket {
    pub id: EscalationId,
    pub ticket_key: String,
    pub source_ticket_id: TicketId,
    pub transfer_id: TransferId,
    pub summary: String,
    pub description: String,
    pub priority: EscalationPriority,
    pub status: EscalationStatus,
    pub assignee: Option<String>,
    pub created_by: AgentId,
    pub resolution: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Payload of `createEscalation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub source_ticket_id: TicketId,
    pub transfer_id: TransferId,
    pub summary: String,
    pub description: String,
    pub priority: EscalationPriority,
    #[serde(default)]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationFilter {
    #[serde(default)]
    pub status: Option<EscalationStatus>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_page_size")]
    pub limit: u32,
}

impl Default for EscalationFilter {
    fn default() -> Self {
        Self { status: None, offset: 0, limit: default_page_size() }
    }
}

impl EscalationFilter {
    pub fn with_status(status: EscalationStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }
}

/// Editable escalation text. The pre-fill is a default only; whatever
/// the agent leaves in the draft is what gets submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationDraft {
    pub summary: String,
    pub description: String,
    pub priority: EscalationPriority,
}

impl EscalationDraft {
    pub fn prefill(transfer: &TransferRecord, ticket_number: &str, settings: &DeskSettings) -> Self {
        let summary = format!(
            "Transfer Escalation: {} - {}",
            transfer.reference_number, transfer.customer_name
        );
        let description = format!(
            "Transfer Reference: {}\n\
             Customer: {}\n\
             From: {}\n\
             To: {}\n\
             Account Type: {}\n\
             Transfer Type: {}\n\
             Amount: {} {}\n\
             Status: {}\n\
             \n\
             Support Ticket: {}\n\
             \n\
             Notes: {}",
            transfer.reference_number,
            transfer.customer_name,
            transfer.from_institution,
            transfer.to_institution,
            transfer.account_type,
            transfer.transfer_type,
            format_currency(transfer.transfer_amount),
            settings.currency_code,
            transfer.status,
            ticket_number,
            settings.escalation_note,
        );
        Self {
            summary,
            description,
            priority: settings.default_escalation_priority,
        }
    }

    pub fn into_request(self, source_ticket_id: TicketId, transfer_id: TransferId) -> EscalationRequest {
        EscalationRequest {
            source_ticket_id,
            transfer_id,
            summary: self.summary,
            description: self.description,
            priority: self.priority,
            assignee: None,
        }
    }
}

/// Tracker key for the next escalation: `{prefix}-{existing + base}`.
pub fn escalation_key(prefix: &str, base: i64, existing: i64) -> String {
    format!("{prefix}-{}", existing + base)
}
