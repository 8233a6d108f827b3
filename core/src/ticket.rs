//! Customer support tickets (the Zendesk side of the desk).

use crate::{
    error::UnknownVariant,
    types::{AgentId, Timestamp, TicketId, TransferId},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Pending,
        Self::Resolved,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "ticket status", value: s.to_string() })
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for TicketPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "ticket priority", value: s.to_string() })
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: TicketId,
    pub ticket_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub transfer_reference: Option<String>,
    pub transfer_id: Option<TransferId>,
    pub assigned_agent: Option<AgentId>,
    pub resolution_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl SupportTicket {
    pub fn is_linked(&self) -> bool {
        self.transfer_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSupportTicket {
    pub customer_name: String,
    pub customer_email: String,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    #[serde(default)]
    pub transfer_reference: Option<String>,
}

/// Query filter for the ticket queue. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub assigned_to: Option<AgentId>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_page_size")]
    pub limit: u32,
}

pub(crate) fn default_page_size() -> u32 {
    100
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            assigned_to: None,
            offset: 0,
            limit: default_page_size(),
        }
    }
}

impl TicketFilter {
    pub fn with_status(status: TicketStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn with_priority(priority: TicketPriority) -> Self {
        Self { priority: Some(priority), ..Self::default() }
    }
}
