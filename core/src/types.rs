//! Shared primitive types used across the desk.

use chrono::{DateTime, Utc};

/// Row id of a support ticket.
pub type TicketId = i64;

/// Row id of a transfer record.
pub type TransferId = i64;

/// Row id of a verification (T2220) form.
pub type FormId = i64;

/// Row id of an escalation ticket.
pub type EscalationId = i64;

/// Row id of a desk agent.
pub type AgentId = i64;

/// Every stored instant is UTC.
pub type Timestamp = DateTime<Utc>;
