use crate::comparator::ComparedField;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Session token is missing, unknown or revoked")]
    Unauthorized,

    #[error("Escalation blocked: {0}")]
    Precondition(EscalationBlocked),

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Data service call '{operation}' failed: {message}")]
    Transport { operation: &'static str, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// The call never reached a decision; resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Database(_))
    }

    /// The data service looked at the request and refused it.
    /// The agent has to change the request, not repeat it.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound { .. })
    }

    /// Rejected client-side before any service call was made.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Why the escalation guard refused to submit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscalationBlocked {
    #[error("support ticket has no linked transfer")]
    MissingTransferLink,

    #[error("{count} unresolved mismatch(es) between transfer and form")]
    UnresolvedMismatches { count: usize },

    #[error("checklist items not confirmed: {unchecked:?}")]
    ChecklistIncomplete { unchecked: Vec<ComparedField> },
}

impl From<EscalationBlocked> for DeskError {
    fn from(reason: EscalationBlocked) -> Self {
        Self::Precondition(reason)
    }
}

/// A stored enum column held a value outside its vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

pub type DeskResult<T> = Result<T, DeskError>;
