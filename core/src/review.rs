//! One agent's view of one support ticket: the fetched ticket, its
//! transfer comparison, the verification checklist, and the escalation
//! draft. This is where the escalation gate is enforced.
//!
//! RULES:
//!   - A review is only constructed once every required fetch has
//!     completed, so the gate is always defined on a live review.
//!   - The checklist starts all-unchecked on every load. It is never
//!     persisted and never carried from one review to another.
//!   - `submit_escalation` checks the gate before touching the service.
//!     A blocked submission issues no call at all.
//!   - A failed submission leaves the review exactly as it was.

use crate::{
    checklist::{self, VerificationChecklist},
    comparator::{ComparedField, Comparison, Mismatch},
    config::DeskSettings,
    error::{DeskResult, EscalationBlocked},
    escalation::{EscalationDraft, EscalationTicket},
    service::DataService,
    session::Session,
    ticket::SupportTicket,
    types::TicketId,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TicketReview {
    ticket: SupportTicket,
    comparison: Option<Comparison>,
    checklist: VerificationChecklist,
    draft: Option<EscalationDraft>,
}

impl TicketReview {
    /// Fetch the ticket and, when it is linked, the transfer comparison.
    /// An unlinked ticket is a valid review with no comparison.
    pub fn load<S: DataService + ?Sized>(
        service: &mut S,
        session: &Session,
        ticket_id: TicketId,
        settings: &DeskSettings,
    ) -> DeskResult<Self> {
        let ticket = service.get_ticket(session, ticket_id)?;
        let comparison = match ticket.transfer_id {
            Some(transfer_id) => Some(service.transfer_comparison(session, transfer_id)?),
            None => None,
        };
        let draft = comparison
            .as_ref()
            .map(|c| EscalationDraft::prefill(&c.transfer, &ticket.ticket_number, settings));
        Ok(Self {
            ticket,
            comparison,
            checklist: VerificationChecklist::new(),
            draft,
        })
    }

    /// Re-query ticket and comparison after a mutation. The checklist and
    /// any draft edits survive; a newly linked transfer gets a fresh draft.
    pub fn reload<S: DataService + ?Sized>(
        &mut self,
        service: &mut S,
        session: &Session,
        settings: &DeskSettings,
    ) -> DeskResult<()> {
        let ticket = service.get_ticket(session, self.ticket.id)?;
        let comparison = match ticket.transfer_id {
            Some(transfer_id) => Some(service.transfer_comparison(session, transfer_id)?),
            None => None,
        };
        if self.draft.is_none() {
            self.draft = comparison
                .as_ref()
                .map(|c| EscalationDraft::prefill(&c.transfer, &ticket.ticket_number, settings));
        }
        if comparison.is_none() {
            self.draft = None;
        }
        self.ticket = ticket;
        self.comparison = comparison;
        Ok(())
    }

    /// Assign the ticket to the session's agent, then re-query.
    pub fn assign_to_me<S: DataService + ?Sized>(
        &mut self,
        service: &mut S,
        session: &Session,
        settings: &DeskSettings,
    ) -> DeskResult<()> {
        service.assign_ticket(session, self.ticket.id, session.agent_id())?;
        self.reload(service, session, settings)
    }

    pub fn ticket(&self) -> &SupportTicket {
        &self.ticket
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        self.comparison
            .as_ref()
            .map(|c| c.mismatches.as_slice())
            .unwrap_or(&[])
    }

    pub fn mismatch_for(&self, field: ComparedField) -> Option<&Mismatch> {
        self.comparison.as_ref().and_then(|c| c.mismatch_for(field))
    }

    pub fn checklist(&self) -> &VerificationChecklist {
        &self.checklist
    }

    pub fn set(&mut self, field: ComparedField, checked: bool) {
        self.checklist.set(field, checked);
    }

    pub fn toggle(&mut self, field: ComparedField) -> bool {
        self.checklist.toggle(field)
    }

    pub fn draft(&self) -> Option<&EscalationDraft> {
        self.draft.as_ref()
    }

    /// None when the ticket has no transfer to escalate.
    pub fn draft_mut(&mut self) -> Option<&mut EscalationDraft> {
        self.draft.as_mut()
    }

    /// The full client-side guard, link check included.
    pub fn escalation_gate(&self) -> Result<(), EscalationBlocked> {
        if self.ticket.transfer_id.is_none() || self.comparison.is_none() {
            return Err(EscalationBlocked::MissingTransferLink);
        }
        checklist::gate(&self.checklist, self.mismatches())
    }

    pub fn can_escalate(&self) -> bool {
        self.escalation_gate().is_ok()
    }

    /// Submit the current draft, edits included, as exactly one
    /// `create_escalation` call. There is no retry; on failure the agent
    /// resubmits.
    pub fn submit_escalation<S: DataService + ?Sized>(
        &self,
        service: &mut S,
        session: &Session,
    ) -> DeskResult<EscalationTicket> {
        if let Err(blocked) = self.escalation_gate() {
            log::warn!("Escalation of {} refused: {blocked}", self.ticket.ticket_number);
            return Err(blocked.into());
        }
        let (Some(transfer_id), Some(draft)) = (self.ticket.transfer_id, self.draft.clone()) else {
            return Err(EscalationBlocked::MissingTransferLink.into());
        };
        let request = draft.into_request(self.ticket.id, transfer_id);
        match service.create_escalation(session, &request) {
            Ok(escalation) => {
                log::info!(
                    "Escalated {} as {}",
                    self.ticket.ticket_number,
                    escalation.ticket_key
                );
                Ok(escalation)
            }
            Err(e) => {
                log::warn!(
                    "Escalation of {} failed (retryable={}): {e}",
                    self.ticket.ticket_number,
                    e.is_retryable()
                );
                Err(e)
            }
        }
    }

    pub fn view(&self) -> ReviewView {
        ReviewView {
            ticket: self.ticket.clone(),
            comparison: self.comparison.clone(),
            checklist: self.checklist.as_map(),
            can_escalate: self.can_escalate(),
            blocked_reason: self.escalation_gate().err().map(|b| b.to_string()),
            draft: self.draft.clone(),
        }
    }
}

/// What the presentation layer renders for a review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub ticket: SupportTicket,
    pub comparison: Option<Comparison>,
    pub checklist: BTreeMap<&'static str, bool>,
    pub can_escalate: bool,
    pub blocked_reason: Option<String>,
    pub draft: Option<EscalationDraft>,
}
