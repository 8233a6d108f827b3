//! The data-service contract the review workflow consumes.
//!
//! RULE: Commands and queries are separate. A mutating call returns
//! nothing the caller should treat as fresh state (apart from the
//! created escalation itself); the caller re-queries explicitly.

use crate::{
    comparator::Comparison,
    error::DeskResult,
    escalation::{EscalationFilter, EscalationRequest, EscalationStatus, EscalationTicket},
    session::Session,
    ticket::{SupportTicket, TicketFilter},
    types::{AgentId, EscalationId, TicketId, TransferId},
};

pub trait DataService {
    fn get_ticket(&mut self, session: &Session, ticket_id: TicketId) -> DeskResult<SupportTicket>;

    fn transfer_comparison(
        &mut self,
        session: &Session,
        transfer_id: TransferId,
    ) -> DeskResult<Comparison>;

    fn assign_ticket(
        &mut self,
        session: &Session,
        ticket_id: TicketId,
        agent_id: AgentId,
    ) -> DeskResult<()>;

    fn create_escalation(
        &mut self,
        session: &Session,
        request: &EscalationRequest,
    ) -> DeskResult<EscalationTicket>;

    fn list_tickets(
        &mut self,
        session: &Session,
        filter: &TicketFilter,
    ) -> DeskResult<Vec<SupportTicket>>;

    fn list_escalations(
        &mut self,
        session: &Session,
        filter: &EscalationFilter,
    ) -> DeskResult<Vec<EscalationTicket>>;

    /// The service is the authority on transitions and may refuse one.
    fn update_escalation_status(
        &mut self,
        session: &Session,
        escalation_id: EscalationId,
        status: EscalationStatus,
    ) -> DeskResult<()>;
}
