//! Ticket review workflow against a scripted data service.
//!
//! The fake records every call so the tests can assert how many round
//! trips the review made, and what it sent.

use chrono::{TimeZone, Utc};
use transfer_desk_core::{
    comparator::{ComparedField, Comparison},
    config::{DeskConfig, DeskSettings},
    error::{DeskError, DeskResult, EscalationBlocked},
    escalation::{
        EscalationFilter, EscalationPriority, EscalationRequest, EscalationStatus, EscalationTicket,
    },
    review::TicketReview,
    service::DataService,
    session::{AgentProfile, AgentRole, Session},
    ticket::{SupportTicket, TicketFilter, TicketPriority, TicketStatus},
    transfer::{TransferRecord, VerificationForm},
    types::{AgentId, EscalationId, TicketId, TransferId},
};

enum Outcome {
    Accept,
    Transport,
    Reject,
}

struct ScriptedService {
    ticket: SupportTicket,
    transfer: TransferRecord,
    form: Option<VerificationForm>,
    outcome: Outcome,
    create_calls: Vec<EscalationRequest>,
    assign_calls: Vec<(TicketId, AgentId)>,
}

impl ScriptedService {
    fn new(form: Option<VerificationForm>) -> Self {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Self {
            ticket: SupportTicket {
                id: 11,
                ticket_number: "ZEN-100200".into(),
                customer_name: "Jane Doe".into(),
                customer_email: "jane@example.com".into(),
                subject: "Where is my TFSA?".into(),
                description: "Reference TX-100".into(),
                status: TicketStatus::Open,
                priority: TicketPriority::Normal,
                transfer_reference: Some("TX-100".into()),
                transfer_id: Some(7),
                assigned_agent: None,
                resolution_notes: None,
                created_at,
                updated_at: None,
            },
            transfer: TransferRecord {
                id: 7,
                reference_number: "TX-100".into(),
                customer_name: "Jane Doe".into(),
                from_institution: "TD Bank".into(),
                to_institution: "Wealthsimple".into(),
                account_number: "123".into(),
                account_type: "TFSA".into(),
                transfer_type: "full".into(),
                transfer_amount: 2500.0,
                status: "pending".into(),
                created_at,
                ..TransferRecord::default()
            },
            form,
            outcome: Outcome::Accept,
            create_calls: Vec::new(),
            assign_calls: Vec::new(),
        }
    }

    fn clean() -> Self {
        let form = VerificationForm {
            id: 3,
            form_number: "T2220-100".into(),
            transfer_id: 7,
            account_holder_name: "Jane Doe".into(),
            account_number_on_form: "123".into(),
            account_type_on_form: "TFSA".into(),
            transfer_amount_on_form: 2500.0,
            transfer_type_on_form: "full".into(),
            ..VerificationForm::default()
        };
        Self::new(Some(form))
    }

    fn unlinked() -> Self {
        let mut service = Self::clean();
        service.ticket.transfer_id = None;
        service.ticket.transfer_reference = None;
        service
    }
}

impl DataService for ScriptedService {
    fn get_ticket(&mut self, _session: &Session, ticket_id: TicketId) -> DeskResult<SupportTicket> {
        if ticket_id != self.ticket.id {
            return Err(DeskError::not_found("Support ticket", ticket_id));
        }
        Ok(self.ticket.clone())
    }

    fn transfer_comparison(
        &mut self,
        _session: &Session,
        transfer_id: TransferId,
    ) -> DeskResult<Comparison> {
        assert_eq!(transfer_id, self.transfer.id);
        Ok(Comparison::build(self.transfer.clone(), self.form.clone()))
    }

    fn assign_ticket(
        &mut self,
        _session: &Session,
        ticket_id: TicketId,
        agent_id: AgentId,
    ) -> DeskResult<()> {
        self.assign_calls.push((ticket_id, agent_id));
        self.ticket.assigned_agent = Some(agent_id);
        self.ticket.status = TicketStatus::InProgress;
        Ok(())
    }

    fn create_escalation(
        &mut self,
        session: &Session,
        request: &EscalationRequest,
    ) -> DeskResult<EscalationTicket> {
        self.create_calls.push(request.clone());
        match self.outcome {
            Outcome::Transport => Err(DeskError::Transport {
                operation: "create_escalation",
                message: "connection reset".into(),
            }),
            Outcome::Reject => Err(DeskError::validation("summary", "must not be blank")),
            Outcome::Accept => Ok(EscalationTicket {
                id: 1,
                ticket_key: "XFER-1001".into(),
                source_ticket_id: request.source_ticket_id,
                transfer_id: request.transfer_id,
                summary: request.summary.clone(),
                description: request.description.clone(),
                priority: request.priority,
                status: EscalationStatus::ToDo,
                assignee: None,
                created_by: session.agent_id(),
                resolution: None,
                resolved_at: None,
                created_at: self.ticket.created_at,
                updated_at: None,
            }),
        }
    }

    fn list_tickets(&mut self, _session: &Session, _filter: &TicketFilter) -> DeskResult<Vec<SupportTicket>> {
        Ok(vec![self.ticket.clone()])
    }

    fn list_escalations(
        &mut self,
        _session: &Session,
        _filter: &EscalationFilter,
    ) -> DeskResult<Vec<EscalationTicket>> {
        Ok(Vec::new())
    }

    fn update_escalation_status(
        &mut self,
        _session: &Session,
        _escalation_id: EscalationId,
        _status: EscalationStatus,
    ) -> DeskResult<()> {
        Ok(())
    }
}

fn session() -> Session {
    Session::new(
        "token-1",
        AgentProfile {
            id: 5,
            username: "sarah.mitchell".into(),
            email: "sarah.mitchell@example.com".into(),
            full_name: "Sarah Mitchell".into(),
            role: AgentRole::CsAgent,
            is_admin: false,
            is_active: true,
        },
    )
}

fn settings() -> DeskSettings {
    DeskConfig::default_test().settings
}

fn check_all(review: &mut TicketReview) {
    for field in ComparedField::ALL {
        review.set(field, true);
    }
}

#[test]
fn review_loads_comparison_and_prefilled_draft() {
    let mut service = ScriptedService::clean();
    let review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();

    assert!(review.comparison().is_some());
    assert!(review.mismatches().is_empty());
    let draft = review.draft().expect("linked ticket has a draft");
    assert!(draft.summary.contains("TX-100"));
    assert!(draft.description.contains("2500"));
    assert!(!review.can_escalate(), "checklist starts unchecked");
}

#[test]
fn unlinked_ticket_has_no_comparison_and_cannot_escalate() {
    let mut service = ScriptedService::unlinked();
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut review);

    assert!(review.comparison().is_none());
    assert!(review.draft().is_none());
    assert_eq!(review.escalation_gate(), Err(EscalationBlocked::MissingTransferLink));

    let err = review.submit_escalation(&mut service, &session()).unwrap_err();
    assert!(err.is_precondition());
    assert!(service.create_calls.is_empty());
}

#[test]
fn blocked_submission_issues_no_call() {
    let mut service = ScriptedService::clean();
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    review.set(ComparedField::AccountNumber, true);

    let err = review.submit_escalation(&mut service, &session()).unwrap_err();
    assert!(err.is_precondition());
    assert!(!err.is_retryable());
    assert!(service.create_calls.is_empty());
}

#[test]
fn mismatch_blocks_regardless_of_checklist() {
    let mut service = ScriptedService::clean();
    if let Some(form) = service.form.as_mut() {
        form.account_number_on_form = "124".into();
    }
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut review);

    assert!(review.mismatch_for(ComparedField::AccountNumber).is_some());
    assert_eq!(
        review.escalation_gate(),
        Err(EscalationBlocked::UnresolvedMismatches { count: 1 })
    );
    assert!(review.submit_escalation(&mut service, &session()).is_err());
    assert!(service.create_calls.is_empty());
}

#[test]
fn submission_sends_edited_draft_exactly_once() {
    let mut service = ScriptedService::clean();
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut review);
    if let Some(draft) = review.draft_mut() {
        draft.summary = "Escalating TX-100 after callback".into();
        draft.priority = EscalationPriority::High;
    }

    let escalation = review.submit_escalation(&mut service, &session()).unwrap();

    assert_eq!(service.create_calls.len(), 1);
    let sent = &service.create_calls[0];
    assert_eq!(sent.source_ticket_id, 11);
    assert_eq!(sent.transfer_id, 7);
    assert_eq!(sent.summary, "Escalating TX-100 after callback");
    assert_eq!(sent.priority, EscalationPriority::High);
    assert_eq!(escalation.ticket_key, "XFER-1001");
    assert_eq!(escalation.created_by, 5);
}

#[test]
fn transport_failure_is_retryable_and_leaves_review_intact() {
    let mut service = ScriptedService::clean();
    service.outcome = Outcome::Transport;
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut review);
    let before = review.view();

    let err = review.submit_escalation(&mut service, &session()).unwrap_err();
    assert!(err.is_retryable());
    assert!(!err.is_validation());
    assert_eq!(service.create_calls.len(), 1, "no automatic retry");

    let after = review.view();
    assert_eq!(before.checklist, after.checklist);
    assert_eq!(before.draft, after.draft);
    assert!(after.can_escalate);

    // The agent resubmits by hand.
    service.outcome = Outcome::Accept;
    review.submit_escalation(&mut service, &session()).unwrap();
    assert_eq!(service.create_calls.len(), 2);
}

#[test]
fn validation_failure_is_not_retryable() {
    let mut service = ScriptedService::clean();
    service.outcome = Outcome::Reject;
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut review);

    let err = review.submit_escalation(&mut service, &session()).unwrap_err();
    assert!(err.is_validation());
    assert!(!err.is_retryable());
    assert!(!err.is_precondition());
}

#[test]
fn assign_to_me_keeps_checklist_and_draft_edits() {
    let mut service = ScriptedService::clean();
    let mut review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    review.set(ComparedField::AccountType, true);
    if let Some(draft) = review.draft_mut() {
        draft.description.push_str("\nCalled TD Bank.");
    }

    review.assign_to_me(&mut service, &session(), &settings()).unwrap();

    assert_eq!(service.assign_calls, vec![(11, 5)]);
    assert_eq!(review.ticket().status, TicketStatus::InProgress);
    assert_eq!(review.ticket().assigned_agent, Some(5));
    assert!(review.checklist().is_checked(ComparedField::AccountType));
    assert!(review.draft().unwrap().description.ends_with("Called TD Bank."));
}

#[test]
fn reloading_a_ticket_starts_with_a_fresh_checklist() {
    let mut service = ScriptedService::clean();
    let mut first = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    check_all(&mut first);
    assert!(first.can_escalate());

    let second = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    assert!(!second.can_escalate());
    assert!(second.view().checklist.values().all(|checked| !checked));
}

#[test]
fn view_reports_blocked_reason() {
    let mut service = ScriptedService::clean();
    let review = TicketReview::load(&mut service, &session(), 11, &settings()).unwrap();
    let view = review.view();

    assert!(!view.can_escalate);
    let reason = view.blocked_reason.expect("blocked");
    assert!(reason.contains("checklist"), "unexpected reason: {reason}");
    assert_eq!(view.checklist.len(), ComparedField::ALL.len());
}
