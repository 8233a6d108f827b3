//! Store-backed desk tests over the in-code fixture set.
//!
//! Seeded ids: agents sarah.mitchell=1, transfers.team=2, admin=3,
//! former.agent=4 (inactive). Tickets 1..=4 link transfers 1..=4 in
//! fixture order; ticket 5 is unlinked. Transfer 1 is the clean one.

use transfer_desk_core::{
    comparator::ComparedField,
    desk::LocalDesk,
    error::DeskError,
    escalation::{EscalationFilter, EscalationPriority, EscalationRequest, EscalationStatus},
    review::TicketReview,
    service::DataService,
    session::Session,
    ticket::{NewSupportTicket, TicketFilter, TicketPriority, TicketStatus},
};

fn desk_with_session() -> (LocalDesk, Session) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut desk = LocalDesk::build_test().unwrap();
    let session = desk.login("sarah.mitchell").unwrap();
    (desk, session)
}

fn request(ticket_id: i64, transfer_id: i64) -> EscalationRequest {
    EscalationRequest {
        source_ticket_id: ticket_id,
        transfer_id,
        summary: "Transfer Escalation: TRF-2024-001001 - Michael Thompson".into(),
        description: "Amount: $45000.00 CAD".into(),
        priority: EscalationPriority::Medium,
        assignee: None,
    }
}

// ── Sessions ───────────────────────────────────────────────

#[test]
fn login_issues_distinct_tokens() {
    let mut desk = LocalDesk::build_test().unwrap();
    let a = desk.login("sarah.mitchell").unwrap();
    let b = desk.login("sarah.mitchell").unwrap();
    assert_ne!(a.token, b.token);
    assert_eq!(a.agent.username, "sarah.mitchell");
    assert_eq!(desk.store.event_count("agent_logged_in").unwrap(), 2);
}

#[test]
fn unknown_and_inactive_agents_cannot_log_in() {
    let mut desk = LocalDesk::build_test().unwrap();
    assert!(matches!(desk.login("nobody"), Err(DeskError::Unauthorized)));
    assert!(matches!(desk.login("former.agent"), Err(DeskError::Unauthorized)));
}

#[test]
fn forged_and_revoked_tokens_are_rejected() {
    let (mut desk, session) = desk_with_session();

    let forged = Session::new("not-a-token", session.agent.clone());
    assert!(matches!(desk.get_ticket(&forged, 1), Err(DeskError::Unauthorized)));
    let empty = Session::new("", session.agent.clone());
    assert!(matches!(desk.get_ticket(&empty, 1), Err(DeskError::Unauthorized)));

    desk.logout(&session).unwrap();
    assert!(matches!(desk.get_ticket(&session, 1), Err(DeskError::Unauthorized)));
}

// ── Tickets ────────────────────────────────────────────────

#[test]
fn seeded_queue_lists_every_ticket() {
    let (mut desk, session) = desk_with_session();
    let tickets = desk.list_tickets(&session, &TicketFilter::default()).unwrap();
    assert_eq!(tickets.len(), 5);
    assert_eq!(tickets.iter().filter(|t| t.is_linked()).count(), 4);
}

#[test]
fn ticket_filters_narrow_the_queue() {
    let (mut desk, session) = desk_with_session();

    let urgent = desk
        .list_tickets(&session, &TicketFilter::with_priority(TicketPriority::Urgent))
        .unwrap();
    assert_eq!(urgent.len(), 1);
    assert_eq!(urgent[0].ticket_number, "ZEN-892623");

    let paged = TicketFilter { offset: 1, limit: 2, ..TicketFilter::default() };
    assert_eq!(desk.list_tickets(&session, &paged).unwrap().len(), 2);

    let pending = desk
        .list_tickets(&session, &TicketFilter::with_status(TicketStatus::Pending))
        .unwrap();
    assert!(pending.is_empty());
}

#[test]
fn missing_ticket_is_not_found() {
    let (mut desk, session) = desk_with_session();
    let err = desk.get_ticket(&session, 999).unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
    assert!(err.is_validation());
}

#[test]
fn assign_moves_ticket_in_progress() {
    let (mut desk, session) = desk_with_session();
    desk.assign_ticket(&session, 1, session.agent_id()).unwrap();

    let ticket = desk.get_ticket(&session, 1).unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.assigned_agent, Some(session.agent_id()));

    let mine = TicketFilter { assigned_to: Some(session.agent_id()), ..TicketFilter::default() };
    assert_eq!(desk.list_tickets(&session, &mine).unwrap().len(), 1);
    assert_eq!(desk.store.event_count("ticket_assigned").unwrap(), 1);
}

#[test]
fn assigning_to_inactive_agent_is_refused() {
    let (mut desk, session) = desk_with_session();
    let err = desk.assign_ticket(&session, 1, 4).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(desk.get_ticket(&session, 1).unwrap().status, TicketStatus::Open);
}

#[test]
fn created_ticket_links_known_reference() {
    let (mut desk, session) = desk_with_session();
    let new_ticket = NewSupportTicket {
        customer_name: "Michael Thompson".into(),
        customer_email: "michael.t@example.com".into(),
        subject: "Following up".into(),
        description: "Any news?".into(),
        priority: TicketPriority::Normal,
        transfer_reference: Some("TRF-2024-001001".into()),
    };
    let ticket = desk.create_ticket(&session, &new_ticket).unwrap();

    assert_eq!(ticket.transfer_id, Some(1));
    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(ticket.ticket_number.starts_with("ZEN-"));
    assert_eq!(ticket.ticket_number.len(), "ZEN-".len() + 6);
}

#[test]
fn created_ticket_with_unknown_reference_stays_unlinked() {
    let (mut desk, session) = desk_with_session();
    let new_ticket = NewSupportTicket {
        customer_name: "Olivia Park".into(),
        customer_email: "olivia@example.com".into(),
        subject: "Transfer".into(),
        description: "TRF-0000".into(),
        priority: TicketPriority::Low,
        transfer_reference: Some("TRF-0000".into()),
    };
    let ticket = desk.create_ticket(&session, &new_ticket).unwrap();
    assert_eq!(ticket.transfer_id, None);
    assert_eq!(ticket.transfer_reference.as_deref(), Some("TRF-0000"));
}

#[test]
fn created_ticket_requires_valid_fields() {
    let (mut desk, session) = desk_with_session();
    let bad = NewSupportTicket {
        customer_name: "Olivia Park".into(),
        customer_email: "not-an-email".into(),
        subject: "Hello".into(),
        description: String::new(),
        priority: TicketPriority::Low,
        transfer_reference: None,
    };
    let err = desk.create_ticket(&session, &bad).unwrap_err();
    assert!(matches!(err, DeskError::Validation { field: "customer_email", .. }));
}

#[test]
fn status_update_keeps_notes() {
    let (mut desk, session) = desk_with_session();
    desk.update_ticket_status(&session, 5, TicketStatus::Resolved, Some("Answered by email"))
        .unwrap();
    desk.update_ticket_status(&session, 5, TicketStatus::Closed, None).unwrap();

    let ticket = desk.get_ticket(&session, 5).unwrap();
    assert_eq!(ticket.status, TicketStatus::Closed);
    assert_eq!(ticket.resolution_notes.as_deref(), Some("Answered by email"));
}

// ── Transfers and forms ────────────────────────────────────

#[test]
fn comparison_reports_seeded_mismatches() {
    let (mut desk, session) = desk_with_session();

    assert!(desk.transfer_comparison(&session, 1).unwrap().is_clean());

    let account = desk.transfer_comparison(&session, 2).unwrap();
    assert_eq!(account.mismatches.len(), 1);
    assert_eq!(account.mismatches[0].field, ComparedField::AccountNumber);

    let double = desk.transfer_comparison(&session, 4).unwrap();
    let fields: Vec<_> = double.mismatches.iter().map(|m| m.field).collect();
    assert_eq!(fields, vec![ComparedField::AccountType, ComparedField::TransferAmount]);
}

#[test]
fn transfer_lookup_by_reference() {
    let (desk, session) = desk_with_session();
    let transfer = desk.transfer_by_reference(&session, "TRF-2024-001004").unwrap();
    assert_eq!(transfer.customer_name, "Amanda Lee");
    assert!(desk.transfer_by_reference(&session, "TRF-missing").is_err());
    assert_eq!(desk.list_transfers(&session, Some("pending")).unwrap().len(), 4);
    assert!(desk.list_transfers(&session, Some("completed")).unwrap().is_empty());
}

#[test]
fn verifying_a_form_records_provenance() {
    let (mut desk, session) = desk_with_session();
    let form = desk.form_for_transfer(&session, 1).unwrap().expect("seeded form");
    assert!(!form.verified);

    desk.verify_form(&session, form.id, true, Some("Matches ledger")).unwrap();

    let form = desk.form_for_transfer(&session, 1).unwrap().unwrap();
    assert!(form.verified);
    assert_eq!(form.verified_by, Some(session.agent_id()));
    assert!(form.verified_at.is_some());
    assert_eq!(form.verification_notes.as_deref(), Some("Matches ledger"));
}

#[test]
fn form_listing_filters_on_verification() {
    let (mut desk, session) = desk_with_session();
    assert_eq!(desk.list_forms(&session, None).unwrap().len(), 4);
    assert!(desk.list_forms(&session, Some(true)).unwrap().is_empty());

    let form = desk.form_for_transfer(&session, 2).unwrap().unwrap();
    desk.verify_form(&session, form.id, true, None).unwrap();

    let verified = desk.list_forms(&session, Some(true)).unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].transfer_id, 2);
    assert_eq!(desk.list_forms(&session, Some(false)).unwrap().len(), 3);
}

#[test]
fn transfer_update_changes_only_given_fields() {
    let (mut desk, session) = desk_with_session();
    let updated = desk
        .update_transfer(&session, 1, Some("completed"), None)
        .unwrap();
    assert_eq!(updated.status, "completed");
    assert!(updated.updated_at.is_some());
    assert_eq!(updated.account_number, "4567890123");

    let noted = desk
        .update_transfer(&session, 1, None, Some("Funds received"))
        .unwrap();
    assert_eq!(noted.status, "completed");
    assert_eq!(noted.notes.as_deref(), Some("Funds received"));
    assert_eq!(desk.store.event_count("transfer_updated").unwrap(), 2);

    let stats = desk.dashboard_stats(&session).unwrap();
    assert_eq!(stats.transfers_by_status.get("completed"), Some(&1));
}

#[test]
fn transfer_update_rejects_blank_status_and_unknown_id() {
    let (mut desk, session) = desk_with_session();
    let err = desk.update_transfer(&session, 1, Some("  "), None).unwrap_err();
    assert!(matches!(err, DeskError::Validation { field: "status", .. }));
    let err = desk.update_transfer(&session, 99, Some("failed"), None).unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
    assert_eq!(desk.store.event_count("transfer_updated").unwrap(), 0);
}

// ── Escalations ────────────────────────────────────────────

#[test]
fn escalation_gets_first_key_and_parks_source_ticket() {
    let (mut desk, session) = desk_with_session();
    let escalation = desk.create_escalation(&session, &request(1, 1)).unwrap();

    assert_eq!(escalation.ticket_key, "XFER-1001");
    assert_eq!(escalation.status, EscalationStatus::ToDo);
    assert_eq!(escalation.created_by, session.agent_id());
    assert_eq!(desk.get_ticket(&session, 1).unwrap().status, TicketStatus::Pending);

    let second = desk.create_escalation(&session, &request(1, 1)).unwrap();
    assert_eq!(second.ticket_key, "XFER-1002");
}

#[test]
fn escalation_with_blank_summary_is_rejected() {
    let (mut desk, session) = desk_with_session();
    let mut blank = request(1, 1);
    blank.summary = "   ".into();
    let err = desk.create_escalation(&session, &blank).unwrap_err();
    assert!(err.is_validation());
    assert!(!err.is_retryable());
    assert_eq!(desk.store.event_count("escalation_created").unwrap(), 0);
}

#[test]
fn escalation_for_unlinked_transfer_is_rejected() {
    let (mut desk, session) = desk_with_session();
    let err = desk.create_escalation(&session, &request(1, 2)).unwrap_err();
    assert!(matches!(err, DeskError::Validation { field: "transfer_id", .. }));
    let err = desk.create_escalation(&session, &request(1, 99)).unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
}

#[test]
fn done_stamps_resolved_at_and_filters_follow_status() {
    let (mut desk, session) = desk_with_session();
    let escalation = desk.create_escalation(&session, &request(1, 1)).unwrap();
    assert!(escalation.resolved_at.is_none());

    desk.update_escalation_status(&session, escalation.id, EscalationStatus::InProgress)
        .unwrap();
    desk.update_escalation_status(&session, escalation.id, EscalationStatus::Done)
        .unwrap();

    let done = desk.get_escalation(&session, escalation.id).unwrap();
    assert_eq!(done.status, EscalationStatus::Done);
    assert!(done.resolved_at.is_some());

    let listed = desk
        .list_escalations(&session, &EscalationFilter::with_status(EscalationStatus::Done))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(desk
        .list_escalations(&session, &EscalationFilter::with_status(EscalationStatus::ToDo))
        .unwrap()
        .is_empty());
    assert_eq!(desk.store.event_count("escalation_status_changed").unwrap(), 2);
}

#[test]
fn unchanged_escalation_status_records_nothing() {
    let (mut desk, session) = desk_with_session();
    let escalation = desk.create_escalation(&session, &request(1, 1)).unwrap();
    desk.update_escalation_status(&session, escalation.id, EscalationStatus::ToDo)
        .unwrap();
    assert_eq!(desk.store.event_count("escalation_status_changed").unwrap(), 0);
}

#[test]
fn dashboard_counts_follow_mutations() {
    let (mut desk, session) = desk_with_session();
    let before = desk.dashboard_stats(&session).unwrap();
    assert_eq!(before.open_tickets, 5);
    assert_eq!(before.transfers_by_status.get("pending"), Some(&4));

    desk.assign_ticket(&session, 2, session.agent_id()).unwrap();
    desk.create_escalation(&session, &request(1, 1)).unwrap();

    let after = desk.dashboard_stats(&session).unwrap();
    assert_eq!(after.open_tickets, 3);
    assert_eq!(after.in_progress_tickets, 1);
    assert_eq!(after.pending_tickets, 1);
    assert_eq!(after.escalations_to_do, 1);
}

// ── End to end ─────────────────────────────────────────────

#[test]
fn review_against_local_desk_escalates_clean_ticket() {
    let (mut desk, session) = desk_with_session();
    let settings = desk.settings().clone();
    let mut review = TicketReview::load(&mut desk, &session, 1, &settings).unwrap();

    review.assign_to_me(&mut desk, &session, &settings).unwrap();
    assert_eq!(review.ticket().status, TicketStatus::InProgress);

    for field in ComparedField::ALL {
        review.toggle(field);
    }
    let escalation = review.submit_escalation(&mut desk, &session).unwrap();

    assert_eq!(escalation.ticket_key, "XFER-1001");
    assert!(escalation.description.contains("TRF-2024-001001"));
    assert!(escalation.description.contains("45000"));
    assert_eq!(desk.get_ticket(&session, 1).unwrap().status, TicketStatus::Pending);
}

#[test]
fn review_of_mismatched_ticket_never_reaches_the_store() {
    let (mut desk, session) = desk_with_session();
    let settings = desk.settings().clone();
    let mut review = TicketReview::load(&mut desk, &session, 2, &settings).unwrap();
    for field in ComparedField::ALL {
        review.set(field, true);
    }

    let err = review.submit_escalation(&mut desk, &session).unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(desk.store.event_count("escalation_created").unwrap(), 0);
}
