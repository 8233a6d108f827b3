//! The store-backed data service.
//!
//! `LocalDesk` is the authority for ticket, transfer, form and
//! escalation records. It authenticates every call against the session
//! table, validates what it is asked to write, and records each
//! mutation in the event log.

use crate::{
    clock::DeskClock,
    comparator::Comparison,
    config::{DeskConfig, DeskSettings},
    error::{DeskError, DeskResult},
    escalation::{
        escalation_key, EscalationFilter, EscalationRequest, EscalationStatus, EscalationTicket,
    },
    event::{DeskEvent, EventLogEntry},
    rng::TicketNumberRng,
    seed,
    service::DataService,
    session::{AgentProfile, Session},
    store::DeskStore,
    ticket::{NewSupportTicket, SupportTicket, TicketFilter, TicketStatus},
    transfer::{TransferRecord, VerificationForm},
    types::{AgentId, EscalationId, FormId, TicketId, TransferId},
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_TICKET_NUMBER_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub open_tickets: i64,
    pub in_progress_tickets: i64,
    pub pending_tickets: i64,
    pub escalations_to_do: i64,
    pub escalations_in_progress: i64,
    pub escalations_done: i64,
    pub transfers_by_status: BTreeMap<String, i64>,
}

pub struct LocalDesk {
    pub store: DeskStore,
    settings: DeskSettings,
    clock: DeskClock,
    ticket_numbers: TicketNumberRng,
}

impl LocalDesk {
    pub fn new(store: DeskStore, settings: DeskSettings, clock: DeskClock) -> Self {
        let ticket_numbers = TicketNumberRng::new(settings.seed);
        Self {
            store,
            settings,
            clock,
            ticket_numbers,
        }
    }

    /// Migrate, seed an empty database from `config`, and wire the desk.
    pub fn build(store: DeskStore, config: &DeskConfig, clock: DeskClock) -> DeskResult<Self> {
        store.migrate()?;
        if seed::seed_if_empty(&store, config, &clock)? {
            log::info!(
                "Seeded {} agents, {} transfers, {} tickets",
                config.agents.len(),
                config.transfers.len(),
                config.tickets.len()
            );
        }
        Ok(Self::new(store, config.settings.clone(), clock))
    }

    /// In-memory desk over `DeskConfig::default_test()` with a pinned clock.
    pub fn build_test() -> DeskResult<Self> {
        let store = DeskStore::in_memory()?;
        let pinned = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("Invalid test clock instant"))?;
        let clock = DeskClock::Fixed(pinned);
        Self::build(store, &DeskConfig::default_test(), clock)
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    pub fn clock(&self) -> DeskClock {
        self.clock
    }

    fn authenticate(&self, session: &Session) -> DeskResult<AgentProfile> {
        if session.token.is_empty() {
            return Err(DeskError::Unauthorized);
        }
        self.store
            .agent_for_token(&session.token)?
            .ok_or(DeskError::Unauthorized)
    }

    fn record(&self, actor: Option<AgentId>, event: DeskEvent) -> DeskResult<()> {
        let entry = EventLogEntry {
            id: None,
            occurred_at: self.clock.now(),
            actor,
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)
    }

    fn require_ticket(&self, ticket_id: TicketId) -> DeskResult<SupportTicket> {
        self.store
            .get_ticket(ticket_id)?
            .ok_or_else(|| DeskError::not_found("Support ticket", ticket_id))
    }

    fn require_transfer(&self, transfer_id: TransferId) -> DeskResult<TransferRecord> {
        self.store
            .get_transfer(transfer_id)?
            .ok_or_else(|| DeskError::not_found("Transfer", transfer_id))
    }

    fn require_escalation(&self, escalation_id: EscalationId) -> DeskResult<EscalationTicket> {
        self.store
            .get_escalation(escalation_id)?
            .ok_or_else(|| DeskError::not_found("Escalation", escalation_id))
    }

    fn next_ticket_number(&mut self) -> DeskResult<String> {
        for _ in 0..MAX_TICKET_NUMBER_ATTEMPTS {
            let candidate = format!(
                "{}-{}",
                self.settings.ticket_number_prefix,
                self.ticket_numbers.next_digits(self.settings.ticket_number_digits)
            );
            if !self.store.ticket_number_exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(anyhow::anyhow!(
            "No free ticket number after {MAX_TICKET_NUMBER_ATTEMPTS} attempts"
        )
        .into())
    }

    // ── Sessions ───────────────────────────────────────────────

    /// Credential checks happen upstream; the desk only issues the token.
    pub fn login(&mut self, username: &str) -> DeskResult<Session> {
        let agent = self
            .store
            .agent_by_username(username)?
            .filter(|agent| agent.is_active)
            .ok_or(DeskError::Unauthorized)?;
        let token = uuid::Uuid::new_v4().to_string();
        self.store.in_transaction(|store| {
            store.insert_session(&token, agent.id, self.clock.now())?;
            self.record(Some(agent.id), DeskEvent::AgentLoggedIn { agent_id: agent.id })
        })?;
        log::info!("Agent {} logged in", agent.username);
        Ok(Session::new(token, agent))
    }

    pub fn logout(&mut self, session: &Session) -> DeskResult<()> {
        let agent = self.authenticate(session)?;
        self.store.in_transaction(|store| {
            store.revoke_session(&session.token, self.clock.now())?;
            self.record(Some(agent.id), DeskEvent::AgentLoggedOut { agent_id: agent.id })
        })?;
        log::info!("Agent {} logged out", agent.username);
        Ok(())
    }

    // ── Support tickets ────────────────────────────────────────

    /// Links the transfer when `transfer_reference` names a known one.
    /// An unknown reference is kept as text and the ticket stays unlinked.
    pub fn create_ticket(
        &mut self,
        session: &Session,
        new_ticket: &NewSupportTicket,
    ) -> DeskResult<SupportTicket> {
        let agent = self.authenticate(session)?;
        if new_ticket.customer_name.trim().is_empty() {
            return Err(DeskError::validation("customer_name", "must not be blank"));
        }
        if new_ticket.subject.trim().is_empty() {
            return Err(DeskError::validation("subject", "must not be blank"));
        }
        if !new_ticket.customer_email.contains('@') {
            return Err(DeskError::validation("customer_email", "not an email address"));
        }

        let transfer_id = match new_ticket.transfer_reference.as_deref() {
            Some(reference) => self.store.transfer_by_reference(reference)?.map(|t| t.id),
            None => None,
        };
        let ticket_number = self.next_ticket_number()?;
        let ticket_id = self.store.in_transaction(|store| {
            let ticket_id = store.insert_ticket(
                &ticket_number,
                new_ticket,
                TicketStatus::Open,
                transfer_id,
                self.clock.now(),
            )?;
            self.record(
                Some(agent.id),
                DeskEvent::TicketCreated {
                    ticket_id,
                    ticket_number: ticket_number.clone(),
                    transfer_id,
                },
            )?;
            Ok(ticket_id)
        })?;
        log::info!("Ticket {ticket_number} created by {}", agent.username);
        self.require_ticket(ticket_id)
    }

    pub fn update_ticket_status(
        &mut self,
        session: &Session,
        ticket_id: TicketId,
        status: TicketStatus,
        resolution_notes: Option<&str>,
    ) -> DeskResult<()> {
        let agent = self.authenticate(session)?;
        let ticket = self.require_ticket(ticket_id)?;
        self.store.in_transaction(|store| {
            store.set_ticket_status(ticket_id, status, resolution_notes, self.clock.now())?;
            if ticket.status != status {
                self.record(
                    Some(agent.id),
                    DeskEvent::TicketStatusChanged { ticket_id, from: ticket.status, to: status },
                )?;
            }
            Ok(())
        })?;
        log::info!(
            "Ticket {} {} -> {} by {}",
            ticket.ticket_number,
            ticket.status,
            status,
            agent.username
        );
        Ok(())
    }

    // ── Transfers and forms ────────────────────────────────────

    pub fn get_transfer(&self, session: &Session, transfer_id: TransferId) -> DeskResult<TransferRecord> {
        self.authenticate(session)?;
        self.require_transfer(transfer_id)
    }

    pub fn transfer_by_reference(
        &self,
        session: &Session,
        reference_number: &str,
    ) -> DeskResult<TransferRecord> {
        self.authenticate(session)?;
        self.store
            .transfer_by_reference(reference_number)?
            .ok_or_else(|| DeskError::not_found("Transfer", reference_number))
    }

    pub fn list_transfers(
        &self,
        session: &Session,
        status: Option<&str>,
    ) -> DeskResult<Vec<TransferRecord>> {
        self.authenticate(session)?;
        self.store
            .list_transfers(status, 0, crate::ticket::default_page_size())
    }

    pub fn form_for_transfer(
        &self,
        session: &Session,
        transfer_id: TransferId,
    ) -> DeskResult<Option<VerificationForm>> {
        self.authenticate(session)?;
        self.store.form_for_transfer(transfer_id)
    }

    /// Forms newest first; `verified` of None lists all of them.
    pub fn list_forms(
        &self,
        session: &Session,
        verified: Option<bool>,
    ) -> DeskResult<Vec<VerificationForm>> {
        self.authenticate(session)?;
        self.store
            .list_forms(verified, 0, crate::ticket::default_page_size())
    }

    /// Ledger-side correction of status and notes. Compared fields are
    /// not editable here.
    pub fn update_transfer(
        &mut self,
        session: &Session,
        transfer_id: TransferId,
        status: Option<&str>,
        notes: Option<&str>,
    ) -> DeskResult<TransferRecord> {
        let agent = self.authenticate(session)?;
        let transfer = self.require_transfer(transfer_id)?;
        if status.is_some_and(|s| s.trim().is_empty()) {
            return Err(DeskError::validation("status", "must not be blank"));
        }
        self.store.in_transaction(|store| {
            store.update_transfer(transfer_id, status, notes, self.clock.now())?;
            self.record(
                Some(agent.id),
                DeskEvent::TransferUpdated {
                    transfer_id,
                    from_status: transfer.status.clone(),
                    to_status: status.unwrap_or(&transfer.status).to_string(),
                },
            )
        })?;
        log::info!(
            "Transfer {} updated by {}",
            transfer.reference_number,
            agent.username
        );
        self.require_transfer(transfer_id)
    }

    /// Records the acting agent and the time as verification provenance.
    pub fn verify_form(
        &mut self,
        session: &Session,
        form_id: FormId,
        verified: bool,
        notes: Option<&str>,
    ) -> DeskResult<()> {
        let agent = self.authenticate(session)?;
        let form = self
            .store
            .get_form(form_id)?
            .ok_or_else(|| DeskError::not_found("Verification form", form_id))?;
        self.store.in_transaction(|store| {
            store.set_form_verification(form_id, verified, notes, agent.id, self.clock.now())?;
            self.record(
                Some(agent.id),
                DeskEvent::FormVerified { form_id, transfer_id: form.transfer_id, verified },
            )
        })?;
        log::info!(
            "Form {} marked verified={verified} by {}",
            form.form_number,
            agent.username
        );
        Ok(())
    }

    // ── Escalations ────────────────────────────────────────────

    pub fn get_escalation(
        &self,
        session: &Session,
        escalation_id: EscalationId,
    ) -> DeskResult<EscalationTicket> {
        self.authenticate(session)?;
        self.require_escalation(escalation_id)
    }

    // ── Dashboard ──────────────────────────────────────────────

    pub fn dashboard_stats(&self, session: &Session) -> DeskResult<DashboardStats> {
        self.authenticate(session)?;
        Ok(DashboardStats {
            open_tickets: self.store.ticket_count_with_status(TicketStatus::Open)?,
            in_progress_tickets: self.store.ticket_count_with_status(TicketStatus::InProgress)?,
            pending_tickets: self.store.ticket_count_with_status(TicketStatus::Pending)?,
            escalations_to_do: self.store.escalation_count_with_status(EscalationStatus::ToDo)?,
            escalations_in_progress: self
                .store
                .escalation_count_with_status(EscalationStatus::InProgress)?,
            escalations_done: self.store.escalation_count_with_status(EscalationStatus::Done)?,
            transfers_by_status: self.store.transfer_counts_by_status()?,
        })
    }
}

impl DataService for LocalDesk {
    fn get_ticket(&mut self, session: &Session, ticket_id: TicketId) -> DeskResult<SupportTicket> {
        self.authenticate(session)?;
        self.require_ticket(ticket_id)
    }

    fn transfer_comparison(
        &mut self,
        session: &Session,
        transfer_id: TransferId,
    ) -> DeskResult<Comparison> {
        self.authenticate(session)?;
        let transfer = self.require_transfer(transfer_id)?;
        let form = self.store.form_for_transfer(transfer_id)?;
        let comparison = Comparison::build(transfer, form);
        log::debug!(
            "Comparison for transfer {}: form={} mismatches={}",
            comparison.transfer.reference_number,
            comparison.has_form(),
            comparison.mismatches.len()
        );
        Ok(comparison)
    }

    fn assign_ticket(
        &mut self,
        session: &Session,
        ticket_id: TicketId,
        agent_id: AgentId,
    ) -> DeskResult<()> {
        let actor = self.authenticate(session)?;
        let ticket = self.require_ticket(ticket_id)?;
        let assignee = self
            .store
            .get_agent(agent_id)?
            .filter(|agent| agent.is_active)
            .ok_or_else(|| DeskError::not_found("Agent", agent_id))?;

        self.store.in_transaction(|store| {
            store.assign_ticket(ticket_id, agent_id, TicketStatus::InProgress, self.clock.now())?;
            self.record(Some(actor.id), DeskEvent::TicketAssigned { ticket_id, agent_id })?;
            if ticket.status != TicketStatus::InProgress {
                self.record(
                    Some(actor.id),
                    DeskEvent::TicketStatusChanged {
                        ticket_id,
                        from: ticket.status,
                        to: TicketStatus::InProgress,
                    },
                )?;
            }
            Ok(())
        })?;
        log::info!(
            "Ticket {} assigned to {} by {}",
            ticket.ticket_number,
            assignee.username,
            actor.username
        );
        Ok(())
    }

    fn create_escalation(
        &mut self,
        session: &Session,
        request: &EscalationRequest,
    ) -> DeskResult<EscalationTicket> {
        let agent = self.authenticate(session)?;
        if request.summary.trim().is_empty() {
            return Err(DeskError::validation("summary", "must not be blank"));
        }
        let source = self.require_ticket(request.source_ticket_id)?;
        let transfer = self.require_transfer(request.transfer_id)?;
        if source.transfer_id != Some(transfer.id) {
            return Err(DeskError::validation(
                "transfer_id",
                format!(
                    "transfer {} is not linked to ticket {}",
                    transfer.reference_number, source.ticket_number
                ),
            ));
        }

        // Key allocation, the insert, the ticket move and both events
        // commit together or not at all.
        let now = self.clock.now();
        let (escalation_id, ticket_key) = self.store.in_transaction(|store| {
            let ticket_key = escalation_key(
                &self.settings.escalation_key_prefix,
                self.settings.escalation_key_base,
                store.escalation_count()?,
            );
            let escalation_id = store.insert_escalation(&ticket_key, request, agent.id, now)?;
            store.set_ticket_status(source.id, TicketStatus::Pending, None, now)?;

            self.record(
                Some(agent.id),
                DeskEvent::EscalationCreated {
                    escalation_id,
                    ticket_key: ticket_key.clone(),
                    source_ticket_id: source.id,
                    transfer_id: transfer.id,
                },
            )?;
            if source.status != TicketStatus::Pending {
                self.record(
                    Some(agent.id),
                    DeskEvent::TicketStatusChanged {
                        ticket_id: source.id,
                        from: source.status,
                        to: TicketStatus::Pending,
                    },
                )?;
            }
            Ok((escalation_id, ticket_key))
        })?;
        log::info!(
            "Escalation {ticket_key} raised from {} for {} by {}",
            source.ticket_number,
            transfer.reference_number,
            agent.username
        );
        self.require_escalation(escalation_id)
    }

    fn list_tickets(
        &mut self,
        session: &Session,
        filter: &TicketFilter,
    ) -> DeskResult<Vec<SupportTicket>> {
        self.authenticate(session)?;
        self.store.list_tickets(filter)
    }

    fn list_escalations(
        &mut self,
        session: &Session,
        filter: &EscalationFilter,
    ) -> DeskResult<Vec<EscalationTicket>> {
        self.authenticate(session)?;
        self.store.list_escalations(filter)
    }

    /// Any status may follow any other here. `resolved_at` is stamped on
    /// entering Done and kept if the ticket is later reopened.
    fn update_escalation_status(
        &mut self,
        session: &Session,
        escalation_id: EscalationId,
        status: EscalationStatus,
    ) -> DeskResult<()> {
        let agent = self.authenticate(session)?;
        let escalation = self.require_escalation(escalation_id)?;
        if escalation.status == status {
            return Ok(());
        }
        let now = self.clock.now();
        let resolved_at = (status == EscalationStatus::Done).then_some(now);
        self.store.in_transaction(|store| {
            store.set_escalation_status(escalation_id, status, resolved_at, now)?;
            self.record(
                Some(agent.id),
                DeskEvent::EscalationStatusChanged {
                    escalation_id,
                    from: escalation.status,
                    to: status,
                },
            )
        })?;
        log::info!(
            "Escalation {} {} -> {} by {}",
            escalation.ticket_key,
            escalation.status,
            status,
            agent.username
        );
        Ok(())
    }
}
