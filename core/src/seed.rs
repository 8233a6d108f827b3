//! Fixture seeding for a fresh database.

use crate::{
    clock::DeskClock,
    config::DeskConfig,
    error::DeskResult,
    store::DeskStore,
    ticket::NewSupportTicket,
    transfer::{NewTransfer, NewVerificationForm},
};

/// Insert the configured agents, transfers, forms and tickets.
/// Does nothing if any agent already exists. Returns whether it seeded.
pub fn seed_if_empty(store: &DeskStore, config: &DeskConfig, clock: &DeskClock) -> DeskResult<bool> {
    if store.agent_count()? > 0 {
        log::debug!("Database already contains agents, skipping seed");
        return Ok(false);
    }
    let now = clock.now();

    // All or nothing: a half-seeded store would be skipped on the next start.
    store.in_transaction(|store| {
        for agent in &config.agents {
            store.insert_agent(agent, now)?;
        }

        for fixture in &config.transfers {
            let transfer = NewTransfer {
                reference_number: fixture.reference_number.clone(),
                customer_name: fixture.customer_name.clone(),
                customer_email: fixture.customer_email.clone(),
                from_institution: fixture.from_institution.clone(),
                to_institution: fixture.to_institution.clone(),
                account_number: fixture.account_number.clone(),
                account_type: fixture.account_type.clone(),
                transfer_type: fixture.transfer_type.clone(),
                transfer_amount: fixture.transfer_amount,
                status: fixture.status.clone(),
                initiated_date: Some(clock.days_ago(fixture.initiated_days_ago)),
                expected_completion: Some(clock.days_ago(fixture.expected_completion_days_ago)),
                notes: fixture.notes.clone(),
            };
            let transfer_id = store.insert_transfer(&transfer, now)?;

            if let Some(form) = &fixture.form {
                store.insert_form(
                    &NewVerificationForm {
                        form_number: form.form_number.clone(),
                        transfer_id,
                        account_holder_name: form.account_holder_name.clone(),
                        account_number_on_form: form.account_number_on_form.clone(),
                        account_type_on_form: form.account_type_on_form.clone(),
                        transfer_amount_on_form: form.transfer_amount_on_form,
                        transfer_type_on_form: form.transfer_type_on_form.clone(),
                        signature_date: Some(clock.days_ago(form.signature_days_ago)),
                        form_pdf_url: form.form_pdf_url.clone(),
                    },
                    now,
                )?;
            }
        }

        for fixture in &config.tickets {
            let transfer_id = match fixture.transfer_reference.as_deref() {
                Some(reference) => {
                    let linked = store.transfer_by_reference(reference)?.map(|t| t.id);
                    if linked.is_none() {
                        log::warn!(
                            "Ticket {} references unknown transfer {reference}",
                            fixture.ticket_number
                        );
                    }
                    linked
                }
                None => None,
            };
            let ticket = NewSupportTicket {
                customer_name: fixture.customer_name.clone(),
                customer_email: fixture.customer_email.clone(),
                subject: fixture.subject.clone(),
                description: fixture.description.clone(),
                priority: fixture.priority,
                transfer_reference: fixture.transfer_reference.clone(),
            };
            store.insert_ticket(&fixture.ticket_number, &ticket, fixture.status, transfer_id, now)?;
        }
        Ok(())
    })?;

    Ok(true)
}
