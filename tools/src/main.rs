//! desk-runner: headless driver for the transfer desk.
//!
//! Usage:
//!   desk-runner --db desk.db --data-dir ./data --agent sarah.mitchell
//!   desk-runner --agent sarah.mitchell --ipc-mode

use anyhow::Result;
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};
use transfer_desk_core::{
    clock::DeskClock,
    comparator::ComparedField,
    config::DeskConfig,
    desk::{DashboardStats, LocalDesk},
    error::DeskError,
    escalation::{EscalationFilter, EscalationPriority, EscalationStatus, EscalationTicket},
    format::{format_currency, format_timestamp},
    review::TicketReview,
    service::DataService,
    session::Session,
    store::DeskStore,
    ticket::{SupportTicket, TicketFilter},
    types::{EscalationId, TicketId},
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    GetTicket {
        ticket_id: TicketId,
    },
    Review {
        ticket_id: TicketId,
        #[serde(default)]
        checked: Vec<ComparedField>,
    },
    Assign {
        ticket_id: TicketId,
    },
    Escalate {
        ticket_id: TicketId,
        #[serde(default)]
        checked: Vec<ComparedField>,
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        priority: Option<EscalationPriority>,
    },
    UpdateEscalation {
        escalation_id: EscalationId,
        status: EscalationStatus,
    },
    Quit,
}

#[derive(Serialize)]
struct UiState {
    agent: String,
    stats: DashboardStats,
    tickets: Vec<SupportTicket>,
    escalations: Vec<EscalationTicket>,
}

#[derive(Serialize)]
struct IpcError {
    error: String,
    retryable: bool,
    validation: bool,
    precondition: bool,
}

impl From<&DeskError> for IpcError {
    fn from(e: &DeskError) -> Self {
        Self {
            error: e.to_string(),
            retryable: e.is_retryable(),
            validation: e.is_validation(),
            precondition: e.is_precondition(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let agent = flag_value(&args, "--agent").unwrap_or("sarah.mitchell");

    if !ipc_mode {
        println!("Transfer Desk - desk-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  agent:     {agent}");
        println!();
    }

    let config = DeskConfig::load(data_dir)?;
    let store = DeskStore::open(db)?;
    let mut desk = LocalDesk::build(store, &config, DeskClock::System)?;
    let session = desk.login(agent)?;
    log::info!("desk-runner acting as {} ({})", session.agent.full_name, session.agent.role);

    if ipc_mode {
        run_ipc_loop(&mut desk, &session)?;
    } else {
        print_summary(&mut desk, &session)?;
    }

    desk.logout(&session)?;
    Ok(())
}

fn run_ipc_loop(desk: &mut LocalDesk, session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        // Desk errors are answered on the wire; only I/O ends the loop.
        let reply = match handle_command(desk, session, cmd) {
            Ok(value) => value,
            Err(e) => serde_json::to_value(IpcError::from(&e))?,
        };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    desk: &mut LocalDesk,
    session: &Session,
    cmd: IpcCommand,
) -> Result<serde_json::Value, DeskError> {
    let settings = desk.settings().clone();
    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => {
            Ok(serde_json::to_value(build_ui_state(desk, session)?)?)
        }
        IpcCommand::GetTicket { ticket_id } => {
            Ok(serde_json::to_value(desk.get_ticket(session, ticket_id)?)?)
        }
        IpcCommand::Review { ticket_id, checked } => {
            let mut review = TicketReview::load(desk, session, ticket_id, &settings)?;
            for field in checked {
                review.set(field, true);
            }
            Ok(serde_json::to_value(review.view())?)
        }
        IpcCommand::Assign { ticket_id } => {
            let mut review = TicketReview::load(desk, session, ticket_id, &settings)?;
            review.assign_to_me(desk, session, &settings)?;
            Ok(serde_json::to_value(review.view())?)
        }
        IpcCommand::Escalate {
            ticket_id,
            checked,
            summary,
            description,
            priority,
        } => {
            let mut review = TicketReview::load(desk, session, ticket_id, &settings)?;
            for field in checked {
                review.set(field, true);
            }
            if let Some(draft) = review.draft_mut() {
                if let Some(summary) = summary {
                    draft.summary = summary;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(priority) = priority {
                    draft.priority = priority;
                }
            }
            let escalation = review.submit_escalation(desk, session)?;
            Ok(serde_json::to_value(escalation)?)
        }
        IpcCommand::UpdateEscalation {
            escalation_id,
            status,
        } => {
            desk.update_escalation_status(session, escalation_id, status)?;
            Ok(serde_json::to_value(desk.get_escalation(session, escalation_id)?)?)
        }
    }
}

fn build_ui_state(desk: &mut LocalDesk, session: &Session) -> Result<UiState, DeskError> {
    let stats = desk.dashboard_stats(session)?;
    let tickets = desk.list_tickets(session, &TicketFilter::default())?;
    let escalations = desk.list_escalations(session, &EscalationFilter::default())?;
    Ok(UiState {
        agent: session.agent.username.clone(),
        stats,
        tickets,
        escalations,
    })
}

fn print_summary(desk: &mut LocalDesk, session: &Session) -> Result<()> {
    let settings = desk.settings().clone();
    let stats = desk.dashboard_stats(session)?;

    println!("=== QUEUE SUMMARY ===");
    println!("  open:           {}", stats.open_tickets);
    println!("  in progress:    {}", stats.in_progress_tickets);
    println!("  pending:        {}", stats.pending_tickets);
    println!("  escalations:    {} to do / {} in progress / {} done",
        stats.escalations_to_do, stats.escalations_in_progress, stats.escalations_done);
    for (status, count) in &stats.transfers_by_status {
        println!("  transfers {status:<10} {count}");
    }

    println!();
    println!("=== TICKETS ===");
    let tickets = desk.list_tickets(session, &TicketFilter::default())?;
    for ticket in &tickets {
        let review = TicketReview::load(desk, session, ticket.id, &settings)?;
        let detail = match review.comparison() {
            None => "not linked".to_string(),
            Some(c) if !c.has_form() => format!("{} | no form on file", c.transfer.reference_number),
            Some(c) => format!(
                "{} | {} | {} mismatch(es)",
                c.transfer.reference_number,
                format_currency(c.transfer.transfer_amount),
                c.mismatches.len()
            ),
        };
        println!(
            "  {} [{:<11}] {:<6} {} | {} | created {}",
            ticket.ticket_number,
            ticket.status,
            ticket.priority,
            ticket.subject,
            detail,
            format_timestamp(Some(&ticket.created_at)),
        );
    }

    let escalations = desk.list_escalations(session, &EscalationFilter::default())?;
    if !escalations.is_empty() {
        println!();
        println!("=== ESCALATIONS ===");
        for e in &escalations {
            println!(
                "  {} [{}] {} | {} | resolved {}",
                e.ticket_key,
                e.status,
                e.priority,
                e.summary,
                format_timestamp(e.resolved_at.as_ref()),
            );
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
