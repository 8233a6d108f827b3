use crate::{
    escalation::EscalationPriority,
    session::AgentRole,
    ticket::{TicketPriority, TicketStatus},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskSettings {
    pub escalation_key_prefix: String,
    pub escalation_key_base: i64,
    pub ticket_number_prefix: String,
    pub ticket_number_digits: usize,
    pub default_escalation_priority: EscalationPriority,
    pub currency_code: String,
    /// Closing line of every pre-filled escalation description.
    pub escalation_note: String,
    /// Seeds the ticket-number stream.
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFixture {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: AgentRole,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFixture {
    pub form_number: String,
    pub account_holder_name: String,
    pub account_number_on_form: String,
    pub account_type_on_form: String,
    pub transfer_amount_on_form: f64,
    pub transfer_type_on_form: String,
    pub signature_days_ago: i64,
    #[serde(default)]
    pub form_pdf_url: Option<String>,
}

/// Dates are relative to seeding time so the queue always looks current.
/// Negative `expected_completion_days_ago` means the date is still ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferFixture {
    pub reference_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub from_institution: String,
    pub to_institution: String,
    pub account_number: String,
    pub account_type: String,
    pub transfer_type: String,
    pub transfer_amount: f64,
    pub status: String,
    pub initiated_days_ago: i64,
    pub expected_completion_days_ago: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub form: Option<FormFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketFixture {
    pub ticket_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    #[serde(default)]
    pub transfer_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AgentsFile {
    agents: Vec<AgentFixture>,
}

#[derive(Debug, Clone, Deserialize)]
struct TransfersFile {
    transfers: Vec<TransferFixture>,
}

#[derive(Debug, Clone, Deserialize)]
struct TicketsFile {
    tickets: Vec<TicketFixture>,
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub settings: DeskSettings,
    pub agents: Vec<AgentFixture>,
    pub transfers: Vec<TransferFixture>,
    pub tickets: Vec<TicketFixture>,
}

impl DeskConfig {
    /// Load from the data/ directory.
    /// In tests, use DeskConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let settings_path = format!("{data_dir}/desk/desk_config.json");
        let settings_content = std::fs::read_to_string(&settings_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {settings_path}: {e}"))?;
        let settings: DeskSettings = serde_json::from_str(&settings_content)?;

        let agents_path = format!("{data_dir}/seed/agents.json");
        let agents_content = std::fs::read_to_string(&agents_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {agents_path}: {e}"))?;
        let agents_file: AgentsFile = serde_json::from_str(&agents_content)?;

        let transfers_path = format!("{data_dir}/seed/transfers.json");
        let transfers_content = std::fs::read_to_string(&transfers_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {transfers_path}: {e}"))?;
        let transfers_file: TransfersFile = serde_json::from_str(&transfers_content)?;

        let tickets_path = format!("{data_dir}/seed/tickets.json");
        let tickets_content = std::fs::read_to_string(&tickets_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {tickets_path}: {e}"))?;
        let tickets_file: TicketsFile = serde_json::from_str(&tickets_content)?;

        Ok(Self {
            settings,
            agents: agents_file.agents,
            transfers: transfers_file.transfers,
            tickets: tickets_file.tickets,
        })
    }

    /// In-code fixture set for tests. Four transfers cover the clean case,
    /// a single mismatch, an amount mismatch and a double mismatch; one
    /// ticket has no transfer at all.
    pub fn default_test() -> Self {
        let settings = DeskSettings {
            escalation_key_prefix: "XFER".into(),
            escalation_key_base: 1001,
            ticket_number_prefix: "ZEN".into(),
            ticket_number_digits: 6,
            default_escalation_priority: EscalationPriority::Medium,
            currency_code: "CAD".into(),
            escalation_note: "All documentation verified, no discrepancies found. \
                              Escalating for transfers team review."
                .into(),
            seed: 42,
        };

        let agents = vec![
            AgentFixture {
                username: "sarah.mitchell".into(),
                email: "sarah.mitchell@example.com".into(),
                full_name: "Sarah Mitchell".into(),
                role: AgentRole::CsAgent,
                is_admin: false,
                is_active: true,
            },
            AgentFixture {
                username: "transfers.team".into(),
                email: "transfers@example.com".into(),
                full_name: "Transfers Team".into(),
                role: AgentRole::TransfersTeam,
                is_admin: false,
                is_active: true,
            },
            AgentFixture {
                username: "admin".into(),
                email: "admin@example.com".into(),
                full_name: "System Admin".into(),
                role: AgentRole::Admin,
                is_admin: true,
                is_active: true,
            },
            AgentFixture {
                username: "former.agent".into(),
                email: "former@example.com".into(),
                full_name: "Former Agent".into(),
                role: AgentRole::CsAgent,
                is_admin: false,
                is_active: false,
            },
        ];

        let transfer = |reference: &str,
                        name: &str,
                        from: &str,
                        account_number: &str,
                        account_type: &str,
                        transfer_type: &str,
                        amount: f64,
                        form: FormFixture| TransferFixture {
            reference_number: reference.into(),
            customer_name: name.into(),
            customer_email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
            from_institution: from.into(),
            to_institution: "Wealthsimple".into(),
            account_number: account_number.into(),
            account_type: account_type.into(),
            transfer_type: transfer_type.into(),
            transfer_amount: amount,
            status: "pending".into(),
            initiated_days_ago: 12,
            expected_completion_days_ago: 2,
            notes: None,
            form: Some(form),
        };
        let form = |number: &str,
                    name: &str,
                    account_number: &str,
                    account_type: &str,
                    transfer_type: &str,
                    amount: f64| FormFixture {
            form_number: number.into(),
            account_holder_name: name.into(),
            account_number_on_form: account_number.into(),
            account_type_on_form: account_type.into(),
            transfer_amount_on_form: amount,
            transfer_type_on_form: transfer_type.into(),
            signature_days_ago: 14,
            form_pdf_url: Some(format!("/forms/{number}.pdf")),
        };

        let transfers = vec![
            transfer(
                "TRF-2024-001001", "Michael Thompson", "TD Bank",
                "4567890123", "RRSP", "full", 45_000.00,
                form("T2220-2024-001001", "Michael Thompson", "4567890123", "RRSP", "full", 45_000.00),
            ),
            transfer(
                "TRF-2024-001002", "Jennifer Wilson", "RBC Royal Bank",
                "7891234567", "TFSA", "full", 28_500.00,
                form("T2220-2024-001002", "Jennifer Wilson", "7891234568", "TFSA", "full", 28_500.00),
            ),
            transfer(
                "TRF-2024-001004", "Amanda Lee", "BMO",
                "9876543210", "RRSP", "partial", 25_000.00,
                form("T2220-2024-001004", "Amanda Lee", "9876543210", "RRSP", "partial", 35_000.00),
            ),
            transfer(
                "TRF-2024-001006", "Emily Davis", "National Bank",
                "6789012345", "RESP", "full", 12_000.00,
                form("T2220-2024-001006", "Emily Davis", "6789012345", "TFSA", "full", 15_000.00),
            ),
        ];

        let ticket = |number: &str, name: &str, subject: &str, priority: TicketPriority, reference: Option<&str>| {
            TicketFixture {
                ticket_number: number.into(),
                customer_name: name.into(),
                customer_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                subject: subject.into(),
                description: match reference {
                    Some(r) => format!("Please check on my transfer. Reference: {r}"),
                    None => "I have a general question about my account.".into(),
                },
                status: TicketStatus::Open,
                priority,
                transfer_reference: reference.map(String::from),
            }
        };

        let tickets = vec![
            ticket("ZEN-892341", "Michael Thompson", "RRSP Transfer from TD Bank - Still Pending",
                   TicketPriority::High, Some("TRF-2024-001001")),
            ticket("ZEN-892456", "Jennifer Wilson", "Transfer Status Inquiry - RBC TFSA",
                   TicketPriority::Normal, Some("TRF-2024-001002")),
            ticket("ZEN-892623", "Amanda Lee", "URGENT: Partial RRSP Transfer Delayed",
                   TicketPriority::Urgent, Some("TRF-2024-001004")),
            ticket("ZEN-892845", "Emily Davis", "RESP Transfer Question",
                   TicketPriority::Low, Some("TRF-2024-001006")),
            ticket("ZEN-893001", "Olivia Park", "Question about account fees",
                   TicketPriority::Normal, None),
        ];

        Self { settings, agents, transfers, tickets }
    }
}
