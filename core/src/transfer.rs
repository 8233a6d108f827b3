//! Transfer records and their verification (T2220) forms.
//!
//! Both are owned by the data service. The desk only ever holds a
//! read-only snapshot taken at fetch time.

use crate::types::{AgentId, FormId, Timestamp, TransferId};
use serde::{Deserialize, Serialize};

/// Authoritative ledger-side record of a transfer.
/// `status` is free-form: processing, pending, completed, failed, rejected...
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    pub reference_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub from_institution: String,
    pub to_institution: String,
    pub account_number: String,
    pub account_type: String,
    pub transfer_type: String,
    pub transfer_amount: f64,
    pub status: String,
    pub initiated_date: Option<Timestamp>,
    pub expected_completion: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// The form the customer signed. Zero or one per transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationForm {
    pub id: FormId,
    pub form_number: String,
    pub transfer_id: TransferId,
    pub account_holder_name: String,
    pub account_number_on_form: String,
    pub account_type_on_form: String,
    pub transfer_amount_on_form: f64,
    pub transfer_type_on_form: String,
    pub signature_date: Option<Timestamp>,
    pub form_pdf_url: Option<String>,
    pub verified: bool,
    pub verification_notes: Option<String>,
    pub verified_by: Option<AgentId>,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert shape for a transfer; ids and audit timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTransfer {
    pub reference_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub from_institution: String,
    pub to_institution: String,
    pub account_number: String,
    pub account_type: String,
    pub transfer_type: String,
    pub transfer_amount: f64,
    pub status: String,
    pub initiated_date: Option<Timestamp>,
    pub expected_completion: Option<Timestamp>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVerificationForm {
    pub form_number: String,
    pub transfer_id: TransferId,
    pub account_holder_name: String,
    pub account_number_on_form: String,
    pub account_type_on_form: String,
    pub transfer_amount_on_form: f64,
    pub transfer_type_on_form: String,
    pub signature_date: Option<Timestamp>,
    pub form_pdf_url: Option<String>,
}
