//! Transfer ↔ verification form comparison.
//!
//! RULE: Fields are evaluated in the fixed order of `ComparedField::ALL`
//! and mismatches come out in that order. Nothing is sorted or ranked.
//! Equality is exact: identifiers and types compare as strings, the
//! amount compares as a number with no tolerance.

use crate::transfer::{TransferRecord, VerificationForm};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedField {
    AccountNumber,
    AccountType,
    TransferAmount,
    TransferType,
}

impl ComparedField {
    /// Evaluation order.
    pub const ALL: [ComparedField; 4] = [
        Self::AccountNumber,
        Self::AccountType,
        Self::TransferAmount,
        Self::TransferType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountNumber => "account_number",
            Self::AccountType => "account_type",
            Self::TransferAmount => "transfer_amount",
            Self::TransferType => "transfer_type",
        }
    }

    /// Position in `ALL`; the checklist is indexed by this.
    pub fn index(&self) -> usize {
        match self {
            Self::AccountNumber => 0,
            Self::AccountType => 1,
            Self::TransferAmount => 2,
            Self::TransferType => 3,
        }
    }

    pub fn authoritative_value(&self, transfer: &TransferRecord) -> FieldValue {
        match self {
            Self::AccountNumber => FieldValue::Text(transfer.account_number.clone()),
            Self::AccountType => FieldValue::Text(transfer.account_type.clone()),
            Self::TransferAmount => FieldValue::Amount(transfer.transfer_amount),
            Self::TransferType => FieldValue::Text(transfer.transfer_type.clone()),
        }
    }

    pub fn form_value(&self, form: &VerificationForm) -> FieldValue {
        match self {
            Self::AccountNumber => FieldValue::Text(form.account_number_on_form.clone()),
            Self::AccountType => FieldValue::Text(form.account_type_on_form.clone()),
            Self::TransferAmount => FieldValue::Amount(form.transfer_amount_on_form),
            Self::TransferType => FieldValue::Text(form.transfer_type_on_form.clone()),
        }
    }
}

impl fmt::Display for ComparedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Amount(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Amount(a) => write!(f, "{a:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub field: ComparedField,
    pub authoritative_value: FieldValue,
    pub form_value: FieldValue,
}

/// Every field where transfer and form disagree.
/// Without a form there is nothing to assert, so the list is empty.
pub fn compare(transfer: &TransferRecord, form: Option<&VerificationForm>) -> Vec<Mismatch> {
    let Some(form) = form else {
        return Vec::new();
    };
    ComparedField::ALL
        .into_iter()
        .filter_map(|field| {
            let authoritative_value = field.authoritative_value(transfer);
            let form_value = field.form_value(form);
            (authoritative_value != form_value).then_some(Mismatch {
                field,
                authoritative_value,
                form_value,
            })
        })
        .collect()
}

/// Transfer, optional form and their mismatches, returned as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub transfer: TransferRecord,
    pub form: Option<VerificationForm>,
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    pub fn build(transfer: TransferRecord, form: Option<VerificationForm>) -> Self {
        let mismatches = compare(&transfer, form.as_ref());
        Self { transfer, form, mismatches }
    }

    pub fn has_form(&self) -> bool {
        self.form.is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn mismatch_for(&self, field: ComparedField) -> Option<&Mismatch> {
        self.mismatches.iter().find(|m| m.field == field)
    }
}
