//! Manual verification checklist and the escalation gate.
//!
//! The checklist is one switch per compared field. Switches flip both
//! ways. It lives only as long as the ticket view that created it.

use crate::{
    comparator::{ComparedField, Mismatch},
    error::EscalationBlocked,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationChecklist {
    items: [bool; ComparedField::ALL.len()],
}

impl VerificationChecklist {
    /// All unchecked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every item confirmed.
    pub fn fully_checked() -> Self {
        Self { items: [true; ComparedField::ALL.len()] }
    }

    pub fn set(&mut self, field: ComparedField, checked: bool) {
        self.items[field.index()] = checked;
    }

    /// Returns the new state.
    pub fn toggle(&mut self, field: ComparedField) -> bool {
        let slot = &mut self.items[field.index()];
        *slot = !*slot;
        *slot
    }

    pub fn is_checked(&self, field: ComparedField) -> bool {
        self.items[field.index()]
    }

    pub fn all_checked(&self) -> bool {
        self.items.iter().all(|checked| *checked)
    }

    pub fn unchecked(&self) -> Vec<ComparedField> {
        ComparedField::ALL
            .into_iter()
            .filter(|field| !self.is_checked(*field))
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Field name → checked.
    pub fn as_map(&self) -> BTreeMap<&'static str, bool> {
        ComparedField::ALL
            .into_iter()
            .map(|field| (field.as_str(), self.is_checked(field)))
            .collect()
    }
}

/// Both halves must pass: no live mismatch, and every item confirmed.
/// Mismatches are reported first since checking boxes cannot clear them.
pub fn gate(checklist: &VerificationChecklist, mismatches: &[Mismatch]) -> Result<(), EscalationBlocked> {
    if !mismatches.is_empty() {
        return Err(EscalationBlocked::UnresolvedMismatches { count: mismatches.len() });
    }
    if !checklist.all_checked() {
        return Err(EscalationBlocked::ChecklistIncomplete { unchecked: checklist.unchecked() });
    }
    Ok(())
}

pub fn can_escalate(checklist: &VerificationChecklist, mismatches: &[Mismatch]) -> bool {
    gate(checklist, mismatches).is_ok()
}
