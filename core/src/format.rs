//! Display helpers shared by escalation text and the runner.

use crate::types::Timestamp;

/// `$1234.50`, `-$12.00`. No grouping separators, so the bare figure
/// stays searchable inside free text.
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// `Mar 04, 2026 14:05`, or `-` when absent.
pub fn format_timestamp(at: Option<&Timestamp>) -> String {
    match at {
        Some(at) => at.format("%b %d, %Y %H:%M").to_string(),
        None => "-".to_string(),
    }
}
