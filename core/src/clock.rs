//! Desk clock. Real runs read the system time; tests pin it.

use crate::types::Timestamp;
use chrono::{Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeskClock {
    #[default]
    System,
    Fixed(Timestamp),
}

impl DeskClock {
    pub fn now(&self) -> Timestamp {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// `now()` shifted back by whole days. Fixture dates are relative.
    pub fn days_ago(&self, days: i64) -> Timestamp {
        self.now() - Duration::days(days)
    }
}
