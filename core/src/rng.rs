//! Deterministic ticket-number generation.
//!
//! RULE: Ticket numbers never come from a platform RNG.
//! The stream is seeded from the desk settings so two desks with the
//! same seed hand out the same numbers in the same order.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct TicketNumberRng {
    inner: Pcg64Mcg,
}

impl TicketNumberRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// A string of exactly `count` decimal digits. Leading zeros are kept.
    pub fn next_digits(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(b'0' + (self.inner.next_u64() % 10) as u8))
            .collect()
    }
}
