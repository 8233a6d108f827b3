//! Transfer desk core: support tickets, transfer/form comparison, the
//! verification checklist gate, and escalation to the transfers team.

pub mod checklist;
pub mod clock;
pub mod comparator;
pub mod config;
pub mod desk;
pub mod error;
pub mod escalation;
pub mod event;
pub mod format;
pub mod review;
pub mod rng;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;
pub mod ticket;
pub mod transfer;
pub mod types;
