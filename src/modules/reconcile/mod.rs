//! Offline repair of unique-key invariants.

pub mod service;

pub use service::{ReconciliationReport, ReconciliationService};
