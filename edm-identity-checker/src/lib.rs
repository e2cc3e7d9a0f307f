//! DNS verification checker for EDM sending domains
//!
//! Implements `edm_identity_core::VerificationChecker` with real TXT/MX
//! lookups through hickory. Matching rules are pure functions in
//! [`rules`] so they can be tested without a network.

mod checker;
mod config;
mod lookup;
pub mod rules;

pub use checker::DnsVerificationChecker;
pub use config::CheckerConfig;
pub use lookup::{HickoryLookup, RecordLookup};
