//! EDM Identity Core Library
//!
//! Domain verification and sender identity management for the EDM console:
//! - DNS record set generation (`DnsRecordSet`)
//! - Domain verification state machine (`Domain`, `VerificationService`)
//! - Domain directory with cascading deletes (`DomainDirectory`)
//! - Sender identity registry (`SenderRegistry`)
//!
//! Storage and DNS lookups are abstracted behind traits so hosts can plug in
//! their own persistence and resolver.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    Catalog, DomainDirectory, SenderRegistry, ServiceContext, VerificationService,
};
pub use traits::{CatalogStore, InMemoryCatalogStore, VerificationChecker};
