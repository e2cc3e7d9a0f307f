//! Type definitions

mod catalog;
mod dns_record;
mod domain;
mod profile;
mod sender;
mod verification;

pub use catalog::{CatalogSnapshot, SNAPSHOT_VERSION};
pub use dns_record::{DnsRecord, DnsRecordSet, RecordStatus, RecordType, APEX_HOST};
pub use domain::{Domain, DomainOverview, DomainStatus};
pub use profile::ProviderProfile;
pub use sender::{email_address, SenderIdentity, SenderStatus};
pub use verification::{ApplyOutcome, CheckResults, VerificationTicket};
