//! Sender identity (a `prefix@domain` mailbox allowed to send)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Domain;

/// Sender identity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderStatus {
    Active,
    Pending,
    Inactive,
}

/// Sender identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderIdentity {
    /// Sender ID (UUID)
    pub id: String,
    /// Owning domain (non-owning reference)
    pub domain_id: String,
    /// `prefix@domain`
    pub email_address: String,
    pub prefix: String,
    pub status: SenderStatus,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    /// Updated by the dispatch path each time the address is used
    #[serde(
        default,
        with = "crate::utils::datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl SenderIdentity {
    /// Build an `Active` identity for `prefix` under `domain`.
    #[must_use]
    pub fn new(domain: &Domain, prefix: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            domain_id: domain.id.clone(),
            email_address: email_address(prefix, &domain.name),
            prefix: prefix.to_string(),
            status: SenderStatus::Active,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    /// Address comparison is ASCII case-insensitive.
    #[must_use]
    pub fn has_address(&self, address: &str) -> bool {
        self.email_address.eq_ignore_ascii_case(address)
    }
}

/// Compose a mailbox address.
#[must_use]
pub fn email_address(prefix: &str, domain_name: &str) -> String {
    format!("{prefix}@{domain_name}")
}
