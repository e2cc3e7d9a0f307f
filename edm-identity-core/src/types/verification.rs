//! Verification attempt bookkeeping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Domain, RecordStatus, RecordType};

/// Per-record outcome reported by a checker. May be partial.
pub type CheckResults = BTreeMap<RecordType, RecordStatus>;

/// Handle returned by `begin_verification`; results must quote its attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTicket {
    pub domain_id: String,
    pub attempt: u64,
}

/// Result of applying check results to a domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Results matched the current attempt and were applied
    Applied(Domain),
    /// Results belonged to a superseded attempt and were ignored
    Stale { current_attempt: u64 },
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// The updated domain, if the results were applied.
    #[must_use]
    pub fn into_domain(self) -> Option<Domain> {
        match self {
            Self::Applied(domain) => Some(domain),
            Self::Stale { .. } => None,
        }
    }
}
