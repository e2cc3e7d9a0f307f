//! Persisted snapshot of the identity catalog

use serde::{Deserialize, Serialize};

use super::{Domain, SenderIdentity};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the directory and registry own, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub version: u32,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub sender_identities: Vec<SenderIdentity>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            domains: Vec::new(),
            sender_identities: Vec::new(),
        }
    }
}
