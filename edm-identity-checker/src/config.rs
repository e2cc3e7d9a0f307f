//! Checker configuration

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resolver settings for the DNS checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Query this nameserver instead of the system resolver
    pub nameserver: Option<IpAddr>,
    /// Per-query timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            nameserver: None,
            timeout_secs: 5,
        }
    }
}

impl CheckerConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
