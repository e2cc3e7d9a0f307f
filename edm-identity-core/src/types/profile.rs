//! Mail provider profile: the fixed values published in generated DNS records.

use serde::{Deserialize, Serialize};

/// Provider-wide constants used when generating a domain's DNS records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProviderProfile {
    /// SPF `include:` target, e.g. `_spf.edm-gateway.com`
    pub spf_include: String,
    /// MX exchange host
    pub mx_host: String,
    /// DKIM selector; the record lives at `<selector>._domainkey`
    pub dkim_selector: String,
    /// Host label of the ownership TXT record
    pub ownership_host: String,
    /// Key prepended to the ownership token (`<prefix>=<token>`)
    pub ownership_prefix: String,
    /// DMARC `p=` policy
    pub dmarc_policy: String,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            spf_include: "_spf.edm-gateway.com".to_string(),
            mx_host: "edm-gateway.com".to_string(),
            dkim_selector: "edm".to_string(),
            ownership_host: "_edm-verification".to_string(),
            ownership_prefix: "edm-verification".to_string(),
            dmarc_policy: "none".to_string(),
        }
    }
}

impl ProviderProfile {
    /// The `include:` mechanism an SPF record must carry.
    #[must_use]
    pub fn spf_mechanism(&self) -> String {
        format!("include:{}", self.spf_include)
    }
}
