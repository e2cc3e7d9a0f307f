//! Raw TXT/MX lookups.

use async_trait::async_trait;
use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    TokioResolver,
};

use crate::config::CheckerConfig;

/// Answers needed to evaluate a record. An error or empty answer both mean
/// "nothing published".
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// TXT strings at `name`, chunks of one record joined
    async fn txt(&self, name: &str) -> Result<Vec<String>, String>;

    /// MX exchange hosts at `name`, trailing dot removed
    async fn mx(&self, name: &str) -> Result<Vec<String>, String>;
}

/// Hickory-backed lookup.
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    #[must_use]
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            resolver: build_resolver(config),
        }
    }
}

#[async_trait]
impl RecordLookup for HickoryLookup {
    async fn txt(&self, name: &str) -> Result<Vec<String>, String> {
        let response = self.resolver.txt_lookup(name).await.map_err(|e| e.to_string())?;
        Ok(response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).to_string())
                    .collect::<String>()
            })
            .collect())
    }

    async fn mx(&self, name: &str) -> Result<Vec<String>, String> {
        let response = self.resolver.mx_lookup(name).await.map_err(|e| e.to_string())?;
        Ok(response
            .iter()
            .map(|mx| mx.exchange().to_string().trim_end_matches('.').to_string())
            .collect())
    }
}

/// Resolver for a configured nameserver, or the host's system configuration
/// (falling back to hickory's defaults when that cannot be read).
fn build_resolver(config: &CheckerConfig) -> TokioResolver {
    let mut opts = ResolverOpts::default();
    opts.timeout = config.timeout();

    if let Some(ns_ip) = config.nameserver {
        let resolver_config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[ns_ip], 53, true),
        );
        return TokioResolver::builder_with_config(
            resolver_config,
            TokioConnectionProvider::default(),
        )
        .with_options(opts)
        .build();
    }

    #[cfg(any(unix, target_os = "windows"))]
    match TokioResolver::builder_tokio() {
        Ok(builder) => return builder.with_options(opts).build(),
        Err(e) => {
            log::warn!("Failed to load system DNS configuration, falling back to defaults: {e}");
        }
    }

    TokioResolver::builder_with_config(
        ResolverConfig::default(),
        TokioConnectionProvider::default(),
    )
    .with_options(opts)
    .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_explicit_nameserver() {
        let config = CheckerConfig {
            nameserver: Some("1.1.1.1".parse().unwrap()),
            timeout_secs: 2,
        };
        let _lookup = HickoryLookup::new(&config);
    }

    #[tokio::test]
    async fn builds_with_system_config() {
        let _lookup = HickoryLookup::new(&CheckerConfig::default());
    }
}
