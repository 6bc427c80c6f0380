//! MX resolution for candidate domains.
//!
//! Looks up MX records and returns the exchangers sorted ascending by
//! preference value. There is intentionally no A/AAAA implicit-MX fallback:
//! a domain that publishes no MX records is reported as having no mail
//! exchanger rather than probed through its web host.
//!
//! Results are cached in a lock-free `DashMap` with a fixed TTL so that a
//! run over many candidates at one domain performs a single lookup.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use hickory_resolver::{
    TokioResolver,
    config::ResolverOpts,
    name_server::TokioConnectionProvider,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors from MX resolution.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The domain publishes no MX records, or does not exist.
    #[error("no mail exchanger for domain: {0}")]
    NoMailExchanger(String),

    /// The query itself failed (network, resolver, timeout).
    #[error("MX lookup failed: {0}")]
    LookupFailed(#[from] hickory_resolver::ResolveError),
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsConfig {
    /// DNS query timeout in seconds (default: 5).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache TTL for resolved exchanger lists in seconds (default: 300).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    5
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// A mail exchanger host with its MX preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchanger {
    /// Hostname of the exchanger.
    pub host: String,
    /// MX preference (lower value is preferred).
    pub preference: u16,
    /// SMTP port, 25 unless overridden.
    pub port: u16,
}

impl MailExchanger {
    #[must_use]
    pub const fn new(host: String, preference: u16, port: u16) -> Self {
        Self {
            host,
            preference,
            port,
        }
    }

    /// The exchanger as `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
struct CachedExchangers {
    exchangers: Arc<Vec<MailExchanger>>,
    expires_at: Instant,
}

/// MX resolver with a TTL cache.
#[derive(Debug)]
pub struct MxResolver {
    resolver: TokioResolver,
    cache: DashMap<String, CachedExchangers>,
    cache_ttl: Duration,
}

impl MxResolver {
    /// Creates a resolver from the system DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system resolver configuration cannot be
    /// loaded.
    pub fn new(config: &DnsConfig) -> Result<Self, DnsError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(config.timeout_secs);

        let resolver = TokioResolver::builder(TokioConnectionProvider::default())?
            .with_options(opts)
            .build();

        Ok(Self {
            resolver,
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        })
    }

    /// Resolves the mail exchangers for `domain`, sorted ascending by
    /// preference.
    ///
    /// # Errors
    ///
    /// Returns `DnsError::NoMailExchanger` when the domain has no MX
    /// records or does not exist, and `DnsError::LookupFailed` on query
    /// failure.
    pub async fn resolve(&self, domain: &str) -> Result<Arc<Vec<MailExchanger>>, DnsError> {
        if let Some(cached) = self.cache.get(domain)
            && cached.expires_at > Instant::now()
        {
            debug!(domain, exchangers = cached.exchangers.len(), "MX cache hit");
            return Ok(Arc::clone(&cached.exchangers));
        }

        let exchangers = Arc::new(self.resolve_uncached(domain).await?);

        self.cache.insert(
            domain.to_string(),
            CachedExchangers {
                exchangers: Arc::clone(&exchangers),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );

        Ok(exchangers)
    }

    async fn resolve_uncached(&self, domain: &str) -> Result<Vec<MailExchanger>, DnsError> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let mut exchangers: Vec<MailExchanger> = lookup
                    .iter()
                    .map(|mx| {
                        let host = mx.exchange().to_utf8();
                        let preference = mx.preference();
                        debug!(domain, host, preference, "found MX record");
                        MailExchanger::new(host, preference, 25)
                    })
                    .collect();

                if exchangers.is_empty() {
                    return Err(DnsError::NoMailExchanger(domain.to_string()));
                }

                exchangers.sort_by_key(|mx| mx.preference);
                Ok(exchangers)
            }
            Err(err) if err.is_no_records_found() || err.is_nx_domain() => {
                Err(DnsError::NoMailExchanger(domain.to_string()))
            }
            Err(err) => Err(DnsError::LookupFailed(err)),
        }
    }
}
