//! DNS resolver trait and implementations.
//!
//! [`SystemResolver`] queries the system's configured nameservers through
//! hickory. [`StaticResolver`] serves fixtures and is what the test suites
//! drive the evaluator and orchestrator with.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use thiserror::Error;

use crate::config::DNS_TIMEOUT_SECS;
use crate::dns::cache::RecordKind;
use crate::models::MxHost;

/// Errors from a DNS query.
///
/// `NotFound` covers both NXDOMAIN and an existing name with no records of
/// the requested type; callers translate it into an empty result. Everything
/// else is a real failure and propagates.
#[derive(Debug, Clone, Error)]
pub enum DnsError {
    /// The name does not exist or has no records of the requested type.
    #[error("no records found")]
    NotFound,
    /// The query timed out at the resolver.
    #[error("DNS query timed out")]
    Timeout,
    /// Any other resolution failure (SERVFAIL, network unreachable, ...).
    #[error("DNS lookup failed: {0}")]
    Lookup(String),
}

/// Abstraction over DNS lookups used by every check.
pub trait DnsResolver: Send + Sync + 'static {
    /// Queries TXT records; multi-part strings are joined per record.
    fn query_txt(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<String>, DnsError>> + Send;

    /// Queries MX records, sorted by priority.
    fn query_mx(&self, domain: &str)
        -> impl Future<Output = Result<Vec<MxHost>, DnsError>> + Send;

    /// Counts records of the given type, without interpreting their data.
    /// Used for DNSSEC material (DS/DNSKEY) presence probing.
    fn record_count(
        &self,
        domain: &str,
        kind: RecordKind,
    ) -> impl Future<Output = Result<usize, DnsError>> + Send;
}

fn classify(e: &ResolveError) -> DnsError {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => DnsError::NotFound,
        ResolveErrorKind::Timeout => DnsError::Timeout,
        _ => DnsError::Lookup(e.to_string()),
    }
}

impl RecordKind {
    fn record_type(self) -> RecordType {
        match self {
            RecordKind::Txt => RecordType::TXT,
            RecordKind::Mx => RecordType::MX,
            RecordKind::Ds => RecordType::DS,
            RecordKind::Dnskey => RecordType::DNSKEY,
        }
    }
}

/// DNS resolver backed by hickory's tokio resolver.
#[derive(Clone)]
pub struct SystemResolver {
    resolver: Arc<TokioAsyncResolver>,
}

impl SystemResolver {
    /// Builds a resolver against the default upstream configuration with the
    /// crate's DNS timeout and reduced retry attempts.
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
        opts.attempts = 2;
        // Prevent search-domain appending on bare domains
        opts.ndots = 0;
        Self {
            resolver: Arc::new(TokioAsyncResolver::tokio(ResolverConfig::default(), opts)),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver for SystemResolver {
    async fn query_txt(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        match self.resolver.txt_lookup(domain).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|txt| {
                    // TXT records can contain multiple character-strings; join them
                    txt.iter()
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                        .collect::<Vec<String>>()
                        .join("")
                })
                .collect()),
            Err(e) => Err(classify(&e)),
        }
    }

    async fn query_mx(&self, domain: &str) -> Result<Vec<MxHost>, DnsError> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let mut records: Vec<MxHost> = lookup
                    .iter()
                    .map(|mx| MxHost {
                        exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        priority: mx.preference(),
                    })
                    .collect();
                records.sort_by_key(|mx| mx.priority);
                Ok(records)
            }
            Err(e) => Err(classify(&e)),
        }
    }

    async fn record_count(&self, domain: &str, kind: RecordKind) -> Result<usize, DnsError> {
        let record_type = kind.record_type();
        match self.resolver.lookup(domain, record_type).await {
            Ok(lookup) => Ok(lookup
                .records()
                .iter()
                .filter(|r| r.record_type() == record_type)
                .count()),
            Err(e) => Err(classify(&e)),
        }
    }
}

/// Fixture-backed resolver for tests and examples.
///
/// Unknown names answer `NotFound`; names registered through
/// [`StaticResolver::fail`] answer a lookup error on every query type,
/// simulating an unreachable or broken zone.
#[derive(Clone, Default)]
pub struct StaticResolver {
    txt: Arc<Mutex<HashMap<String, Vec<String>>>>,
    mx: Arc<Mutex<HashMap<String, Vec<MxHost>>>>,
    counts: Arc<Mutex<HashMap<(RecordKind, String), usize>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl StaticResolver {
    /// Creates an empty fixture resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers TXT records for a domain.
    pub fn add_txt(&self, domain: &str, records: &[&str]) {
        self.txt.lock().unwrap().insert(
            domain.to_lowercase(),
            records.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Registers MX records for a domain.
    pub fn add_mx(&self, domain: &str, records: &[(&str, u16)]) {
        self.mx.lock().unwrap().insert(
            domain.to_lowercase(),
            records
                .iter()
                .map(|(exchange, priority)| MxHost {
                    exchange: exchange.to_string(),
                    priority: *priority,
                })
                .collect(),
        );
    }

    /// Registers a record count for (kind, domain), for DNSSEC fixtures.
    pub fn add_record_count(&self, domain: &str, kind: RecordKind, count: usize) {
        self.counts
            .lock()
            .unwrap()
            .insert((kind, domain.to_lowercase()), count);
    }

    /// Makes every query against the domain fail with a lookup error.
    pub fn fail(&self, domain: &str) {
        self.failing.lock().unwrap().insert(domain.to_lowercase());
    }

    fn check_failing(&self, domain: &str) -> Result<(), DnsError> {
        if self.failing.lock().unwrap().contains(&domain.to_lowercase()) {
            Err(DnsError::Lookup(format!("simulated failure for {domain}")))
        } else {
            Ok(())
        }
    }
}

impl DnsResolver for StaticResolver {
    async fn query_txt(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        self.check_failing(domain)?;
        self.txt
            .lock()
            .unwrap()
            .get(&domain.to_lowercase())
            .cloned()
            .ok_or(DnsError::NotFound)
    }

    async fn query_mx(&self, domain: &str) -> Result<Vec<MxHost>, DnsError> {
        self.check_failing(domain)?;
        self.mx
            .lock()
            .unwrap()
            .get(&domain.to_lowercase())
            .cloned()
            .ok_or(DnsError::NotFound)
    }

    async fn record_count(&self, domain: &str, kind: RecordKind) -> Result<usize, DnsError> {
        self.check_failing(domain)?;
        self.counts
            .lock()
            .unwrap()
            .get(&(kind, domain.to_lowercase()))
            .copied()
            .ok_or(DnsError::NotFound)
    }
}
