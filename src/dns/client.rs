//! Caching DNS client.
//!
//! Wraps a [`DnsResolver`] with the TTL cache and applies the check-layer
//! contract: "no such domain / no such record" comes back as an empty result,
//! any other DNS failure propagates to the caller.

use log::debug;

use crate::config::DNS_CACHE_TTL;
use crate::dns::cache::{CachedValue, DnsCache, RecordKind};
use crate::dns::resolver::{DnsError, DnsResolver};
use crate::models::MxHost;

/// DNS client shared by all checks of an analysis.
pub struct DnsClient<R: DnsResolver> {
    resolver: R,
    cache: DnsCache,
}

impl<R: DnsResolver> DnsClient<R> {
    /// Wraps a resolver with a fresh cache using the default TTL.
    pub fn new(resolver: R) -> Self {
        DnsClient {
            resolver,
            cache: DnsCache::new(DNS_CACHE_TTL),
        }
    }

    /// Resolves TXT records, returning an empty list when none exist.
    pub async fn txt(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        if let Some(CachedValue::Txt(records)) = self.cache.get(RecordKind::Txt, domain) {
            debug!("DNS cache hit: TXT {domain}");
            return Ok(records);
        }
        let records = match self.resolver.query_txt(domain).await {
            Ok(records) => records,
            Err(DnsError::NotFound) => Vec::new(),
            Err(e) => return Err(e),
        };
        self.cache
            .insert(RecordKind::Txt, domain, CachedValue::Txt(records.clone()));
        Ok(records)
    }

    /// Resolves MX records, returning an empty list when none exist.
    pub async fn mx(&self, domain: &str) -> Result<Vec<MxHost>, DnsError> {
        if let Some(CachedValue::Mx(records)) = self.cache.get(RecordKind::Mx, domain) {
            debug!("DNS cache hit: MX {domain}");
            return Ok(records);
        }
        let records = match self.resolver.query_mx(domain).await {
            Ok(records) => records,
            Err(DnsError::NotFound) => Vec::new(),
            Err(e) => return Err(e),
        };
        self.cache
            .insert(RecordKind::Mx, domain, CachedValue::Mx(records.clone()));
        Ok(records)
    }

    /// Counts records of the given kind, returning 0 when none exist.
    pub async fn record_count(&self, domain: &str, kind: RecordKind) -> Result<usize, DnsError> {
        if let Some(CachedValue::Count(count)) = self.cache.get(kind, domain) {
            debug!("DNS cache hit: {kind:?} {domain}");
            return Ok(count);
        }
        let count = match self.resolver.record_count(domain, kind).await {
            Ok(count) => count,
            Err(DnsError::NotFound) => 0,
            Err(e) => return Err(e),
        };
        self.cache.insert(kind, domain, CachedValue::Count(count));
        Ok(count)
    }

    /// Clears the cache. Invoked between batch windows in multi-domain scans.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::resolver::StaticResolver;

    #[tokio::test]
    async fn not_found_becomes_empty() {
        let client = DnsClient::new(StaticResolver::new());
        assert!(client.txt("absent.test").await.unwrap().is_empty());
        assert!(client.mx("absent.test").await.unwrap().is_empty());
        assert_eq!(
            client.record_count("absent.test", RecordKind::Ds).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn other_failures_propagate() {
        let resolver = StaticResolver::new();
        resolver.fail("down.test");
        let client = DnsClient::new(resolver);
        assert!(client.txt("down.test").await.is_err());
    }

    #[tokio::test]
    async fn repeated_queries_are_served_from_cache() {
        let resolver = StaticResolver::new();
        resolver.add_txt("example.com", &["v=spf1 -all"]);
        let client = DnsClient::new(resolver.clone());

        assert_eq!(client.txt("example.com").await.unwrap().len(), 1);
        // Mutate the fixture; the cached answer should still be served.
        resolver.add_txt("example.com", &[]);
        assert_eq!(client.txt("example.com").await.unwrap().len(), 1);
        // After a clear, the new fixture is visible.
        client.clear_cache();
        assert!(client.txt("example.com").await.unwrap().is_empty());
    }
}
