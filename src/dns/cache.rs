//! Process-wide DNS result cache with TTL eviction.
//!
//! Several checks query the same apex or subdomain during one analysis; the
//! cache deduplicates those queries. It is cleared explicitly at batch-window
//! boundaries in multi-domain scans rather than relying on TTL alone, which
//! bounds both memory and staleness.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::MxHost;

/// Record type component of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// TXT records.
    Txt,
    /// MX records.
    Mx,
    /// DS records (DNSSEC delegation).
    Ds,
    /// DNSKEY records (DNSSEC zone keys).
    Dnskey,
}

/// A cached query result.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// TXT record strings.
    Txt(Vec<String>),
    /// MX records.
    Mx(Vec<MxHost>),
    /// Record count for presence probes.
    Count(usize),
}

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

/// TTL cache keyed by `(record kind, domain)`.
///
/// The mutex is held only for map access, never across an await, so lock
/// contention is negligible even on a multi-threaded runtime.
pub struct DnsCache {
    entries: Mutex<HashMap<(RecordKind, String), Entry>>,
    ttl: Duration,
}

impl DnsCache {
    /// Creates a cache with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        DnsCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value for the key if present and not expired.
    /// Expired entries are evicted on read.
    pub fn get(&self, kind: RecordKind, domain: &str) -> Option<CachedValue> {
        let key = (kind, domain.to_lowercase());
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Stores a value under the key with the cache's TTL.
    pub fn insert(&self, kind: RecordKind, domain: &str, value: CachedValue) {
        let key = (kind, domain.to_lowercase());
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().unwrap().insert(key, entry);
    }

    /// Drops every entry. Called at batch-window boundaries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of live entries (expired entries may still be counted until
    /// their next read).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = DnsCache::new(Duration::from_secs(30));
        cache.insert(
            RecordKind::Txt,
            "example.com",
            CachedValue::Txt(vec!["v=spf1 -all".into()]),
        );
        match cache.get(RecordKind::Txt, "example.com") {
            Some(CachedValue::Txt(records)) => assert_eq!(records, vec!["v=spf1 -all"]),
            other => panic!("expected cached TXT, got {other:?}"),
        }
    }

    #[test]
    fn keys_are_case_insensitive_and_kind_scoped() {
        let cache = DnsCache::new(Duration::from_secs(30));
        cache.insert(RecordKind::Txt, "Example.COM", CachedValue::Txt(vec![]));
        assert!(cache.get(RecordKind::Txt, "example.com").is_some());
        assert!(cache.get(RecordKind::Mx, "example.com").is_none());
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = DnsCache::new(Duration::ZERO);
        cache.insert(RecordKind::Mx, "example.com", CachedValue::Mx(vec![]));
        assert!(cache.get(RecordKind::Mx, "example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = DnsCache::new(Duration::from_secs(30));
        cache.insert(RecordKind::Ds, "example.com", CachedValue::Count(2));
        cache.insert(RecordKind::Dnskey, "example.com", CachedValue::Count(1));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
