//! Recursive SPF lookup counting.
//!
//! Walks the `include:`/`redirect=` graph of a policy, charging one DNS
//! lookup per consuming mechanism, bounded by a hard recursion depth and a
//! visited set keyed on `(domain, hash(record))`. Keying on record content
//! means the same domain can legitimately reappear with a different record
//! without being treated as a cycle.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;

use crate::config::SPF_MAX_DEPTH;
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::spf::parse;

/// Mutable state threaded through one evaluation call tree. Flags and
/// failure lists set anywhere in the tree taint the whole evaluation, but
/// never stop sibling branches from being counted.
#[derive(Debug, Default)]
pub struct Traversal {
    /// `(domain, record hash)` pairs already expanded.
    pub visited: HashSet<(String, u64)>,
    /// Accumulated DNS-lookup-consuming mechanism count.
    pub count: u32,
    /// An include/redirect cycle was hit.
    pub loop_detected: bool,
    /// The recursion depth bound was hit.
    pub depth_limit_reached: bool,
    /// The deprecated `ptr` mechanism appeared anywhere in the tree.
    pub ptr_seen: bool,
    /// `include:` targets with no resolvable SPF record.
    pub failed_includes: Vec<String>,
    /// `redirect=` targets with no resolvable SPF record.
    pub failed_redirects: Vec<String>,
}

fn record_hash(record: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    record.hash(&mut hasher);
    hasher.finish()
}

/// Resolves the SPF record of a domain: `Ok(Some(record))` when exactly one
/// usable `v=spf1` TXT record exists (first one wins on duplicates),
/// `Ok(None)` when the domain has none.
pub(crate) async fn resolve_spf<R: DnsResolver>(
    dns: &DnsClient<R>,
    domain: &str,
) -> Result<Option<String>, DnsError> {
    let records = dns.txt(domain).await?;
    Ok(records.into_iter().find(|r| parse::is_spf_record(r)))
}

/// Expands one record of the traversal tree, recursing into resolvable
/// include/redirect targets.
///
/// Unresolvable targets (DNS failure or no `v=spf1` record) are recorded in
/// the failure lists rather than failing the evaluation.
pub(crate) fn walk<'a, R: DnsResolver>(
    dns: &'a DnsClient<R>,
    domain: String,
    record: String,
    depth: usize,
    state: &'a mut Traversal,
) -> BoxFuture<'a, ()> {
    async move {
        if depth > SPF_MAX_DEPTH {
            debug!("SPF traversal for {domain} hit the depth bound at {depth}");
            state.depth_limit_reached = true;
            return;
        }

        let key = (domain.to_lowercase(), record_hash(&record));
        if !state.visited.insert(key) {
            debug!("SPF traversal cycle at {domain}");
            state.loop_detected = true;
            return;
        }

        let counts = parse::mechanism_counts(&record);
        state.count += counts.dns_lookups;
        state.ptr_seen |= counts.has_ptr;

        for target in parse::include_targets(&record) {
            state.count += 1;
            match resolve_spf(dns, &target).await {
                Ok(Some(sub_record)) => {
                    walk(dns, target, sub_record, depth + 1, state).await;
                }
                Ok(None) | Err(_) => state.failed_includes.push(target),
            }
        }

        if let Some(target) = parse::redirect_target(&record) {
            state.count += 1;
            match resolve_spf(dns, &target).await {
                Ok(Some(sub_record)) => {
                    walk(dns, target, sub_record, depth + 1, state).await;
                }
                Ok(None) | Err(_) => state.failed_redirects.push(target),
            }
        }
    }
    .boxed()
}
