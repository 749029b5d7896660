//! SPF policy evaluation (RFC 7208 auditing, not authorization).
//!
//! Fetches the apex `v=spf1` record, walks its include/redirect tree while
//! counting DNS-lookup-consuming mechanisms, and turns what it finds into
//! severity-tagged issues: enforcement strength of the `all` qualifier,
//! lookup-limit overruns, deprecated mechanisms, unresolvable targets, and
//! traversal anomalies (cycles, depth overflow).

pub(crate) mod eval;
pub(crate) mod parse;

use log::debug;

use crate::config::{SPF_HARD_LOOKUP_LIMIT, SPF_SOFT_LOOKUP_LIMIT};
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{Issue, Severity, SpfCheck};

use eval::Traversal;

/// Evaluates the SPF posture of a domain.
///
/// Returns `found: false` with a critical issue when no `v=spf1` record
/// exists. DNS failures below the apex (for include/redirect targets) are
/// absorbed into the failure lists; only an apex-level DNS failure errors
/// out, to be caught by the orchestrator's per-check isolation.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<SpfCheck, DnsError> {
    let records = dns.txt(domain).await?;
    let spf_records: Vec<&String> = records.iter().filter(|r| parse::is_spf_record(r)).collect();

    let Some(record) = spf_records.first().map(|r| r.to_string()) else {
        return Ok(SpfCheck {
            found: false,
            issues: vec![Issue::with_recommendation(
                Severity::Critical,
                "No SPF record found",
                "Publish a v=spf1 TXT record declaring your authorized senders",
            )],
            ..Default::default()
        });
    };
    debug!("Evaluating SPF for {domain}: {record}");

    let mut issues = Vec::new();
    if spf_records.len() > 1 {
        // Multiple records make evaluation ambiguous in real MTAs; proceed
        // with the first one.
        issues.push(Issue::with_recommendation(
            Severity::High,
            format!(
                "{} SPF records found; receivers treat multiple records as a permanent error",
                spf_records.len()
            ),
            "Merge all mechanisms into a single v=spf1 record",
        ));
    }

    let mechanism = parse::all_mechanism(&record);
    let includes = parse::include_targets(&record);

    let mut traversal = Traversal::default();
    eval::walk(dns, domain.to_string(), record.clone(), 0, &mut traversal).await;

    issues.extend(derive_issues(&mechanism, &traversal));

    Ok(SpfCheck {
        found: true,
        record: Some(record),
        mechanism,
        lookup_count: traversal.count,
        includes,
        loop_detected: traversal.loop_detected,
        depth_limit_reached: traversal.depth_limit_reached,
        issues,
    })
}

fn derive_issues(mechanism: &Option<String>, traversal: &Traversal) -> Vec<Issue> {
    let mut issues = Vec::new();

    match mechanism.as_deref() {
        Some("+all") => issues.push(Issue::with_recommendation(
            Severity::Critical,
            "SPF record uses '+all', authorizing the entire internet to send as this domain",
            "Replace '+all' with '-all'",
        )),
        Some("?all") => issues.push(Issue::with_recommendation(
            Severity::High,
            "SPF record ends in '?all' (neutral), providing no enforcement",
            "Tighten the policy to '~all' or '-all'",
        )),
        Some("~all") => issues.push(Issue::with_recommendation(
            Severity::Medium,
            "SPF record ends in '~all' (softfail) rather than '-all'",
            "Move to '-all' once all legitimate senders are listed",
        )),
        Some(_) => {}
        None => issues.push(Issue::with_recommendation(
            Severity::High,
            "SPF record has no 'all' mechanism; unlisted senders are implicitly neutral",
            "Terminate the record with '-all'",
        )),
    }

    if traversal.count > SPF_HARD_LOOKUP_LIMIT {
        issues.push(Issue::with_recommendation(
            Severity::High,
            format!(
                "SPF record requires {} DNS lookups, exceeding the RFC 7208 limit of {}",
                traversal.count, SPF_HARD_LOOKUP_LIMIT
            ),
            "Flatten includes or drop unused mechanisms; receivers return permerror past the limit",
        ));
    } else if traversal.count > SPF_SOFT_LOOKUP_LIMIT {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            format!(
                "SPF record requires {} DNS lookups, close to the limit of {}",
                traversal.count, SPF_HARD_LOOKUP_LIMIT
            ),
            "Leave headroom below the lookup limit for third-party include growth",
        ));
    }

    if traversal.ptr_seen {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            "SPF record uses the deprecated 'ptr' mechanism",
            "Remove 'ptr'; RFC 7208 discourages it as slow and unreliable",
        ));
    }

    for target in unique(&traversal.failed_includes) {
        issues.push(Issue::with_recommendation(
            Severity::High,
            format!("SPF include target '{target}' has no resolvable SPF record"),
            "Remove or fix the include target",
        ));
    }
    for target in unique(&traversal.failed_redirects) {
        issues.push(Issue::with_recommendation(
            Severity::High,
            format!("SPF redirect target '{target}' has no resolvable SPF record"),
            "Remove or fix the redirect target",
        ));
    }

    if traversal.loop_detected {
        issues.push(Issue::new(
            Severity::High,
            "SPF include/redirect chain contains a loop",
        ));
    }
    if traversal.depth_limit_reached {
        issues.push(Issue::new(
            Severity::High,
            "SPF include/redirect chain exceeds the maximum evaluation depth",
        ));
    }

    issues
}

/// Deduplicates while preserving first-seen order.
fn unique(targets: &[String]) -> Vec<&String> {
    let mut seen = std::collections::HashSet::new();
    targets.iter().filter(|t| seen.insert(t.as_str())).collect()
}
