//! DNSSEC signing-material probe.
//!
//! Checks for DNSKEY records in the zone and a DS record at the parent
//! delegation. Presence of both means the chain of trust is complete;
//! DNSKEY without DS means the zone signs but no resolver can validate it.

use futures::try_join;

use crate::dns::{DnsClient, DnsError, DnsResolver, RecordKind};
use crate::models::{DnssecCheck, Issue, Severity};

/// Probes DS and DNSKEY presence for the domain.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<DnssecCheck, DnsError> {
    let (ds_count, dnskey_count) = try_join!(
        dns.record_count(domain, RecordKind::Ds),
        dns.record_count(domain, RecordKind::Dnskey),
    )?;

    let enabled = ds_count > 0 || dnskey_count > 0;
    let chain_valid = ds_count > 0 && dnskey_count > 0;

    let mut issues = Vec::new();
    if !enabled {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            "DNSSEC is not enabled; DNS answers for this domain cannot be authenticated",
            "Sign the zone and publish a DS record at the registrar",
        ));
    } else if !chain_valid {
        let missing = if ds_count == 0 { "DS" } else { "DNSKEY" };
        issues.push(Issue::new(
            Severity::Medium,
            format!("DNSSEC chain of trust is incomplete: no {missing} record found"),
        ));
    }

    Ok(DnssecCheck {
        found: enabled,
        enabled,
        chain_valid,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticResolver;

    async fn check_with(ds: usize, dnskey: usize) -> DnssecCheck {
        let resolver = StaticResolver::new();
        resolver.add_record_count("example.com", RecordKind::Ds, ds);
        resolver.add_record_count("example.com", RecordKind::Dnskey, dnskey);
        let dns = DnsClient::new(resolver);
        check("example.com", &dns).await.unwrap()
    }

    #[tokio::test]
    async fn unsigned_zone_is_medium() {
        let result = check_with(0, 0).await;
        assert!(!result.enabled);
        assert!(!result.chain_valid);
        assert_eq!(result.issues[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn complete_chain_is_clean() {
        let result = check_with(1, 2).await;
        assert!(result.enabled);
        assert!(result.chain_valid);
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn dnskey_without_ds_is_incomplete() {
        let result = check_with(0, 2).await;
        assert!(result.enabled);
        assert!(!result.chain_valid);
        assert!(result.issues[0].message.contains("no DS record"));
    }
}
