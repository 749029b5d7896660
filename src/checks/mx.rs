//! MX record probe.

use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{Issue, MxCheck, Severity};

/// Fetches the domain's MX records.
pub async fn check<R: DnsResolver>(domain: &str, dns: &DnsClient<R>) -> Result<MxCheck, DnsError> {
    let records = dns.mx(domain).await?;
    let mut issues = Vec::new();

    if records.is_empty() {
        issues.push(Issue::with_recommendation(
            Severity::High,
            "No MX records found; the domain cannot receive mail",
            "Publish MX records, or an explicit 'null MX' (RFC 7505) if the domain sends no mail",
        ));
    } else if records.len() == 1 {
        issues.push(Issue::new(
            Severity::Low,
            "Only one MX record; a backup exchanger improves delivery resilience",
        ));
    }

    Ok(MxCheck {
        found: !records.is_empty(),
        records,
        issues,
    })
}
