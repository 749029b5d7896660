//! TLS-RPT record probe.

use crate::checks::{parse_tags, split_list, tag_value};
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{Issue, Severity, TlsRptCheck};

fn is_tlsrpt_record(record: &str) -> bool {
    let lower = record.trim().to_ascii_lowercase();
    lower == "v=tlsrptv1" || lower.starts_with("v=tlsrptv1;") || lower.starts_with("v=tlsrptv1 ")
}

/// Fetches and assesses the `_smtp._tls.<domain>` record.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<TlsRptCheck, DnsError> {
    let records = dns.txt(&format!("_smtp._tls.{domain}")).await?;
    let Some(record) = records.iter().find(|r| is_tlsrpt_record(r)).cloned() else {
        return Ok(TlsRptCheck {
            found: false,
            issues: vec![Issue::with_recommendation(
                Severity::Low,
                "No TLS-RPT record found",
                "Publish a _smtp._tls record to receive reports about TLS delivery failures",
            )],
            ..Default::default()
        });
    };

    let tags = parse_tags(&record);
    let rua = tag_value(&tags, "rua").map(split_list).unwrap_or_default();

    let mut issues = Vec::new();
    if rua.is_empty() {
        issues.push(Issue::new(
            Severity::Medium,
            "TLS-RPT record has no report destination (rua=)",
        ));
    }

    Ok(TlsRptCheck {
        found: true,
        record: Some(record),
        rua,
        issues,
    })
}
