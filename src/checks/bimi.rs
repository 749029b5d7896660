//! BIMI record probe.
//!
//! Only the record itself is validated here; the DMARC prerequisites
//! (configured, enforcing policy) are cross-check rules the orchestrator
//! appends after all checks have settled.

use crate::checks::{parse_tags, tag_value};
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{BimiCheck, Issue, Severity};

fn is_bimi_record(record: &str) -> bool {
    let lower = record.trim().to_ascii_lowercase();
    lower == "v=bimi1" || lower.starts_with("v=bimi1;") || lower.starts_with("v=bimi1 ")
}

/// Fetches and assesses the `default._bimi.<domain>` record.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<BimiCheck, DnsError> {
    let records = dns.txt(&format!("default._bimi.{domain}")).await?;
    let Some(record) = records.iter().find(|r| is_bimi_record(r)).cloned() else {
        return Ok(BimiCheck::default());
    };

    let tags = parse_tags(&record);
    let logo_url = tag_value(&tags, "l")
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let certificate_url = tag_value(&tags, "a")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let mut issues = Vec::new();
    match &logo_url {
        None => issues.push(Issue::with_recommendation(
            Severity::High,
            "BIMI record has no logo URL (l=)",
            "Point l= at an SVG Tiny PS logo served over HTTPS",
        )),
        Some(raw) => match url::Url::parse(raw) {
            Ok(parsed) if parsed.scheme() != "https" => issues.push(Issue::new(
                Severity::Medium,
                "BIMI logo URL is not served over HTTPS",
            )),
            Ok(_) => {}
            Err(_) => issues.push(Issue::new(
                Severity::Medium,
                format!("BIMI logo URL does not parse: {raw}"),
            )),
        },
    }
    if certificate_url.is_none() {
        issues.push(Issue::new(
            Severity::Info,
            "BIMI record has no Verified Mark Certificate (a=); some receivers will not display the logo",
        ));
    }

    Ok(BimiCheck {
        found: true,
        record: Some(record),
        logo_url,
        certificate_url,
        issues,
    })
}
