//! DMARC policy record probe.

use log::debug;

use crate::checks::{parse_tags, split_list, tag_value};
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{DmarcCheck, Issue, Severity};

fn is_dmarc_record(record: &str) -> bool {
    let lower = record.trim().to_ascii_lowercase();
    lower == "v=dmarc1" || lower.starts_with("v=dmarc1;") || lower.starts_with("v=dmarc1 ")
}

/// Strength ordering for policy comparison: none < quarantine < reject.
fn policy_rank(policy: &str) -> u8 {
    match policy {
        "reject" => 2,
        "quarantine" => 1,
        _ => 0,
    }
}

/// Fetches and assesses the `_dmarc.<domain>` policy record.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<DmarcCheck, DnsError> {
    let records = dns.txt(&format!("_dmarc.{domain}")).await?;
    let Some(record) = records.iter().find(|r| is_dmarc_record(r)).cloned() else {
        return Ok(DmarcCheck {
            found: false,
            issues: vec![Issue::with_recommendation(
                Severity::Critical,
                "No DMARC record found",
                "Publish a v=DMARC1 record at _dmarc; start with p=none and reporting, then enforce",
            )],
            ..Default::default()
        });
    };
    debug!("DMARC record for {domain}: {record}");

    let tags = parse_tags(&record);
    let mut issues = Vec::new();

    let policy = tag_value(&tags, "p").map(|p| p.to_ascii_lowercase());
    let subdomain_policy = tag_value(&tags, "sp").map(|p| p.to_ascii_lowercase());
    let rua = tag_value(&tags, "rua").map(split_list).unwrap_or_default();
    let ruf = tag_value(&tags, "ruf").map(split_list).unwrap_or_default();

    let pct = match tag_value(&tags, "pct") {
        Some(raw) => match raw.parse::<u8>() {
            Ok(pct) if pct <= 100 => Some(pct),
            _ => {
                issues.push(Issue::new(
                    Severity::Low,
                    format!("DMARC pct tag has an invalid value '{raw}'"),
                ));
                None
            }
        },
        None => None,
    };

    match policy.as_deref() {
        Some("none") => issues.push(Issue::with_recommendation(
            Severity::High,
            "DMARC policy is 'none'; failing mail is delivered normally",
            "Move to p=quarantine and then p=reject once reports look clean",
        )),
        Some("quarantine") => issues.push(Issue::with_recommendation(
            Severity::Low,
            "DMARC policy is 'quarantine'",
            "Move to p=reject for full enforcement",
        )),
        Some("reject") => {}
        Some(other) => issues.push(Issue::new(
            Severity::Low,
            format!("DMARC record has an unrecognized policy '{other}'"),
        )),
        None => issues.push(Issue::new(
            Severity::Medium,
            "DMARC record is missing the required p= tag",
        )),
    }

    if let Some(pct) = pct {
        if pct < 100 {
            issues.push(Issue::with_recommendation(
                Severity::Medium,
                format!("DMARC policy applies to only {pct}% of mail"),
                "Remove pct= (or set pct=100) so the policy covers all mail",
            ));
        }
    }

    if rua.is_empty() && ruf.is_empty() {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            "DMARC record has no reporting addresses (rua/ruf)",
            "Add rua= so you can see who sends as your domain",
        ));
    }

    if let (Some(p), Some(sp)) = (policy.as_deref(), subdomain_policy.as_deref()) {
        if policy_rank(sp) < policy_rank(p) {
            issues.push(Issue::new(
                Severity::Low,
                format!("DMARC subdomain policy 'sp={sp}' is weaker than the domain policy 'p={p}'"),
            ));
        }
    }

    Ok(DmarcCheck {
        found: true,
        record: Some(record),
        policy,
        subdomain_policy,
        pct,
        rua,
        ruf,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticResolver;

    async fn check_record(record: &str) -> DmarcCheck {
        let resolver = StaticResolver::new();
        resolver.add_txt("_dmarc.example.com", &[record]);
        let dns = DnsClient::new(resolver);
        check("example.com", &dns).await.unwrap()
    }

    #[tokio::test]
    async fn missing_record_is_critical() {
        let dns = DnsClient::new(StaticResolver::new());
        let result = check("example.com", &dns).await.unwrap();
        assert!(!result.found);
        assert_eq!(result.issues[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn full_reject_policy_is_clean() {
        let result =
            check_record("v=DMARC1; p=reject; rua=mailto:dmarc@example.com; pct=100").await;
        assert!(result.found);
        assert_eq!(result.policy.as_deref(), Some("reject"));
        assert_eq!(result.pct, Some(100));
        assert_eq!(result.rua, vec!["mailto:dmarc@example.com"]);
        assert!(result.issues.is_empty(), "issues: {:?}", result.issues);
    }

    #[tokio::test]
    async fn policy_none_is_high() {
        let result = check_record("v=DMARC1; p=none; rua=mailto:d@example.com").await;
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::High && i.message.contains("'none'")));
    }

    #[tokio::test]
    async fn partial_pct_is_medium() {
        let result = check_record("v=DMARC1; p=reject; pct=30; rua=mailto:d@example.com").await;
        assert_eq!(result.pct, Some(30));
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.message.contains("30%")));
    }

    #[tokio::test]
    async fn invalid_pct_is_low_and_parsing_continues() {
        let result = check_record("v=DMARC1; p=reject; pct=banana; rua=mailto:d@example.com").await;
        assert!(result.found);
        assert_eq!(result.pct, None);
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Low && i.message.contains("pct")));
    }

    #[tokio::test]
    async fn missing_reporting_is_medium() {
        let result = check_record("v=DMARC1; p=reject").await;
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.message.contains("reporting")));
    }

    #[tokio::test]
    async fn weaker_subdomain_policy_is_low() {
        let result = check_record("v=DMARC1; p=reject; sp=none; rua=mailto:d@example.com").await;
        assert_eq!(result.subdomain_policy.as_deref(), Some("none"));
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Low && i.message.contains("sp=none")));
    }

    #[tokio::test]
    async fn non_dmarc_txt_records_are_ignored() {
        let resolver = StaticResolver::new();
        resolver.add_txt("_dmarc.example.com", &["some verification token"]);
        let dns = DnsClient::new(resolver);
        let result = check("example.com", &dns).await.unwrap();
        assert!(!result.found);
    }
}
