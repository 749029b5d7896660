//! MTA-STS probe: DNS record plus the HTTPS policy file.
//!
//! The DNS record only announces that a policy exists; the policy itself
//! lives at `https://mta-sts.<domain>/.well-known/mta-sts.txt`. The fetch
//! runs under a hard timeout with true cancellation (dropping the reqwest
//! future aborts the connection), and every failure mode is classified into
//! an issue rather than failing the check.

use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::checks::{parse_tags, tag_value};
use crate::config::{MTA_STS_MIN_MAX_AGE, POLICY_FETCH_TIMEOUT};
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{Issue, MtaStsCheck, MtaStsPolicy, Severity};

/// Why an HTTPS policy fetch failed.
#[derive(Debug, Error)]
pub enum PolicyFetchError {
    /// The fetch exceeded the policy timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Connection-level failure (DNS, TLS, refused, ...).
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// The body did not parse as an MTA-STS policy.
    #[error("malformed policy: {0}")]
    Parse(String),
}

fn is_sts_record(record: &str) -> bool {
    let lower = record.trim().to_ascii_lowercase();
    lower == "v=stsv1" || lower.starts_with("v=stsv1;") || lower.starts_with("v=stsv1 ")
}

/// Fetches the `_mta-sts.<domain>` record and, when present, the policy file.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
    http: &reqwest::Client,
) -> Result<MtaStsCheck, DnsError> {
    let records = dns.txt(&format!("_mta-sts.{domain}")).await?;
    let Some(record) = records.iter().find(|r| is_sts_record(r)).cloned() else {
        return Ok(MtaStsCheck::default());
    };
    debug!("MTA-STS record for {domain}: {record}");

    let mut issues = Vec::new();
    let tags = parse_tags(&record);
    if tag_value(&tags, "id").filter(|v| !v.is_empty()).is_none() {
        issues.push(Issue::new(
            Severity::Low,
            "MTA-STS record is missing the id= tag; receivers cannot detect policy updates",
        ));
    }

    let policy = match fetch_policy(http, domain).await {
        Ok(policy) => {
            assess_policy(&policy, &mut issues);
            Some(policy)
        }
        Err(e) => {
            issues.push(Issue::with_recommendation(
                Severity::High,
                format!("MTA-STS record exists but the policy file could not be retrieved: {e}"),
                format!("Serve a valid policy at https://mta-sts.{domain}/.well-known/mta-sts.txt"),
            ));
            None
        }
    };

    Ok(MtaStsCheck {
        found: true,
        record: Some(record),
        policy,
        issues,
    })
}

async fn fetch_policy(
    http: &reqwest::Client,
    domain: &str,
) -> Result<MtaStsPolicy, PolicyFetchError> {
    let url = format!("https://mta-sts.{domain}/.well-known/mta-sts.txt");
    let request = http.get(&url).send();

    let response = match tokio::time::timeout(POLICY_FETCH_TIMEOUT, request).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) if e.is_timeout() => return Err(PolicyFetchError::Timeout(POLICY_FETCH_TIMEOUT)),
        Ok(Err(e)) => return Err(PolicyFetchError::Network(e.to_string())),
        Err(_) => return Err(PolicyFetchError::Timeout(POLICY_FETCH_TIMEOUT)),
    };

    let status = response.status();
    if !status.is_success() {
        return Err(PolicyFetchError::HttpStatus(status.as_u16()));
    }

    let body = match tokio::time::timeout(POLICY_FETCH_TIMEOUT, response.text()).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return Err(PolicyFetchError::Network(e.to_string())),
        Err(_) => return Err(PolicyFetchError::Timeout(POLICY_FETCH_TIMEOUT)),
    };

    parse_policy(&body).map_err(PolicyFetchError::Parse)
}

/// Parses the `key: value` policy file format (RFC 8461 section 3.2).
fn parse_policy(body: &str) -> Result<MtaStsPolicy, String> {
    let mut version = None;
    let mut mode = None;
    let mut max_age = None;
    let mut mx = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => version = Some(value.to_string()),
            "mode" => mode = Some(value.to_ascii_lowercase()),
            "max_age" => max_age = value.parse::<u64>().ok(),
            "mx" => mx.push(value.trim_end_matches('.').to_lowercase()),
            _ => {}
        }
    }

    match version.as_deref() {
        Some("STSv1") => {}
        Some(other) => return Err(format!("unsupported version '{other}'")),
        None => return Err("missing version field".to_string()),
    }
    let Some(mode) = mode else {
        return Err("missing mode field".to_string());
    };

    Ok(MtaStsPolicy { mode, mx, max_age })
}

fn assess_policy(policy: &MtaStsPolicy, issues: &mut Vec<Issue>) {
    match policy.mode.as_str() {
        "enforce" => {}
        "testing" => issues.push(Issue::with_recommendation(
            Severity::Low,
            "MTA-STS policy is in testing mode",
            "Switch to mode: enforce once TLS reports look clean",
        )),
        "none" => issues.push(Issue::new(
            Severity::Medium,
            "MTA-STS policy mode is 'none', disabling the policy",
        )),
        other => issues.push(Issue::new(
            Severity::Medium,
            format!("MTA-STS policy has an unrecognized mode '{other}'"),
        )),
    }

    match policy.max_age {
        Some(age) if age < MTA_STS_MIN_MAX_AGE => issues.push(Issue::new(
            Severity::Low,
            format!("MTA-STS max_age of {age}s is under one day; cached protection expires quickly"),
        )),
        Some(_) => {}
        None => issues.push(Issue::new(
            Severity::Low,
            "MTA-STS policy is missing max_age",
        )),
    }
}
