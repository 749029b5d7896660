//! DKIM key discovery over the common-selector list.
//!
//! Without access to outbound mail we cannot know which selectors a domain
//! actually signs with, so the probe queries a fixed list of well-known
//! selectors in parallel and assesses every key it finds.

use base64::Engine;
use futures::future::join_all;
use log::debug;

use crate::checks::{parse_tags, tag_value};
use crate::config::DKIM_COMMON_SELECTORS;
use crate::dns::{DnsClient, DnsError, DnsResolver};
use crate::models::{DkimCheck, DkimSelector, Issue, Severity};

/// Probes the common selectors and assesses the discovered keys.
pub async fn check<R: DnsResolver>(
    domain: &str,
    dns: &DnsClient<R>,
) -> Result<DkimCheck, DnsError> {
    let lookups = DKIM_COMMON_SELECTORS.iter().map(|selector| async move {
        let name = format!("{selector}._domainkey.{domain}");
        let records = dns.txt(&name).await?;
        Ok::<_, DnsError>((*selector, records))
    });

    let mut selectors = Vec::new();
    let mut issues = Vec::new();
    for outcome in join_all(lookups).await {
        let (selector, records) = outcome?;
        let Some(record) = records.iter().find(|r| is_dkim_record(r)) else {
            continue;
        };
        debug!("DKIM key found at {selector}._domainkey.{domain}");
        selectors.push(assess_key(selector, record, &mut issues));
    }

    let found = !selectors.is_empty();
    if !found {
        issues.push(Issue::with_recommendation(
            Severity::High,
            "No DKIM keys found on any common selector",
            "Publish a DKIM key and sign outbound mail; selectors outside the probed list are not detected",
        ));
    }

    Ok(DkimCheck {
        found,
        selectors,
        issues,
    })
}

/// A TXT record is treated as a DKIM key when it carries a `p=` tag or the
/// explicit `v=DKIM1` version.
fn is_dkim_record(record: &str) -> bool {
    let tags = parse_tags(record);
    tag_value(&tags, "v").is_some_and(|v| v.eq_ignore_ascii_case("DKIM1"))
        || tag_value(&tags, "p").is_some()
}

fn assess_key(selector: &str, record: &str, issues: &mut Vec<Issue>) -> DkimSelector {
    let tags = parse_tags(record);
    let key_type = tag_value(&tags, "k").unwrap_or("rsa").to_ascii_lowercase();
    let public_key = tag_value(&tags, "p").unwrap_or("");
    let revoked = public_key.is_empty();

    let key_bits = if revoked {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            format!("DKIM selector '{selector}' publishes an empty key (revoked)"),
            "Remove the record or publish a fresh key",
        ));
        None
    } else {
        match estimate_key_bits(&key_type, public_key) {
            Ok(bits) => Some(bits),
            Err(reason) => {
                issues.push(Issue::new(
                    Severity::Low,
                    format!("DKIM selector '{selector}' has an unparseable public key: {reason}"),
                ));
                None
            }
        }
    };

    if let Some(bits) = key_bits {
        if key_type == "rsa" && bits < 1024 {
            issues.push(Issue::with_recommendation(
                Severity::High,
                format!("DKIM selector '{selector}' uses a weak {bits}-bit RSA key"),
                "Rotate to a 2048-bit RSA or ed25519 key",
            ));
        } else if key_type == "rsa" && bits < 2048 {
            issues.push(Issue::with_recommendation(
                Severity::Medium,
                format!("DKIM selector '{selector}' uses a {bits}-bit RSA key"),
                "Rotate to a 2048-bit RSA or ed25519 key",
            ));
        }
    }

    if tag_value(&tags, "t").is_some_and(|t| t.split(':').any(|f| f.trim() == "y")) {
        issues.push(Issue::new(
            Severity::Low,
            format!("DKIM selector '{selector}' is in testing mode (t=y)"),
        ));
    }

    DkimSelector {
        selector: selector.to_string(),
        key_type,
        key_bits,
        revoked,
    }
}

/// Estimates key strength from the decoded `p=` material.
///
/// RSA keys are published as SubjectPublicKeyInfo DER, whose length tracks
/// the modulus size closely (1024-bit ~ 162 bytes, 2048-bit ~ 294 bytes,
/// 4096-bit ~ 550 bytes); ed25519 keys are 32 raw bytes.
fn estimate_key_bits(key_type: &str, public_key: &str) -> Result<u32, String> {
    let stripped: String = public_key.chars().filter(|c| !c.is_whitespace()).collect();
    let der = base64::engine::general_purpose::STANDARD
        .decode(&stripped)
        .map_err(|e| format!("invalid base64: {e}"))?;

    if key_type == "ed25519" {
        return Ok(256);
    }

    let bits = match der.len() {
        0..=93 => 256,
        94..=120 => 512,
        121..=161 => 768,
        162..=269 => 1024,
        270..=420 => 2048,
        421..=520 => 3072,
        _ => 4096,
    };
    Ok(bits)
}
