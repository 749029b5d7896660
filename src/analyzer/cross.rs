//! Cross-check rules that only make sense once multiple results are in hand.

use crate::models::{BimiCheck, Issue, MtaStsCheck, MxCheck, Severity};

/// BIMI is only honored by mailbox providers when DMARC is at an enforcing
/// policy. Flags a published BIMI record whose DMARC prerequisite is missing
/// or too weak.
pub(super) fn bimi_requires_dmarc(
    bimi: &mut BimiCheck,
    dmarc: Option<&crate::models::DmarcCheck>,
) {
    if !bimi.found {
        return;
    }
    match dmarc {
        Some(dmarc) if dmarc.found => {
            if !dmarc.is_enforcing() {
                bimi.issues.push(Issue::with_recommendation(
                    Severity::High,
                    "BIMI record published but DMARC is not at an enforcing policy",
                    "Set the DMARC policy to quarantine or reject; providers ignore BIMI otherwise",
                ));
            }
        }
        _ => {
            bimi.issues.push(Issue::with_recommendation(
                Severity::High,
                "BIMI record published without a DMARC record",
                "Publish a DMARC record with p=quarantine or p=reject before deploying BIMI",
            ));
        }
    }
}

/// Every advertised MX exchange must match one of the MTA-STS policy's mx
/// patterns, otherwise enforcing senders will refuse to deliver through it.
pub(super) fn mta_sts_covers_mx(mta_sts: &mut MtaStsCheck, mx: &MxCheck) {
    let Some(policy) = mta_sts.policy.as_ref() else {
        return;
    };
    if policy.mx.is_empty() || !mx.found {
        return;
    }

    let uncovered: Vec<&str> = mx
        .records
        .iter()
        .map(|h| h.exchange.as_str())
        .filter(|exchange| !policy.mx.iter().any(|pattern| matches(pattern, exchange)))
        .collect();

    if !uncovered.is_empty() {
        mta_sts.issues.push(Issue::with_recommendation(
            Severity::High,
            format!(
                "MTA-STS policy does not cover MX host(s): {}",
                uncovered.join(", ")
            ),
            "Add the missing exchanges (or a matching wildcard) to the policy's mx entries",
        ));
    }
}

/// Pattern match per the MTA-STS policy syntax: an exact hostname, or a
/// `*.suffix` wildcard covering exactly the hosts under that suffix.
fn matches(pattern: &str, exchange: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let exchange = exchange.trim_end_matches('.').to_ascii_lowercase();
    if let Some(suffix) = pattern.strip_prefix("*.") {
        exchange
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.') && head.len() > 1)
    } else {
        pattern == exchange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DmarcCheck, MtaStsPolicy, MxHost};

    fn found_bimi() -> BimiCheck {
        BimiCheck {
            found: true,
            logo_url: Some("https://example.com/logo.svg".into()),
            ..Default::default()
        }
    }

    #[test]
    fn bimi_without_dmarc_is_flagged() {
        let mut bimi = found_bimi();
        bimi_requires_dmarc(&mut bimi, None);
        assert_eq!(bimi.issues.len(), 1);
        assert_eq!(bimi.issues[0].severity, Severity::High);
    }

    #[test]
    fn bimi_with_monitoring_dmarc_is_flagged() {
        let mut bimi = found_bimi();
        let dmarc = DmarcCheck {
            found: true,
            policy: Some("none".into()),
            ..Default::default()
        };
        bimi_requires_dmarc(&mut bimi, Some(&dmarc));
        assert_eq!(bimi.issues.len(), 1);
        assert!(bimi.issues[0].message.contains("enforcing"));
    }

    #[test]
    fn bimi_with_reject_dmarc_is_clean() {
        let mut bimi = found_bimi();
        let dmarc = DmarcCheck {
            found: true,
            policy: Some("reject".into()),
            ..Default::default()
        };
        bimi_requires_dmarc(&mut bimi, Some(&dmarc));
        assert!(bimi.issues.is_empty());
    }

    #[test]
    fn absent_bimi_is_never_flagged() {
        let mut bimi = BimiCheck::default();
        bimi_requires_dmarc(&mut bimi, None);
        assert!(bimi.issues.is_empty());
    }

    #[test]
    fn wildcard_covers_one_level_of_subdomains() {
        assert!(matches("*.example.com", "mx1.example.com"));
        assert!(matches("*.example.com", "deep.mx.example.com"));
        assert!(!matches("*.example.com", "example.com"));
        assert!(!matches("*.example.com", "mx1.example.org"));
        assert!(matches("mx.example.com", "MX.example.com."));
    }

    #[test]
    fn uncovered_exchange_raises_high_issue() {
        let mut mta_sts = MtaStsCheck {
            found: true,
            policy: Some(MtaStsPolicy {
                mode: "enforce".into(),
                mx: vec!["mx1.example.com".into(), "*.backup.example.com".into()],
                max_age: Some(604_800),
            }),
            ..Default::default()
        };
        let mx = MxCheck {
            found: true,
            records: vec![
                MxHost {
                    exchange: "mx1.example.com".into(),
                    priority: 10,
                },
                MxHost {
                    exchange: "relay.other.net".into(),
                    priority: 20,
                },
            ],
            issues: vec![],
        };
        mta_sts_covers_mx(&mut mta_sts, &mx);
        assert_eq!(mta_sts.issues.len(), 1);
        assert!(mta_sts.issues[0].message.contains("relay.other.net"));
        assert!(!mta_sts.issues[0].message.contains("mx1"));
    }

    #[test]
    fn fully_covered_policy_is_clean() {
        let mut mta_sts = MtaStsCheck {
            found: true,
            policy: Some(MtaStsPolicy {
                mode: "enforce".into(),
                mx: vec!["*.example.com".into()],
                max_age: Some(604_800),
            }),
            ..Default::default()
        };
        let mx = MxCheck {
            found: true,
            records: vec![MxHost {
                exchange: "mx2.example.com".into(),
                priority: 10,
            }],
            issues: vec![],
        };
        mta_sts_covers_mx(&mut mta_sts, &mx);
        assert!(mta_sts.issues.is_empty());
    }
}
