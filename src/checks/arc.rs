//! ARC readiness derivation.
//!
//! ARC builds entirely on DKIM keys and DMARC policy, so readiness is
//! derived from the already-computed check results; no DNS query is made.

use crate::models::{ArcReadiness, DkimCheck, DmarcCheck, Issue, Severity, SpfCheck};

/// Derives ARC readiness from the SPF/DKIM/DMARC results. Checks that were
/// disabled or failed count as not-found.
pub fn derive(
    spf: Option<&SpfCheck>,
    dkim: Option<&DkimCheck>,
    dmarc: Option<&DmarcCheck>,
) -> ArcReadiness {
    let spf_found = spf.is_some_and(|c| c.found);
    let dkim_found = dkim.is_some_and(|c| c.found);
    let dmarc_found = dmarc.is_some_and(|c| c.found);

    let mut issues = Vec::new();

    if !dkim_found {
        issues.push(Issue::with_recommendation(
            Severity::Medium,
            "No DKIM key available; the domain cannot sign ARC sets",
            "Publish a DKIM key to enable ARC signing when forwarding mail",
        ));
    }
    if !dmarc_found {
        issues.push(Issue::new(
            Severity::Low,
            "Without DMARC, ARC's benefits for forwarded mail are limited",
        ));
    } else if dmarc.is_some_and(|c| matches!(c.policy.as_deref(), Some("none") | None)) {
        issues.push(Issue::new(
            Severity::Info,
            "DMARC policy is not enforcing; ARC only matters once failing mail is acted on",
        ));
    }
    if !spf_found {
        issues.push(Issue::new(
            Severity::Info,
            "No SPF record; ARC preserves SPF results across forwarding hops only when they exist",
        ));
    }
    if dkim_found && !dkim.is_some_and(|c| c.selectors.iter().any(|s| s.is_strong())) {
        issues.push(Issue::new(
            Severity::Low,
            "No DKIM selector uses ed25519 or RSA >= 2048 bits; ARC seals inherit that weakness",
        ));
    }

    ArcReadiness {
        can_sign: dkim_found,
        // Validation needs no domain-side configuration
        can_validate: true,
        ready: dkim_found && dmarc_found,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DkimSelector;

    fn found_spf() -> SpfCheck {
        SpfCheck {
            found: true,
            ..Default::default()
        }
    }

    fn dkim_with_bits(bits: u32) -> DkimCheck {
        DkimCheck {
            found: true,
            selectors: vec![DkimSelector {
                selector: "s1".into(),
                key_type: "rsa".into(),
                key_bits: Some(bits),
                revoked: false,
            }],
            issues: vec![],
        }
    }

    fn enforcing_dmarc() -> DmarcCheck {
        DmarcCheck {
            found: true,
            policy: Some("reject".into()),
            ..Default::default()
        }
    }

    #[test]
    fn fully_configured_domain_is_ready() {
        let spf = found_spf();
        let dkim = dkim_with_bits(2048);
        let dmarc = enforcing_dmarc();
        let arc = derive(Some(&spf), Some(&dkim), Some(&dmarc));
        assert!(arc.ready);
        assert!(arc.can_sign);
        assert!(arc.can_validate);
        assert!(arc.issues.is_empty());
    }

    #[test]
    fn missing_dkim_blocks_signing() {
        let spf = found_spf();
        let dmarc = enforcing_dmarc();
        let arc = derive(Some(&spf), None, Some(&dmarc));
        assert!(!arc.can_sign);
        assert!(!arc.ready);
        assert!(arc
            .issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.message.contains("cannot sign")));
    }

    #[test]
    fn dmarc_none_policy_is_info() {
        let spf = found_spf();
        let dkim = dkim_with_bits(2048);
        let dmarc = DmarcCheck {
            found: true,
            policy: Some("none".into()),
            ..Default::default()
        };
        let arc = derive(Some(&spf), Some(&dkim), Some(&dmarc));
        assert!(arc.ready);
        assert!(arc
            .issues
            .iter()
            .any(|i| i.severity == Severity::Info && i.message.contains("not enforcing")));
    }

    #[test]
    fn weak_keys_are_low() {
        let spf = found_spf();
        let dkim = dkim_with_bits(1024);
        let dmarc = enforcing_dmarc();
        let arc = derive(Some(&spf), Some(&dkim), Some(&dmarc));
        assert!(arc
            .issues
            .iter()
            .any(|i| i.severity == Severity::Low && i.message.contains("2048")));
    }

    #[test]
    fn can_validate_is_always_true() {
        let arc = derive(None, None, None);
        assert!(arc.can_validate);
        assert!(!arc.ready);
    }
}
