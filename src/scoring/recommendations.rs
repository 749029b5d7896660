//! Prioritized remediation advice derived from the check results.

use super::ScoreInput;

/// Builds remediation advice ordered by impact, biggest wins first.
///
/// The list is deterministic for a given set of results: each rule either
/// fires or it does not, and rules are emitted in a fixed priority order.
pub fn recommendations(input: &ScoreInput) -> Vec<String> {
    let mut out = Vec::new();

    let spf_found = input.spf.is_some_and(|c| c.found);
    let dkim_found = input.dkim.is_some_and(|c| c.found);
    let dmarc_found = input.dmarc.is_some_and(|c| c.found);

    if input.spf.is_some() && !spf_found {
        out.push(
            "Publish an SPF record listing your authorized mail senders, ending in -all".into(),
        );
    }
    if let Some(spf) = input.spf.filter(|c| c.found) {
        match spf.mechanism.as_deref() {
            Some("+all") => out.push(
                "Replace +all with -all; the current SPF record authorizes every host on the \
                 internet to send as your domain"
                    .into(),
            ),
            Some("?all") | None => out.push(
                "End the SPF record with -all so receivers can reject unauthorized senders".into(),
            ),
            Some("~all") => out.push(
                "Tighten the SPF record from ~all to -all once all senders are listed".into(),
            ),
            _ => {}
        }
        if spf.lookup_count > crate::config::SPF_HARD_LOOKUP_LIMIT {
            out.push(
                "Flatten the SPF record below 10 DNS lookups; receivers permerror past the limit"
                    .into(),
            );
        }
    }

    if input.dmarc.is_some() && !dmarc_found {
        out.push("Publish a DMARC record at _dmarc with at least p=none and a rua address".into());
    }
    if let Some(dmarc) = input.dmarc.filter(|c| c.found) {
        if dmarc.policy.as_deref() == Some("none") {
            out.push(
                "Move DMARC from p=none to p=quarantine and then p=reject once reports look clean"
                    .into(),
            );
        }
        if dmarc.pct.is_some_and(|p| p < 100) {
            out.push("Raise the DMARC pct value to 100 for full coverage".into());
        }
        if dmarc.rua.is_empty() && dmarc.ruf.is_empty() {
            out.push("Add a rua address to the DMARC record to receive aggregate reports".into());
        }
    }

    if input.dkim.is_some() && !dkim_found {
        out.push(
            "Set up DKIM signing and publish the public key under a selector at _domainkey".into(),
        );
    }
    if let Some(dkim) = input.dkim.filter(|c| c.found) {
        if !dkim.selectors.iter().any(|s| s.is_strong()) {
            out.push("Rotate DKIM keys to 2048-bit RSA or ed25519".into());
        }
    }

    if input.mx.is_some_and(|c| !c.found) {
        out.push("Publish MX records if this domain is meant to receive mail".into());
    }

    if input.mta_sts.is_some_and(|c| !c.found) {
        out.push("Deploy MTA-STS to require TLS for inbound mail delivery".into());
    } else if let Some(mta_sts) = input.mta_sts.filter(|c| c.found) {
        if mta_sts
            .policy
            .as_ref()
            .is_some_and(|p| p.mode == "testing")
        {
            out.push("Promote the MTA-STS policy from testing to enforce mode".into());
        }
    }

    if input.tls_rpt.is_some_and(|c| !c.found) {
        out.push("Publish a TLS-RPT record to receive reports about TLS delivery failures".into());
    }

    if input.dnssec.is_some_and(|c| !c.enabled) {
        out.push("Enable DNSSEC so your authentication records cannot be spoofed in transit".into());
    }

    if let Some(bimi) = input.bimi.filter(|c| c.found) {
        if bimi.certificate_url.is_none() {
            out.push(
                "Obtain a Verified Mark Certificate so mailbox providers display the BIMI logo"
                    .into(),
            );
        }
    }

    out
}
