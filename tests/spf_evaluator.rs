//! SPF evaluation through the public API, driven by a fixture resolver.
//!
//! Covers the RFC 7208 lookup accounting across realistic include trees,
//! the hard lookup limit, and loop handling.

use mail_posture::dns::{DnsClient, StaticResolver};
use mail_posture::{spf, Severity};

fn client() -> (StaticResolver, DnsClient<StaticResolver>) {
    let resolver = StaticResolver::new();
    (resolver.clone(), DnsClient::new(resolver))
}

#[tokio::test]
async fn provider_style_include_tree_is_counted() {
    // Mirrors a common SaaS setup: one provider include that fans out to
    // three net blocks, like _spf.google.com does.
    let (resolver, dns) = client();
    resolver.add_txt(
        "example.com",
        &["v=spf1 include:_spf.provider.test ~all"],
    );
    resolver.add_txt(
        "_spf.provider.test",
        &["v=spf1 include:netblocks.provider.test include:netblocks2.provider.test include:netblocks3.provider.test ~all"],
    );
    resolver.add_txt("netblocks.provider.test", &["v=spf1 ip4:192.0.2.0/24 ~all"]);
    resolver.add_txt("netblocks2.provider.test", &["v=spf1 ip6:2001:db8::/32 ~all"]);
    resolver.add_txt("netblocks3.provider.test", &["v=spf1 ip4:198.51.100.0/24 ~all"]);

    let result = spf::check("example.com", &dns).await.unwrap();
    assert!(result.found);
    // 1 for the provider include + 3 for its nested includes
    assert_eq!(result.lookup_count, 4);
    assert_eq!(result.mechanism.as_deref(), Some("~all"));
    assert_eq!(result.includes, vec!["_spf.provider.test"]);
    assert!(!result.loop_detected);
}

#[tokio::test]
async fn exceeding_the_lookup_limit_is_flagged_high() {
    let (resolver, dns) = client();
    let includes: Vec<String> = (0..11).map(|i| format!("include:spf{i}.test")).collect();
    resolver.add_txt(
        "example.com",
        &[&format!("v=spf1 {} -all", includes.join(" "))],
    );
    for i in 0..11 {
        resolver.add_txt(&format!("spf{i}.test"), &["v=spf1 ip4:192.0.2.1 -all"]);
    }

    let result = spf::check("example.com", &dns).await.unwrap();
    assert_eq!(result.lookup_count, 11);
    assert!(result
        .issues
        .iter()
        .any(|i| i.severity == Severity::High && i.message.contains("exceed")));
}

#[tokio::test]
async fn mutual_include_cycle_terminates() {
    let (resolver, dns) = client();
    resolver.add_txt("a.test", &["v=spf1 include:b.test -all"]);
    resolver.add_txt("b.test", &["v=spf1 include:a.test -all"]);

    let result = spf::check("a.test", &dns).await.unwrap();
    assert!(result.loop_detected);
    assert!(result
        .issues
        .iter()
        .any(|i| i.severity == Severity::High && i.message.to_lowercase().contains("loop")));
}

#[tokio::test]
async fn unresolvable_include_is_reported_but_not_fatal() {
    let (resolver, dns) = client();
    resolver.add_txt("example.com", &["v=spf1 include:gone.test -all"]);

    let result = spf::check("example.com", &dns).await.unwrap();
    assert!(result.found);
    assert_eq!(result.lookup_count, 1);
    assert!(result
        .issues
        .iter()
        .any(|i| i.severity == Severity::High && i.message.contains("gone.test")));
}

#[tokio::test]
async fn open_policy_is_critical() {
    let (resolver, dns) = client();
    resolver.add_txt("example.com", &["v=spf1 +all"]);

    let result = spf::check("example.com", &dns).await.unwrap();
    assert_eq!(result.mechanism.as_deref(), Some("+all"));
    let critical: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
}

#[tokio::test]
async fn multiple_spf_records_are_flagged() {
    let (resolver, dns) = client();
    resolver.add_txt(
        "example.com",
        &["v=spf1 -all", "v=spf1 include:other.test ~all"],
    );
    resolver.add_txt("other.test", &["v=spf1 -all"]);

    let result = spf::check("example.com", &dns).await.unwrap();
    // First record wins for evaluation
    assert_eq!(result.mechanism.as_deref(), Some("-all"));
    assert!(result
        .issues
        .iter()
        .any(|i| i.severity == Severity::High && i.message.contains("2 SPF records")));
}
