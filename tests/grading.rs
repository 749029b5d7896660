//! Grade composition over full analysis runs.
//!
//! Uses fixture zones rather than hand-built result structs so the grades
//! reflect what the whole pipeline actually produces.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use mail_posture::dns::{RecordKind, StaticResolver};
use mail_posture::{Analyzer, CheckKind, Config, Grade};

/// A DKIM record whose base64 key decodes to a 2048-bit-RSA-sized SPKI.
fn strong_dkim_record() -> String {
    format!("v=DKIM1; k=rsa; p={}", STANDARD.encode(vec![0u8; 294]))
}

fn hardened_zone() -> StaticResolver {
    let resolver = StaticResolver::new();
    resolver.add_txt("example.com", &["v=spf1 ip4:192.0.2.0/24 -all"]);
    resolver.add_txt("default._domainkey.example.com", &[&strong_dkim_record()]);
    resolver.add_txt(
        "_dmarc.example.com",
        &["v=DMARC1; p=reject; rua=mailto:dmarc@example.com"],
    );
    resolver.add_mx(
        "example.com",
        &[("mx1.example.com", 10), ("mx2.example.com", 20)],
    );
    resolver.add_txt(
        "_smtp._tls.example.com",
        &["v=TLSRPTv1; rua=mailto:tls@example.com"],
    );
    resolver.add_record_count("example.com", RecordKind::Ds, 1);
    resolver.add_record_count("example.com", RecordKind::Dnskey, 2);
    resolver
}

#[tokio::test]
async fn hardened_domain_grades_a_with_no_advice() {
    // MTA-STS is skipped: the fixture has no HTTPS endpoint to serve a
    // policy from, and an absent record would draw a deployment suggestion.
    let config = Config {
        skip: vec![CheckKind::MtaSts],
        ..Default::default()
    };
    let analyzer = Analyzer::with_resolver(hardened_zone(), config).unwrap();
    let result = analyzer.analyze_domain("example.com").await;

    assert_eq!(result.grade, Grade::A, "result: {result:?}");
    assert_eq!(result.score, 100);
    assert!(result.recommendations.is_empty());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn empty_zone_grades_f_at_zero() {
    let config = Config {
        checks: Some(vec![CheckKind::Spf, CheckKind::Dkim, CheckKind::Dmarc]),
        ..Default::default()
    };
    let analyzer = Analyzer::with_resolver(StaticResolver::new(), config).unwrap();
    let result = analyzer.analyze_domain("example.com").await;

    assert_eq!(result.score, 0);
    assert_eq!(result.grade, Grade::F);
    assert!(!result.recommendations.is_empty());
}

#[tokio::test]
async fn monitoring_only_posture_grades_below_a() {
    let resolver = StaticResolver::new();
    resolver.add_txt("example.com", &["v=spf1 include:_spf.provider.test ~all"]);
    resolver.add_txt("_spf.provider.test", &["v=spf1 ip4:192.0.2.0/24 ~all"]);
    resolver.add_txt("_dmarc.example.com", &["v=DMARC1; p=none"]);
    resolver.add_mx("example.com", &[("mx1.example.com", 10), ("mx2.example.com", 20)]);

    let analyzer = Analyzer::with_resolver(resolver, Config::default()).unwrap();
    let result = analyzer.analyze_domain("example.com").await;

    assert!(result.score < 75, "score: {}", result.score);
    assert!(result.grade != Grade::A && result.grade != Grade::B);
    // Enforcement is the biggest gap, so it must lead the advice
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.contains("p=quarantine") || r.contains("quarantine")));
}

#[tokio::test]
async fn open_spf_policy_caps_the_grade() {
    let resolver = hardened_zone();
    resolver.add_txt("example.com", &["v=spf1 +all"]);

    let analyzer = Analyzer::with_resolver(resolver, Config::default()).unwrap();
    let result = analyzer.analyze_domain("example.com").await;

    // Loses the -all points and eats a critical penalty
    assert!(result.score <= 85, "score: {}", result.score);
    assert!(result
        .recommendations
        .first()
        .is_some_and(|r| r.contains("+all")));
}

#[tokio::test]
async fn dnssec_and_tls_rpt_only_move_the_bonus_pool() {
    // Same core posture with and without the optional checks enabled:
    // the delta is bounded by the bonus cap.
    let analyzer = Analyzer::with_resolver(hardened_zone(), Config::default()).unwrap();
    let with_bonus = analyzer.analyze_domain("example.com").await;

    let core_only = Config {
        checks: Some(vec![
            CheckKind::Spf,
            CheckKind::Dkim,
            CheckKind::Dmarc,
            CheckKind::Mx,
        ]),
        ..Default::default()
    };
    let analyzer = Analyzer::with_resolver(hardened_zone(), core_only).unwrap();
    let without_bonus = analyzer.analyze_domain("example.com").await;

    assert!(with_bonus.score >= without_bonus.score);
    assert!(with_bonus.score - without_bonus.score <= 15);
}
