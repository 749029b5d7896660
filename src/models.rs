//! Shared result types for the audit.
//!
//! Every check produces a result struct with a common `{found, issues}` base
//! plus check-specific fields. Results are created once per check per analysis
//! and never mutated after the orchestrator has finished appending its
//! cross-check issues.

use serde::Serialize;

/// Severity of a detected issue, ordered from worst to most benign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Configuration is actively harmful or missing entirely.
    Critical,
    /// Serious weakness that should be fixed promptly.
    High,
    /// Suboptimal configuration worth improving.
    Medium,
    /// Minor improvement opportunity.
    Low,
    /// Informational note, no action required.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A single finding attached to a check result.
///
/// Issues are immutable: they are created at detection time and carried
/// through scoring unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// How serious the finding is.
    pub severity: Severity,
    /// Human-readable description of the finding.
    pub message: String,
    /// Suggested remediation, when one is clear-cut.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Issue {
    /// Creates an issue without a remediation hint.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Issue {
            severity,
            message: message.into(),
            recommendation: None,
        }
    }

    /// Creates an issue with a remediation hint.
    pub fn with_recommendation(
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Issue {
            severity,
            message: message.into(),
            recommendation: Some(recommendation.into()),
        }
    }
}

/// SPF evaluation result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpfCheck {
    /// Whether a `v=spf1` TXT record was found at the domain apex.
    pub found: bool,
    /// The raw record that was evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// The `all` mechanism with its qualifier (e.g. `-all`), if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    /// Total DNS-lookup-consuming mechanisms across the include/redirect tree.
    pub lookup_count: u32,
    /// Direct `include:` targets of the apex record.
    pub includes: Vec<String>,
    /// An include/redirect cycle was detected during traversal.
    pub loop_detected: bool,
    /// Traversal hit the hard recursion depth bound.
    pub depth_limit_reached: bool,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// A published DKIM key discovered under `<selector>._domainkey.<domain>`.
#[derive(Debug, Clone, Serialize)]
pub struct DkimSelector {
    /// Selector label.
    pub selector: String,
    /// Key type from the `k=` tag (`rsa` when absent).
    pub key_type: String,
    /// Estimated public key strength in bits, when it could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    /// The key was published with an empty `p=` tag (revoked).
    pub revoked: bool,
}

impl DkimSelector {
    /// Whether this key meets the modern-strength bar (ed25519 or RSA >= 2048).
    pub fn is_strong(&self) -> bool {
        if self.revoked {
            return false;
        }
        self.key_type.eq_ignore_ascii_case("ed25519")
            || self.key_bits.is_some_and(|bits| bits >= 2048)
    }
}

/// DKIM probe result over the common-selector list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DkimCheck {
    /// At least one selector published a DKIM key.
    pub found: bool,
    /// Selectors that resolved to a DKIM record.
    pub selectors: Vec<DkimSelector>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// DMARC record result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DmarcCheck {
    /// A `v=DMARC1` record exists at `_dmarc.<domain>`.
    pub found: bool,
    /// The raw record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// Requested policy (`none`, `quarantine`, `reject`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Subdomain policy from `sp=`, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain_policy: Option<String>,
    /// Sampling percentage from `pct=`, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct: Option<u8>,
    /// Aggregate report addresses from `rua=`.
    pub rua: Vec<String>,
    /// Forensic report addresses from `ruf=`.
    pub ruf: Vec<String>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

impl DmarcCheck {
    /// Whether the published policy is enforcing (quarantine or reject).
    pub fn is_enforcing(&self) -> bool {
        matches!(self.policy.as_deref(), Some("quarantine") | Some("reject"))
    }
}

/// A single MX record.
#[derive(Debug, Clone, Serialize)]
pub struct MxHost {
    /// Mail exchange hostname.
    pub exchange: String,
    /// Preference value (lower is tried first).
    pub priority: u16,
}

/// MX probe result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MxCheck {
    /// The domain publishes at least one MX record.
    pub found: bool,
    /// MX records sorted by priority.
    pub records: Vec<MxHost>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// BIMI record result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BimiCheck {
    /// A `v=BIMI1` record exists at `default._bimi.<domain>`.
    pub found: bool,
    /// The raw record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// Logo indicator URL from `l=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Verified Mark Certificate URL from `a=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// Parsed MTA-STS policy file fetched from the well-known HTTPS endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MtaStsPolicy {
    /// Policy mode: `enforce`, `testing`, or `none`.
    pub mode: String,
    /// Permitted MX host patterns (exact hosts or `*.suffix` wildcards).
    pub mx: Vec<String>,
    /// Policy lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

/// MTA-STS probe result (DNS record + HTTPS policy fetch).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MtaStsCheck {
    /// A `v=STSv1` record exists at `_mta-sts.<domain>`.
    pub found: bool,
    /// The raw DNS record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// The fetched policy, when the HTTPS endpoint was reachable and parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<MtaStsPolicy>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// TLS-RPT record result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TlsRptCheck {
    /// A `v=TLSRPTv1` record exists at `_smtp._tls.<domain>`.
    pub found: bool,
    /// The raw record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    /// Report destinations from `rua=`.
    pub rua: Vec<String>,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// DNSSEC probe result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DnssecCheck {
    /// Signing material (DNSKEY or DS) was found.
    pub found: bool,
    /// The zone publishes DNSKEY or DS records.
    pub enabled: bool,
    /// Both DS and DNSKEY are present, i.e. the delegation chain is complete.
    pub chain_valid: bool,
    /// Findings for this check.
    pub issues: Vec<Issue>,
}

/// ARC readiness, derived from the SPF/DKIM/DMARC results without any
/// additional DNS queries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArcReadiness {
    /// The domain can sign ARC sets (requires a DKIM key).
    pub can_sign: bool,
    /// Any receiver can validate ARC; always true.
    pub can_validate: bool,
    /// DKIM and DMARC are both in place.
    pub ready: bool,
    /// Findings for this derivation.
    pub issues: Vec<Issue>,
}

/// Letter grade bands over the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    /// Score >= 90.
    A,
    /// Score >= 75.
    B,
    /// Score >= 50.
    C,
    /// Score >= 25.
    D,
    /// Everything else.
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Aggregate result of one domain analysis.
///
/// Constructed once per `analyze_domain` call and immutable afterwards.
/// Check fields are `None` when the corresponding check was disabled (or the
/// input domain failed validation and nothing ran at all).
#[derive(Debug, Clone, Serialize)]
pub struct DomainResult {
    /// The normalized domain that was analyzed.
    pub domain: String,
    /// SPF evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spf: Option<SpfCheck>,
    /// DKIM probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dkim: Option<DkimCheck>,
    /// DMARC probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmarc: Option<DmarcCheck>,
    /// MX probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx: Option<MxCheck>,
    /// BIMI probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bimi: Option<BimiCheck>,
    /// MTA-STS probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mta_sts: Option<MtaStsCheck>,
    /// TLS-RPT probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_rpt: Option<TlsRptCheck>,
    /// DNSSEC probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<DnssecCheck>,
    /// Derived ARC readiness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc: Option<ArcReadiness>,
    /// Letter grade for the overall posture.
    pub grade: Grade,
    /// Score in [0, 100].
    pub score: u32,
    /// Priority-ordered remediation suggestions.
    pub recommendations: Vec<String>,
    /// Per-check failure summary, when one or more checks failed or timed out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the analysis completed (UTC, milliseconds since epoch).
    pub timestamp: i64,
}
