//! Result rendering: a colored human-readable report, or JSON.

use std::fmt::Write as _;

use clap::ValueEnum;
use colored::Colorize;

use crate::models::{DomainResult, Grade, Issue, Severity};

/// Output format for rendered results.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored report.
    Text,
    /// Machine-readable JSON array.
    Json,
}

/// Serializes results to pretty-printed JSON.
pub fn render_json(results: &[DomainResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Renders one result as a human-readable report.
pub fn render_text(result: &DomainResult) -> String {
    let mut out = String::new();

    let grade = match result.grade {
        Grade::A => result.grade.to_string().green().bold(),
        Grade::B => result.grade.to_string().green(),
        Grade::C => result.grade.to_string().yellow(),
        Grade::D | Grade::F => result.grade.to_string().red().bold(),
    };
    let _ = writeln!(
        out,
        "{}  grade {}  ({}/100)",
        result.domain.bold(),
        grade,
        result.score
    );

    if let Some(error) = &result.error {
        let _ = writeln!(out, "  {} {}", "error:".red(), error);
    }

    if let Some(spf) = &result.spf {
        let detail = if spf.found {
            let all = spf.mechanism.as_deref().unwrap_or("no all mechanism");
            format!("{all}, {} DNS lookups", spf.lookup_count)
        } else {
            "no record".into()
        };
        section(&mut out, "SPF", spf.found, &detail, &spf.issues);
    }
    if let Some(dkim) = &result.dkim {
        let detail = if dkim.found {
            let names: Vec<&str> = dkim.selectors.iter().map(|s| s.selector.as_str()).collect();
            format!("selectors: {}", names.join(", "))
        } else {
            "no selectors found".into()
        };
        section(&mut out, "DKIM", dkim.found, &detail, &dkim.issues);
    }
    if let Some(dmarc) = &result.dmarc {
        let detail = if dmarc.found {
            format!("p={}", dmarc.policy.as_deref().unwrap_or("(missing)"))
        } else {
            "no record".into()
        };
        section(&mut out, "DMARC", dmarc.found, &detail, &dmarc.issues);
    }
    if let Some(mx) = &result.mx {
        let detail = if mx.found {
            format!("{} record(s)", mx.records.len())
        } else {
            "no records".into()
        };
        section(&mut out, "MX", mx.found, &detail, &mx.issues);
    }
    if let Some(bimi) = &result.bimi {
        let detail = if bimi.found { "record published" } else { "not deployed" };
        section(&mut out, "BIMI", bimi.found, detail, &bimi.issues);
    }
    if let Some(mta_sts) = &result.mta_sts {
        let detail = match (mta_sts.found, mta_sts.policy.as_ref()) {
            (true, Some(policy)) => format!("mode={}", policy.mode),
            (true, None) => "record present, policy unavailable".into(),
            (false, _) => "not deployed".into(),
        };
        section(&mut out, "MTA-STS", mta_sts.found, &detail, &mta_sts.issues);
    }
    if let Some(tls_rpt) = &result.tls_rpt {
        let detail = if tls_rpt.found { "record published" } else { "not deployed" };
        section(&mut out, "TLS-RPT", tls_rpt.found, detail, &tls_rpt.issues);
    }
    if let Some(dnssec) = &result.dnssec {
        let detail = if dnssec.chain_valid {
            "signed, chain complete"
        } else if dnssec.enabled {
            "signing material present, chain incomplete"
        } else {
            "not signed"
        };
        section(&mut out, "DNSSEC", dnssec.enabled, detail, &dnssec.issues);
    }
    if let Some(arc) = &result.arc {
        let detail = if arc.ready { "ready" } else { "not ready" };
        section(&mut out, "ARC", arc.ready, detail, &arc.issues);
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "  {}", "recommendations:".bold());
        for (i, rec) in result.recommendations.iter().enumerate() {
            let _ = writeln!(out, "    {}. {rec}", i + 1);
        }
    }

    out
}

fn section(out: &mut String, name: &str, ok: bool, detail: &str, issues: &[Issue]) {
    let marker = if ok { "+".green() } else { "-".red() };
    let _ = writeln!(out, "  [{marker}] {name:<8} {detail}");
    for issue in issues {
        let tag = severity_tag(issue.severity);
        let _ = writeln!(out, "        {tag} {}", issue.message);
        if let Some(rec) = &issue.recommendation {
            let _ = writeln!(out, "          -> {rec}");
        }
    }
}

fn severity_tag(severity: Severity) -> colored::ColoredString {
    let label = format!("[{severity}]");
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.cyan(),
        Severity::Info => label.dimmed(),
    }
}
