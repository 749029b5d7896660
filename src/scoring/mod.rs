//! Scoring and grading.
//!
//! A pure function over the check results: base points for SPF/DKIM/DMARC,
//! a capped bonus pool for the optional checks, and a severity-capped
//! penalty over every issue from every check. The score is clamped to
//! [0, 100] and mapped onto monotonic, exhaustive grade bands.

pub mod recommendations;

pub use recommendations::recommendations;

use crate::config::{BONUS_CAP, GRADE_A_MIN, GRADE_B_MIN, GRADE_C_MIN, GRADE_D_MIN, SPF_HARD_LOOKUP_LIMIT};
use crate::models::{
    ArcReadiness, BimiCheck, DkimCheck, DmarcCheck, DnssecCheck, Grade, Issue, MtaStsCheck,
    MxCheck, Severity, SpfCheck, TlsRptCheck,
};

/// Borrowed view over all check results feeding the grade.
///
/// `None` means the check was disabled or never ran; it contributes neither
/// points nor penalties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInput<'a> {
    /// SPF evaluation.
    pub spf: Option<&'a SpfCheck>,
    /// DKIM probe.
    pub dkim: Option<&'a DkimCheck>,
    /// DMARC probe.
    pub dmarc: Option<&'a DmarcCheck>,
    /// MX probe.
    pub mx: Option<&'a MxCheck>,
    /// BIMI probe.
    pub bimi: Option<&'a BimiCheck>,
    /// MTA-STS probe.
    pub mta_sts: Option<&'a MtaStsCheck>,
    /// TLS-RPT probe.
    pub tls_rpt: Option<&'a TlsRptCheck>,
    /// Derived ARC readiness.
    pub arc: Option<&'a ArcReadiness>,
    /// DNSSEC probe.
    pub dnssec: Option<&'a DnssecCheck>,
}

impl<'a> ScoreInput<'a> {
    fn all_issues(&self) -> impl Iterator<Item = &'a Issue> {
        let spf = self.spf.map(|c| c.issues.as_slice()).unwrap_or_default();
        let dkim = self.dkim.map(|c| c.issues.as_slice()).unwrap_or_default();
        let dmarc = self.dmarc.map(|c| c.issues.as_slice()).unwrap_or_default();
        let mx = self.mx.map(|c| c.issues.as_slice()).unwrap_or_default();
        let bimi = self.bimi.map(|c| c.issues.as_slice()).unwrap_or_default();
        let mta_sts = self.mta_sts.map(|c| c.issues.as_slice()).unwrap_or_default();
        let tls_rpt = self.tls_rpt.map(|c| c.issues.as_slice()).unwrap_or_default();
        let arc = self.arc.map(|c| c.issues.as_slice()).unwrap_or_default();
        let dnssec = self.dnssec.map(|c| c.issues.as_slice()).unwrap_or_default();
        spf.iter()
            .chain(dkim)
            .chain(dmarc)
            .chain(mx)
            .chain(bimi)
            .chain(mta_sts)
            .chain(tls_rpt)
            .chain(arc)
            .chain(dnssec)
    }
}

/// Computes the grade and clamped score for a set of check results.
pub fn calculate_grade(input: &ScoreInput) -> (Grade, u32) {
    let base = spf_points(input.spf) + dkim_points(input.dkim) + dmarc_points(input.dmarc);
    let bonus = bonus_points(input).min(BONUS_CAP as i64);
    let penalty = penalty_points(input);

    let score = (base + bonus - penalty).clamp(0, 100) as u32;
    (grade_for(score), score)
}

/// SPF component, max 35.
fn spf_points(spf: Option<&SpfCheck>) -> i64 {
    let Some(spf) = spf.filter(|c| c.found) else {
        return 0;
    };
    let mut points = 15;
    points += match spf.mechanism.as_deref() {
        Some("-all") => 20,
        Some("~all") => 10,
        Some("?all") => 5,
        _ => 0,
    };
    if spf.lookup_count > SPF_HARD_LOOKUP_LIMIT {
        points -= 10;
    }
    points
}

/// DKIM component, max 25.
fn dkim_points(dkim: Option<&DkimCheck>) -> i64 {
    let Some(dkim) = dkim.filter(|c| c.found) else {
        return 0;
    };
    let mut points = 15;
    if dkim.selectors.iter().any(|s| s.is_strong()) {
        points += 10;
    } else if dkim
        .selectors
        .iter()
        .any(|s| !s.revoked && s.key_bits.is_some_and(|b| b >= 1024))
    {
        points += 5;
    }
    points
}

/// DMARC component, max 40.
fn dmarc_points(dmarc: Option<&DmarcCheck>) -> i64 {
    let Some(dmarc) = dmarc.filter(|c| c.found) else {
        return 0;
    };
    let mut points = 10;
    points += match dmarc.policy.as_deref() {
        Some("reject") => 20,
        Some("quarantine") => 12,
        Some("none") => 3,
        _ => 0,
    };
    if !dmarc.rua.is_empty() || !dmarc.ruf.is_empty() {
        points += 5;
    }
    if dmarc.pct.is_none() || dmarc.pct == Some(100) {
        points += 5;
    }
    points
}

/// Optional-check bonus pool, capped by the caller.
fn bonus_points(input: &ScoreInput) -> i64 {
    let mut bonus = 0;

    if let Some(bimi) = input.bimi.filter(|c| c.found) {
        // BIMI is meaningless without an enforcing-capable DMARC policy
        let dmarc_active = input
            .dmarc
            .is_some_and(|d| d.found && d.policy.as_deref().is_some_and(|p| p != "none"));
        if dmarc_active {
            bonus += 3;
            if bimi.certificate_url.is_some() {
                bonus += 2;
            }
        }
    }

    if let Some(mta_sts) = input.mta_sts.filter(|c| c.found) {
        match mta_sts.policy.as_ref().map(|p| p.mode.as_str()) {
            Some("enforce") => bonus += 4,
            Some("testing") => bonus += 2,
            _ => {}
        }
    }

    if input
        .tls_rpt
        .is_some_and(|c| c.found && !c.rua.is_empty())
    {
        bonus += 3;
    }

    if input.arc.is_some_and(|a| a.ready && a.can_sign) {
        bonus += 3;
    }

    if let Some(dnssec) = input.dnssec {
        if dnssec.chain_valid {
            bonus += 5;
        } else if dnssec.enabled {
            bonus += 3;
        }
    }

    bonus
}

/// Severity-capped penalty over the issues of every check result.
fn penalty_points(input: &ScoreInput) -> i64 {
    let mut critical = 0i64;
    let mut high = 0i64;
    let mut medium = 0i64;
    for issue in input.all_issues() {
        match issue.severity {
            Severity::Critical => critical += 1,
            Severity::High => high += 1,
            Severity::Medium => medium += 1,
            Severity::Low | Severity::Info => {}
        }
    }
    critical.min(3) * 15 + high.min(3) * 8 + medium.min(5) * 3
}

/// Maps a clamped score onto its grade band.
fn grade_for(score: u32) -> Grade {
    match score {
        s if s >= GRADE_A_MIN => Grade::A,
        s if s >= GRADE_B_MIN => Grade::B,
        s if s >= GRADE_C_MIN => Grade::C,
        s if s >= GRADE_D_MIN => Grade::D,
        _ => Grade::F,
    }
}
