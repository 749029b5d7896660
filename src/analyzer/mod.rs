//! Check orchestration.
//!
//! `Analyzer` owns the DNS client, the HTTP client used for MTA-STS policy
//! fetches, and the configuration. One analysis runs every enabled check
//! concurrently, each under its own timeout, and a failed or timed-out check
//! never sinks the others: it is replaced by a synthetic not-found result
//! carrying a high-severity issue, and the failure reason is surfaced on the
//! aggregate result.

use std::time::Duration;

use anyhow::Context;
use futures::future::join_all;
use log::{debug, info, warn};

use crate::checks;
use crate::config::{CheckKind, Config, POLICY_FETCH_TIMEOUT};
use crate::dns::{DnsClient, DnsError, DnsResolver, SystemResolver};
use crate::models::{DomainResult, Grade, Issue, Severity};
use crate::scoring::{calculate_grade, recommendations, ScoreInput};
use crate::{domain, spf};

mod cross;

/// Runs the full check suite against domains.
pub struct Analyzer<R: DnsResolver> {
    dns: DnsClient<R>,
    http: reqwest::Client,
    config: Config,
}

impl Analyzer<SystemResolver> {
    /// Builds an analyzer backed by the system DNS configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_resolver(SystemResolver::new(), config)
    }
}

impl<R: DnsResolver> Analyzer<R> {
    /// Builds an analyzer over a specific resolver implementation.
    pub fn with_resolver(resolver: R, config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(POLICY_FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Analyzer {
            dns: DnsClient::new(resolver),
            http,
            config,
        })
    }

    /// Analyzes one domain and produces its aggregate result.
    ///
    /// Never returns an error: invalid input yields an `F`-graded result with
    /// the `error` field set, and individual check failures are folded into
    /// synthetic results.
    pub async fn analyze_domain(&self, input: &str) -> DomainResult {
        let domain = match domain::normalize_domain(input) {
            Ok(domain) => domain,
            Err(e) => {
                warn!("rejecting input '{input}': {e}");
                return invalid_input_result(input, &e.to_string());
            }
        };
        debug!("analyzing {domain}");

        let timeout = self.config.check_timeout;
        let (spf, dkim, dmarc, mx, bimi, mta_sts, tls_rpt, dnssec) = tokio::join!(
            run(self.enabled(CheckKind::Spf), timeout, spf::check(&domain, &self.dns)),
            run(self.enabled(CheckKind::Dkim), timeout, checks::dkim::check(&domain, &self.dns)),
            run(self.enabled(CheckKind::Dmarc), timeout, checks::dmarc::check(&domain, &self.dns)),
            run(self.enabled(CheckKind::Mx), timeout, checks::mx::check(&domain, &self.dns)),
            run(self.enabled(CheckKind::Bimi), timeout, checks::bimi::check(&domain, &self.dns)),
            run(
                self.enabled(CheckKind::MtaSts),
                timeout,
                checks::mta_sts::check(&domain, &self.dns, &self.http),
            ),
            run(
                self.enabled(CheckKind::TlsRpt),
                timeout,
                checks::tls_rpt::check(&domain, &self.dns),
            ),
            run(
                self.enabled(CheckKind::Dnssec),
                timeout,
                checks::dnssec::check(&domain, &self.dns),
            ),
        );

        let mut failures = Vec::new();
        let spf = settle(spf, "SPF", &mut failures, |c| &mut c.issues);
        let dkim = settle(dkim, "DKIM", &mut failures, |c| &mut c.issues);
        let dmarc = settle(dmarc, "DMARC", &mut failures, |c| &mut c.issues);
        let mx = settle(mx, "MX", &mut failures, |c| &mut c.issues);
        let mut bimi = settle(bimi, "BIMI", &mut failures, |c| &mut c.issues);
        let mut mta_sts = settle(mta_sts, "MTA-STS", &mut failures, |c| &mut c.issues);
        let tls_rpt = settle(tls_rpt, "TLS-RPT", &mut failures, |c| &mut c.issues);
        let dnssec = settle(dnssec, "DNSSEC", &mut failures, |c| &mut c.issues);

        if let Some(bimi) = bimi.as_mut() {
            cross::bimi_requires_dmarc(bimi, dmarc.as_ref());
        }
        if let (Some(mta_sts), Some(mx)) = (mta_sts.as_mut(), mx.as_ref()) {
            cross::mta_sts_covers_mx(mta_sts, mx);
        }

        let arc = Some(checks::arc::derive(
            spf.as_ref(),
            dkim.as_ref(),
            dmarc.as_ref(),
        ));

        let score_input = ScoreInput {
            spf: spf.as_ref(),
            dkim: dkim.as_ref(),
            dmarc: dmarc.as_ref(),
            mx: mx.as_ref(),
            bimi: bimi.as_ref(),
            mta_sts: mta_sts.as_ref(),
            tls_rpt: tls_rpt.as_ref(),
            arc: arc.as_ref(),
            dnssec: dnssec.as_ref(),
        };
        let (grade, score) = calculate_grade(&score_input);
        let recommendations = recommendations(&score_input);
        info!("{domain}: grade {grade} ({score}/100)");

        DomainResult {
            domain,
            spf,
            dkim,
            dmarc,
            mx,
            bimi,
            mta_sts,
            tls_rpt,
            dnssec,
            arc,
            grade,
            score,
            recommendations,
            error: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Analyzes domains in fixed-size concurrent windows.
    ///
    /// Results come back in input order. The DNS cache is dropped at each
    /// window boundary so a long run never serves stale records.
    pub async fn analyze_multiple(&self, domains: &[String]) -> Vec<DomainResult> {
        let mut results = Vec::with_capacity(domains.len());
        for window in domains.chunks(self.config.batch_window.max(1)) {
            let batch = join_all(window.iter().map(|d| self.analyze_domain(d))).await;
            results.extend(batch);
            self.dns.clear_cache();
            debug!("completed {} of {} domains", results.len(), domains.len());
        }
        results
    }

    fn enabled(&self, kind: CheckKind) -> bool {
        self.config.is_enabled(kind)
    }
}

/// Outcome of one guarded check run.
enum Outcome<T> {
    Disabled,
    Done(T),
    Failed(String),
}

/// Runs a check under the shared timeout, capturing failure as a value.
async fn run<T, Fut>(enabled: bool, timeout: Duration, fut: Fut) -> Outcome<T>
where
    Fut: std::future::Future<Output = Result<T, DnsError>>,
{
    if !enabled {
        return Outcome::Disabled;
    }
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Outcome::Done(value),
        Ok(Err(e)) => Outcome::Failed(e.to_string()),
        Err(_) => Outcome::Failed(format!("timed out after {}s", timeout.as_secs())),
    }
}

/// Converts an outcome into the result slot, synthesizing a not-found value
/// with a high-severity issue when the check failed.
fn settle<T: Default>(
    outcome: Outcome<T>,
    label: &str,
    failures: &mut Vec<String>,
    issues: fn(&mut T) -> &mut Vec<Issue>,
) -> Option<T> {
    match outcome {
        Outcome::Disabled => None,
        Outcome::Done(value) => Some(value),
        Outcome::Failed(reason) => {
            warn!("{label} check failed: {reason}");
            failures.push(format!("{label}: {reason}"));
            let mut value = T::default();
            issues(&mut value).push(Issue::new(
                Severity::High,
                format!("{label} check failed: {reason}"),
            ));
            Some(value)
        }
    }
}

fn invalid_input_result(input: &str, reason: &str) -> DomainResult {
    DomainResult {
        domain: input.trim().to_string(),
        spf: None,
        dkim: None,
        dmarc: None,
        mx: None,
        bimi: None,
        mta_sts: None,
        tls_rpt: None,
        dnssec: None,
        arc: None,
        grade: Grade::F,
        score: 0,
        recommendations: Vec::new(),
        error: Some(reason.to_string()),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}
