//! Configuration constants.
//!
//! This module defines all tunable constants used throughout the audit,
//! including timeouts, recursion bounds, and scoring thresholds.

use std::time::Duration;

/// Per-check timeout, shared across every check of a domain analysis.
/// DNS-bound checks cannot be cancelled mid-query; the timed-out future is
/// simply dropped and the in-flight lookup is abandoned to the resolver's
/// own shorter timeout.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// DNS query timeout. Most queries complete in well under a second; 3s
/// provides buffer while still failing fast on unresponsive servers.
pub const DNS_TIMEOUT_SECS: u64 = 3;

/// TTL for the process-wide DNS cache. Several checks query the same
/// apex or subdomain within one analysis; tens of seconds is enough to
/// deduplicate those without serving stale data across batches.
pub const DNS_CACHE_TTL: Duration = Duration::from_secs(30);

/// Number of domains analyzed concurrently in a multi-domain scan.
/// The DNS cache is cleared at each window boundary.
pub const BATCH_WINDOW_SIZE: usize = 5;

/// Hard bound on SPF include/redirect recursion depth.
pub const SPF_MAX_DEPTH: usize = 10;

/// RFC 7208 section 4.6.4 hard limit on DNS-lookup-consuming mechanisms.
pub const SPF_HARD_LOOKUP_LIMIT: u32 = 10;

/// Soft warning threshold for SPF lookups, leaving headroom below the
/// hard limit for third-party include churn.
pub const SPF_SOFT_LOOKUP_LIMIT: u32 = 7;

/// HTTP timeout for MTA-STS policy fetches. Dropping the request future
/// cancels the connection, so this is a true cancellation bound.
pub const POLICY_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Selectors probed for DKIM keys, covering the major providers and the
/// most common self-hosted conventions.
pub const DKIM_COMMON_SELECTORS: &[&str] = &[
    "default",
    "google",
    "selector1",
    "selector2",
    "k1",
    "s1",
    "s2",
    "dkim",
    "mail",
    "smtp",
];

/// MTA-STS policies younger than this are flagged as short-lived.
pub const MTA_STS_MIN_MAX_AGE: u64 = 86_400;

// Scoring thresholds (see the scoring module for the full breakdown).

/// Minimum score for grade A.
pub const GRADE_A_MIN: u32 = 90;
/// Minimum score for grade B.
pub const GRADE_B_MIN: u32 = 75;
/// Minimum score for grade C.
pub const GRADE_C_MIN: u32 = 50;
/// Minimum score for grade D.
pub const GRADE_D_MIN: u32 = 25;

/// Cap on the optional-check bonus pool.
pub const BONUS_CAP: u32 = 15;
