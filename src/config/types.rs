//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument
//! parsing and library configuration.

use std::time::Duration;

use clap::ValueEnum;
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::constants::{BATCH_WINDOW_SIZE, CHECK_TIMEOUT};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// The individual checks an analysis can run.
///
/// `Arc` is not listed: ARC readiness is derived from the SPF/DKIM/DMARC
/// results rather than probed, so it cannot be toggled independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CheckKind {
    /// SPF record evaluation
    Spf,
    /// DKIM selector probing
    Dkim,
    /// DMARC policy record
    Dmarc,
    /// MX records
    Mx,
    /// BIMI record
    Bimi,
    /// MTA-STS record and policy file
    MtaSts,
    /// TLS-RPT record
    TlsRpt,
    /// DNSSEC signing material
    Dnssec,
}

/// Library configuration (no CLI dependencies).
///
/// Constructed programmatically, or from the binary's parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use mail_posture::Config;
///
/// let config = Config {
///     checks: None, // all checks enabled
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Checks to run. `None` means all checks are enabled.
    pub checks: Option<Vec<CheckKind>>,

    /// Checks to exclude from the enabled set.
    pub skip: Vec<CheckKind>,

    /// Per-check timeout, shared by every check.
    pub check_timeout: Duration,

    /// Number of domains analyzed concurrently in a batch scan.
    pub batch_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            checks: None,
            skip: Vec::new(),
            check_timeout: CHECK_TIMEOUT,
            batch_window: BATCH_WINDOW_SIZE,
        }
    }
}

impl Config {
    /// Whether a given check is enabled under the include/skip lists.
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        if self.skip.contains(&kind) {
            return false;
        }
        match &self.checks {
            Some(included) => included.contains(&kind),
            None => true,
        }
    }
}
