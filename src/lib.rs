//! mail_posture library: email authentication posture auditing
//!
//! This library evaluates the DNS-published email authentication posture of a
//! domain: SPF (including recursive include/redirect traversal with RFC 7208
//! lookup accounting), DKIM selector probing, DMARC policy, MX, BIMI, MTA-STS,
//! TLS-RPT, and DNSSEC, plus a derived ARC readiness assessment. Results are
//! scored deterministically and mapped onto a letter grade.
//!
//! # Example
//!
//! ```no_run
//! use mail_posture::{Analyzer, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::new(Config::default())?;
//! let result = analyzer.analyze_domain("example.com").await;
//! println!("{}: grade {} ({}/100)", result.domain, result.grade, result.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod analyzer;
pub mod checks;
pub mod config;
pub mod dns;
mod domain;
pub mod logging;
pub mod models;
pub mod output;
pub mod scoring;
pub mod spf;

// Re-export public API
pub use analyzer::Analyzer;
pub use config::{CheckKind, Config, LogFormat, LogLevel};
pub use domain::normalize_domain;
pub use models::{DomainResult, Grade, Issue, Severity};
pub use output::{render_json, render_text, OutputFormat};
