//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `mail_posture` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Reading domains from arguments, a file, or stdin
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use mail_posture::logging::init_logger_with;
use mail_posture::{render_json, render_text, Analyzer, CheckKind, Config, OutputFormat};
use mail_posture::{LogFormat, LogLevel};

/// Audit the email authentication posture of one or more domains.
#[derive(Debug, Parser)]
#[command(name = "mail_posture", version, about)]
struct Args {
    /// Domains to analyze
    #[arg(value_name = "DOMAIN", required_unless_present = "file")]
    domains: Vec<String>,

    /// Read domains from a file, one per line (use '-' for stdin)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Run only these checks (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    checks: Option<Vec<CheckKind>>,

    /// Skip these checks (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    skip: Vec<CheckKind>,

    /// Per-check timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    timeout: u64,

    /// Number of domains analyzed concurrently
    #[arg(long, value_name = "N", default_value_t = 5)]
    batch_window: usize,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

/// Collects the domains to analyze from positional arguments and/or the
/// input file. Blank lines and `#` comments are skipped.
fn collect_domains(args: &Args) -> Result<Vec<String>> {
    let mut domains = args.domains.clone();

    if let Some(path) = &args.file {
        let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
            Box::new(BufReader::new(std::io::stdin()))
        } else {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        };
        for line in reader.lines() {
            let line = line.context("failed to read input line")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            domains.push(trimmed.to_string());
        }
    }

    if domains.is_empty() {
        bail!("no domains to analyze");
    }
    Ok(domains)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger_with(args.log_level.clone().into(), args.log_format.clone())
        .context("Failed to initialize logger")?;

    let domains = match collect_domains(&args) {
        Ok(domains) => domains,
        Err(e) => {
            eprintln!("mail_posture error: {e:#}");
            process::exit(2);
        }
    };

    let config = Config {
        checks: args.checks.clone(),
        skip: args.skip.clone(),
        check_timeout: Duration::from_secs(args.timeout),
        batch_window: args.batch_window,
    };
    let analyzer = Analyzer::new(config).context("Failed to initialize analyzer")?;

    let results = analyzer.analyze_multiple(&domains).await;

    match args.format {
        OutputFormat::Json => {
            println!("{}", render_json(&results).context("Failed to serialize results")?);
        }
        OutputFormat::Text => {
            for result in &results {
                print!("{}", render_text(result));
                println!();
            }
        }
    }

    // Nonzero exit when any domain could not be analyzed at all
    if results.iter().any(|r| r.error.is_some()) {
        process::exit(1);
    }
    Ok(())
}
