//! Configuration module.
//!
//! Provides configuration types and constants for the audit tool.

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{CheckKind, Config, LogFormat, LogLevel};
