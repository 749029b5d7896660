//! DNS resolution and caching.
//!
//! The resolver trait abstracts the actual DNS transport so the evaluator and
//! checks can be driven by a fixture resolver in tests. [`DnsClient`] wraps a
//! resolver with a TTL cache and normalizes "no such record" into empty
//! results, per the check contract.

pub mod cache;
pub mod client;
pub mod resolver;

pub use cache::{DnsCache, RecordKind};
pub use client::DnsClient;
pub use resolver::{DnsError, DnsResolver, StaticResolver, SystemResolver};
