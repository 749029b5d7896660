//! SPF record term scanning.
//!
//! The evaluator only audits policies, it never matches a sending IP, so the
//! parser extracts just what auditing needs: the `all` qualifier, the
//! DNS-lookup-consuming mechanisms, and the `include:`/`redirect=` targets.
//! Terms it does not understand are skipped (best-effort, RFC 7208 syntax
//! errors are a receiver's problem, not ours).

/// Whether a TXT record is an SPF record (case-insensitive `v=spf1` tag).
pub fn is_spf_record(txt: &str) -> bool {
    let lower = txt.trim().to_ascii_lowercase();
    lower == "v=spf1" || lower.starts_with("v=spf1 ")
}

/// Iterates the terms of a record, skipping the version tag.
fn terms(record: &str) -> impl Iterator<Item = &str> {
    record
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("v=spf1"))
}

/// Strips a leading qualifier character, returning `(qualifier, rest)`.
/// A bare mechanism defaults to `+`.
fn split_qualifier(term: &str) -> (char, &str) {
    match term.chars().next() {
        Some(q @ ('+' | '-' | '~' | '?')) => (q, &term[1..]),
        _ => ('+', term),
    }
}

/// Mechanism name of a term: everything up to `:` or `/`, lowercased.
/// Returns `None` for modifiers (`name=value`).
fn mechanism_name(term: &str) -> Option<String> {
    let (_, rest) = split_qualifier(term);
    let end = rest.find([':', '/']).unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() || name.contains('=') {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

/// The `all` mechanism with its explicit qualifier (`-all`, `~all`, `?all`,
/// `+all`), or `None` when the record has no `all` term.
pub fn all_mechanism(record: &str) -> Option<String> {
    for term in terms(record) {
        let (qualifier, rest) = split_qualifier(term);
        if rest.eq_ignore_ascii_case("all") {
            return Some(format!("{qualifier}all"));
        }
    }
    None
}

/// Targets of every `include:` mechanism, in record order.
pub fn include_targets(record: &str) -> Vec<String> {
    terms(record)
        .filter_map(|term| {
            let (_, rest) = split_qualifier(term);
            let (name, value) = rest.split_once(':')?;
            if name.eq_ignore_ascii_case("include") && !value.is_empty() {
                Some(value.trim_end_matches('.').to_lowercase())
            } else {
                None
            }
        })
        .collect()
}

/// Target of the `redirect=` modifier, if present.
pub fn redirect_target(record: &str) -> Option<String> {
    terms(record).find_map(|term| {
        let (name, value) = term.split_once('=')?;
        if name.eq_ignore_ascii_case("redirect") && !value.is_empty() {
            Some(value.trim_end_matches('.').to_lowercase())
        } else {
            None
        }
    })
}

/// DNS-lookup-consuming mechanisms of a single record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MechanismCounts {
    /// Occurrences of `a`, `mx`, `ptr`, and `exists:` (RFC 7208 section
    /// 4.6.4; each occurrence costs exactly one lookup, implicit A/AAAA
    /// lookups under `mx` do not count further). `include` and `redirect`
    /// are charged separately by the traversal.
    pub dns_lookups: u32,
    /// The record uses the deprecated `ptr` mechanism.
    pub has_ptr: bool,
}

/// Counts the `a`/`mx`/`ptr`/`exists` mechanisms of one record.
pub fn mechanism_counts(record: &str) -> MechanismCounts {
    let mut counts = MechanismCounts::default();
    for term in terms(record) {
        let Some(name) = mechanism_name(term) else {
            continue;
        };
        match name.as_str() {
            "a" | "mx" | "exists" => counts.dns_lookups += 1,
            "ptr" => {
                counts.dns_lookups += 1;
                counts.has_ptr = true;
            }
            _ => {}
        }
    }
    counts
}
