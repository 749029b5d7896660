//! The individual DNS/HTTP probes.
//!
//! Every check follows the same contract: an expected "record absent" DNS
//! answer is translated into `found: false`, never an error; any other
//! failure propagates and is isolated per-check by the orchestrator.
//! Malformed records produce low/medium issues and a best-effort partial
//! parse rather than an abort.

pub mod arc;
pub mod bimi;
pub mod dkim;
pub mod dmarc;
pub mod dnssec;
pub mod mta_sts;
pub mod mx;
pub mod tls_rpt;

/// Splits a `tag=value; tag=value` record into trimmed pairs, skipping
/// fragments without a `=`. Shared by the DKIM/DMARC/BIMI/TLS-RPT and
/// MTA-STS record parsers.
pub(crate) fn parse_tags(record: &str) -> Vec<(String, String)> {
    record
        .split(';')
        .filter_map(|fragment| {
            let (tag, value) = fragment.split_once('=')?;
            Some((tag.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// First value for a tag, if present.
pub(crate) fn tag_value<'a>(tags: &'a [(String, String)], tag: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(t, _)| t == tag)
        .map(|(_, v)| v.as_str())
}

/// Splits a comma-separated tag value into trimmed, non-empty entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_lowercased() {
        let tags = parse_tags("v=DMARC1; P=reject ; rua=mailto:a@x.test");
        assert_eq!(tag_value(&tags, "v"), Some("DMARC1"));
        assert_eq!(tag_value(&tags, "p"), Some("reject"));
        assert_eq!(tag_value(&tags, "rua"), Some("mailto:a@x.test"));
        assert_eq!(tag_value(&tags, "pct"), None);
    }

    #[test]
    fn fragments_without_separator_are_skipped() {
        let tags = parse_tags("v=BIMI1; junk; l=https://x.test/logo.svg");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn list_values_split_on_commas() {
        assert_eq!(
            split_list("mailto:a@x.test, mailto:b@x.test,"),
            vec!["mailto:a@x.test", "mailto:b@x.test"]
        );
    }
}
