//! Input domain normalization and validation.
//!
//! Callers hand us anything from a bare apex to a full URL with scheme,
//! port, and path. Normalization lowercases, strips URL decoration and the
//! trailing dot, and converts internationalized labels to their
//! ASCII-compatible form. Validation applies the RFC 1035 syntactic rules;
//! an invalid domain short-circuits the whole analysis.

use anyhow::{bail, Result};

/// Normalizes a user-supplied domain and validates it.
///
/// Accepts `"https://Example.COM:443/path"`, `"mail.example.com."`,
/// `"bücher.example"` and the like; returns the lowercase ASCII domain.
///
/// # Errors
///
/// Returns a descriptive error when the input is not a syntactically valid
/// domain name.
pub fn normalize_domain(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("domain is empty");
    }

    // Strip scheme, path, query, fragment, port
    let mut host = trimmed;
    if let Some(idx) = host.find("://") {
        host = &host[idx + 3..];
    }
    if let Some(idx) = host.find(['/', '?', '#']) {
        host = &host[..idx];
    }
    if let Some(idx) = host.rfind(':') {
        // Only treat as a port when everything after the colon is numeric
        if host[idx + 1..].chars().all(|c| c.is_ascii_digit()) && idx + 1 < host.len() {
            host = &host[..idx];
        }
    }
    let host = host.trim_end_matches('.');

    let ascii = idna::domain_to_ascii(host)
        .map_err(|e| anyhow::anyhow!("'{input}' is not a valid domain name: {e}"))?;
    let ascii = ascii.to_lowercase();

    validate_domain(&ascii)?;
    Ok(ascii)
}

/// Validates domain syntax: 1-253 total characters, labels of 1-63
/// alphanumeric-hyphen characters with no leading or trailing hyphen, and at
/// least one dot.
fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() || domain.len() > 253 {
        bail!("domain must be 1-253 characters, got {}", domain.len());
    }
    if !domain.contains('.') {
        bail!("'{domain}' has no top-level domain");
    }
    for label in domain.split('.') {
        if label.is_empty() || label.len() > 63 {
            bail!("'{domain}' contains a label outside 1-63 characters");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            bail!("'{domain}' contains invalid characters");
        }
        if label.starts_with('-') || label.ends_with('-') {
            bail!("'{domain}' contains a label with a leading or trailing hyphen");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_domain_passes_through() {
        assert_eq!(normalize_domain("example.com").unwrap(), "example.com");
    }

    #[test]
    fn uppercase_is_lowered() {
        assert_eq!(normalize_domain("Example.COM").unwrap(), "example.com");
    }

    #[test]
    fn url_decoration_is_stripped() {
        assert_eq!(
            normalize_domain("https://example.com:8443/mail?x=1#top").unwrap(),
            "example.com"
        );
        assert_eq!(
            normalize_domain("http://mail.example.com/").unwrap(),
            "mail.example.com"
        );
    }

    #[test]
    fn trailing_dot_is_stripped() {
        assert_eq!(normalize_domain("example.com.").unwrap(), "example.com");
    }

    #[test]
    fn idn_labels_become_punycode() {
        assert_eq!(
            normalize_domain("bücher.example").unwrap(),
            "xn--bcher-kva.example"
        );
    }

    #[test]
    fn rejects_empty_and_dotless() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("localhost").is_err());
    }

    #[test]
    fn rejects_bad_labels() {
        assert!(normalize_domain("-example.com").is_err());
        assert!(normalize_domain("example-.com").is_err());
        assert!(normalize_domain("exa mple.com").is_err());
        assert!(normalize_domain("example..com").is_err());
    }

    #[test]
    fn rejects_over_long_domains() {
        let label = "a".repeat(63);
        let long = format!("{label}.{label}.{label}.{label}.com");
        assert!(long.len() > 253);
        assert!(normalize_domain(&long).is_err());

        let too_long_label = format!("{}.com", "a".repeat(64));
        assert!(normalize_domain(&too_long_label).is_err());
    }
}
