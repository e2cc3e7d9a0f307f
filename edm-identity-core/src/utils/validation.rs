//! Input validation for domain names and sender prefixes.

use crate::error::{CoreError, CoreResult};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 64;

/// Validate a hostname and return its normalized (trimmed, lower-case) form.
///
/// Labels are dot-separated, 1-63 characters of ASCII letters, digits and
/// hyphens, and may not start or end with a hyphen.
pub fn normalize_domain_name(name: &str) -> CoreResult<String> {
    let normalized = name.trim().to_ascii_lowercase();
    let invalid = || CoreError::InvalidDomainName(name.trim().to_string());

    if normalized.is_empty() || normalized.len() > MAX_DOMAIN_LEN {
        return Err(invalid());
    }
    if !normalized.split('.').all(is_valid_label) {
        return Err(invalid());
    }
    Ok(normalized)
}

fn is_valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LEN).contains(&label.len())
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Validate a sender mailbox prefix (the part before `@`).
///
/// Accepts `[A-Za-z0-9][A-Za-z0-9._-]*[A-Za-z0-9]`; a lone character is
/// rejected.
pub fn validate_prefix(prefix: &str) -> CoreResult<()> {
    let bytes = prefix.as_bytes();
    let valid = (2..=MAX_PREFIX_LEN).contains(&bytes.len())
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidPrefix(prefix.to_string()))
    }
}
