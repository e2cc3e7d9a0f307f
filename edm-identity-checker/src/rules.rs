//! Record matching rules.
//!
//! Each rule compares the answers found at a record's owner name with the
//! record's expected value and yields `Verified` or `Failed`.

use edm_identity_core::types::{DnsRecord, RecordStatus, RecordType};

/// Evaluate one record against the answers at its owner name.
#[must_use]
pub fn evaluate(record: &DnsRecord, answers: &[String]) -> RecordStatus {
    let expected = record.expected_value.trim();
    let matched = match record.record_type {
        RecordType::Ownership | RecordType::Dkim => {
            answers.iter().any(|a| normalize_txt(a) == normalize_txt(expected))
        }
        RecordType::Spf => answers.iter().any(|a| spf_matches(a, expected)),
        RecordType::Dmarc => answers.iter().any(|a| is_dmarc(a)),
        RecordType::Mx => answers.iter().any(|a| same_host(a, expected)),
    };
    if matched {
        RecordStatus::Verified
    } else {
        RecordStatus::Failed
    }
}

/// Collapse whitespace runs; resolvers and DNS panels disagree on spacing.
fn normalize_txt(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An SPF answer matches when it is a `v=spf1` record carrying every
/// `include:` mechanism of the expected record. Other mechanisms the user
/// already publishes are allowed.
fn spf_matches(answer: &str, expected: &str) -> bool {
    let mut terms = answer.split_whitespace();
    if !terms
        .next()
        .is_some_and(|v| v.eq_ignore_ascii_case("v=spf1"))
    {
        return false;
    }
    let published: Vec<&str> = terms.collect();
    expected
        .split_whitespace()
        .filter(|t| t.to_ascii_lowercase().starts_with("include:"))
        .all(|inc| published.iter().any(|p| p.eq_ignore_ascii_case(inc)))
}

fn is_dmarc(answer: &str) -> bool {
    answer
        .split(';')
        .next()
        .is_some_and(|tag| tag.trim().replace(' ', "").eq_ignore_ascii_case("v=DMARC1"))
}

fn same_host(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('.').eq_ignore_ascii_case(b.trim().trim_end_matches('.'))
}
