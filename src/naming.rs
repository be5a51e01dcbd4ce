//! Deterministic name derivation for slugs, branches and workspace
//! directories.

use chrono::{DateTime, Utc};

/// Prefix for publish branches; the suffix is a compact UTC timestamp.
pub const BRANCH_PREFIX: &str = "blog-post-";

/// Lowercase-kebab slug of arbitrary text.
///
/// Splits on whitespace runs, lowercases each token, strips everything
/// outside `[a-z-]`, drops tokens that end up empty and joins the rest
/// with `-`. Total over any input; idempotent.
pub fn to_kebab_case(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            token
                .to_lowercase()
                .chars()
                .filter(|c| matches!(c, 'a'..='z' | '-'))
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Branch name for a publish run started at `now`.
///
/// Second granularity: two runs within the same second race on the branch
/// name. Known limitation, single-run-at-a-time is assumed.
pub fn branch_name(now: DateTime<Utc>) -> String {
    format!("{}{}", BRANCH_PREFIX, now.format("%Y%m%d%H%M%S"))
}
