//! Ordering of natural-language wait descriptions.
//!
//! Catalogs describe availability as text ("Available now", "About 3 weeks",
//! "Several months"). These are mapped onto a day count so offers from
//! different libraries can be compared. Weeks and months use fixed 7 and
//! 30 day multipliers; stored reports were produced with exactly these.

use crate::error::MalformedWaitTime;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Ordinal for "Available now".
pub const AVAILABLE_NOW: i64 = -1;

/// Ordinal for "Available soon".
pub const AVAILABLE_SOON: i64 = 0;

/// Ordinal for "Several months", larger than any realistic estimate.
pub const SEVERAL_MONTHS: i64 = 10_000_000;

/// Matches `about <n> days|weeks|months` on lowercased input.
static ESTIMATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^about (.+) (days|weeks|months)$").unwrap());

/// Converts a wait description into its ordinal (roughly, days to wait).
///
/// Matching is case-insensitive. Anything outside the known phrases is a
/// [`MalformedWaitTime`] carrying the original text.
pub fn to_ordinal(text: &str) -> Result<i64, MalformedWaitTime> {
    let lowered = text.to_lowercase();
    let malformed = || MalformedWaitTime(text.to_string());

    match lowered.as_str() {
        "available now" => return Ok(AVAILABLE_NOW),
        "available soon" => return Ok(AVAILABLE_SOON),
        "several months" => return Ok(SEVERAL_MONTHS),
        _ => {}
    }

    let caps = ESTIMATE_REGEX.captures(&lowered).ok_or_else(malformed)?;
    let count: i64 = caps[1].trim().parse().map_err(|_| malformed())?;
    let multiplier = match &caps[2] {
        "days" => 1,
        "weeks" => 7,
        _ => 30,
    };

    count.checked_mul(multiplier).ok_or_else(malformed)
}

/// Compares two wait descriptions; `Less` means `a` is available sooner.
pub fn compare(a: &str, b: &str) -> Result<Ordering, MalformedWaitTime> {
    Ok(to_ordinal(a)?.cmp(&to_ordinal(b)?))
}

/// Returns true iff `a` is strictly sooner than `b`.
pub fn is_sooner(a: &str, b: &str) -> Result<bool, MalformedWaitTime> {
    Ok(compare(a, b)? == Ordering::Less)
}
