//! Locale-aware parsing of currency amounts such as `"5 M€"` or `"1,2 milliard"`

use regex::Regex;
use std::sync::LazyLock;

use crate::output::NOT_AVAILABLE;

/// First decimal number, optionally followed by a magnitude or currency token.
///
/// Alternatives are ordered longest first so that `milliard` is never read as
/// a bare `M`. A bare `M` only counts when it ends a word (`5M`, `5 M€`),
/// which keeps `5 mois` at ×1.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(milliard|million|m\b|k?€)?")
        .expect("amount pattern is valid")
});

/// Parses a free-form amount into a whole number of currency units
///
/// Magnitude words are matched case-insensitively:
///
/// | Token | Multiplier |
/// |-------|------------|
/// | `milliard` | 1 000 000 000 |
/// | `million`, `M` | 1 000 000 |
/// | anything else, `k€` included | 1 |
///
/// `k`/`K` is accepted by the pattern but carries no multiplier, so
/// `"250k€"` yields `250`. This mirrors the long-standing behaviour of the
/// published datasets and is pinned by tests until the intended meaning is
/// settled.
///
/// Returns `None` for the `"N/A"` sentinel, empty input, and text without any
/// digits. Only the first number in the text is considered.
///
/// # Example
///
/// ```
/// use listing_harvest::normalize_amount;
///
/// assert_eq!(normalize_amount("5 M€"), Some(5_000_000));
/// assert_eq!(normalize_amount("1,2 milliard"), Some(1_200_000_000));
/// assert_eq!(normalize_amount("N/A"), None);
/// ```
pub fn normalize_amount(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        return None;
    }

    let captures = AMOUNT_PATTERN.captures(text)?;
    let number: f64 = captures.get(1)?.as_str().replace(',', ".").parse().ok()?;

    let multiplier = match captures.get(2).map(|m| m.as_str().to_uppercase()) {
        Some(token) if token.starts_with("MILLIARD") => 1_000_000_000.0,
        Some(token) if token == "M" || token == "MILLION" => 1_000_000.0,
        _ => 1.0,
    };

    let value = (number * multiplier).round_ties_even();
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
