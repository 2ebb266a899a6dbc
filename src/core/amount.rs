//! Conversion between user-entered decimal amounts and integer minor units.
//!
//! Amounts are kept as whole cents everywhere in the core so sums and
//! comparisons never drift. Parsing goes through `rust_decimal`, rounding
//! half-up to two decimal places.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parses a decimal amount into minor units.
///
/// Accepts `,` or `.` as the decimal separator and spaces (including
/// non-breaking ones) as thousands separators: `"1 234,50"` and `"1234.50"`
/// both yield `123450`. Values are rounded half-up to two decimal places.
///
/// Returns `None` for empty or unparseable input. Zero and negative values
/// are returned as parsed; rejecting them is the caller's decision.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<i64> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if normalized.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&normalized).ok()?;
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Formats minor units for display with space-grouped thousands:
/// `123450` becomes `"1 234.50"`.
#[must_use]
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{fraction:02}")
}

/// Formats minor units the way the entry form expects them back:
/// `123450` becomes `"1234.50"`.
#[must_use]
pub fn format_amount_plain(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
