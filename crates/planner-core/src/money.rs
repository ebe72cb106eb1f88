//! Monetary rounding and currency-code normalization.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency used when the caller leaves it blank.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Round a monetary amount (or booked hours) to two decimal places.
///
/// Midpoints round to even, so `2.345` becomes `2.34` and `2.355` becomes
/// `2.36`.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Trim and upper-case a currency code, defaulting blank input to
/// [`DEFAULT_CURRENCY`].
///
/// Returns `None` when the trimmed code is not exactly three ASCII letters.
pub fn normalize_currency(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_CURRENCY.to_owned());
    }
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}
