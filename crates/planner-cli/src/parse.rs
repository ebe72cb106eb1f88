//! Parsing of command-line argument values into domain types.
//!
//! Each helper attaches the offending input to the error so the CLI can
//! print a useful message.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use planner_core::BudgetStatus;

pub fn parse_id(input: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim()).with_context(|| format!("invalid {what} id: {input:?}"))
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {input:?} (expected YYYY-MM-DD)"))
}

/// Parse a decimal amount such as `12000` or `45.50`.
///
/// Scientific notation is accepted too, since some shells and scripts emit
/// it for large numbers.
pub fn parse_decimal(input: &str, what: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .with_context(|| format!("invalid {what}: {input:?}"))
}

pub fn parse_status(input: &str) -> Result<BudgetStatus> {
    BudgetStatus::from_str(input).with_context(|| format!("invalid budget status: {input:?}"))
}
