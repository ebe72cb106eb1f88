//! Console formatting: money strings and plain-text tables.

use rust_decimal::{Decimal, RoundingStrategy};

/// Render an amount with two decimal places, prefixed by its currency code.
///
/// A blank currency yields the bare amount. Midpoints round away from zero.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let currency = currency.trim();
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if currency.is_empty() {
        format!("{amount:.2}")
    } else {
        format!("{currency} {amount:.2}")
    }
}

/// Staff cost cell. Rate times hours can overflow on hand-edited data.
pub fn format_cost(cost: Option<Decimal>, currency: &str) -> String {
    match cost {
        Some(cost) => format_money(cost, currency),
        None => "overflow".to_string(),
    }
}

/// Shown in table cells whose value is blank.
pub const EMPTY_CELL: &str = "—";

/// Substitute [`EMPTY_CELL`] for a blank value.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_CELL
    } else {
        value
    }
}

/// Render rows under a header, padding each column to its widest cell.
///
/// ```text
/// Name | Date
/// -----+-----------
/// Expo | 2025-04-02
/// ```
///
/// Every line ends with `\n`. Rows shorter than the header are padded with
/// empty cells.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(separator.join("-+-").as_str());
    out.push('\n');

    for row in rows {
        let cells = (0..widths.len()).map(|i| row.get(i).map(String::as_str).unwrap_or(""));
        push_row(&mut out, cells, &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
