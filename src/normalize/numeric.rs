//! Numeric normalization for temperature/humidity cells.

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::normalize_text;
use crate::table::{Cell, RawTable};

static SIGNED_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").unwrap());

/// Convert a raw cell to a float. Unparseable input is `None`, never zero.
pub fn normalize_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(f) if f.is_finite() => Some(*f),
        Cell::Text(s) => parse_numeric_text(s),
        _ => None,
    }
}

/// "23,5 °C" -> 23.5, "−4,1" -> -4.1, "n/a" -> None
pub fn parse_numeric_text(raw: &str) -> Option<f64> {
    let text = normalize_text(raw).replace(',', ".");
    let text = text.trim();
    SIGNED_DECIMAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|f| f.is_finite())
}

/// Normalize every column in `cols` and keep, per row, the first present
/// value in column order.
pub fn unified_numeric_column(table: &RawTable, cols: &[usize]) -> Vec<Option<f64>> {
    (0..table.height())
        .map(|row| {
            cols.iter()
                .find_map(|&col| normalize_number(table.cell(row, col)))
        })
        .collect()
}

pub fn present_count(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}
