//! Per-sheet parse attempts and the deterministic scorer that picks one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::datetime::TimestampSeries;
use super::header::autodetect_header;
use super::numeric::{present_count, unified_numeric_column};
use super::roles::{ColumnRole, RoleTable};
use super::strategies::disambiguate;
use super::text::normalize_text;
use crate::config::NormalizerConfig;
use crate::table::{NamedSheet, RawTable};

static DATE_LIKE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{1,2}/\d{1,2}/\d{2,4}",
        r"\d{4}-\d{2}-\d{2}",
        r"\d{1,2}-\d{1,2}-\d{2,4}",
        r"\d{1,2}:\d{2}(:\d{2})?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// How the table behind a candidate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateOrigin {
    AsGiven,
    HeaderRow { row: usize },
    ColumnScan { column: usize },
}

#[derive(Debug, Clone)]
pub struct ParseCandidate {
    pub sheet_name: String,
    pub origin: CandidateOrigin,
    pub table: RoleTable,
    pub timestamps: TimestampSeries,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub temperature_count: usize,
    pub timestamp_count: usize,
    pub strategy: &'static str,
    pub chain_timestamp_count: usize,
    pub iso_fast_path: bool,
    pub recovered: usize,
}

impl ParseCandidate {
    /// Run the full per-table pipeline: disambiguation plus numeric columns.
    pub fn evaluate(
        sheet_name: &str,
        origin: CandidateOrigin,
        table: RoleTable,
        config: &NormalizerConfig,
    ) -> Self {
        let outcome = disambiguate(&table, config);
        let temperature = unified_numeric_column(
            &table.table,
            &table.roles.columns_for(ColumnRole::Temperature),
        );
        let humidity =
            unified_numeric_column(&table.table, &table.roles.columns_for(ColumnRole::Humidity));

        let candidate = Self {
            sheet_name: sheet_name.to_string(),
            origin,
            temperature_count: present_count(&temperature),
            timestamp_count: outcome.resolved(),
            table,
            timestamps: outcome.series,
            temperature,
            humidity,
            strategy: outcome.strategy,
            chain_timestamp_count: outcome.chain_resolved,
            iso_fast_path: outcome.iso_fast_path,
            recovered: outcome.recovered,
        };
        debug!(
            "Candidate '{}' {:?}: {} rows, {} timestamps, {} temperatures",
            candidate.sheet_name,
            candidate.origin,
            candidate.row_count(),
            candidate.timestamp_count,
            candidate.temperature_count
        );
        candidate
    }

    pub fn row_count(&self) -> usize {
        self.table.table.height()
    }

    pub fn humidity_count(&self) -> usize {
        present_count(&self.humidity)
    }

    /// Strict ranking: more temperatures, then more timestamps. Equal
    /// candidates never outrank each other, so the first one seen is kept.
    pub fn outranks(&self, other: &Self) -> bool {
        self.temperature_count > other.temperature_count
            || (self.temperature_count == other.temperature_count
                && self.timestamp_count > other.timestamp_count)
    }
}

pub fn select_best<I>(candidates: I) -> Option<ParseCandidate>
where
    I: IntoIterator<Item = ParseCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(best) if !candidate.outranks(&best) => Some(best),
        _ => Some(candidate),
    })
}

/// The sheet with its first row as header.
pub fn as_given_attempt(sheet: &NamedSheet, config: &NormalizerConfig) -> ParseCandidate {
    let table = RoleTable::new(RawTable::from_grid(&sheet.grid, 0));
    ParseCandidate::evaluate(&sheet.name, CandidateOrigin::AsGiven, table, config)
}

/// The sheet re-read from the most header-like row, if any.
pub fn header_attempt(sheet: &NamedSheet, config: &NormalizerConfig) -> Option<ParseCandidate> {
    let (row, table) = autodetect_header(&sheet.grid, config)?;
    Some(ParseCandidate::evaluate(
        &sheet.name,
        CandidateOrigin::HeaderRow { row },
        RoleTable::new(table),
        config,
    ))
}

/// Best attempt for one sheet. Header autodetection only runs when the
/// labeled columns of the table as given resolve no timestamps.
pub fn evaluate_sheet(sheet: &NamedSheet, config: &NormalizerConfig) -> ParseCandidate {
    let as_given = as_given_attempt(sheet, config);
    if as_given.chain_timestamp_count > 0 {
        return as_given;
    }
    match header_attempt(sheet, config) {
        Some(shifted) if shifted.outranks(&as_given) => {
            debug!(
                "Sheet '{}': header autodetect {:?} replaces the table as given",
                sheet.name, shifted.origin
            );
            shifted
        }
        _ => as_given,
    }
}

/// Columns whose leading rows look date-like often enough to be worth
/// forcing as a date column.
pub fn find_date_like_columns(table: &RawTable, config: &NormalizerConfig) -> Vec<usize> {
    let sampled = table.height().min(config.column_scan_rows);
    if sampled == 0 {
        return Vec::new();
    }
    (0..table.width())
        .filter(|&col| {
            let hits = (0..sampled)
                .filter(|&row| {
                    let text = normalize_text(&table.cell(row, col).render());
                    DATE_LIKE.iter().any(|re| re.is_match(&text))
                })
                .count();
            hits as f64 / sampled as f64 > config.column_scan_ratio
        })
        .collect()
}

/// Last-chance fallback for a winner without timestamps: force each
/// date-looking column in turn and keep the first that resolves more rows.
pub fn column_scan(candidate: &ParseCandidate, config: &NormalizerConfig) -> Option<ParseCandidate> {
    let columns = find_date_like_columns(&candidate.table.table, config);
    debug!(
        "Column scan on '{}': date-like columns {:?}",
        candidate.sheet_name, columns
    );
    columns.into_iter().find_map(|col| {
        let roles = candidate.table.roles.with_forced_date(col);
        let attempt = ParseCandidate::evaluate(
            &candidate.sheet_name,
            CandidateOrigin::ColumnScan { column: col },
            RoleTable::with_roles(candidate.table.table.clone(), roles),
            config,
        );
        (attempt.timestamp_count > candidate.timestamp_count).then_some(attempt)
    })
}
