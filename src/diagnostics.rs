//! Reports built from a chosen candidate: the per-file summary, the gap
//! report for rows that carry measurements without a timestamp, and the
//! per-sheet inspection used by the `inspect-sheet` binary.

use serde::Serialize;

use crate::config::NormalizerConfig;
use crate::normalize::candidate::{
    as_given_attempt, header_attempt, CandidateOrigin, ParseCandidate,
};
use crate::normalize::datetime::{resolve_column, resolved_count, DateOrder};
use crate::normalize::roles::ColumnRole;
use crate::table::NamedSheet;

const MAX_UNRESOLVED_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationSummary {
    pub sheet: String,
    pub origin: CandidateOrigin,
    pub strategy: &'static str,
    pub rows: usize,
    pub timestamps: usize,
    pub timestamp_gaps: usize,
    pub temperatures: usize,
    pub humidities: usize,
    pub iso_fast_path: bool,
    pub recovered: usize,
}

impl NormalizationSummary {
    pub fn from_candidate(candidate: &ParseCandidate) -> Self {
        Self {
            sheet: candidate.sheet_name.clone(),
            origin: candidate.origin,
            strategy: candidate.strategy,
            rows: candidate.row_count(),
            timestamps: candidate.timestamp_count,
            timestamp_gaps: candidate.row_count() - candidate.timestamp_count,
            temperatures: candidate.temperature_count,
            humidities: candidate.humidity_count(),
            iso_fast_path: candidate.iso_fast_path,
            recovered: candidate.recovered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSample {
    pub row: usize,
    pub cells: Vec<LabeledValue>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Rows that carry a temperature or humidity but no resolved timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub sheet: String,
    pub date_columns: Vec<String>,
    pub rows: usize,
    pub gap_rows: usize,
    pub samples: Vec<GapSample>,
}

impl GapReport {
    pub fn from_candidate(candidate: &ParseCandidate, config: &NormalizerConfig) -> Self {
        let table = &candidate.table;
        let date_columns = table
            .roles
            .iter()
            .filter(|(_, role)| role.map_or(false, ColumnRole::is_date_bearing))
            .map(|(col, _)| table.table.labels[col].clone())
            .collect();

        let gaps: Vec<usize> = (0..candidate.row_count())
            .filter(|&row| {
                candidate.timestamps[row].is_none()
                    && (candidate.temperature[row].is_some() || candidate.humidity[row].is_some())
            })
            .collect();

        let samples = gaps
            .iter()
            .take(config.max_gap_samples)
            .map(|&row| GapSample {
                row,
                cells: table
                    .table
                    .labels
                    .iter()
                    .zip(&table.table.rows[row])
                    .map(|(label, cell)| LabeledValue {
                        label: label.clone(),
                        value: cell.render(),
                    })
                    .collect(),
                temperature: candidate.temperature[row],
                humidity: candidate.humidity[row],
            })
            .collect();

        Self {
            sheet: candidate.sheet_name.clone(),
            date_columns,
            rows: candidate.row_count(),
            gap_rows: gaps.len(),
            samples,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLabel {
    pub column: usize,
    pub label: String,
    pub role: Option<ColumnRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateColumnReport {
    pub column: usize,
    pub label: String,
    pub role: ColumnRole,
    /// `None` when the column holds numeric serials
    pub order: Option<DateOrder>,
    pub resolved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateCounts {
    pub origin: CandidateOrigin,
    pub strategy: &'static str,
    pub rows: usize,
    pub timestamps: usize,
    pub temperatures: usize,
    pub humidities: usize,
}

impl From<&ParseCandidate> for CandidateCounts {
    fn from(c: &ParseCandidate) -> Self {
        Self {
            origin: c.origin,
            strategy: c.strategy,
            rows: c.row_count(),
            timestamps: c.timestamp_count,
            temperatures: c.temperature_count,
            humidities: c.humidity_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedSample {
    pub row: usize,
    pub cells: Vec<String>,
}

/// Everything the normalizer sees about one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetInspection {
    pub sheet: String,
    pub grid_rows: usize,
    pub grid_columns: usize,
    pub as_given: CandidateCounts,
    pub header_autodetect: Option<CandidateCounts>,
    pub chosen: CandidateCounts,
    pub labels: Vec<ColumnLabel>,
    pub date_columns: Vec<DateColumnReport>,
    pub unresolved_samples: Vec<UnresolvedSample>,
}

impl SheetInspection {
    pub fn inspect(sheet: &NamedSheet, config: &NormalizerConfig) -> Self {
        let as_given = as_given_attempt(sheet, config);
        // Always run the header attempt here so it can be compared
        let header = header_attempt(sheet, config);
        let as_given_counts = CandidateCounts::from(&as_given);
        let header_counts = header.as_ref().map(CandidateCounts::from);

        let chosen = match header {
            Some(h) if as_given.chain_timestamp_count == 0 && h.outranks(&as_given) => h,
            _ => as_given,
        };
        let table = &chosen.table;

        let labels = table
            .roles
            .iter()
            .map(|(column, role)| ColumnLabel {
                column,
                label: table.table.labels[column].clone(),
                role,
            })
            .collect();

        let date_columns = table
            .roles
            .iter()
            .filter_map(|(column, role)| {
                let role = role.filter(|r| r.is_date_bearing())?;
                let parsed = resolve_column(&table.table.column(column), config);
                Some(DateColumnReport {
                    column,
                    label: table.table.labels[column].clone(),
                    role,
                    order: parsed.order,
                    resolved: resolved_count(&parsed.series),
                })
            })
            .collect();

        let unresolved_samples = chosen
            .timestamps
            .iter()
            .enumerate()
            .filter(|(row, ts)| {
                ts.is_none() && table.table.rows[*row].iter().any(|c| !c.is_empty())
            })
            .take(MAX_UNRESOLVED_SAMPLES)
            .map(|(row, _)| UnresolvedSample {
                row,
                cells: table.table.rows[row].iter().map(|c| c.render()).collect(),
            })
            .collect();

        Self {
            sheet: sheet.name.clone(),
            grid_rows: sheet.grid.height(),
            grid_columns: sheet.grid.width(),
            as_given: as_given_counts,
            header_autodetect: header_counts,
            chosen: CandidateCounts::from(&chosen),
            labels,
            date_columns,
            unresolved_samples,
        }
    }
}
