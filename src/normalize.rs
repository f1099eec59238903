pub mod assembler;
pub mod candidate;
pub mod datetime;
pub mod header;
pub mod numeric;
pub mod roles;
pub mod strategies;
pub mod text;

use tracing::{debug, info, warn};

use crate::config::NormalizerConfig;
use crate::diagnostics::{GapReport, NormalizationSummary, SheetInspection};
use crate::error::NormalizeError;
use crate::record::CanonicalRecord;
use crate::table::NamedSheet;
use candidate::{column_scan, evaluate_sheet, select_best, ParseCandidate};

/// Records of one file together with how they were obtained.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<CanonicalRecord>,
    pub summary: NormalizationSummary,
}

/// Turns the sheets of one workbook into canonical records.
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Evaluate every sheet, pick the best candidate and run the column scan
    /// when it still has no timestamps.
    pub fn choose_candidate(&self, sheets: &[NamedSheet]) -> Result<ParseCandidate, NormalizeError> {
        if sheets.is_empty() {
            return Err(NormalizeError::NoCandidate(
                "workbook contains no sheets".to_string(),
            ));
        }

        let best = select_best(sheets.iter().map(|sheet| {
            debug!(
                "Evaluating sheet '{}' ({} rows)",
                sheet.name,
                sheet.grid.height()
            );
            evaluate_sheet(sheet, &self.config)
        }))
        .ok_or_else(|| NormalizeError::NoCandidate("no sheet could be evaluated".to_string()))?;

        info!(
            "Chosen sheet '{}' ({:?}): {} timestamps, {} temperatures",
            best.sheet_name, best.origin, best.timestamp_count, best.temperature_count
        );

        if best.timestamp_count > 0 {
            return Ok(best);
        }

        match column_scan(&best, &self.config) {
            Some(scanned) => {
                info!(
                    "Column scan recovered {} timestamps on sheet '{}' ({:?})",
                    scanned.timestamp_count, scanned.sheet_name, scanned.origin
                );
                Ok(scanned)
            }
            None => {
                warn!(
                    "No timestamps could be resolved; best sheet was '{}'",
                    best.sheet_name
                );
                Err(NormalizeError::NoCandidate(format!(
                    "no timestamps could be resolved (best sheet: '{}')",
                    best.sheet_name
                )))
            }
        }
    }

    pub fn normalize(&self, sheets: &[NamedSheet]) -> Result<Normalized, NormalizeError> {
        let candidate = self.choose_candidate(sheets)?;
        let records = assembler::assemble(&candidate);
        let summary = NormalizationSummary::from_candidate(&candidate);

        info!(
            "Normalized sheet '{}': {} rows, {} timestamps, {} gaps, {} temperatures, {} humidities",
            summary.sheet,
            summary.rows,
            summary.timestamps,
            summary.timestamp_gaps,
            summary.temperatures,
            summary.humidities
        );
        if summary.timestamp_gaps > 0 {
            debug!(
                "{} rows kept without timestamp ({} recovered row by row)",
                summary.timestamp_gaps, summary.recovered
            );
        }

        Ok(Normalized { records, summary })
    }

    pub fn gap_report(&self, sheets: &[NamedSheet]) -> Result<GapReport, NormalizeError> {
        let candidate = self.choose_candidate(sheets)?;
        Ok(GapReport::from_candidate(&candidate, &self.config))
    }

    pub fn inspect(&self, sheets: &[NamedSheet]) -> Vec<SheetInspection> {
        sheets
            .iter()
            .map(|sheet| SheetInspection::inspect(sheet, &self.config))
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}
