//! Row assembly: the chosen candidate's series zipped into records.

use super::candidate::ParseCandidate;
use crate::record::CanonicalRecord;

/// One record per table row, in row order. Rows without a timestamp are
/// kept so gaps stay visible downstream.
pub fn assemble(candidate: &ParseCandidate) -> Vec<CanonicalRecord> {
    candidate
        .timestamps
        .iter()
        .zip(&candidate.temperature)
        .zip(&candidate.humidity)
        .map(|((timestamp, temperature), humidity)| CanonicalRecord {
            timestamp: *timestamp,
            temperature: *temperature,
            humidity: *humidity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::normalize::candidate::evaluate_sheet;
    use crate::table::{Cell, NamedSheet, SheetGrid};

    #[test]
    fn test_one_record_per_row_with_gaps() {
        let sheet = NamedSheet::new(
            "Plan1",
            SheetGrid::new(vec![
                vec![Cell::from("Data/Hora"), Cell::from("Temperatura"), Cell::from("Umidade")],
                vec![Cell::from("2024-01-05 10:00:00"), Cell::from("23,5"), Cell::from("61")],
                vec![Cell::from("sem data"), Cell::from("23,6"), Cell::Empty],
                vec![Cell::from("2024-01-05 10:10:00"), Cell::Empty, Cell::from("60,5")],
            ]),
        );
        let candidate = evaluate_sheet(&sheet, &NormalizerConfig::default());
        let records = assemble(&candidate);

        assert_eq!(records.len(), 3);
        assert!(records[0].timestamp.is_some());
        assert_eq!(records[0].temperature, Some(23.5));
        assert_eq!(records[0].humidity, Some(61.0));
        assert_eq!(records[1].timestamp, None);
        assert_eq!(records[1].temperature, Some(23.6));
        assert_eq!(records[1].humidity, None);
        assert_eq!(records[2].temperature, None);
        assert_eq!(records[2].humidity, Some(60.5));
    }
}
