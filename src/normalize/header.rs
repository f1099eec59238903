//! Shifted-header detection for sheets with banner rows above the real header.

use tracing::debug;

use super::roles::mentions_role_keyword;
use crate::config::NormalizerConfig;
use crate::table::{Cell, RawTable, SheetGrid};

/// Score of one grid row: how many cells mention a role keyword.
pub fn header_score(row: &[Cell]) -> usize {
    row.iter()
        .filter(|cell| mentions_role_keyword(&cell.render().trim().to_lowercase()))
        .count()
}

/// Index of the most header-like row within the scan window. Ties go to the
/// lowest index; a best score of zero means no header was found.
pub fn detect_header_row(grid: &SheetGrid, config: &NormalizerConfig) -> Option<usize> {
    let window = grid.height().min(config.header_scan_rows);
    let mut best: Option<(usize, usize)> = None;

    for (idx, row) in grid.rows.iter().take(window).enumerate() {
        let score = header_score(row);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((idx, score)) if score > 0 => {
            debug!("Header candidate at row {} (score {})", idx, score);
            Some(idx)
        }
        _ => None,
    }
}

/// Re-read the grid with the detected header row promoted to labels.
pub fn autodetect_header(grid: &SheetGrid, config: &NormalizerConfig) -> Option<(usize, RawTable)> {
    detect_header_row(grid, config).map(|idx| (idx, RawTable::from_grid(grid, idx)))
}
