use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::NormalizeError;
use crate::table::{Cell, NamedSheet, SheetGrid};

/// Reads every sheet of a workbook (or one named sheet) into positional grids.
pub struct WorkbookLoader {
    path: PathBuf,
}

impl WorkbookLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load sheets in workbook order.
    ///
    /// The format is sniffed from the content, not the extension, so `.xls`
    /// exports that are really XLSX archives open fine.
    pub fn load(&self, sheet: Option<&str>) -> Result<Vec<NamedSheet>, NormalizeError> {
        if !self.path.is_file() {
            return Err(NormalizeError::InputNotFound(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path).map_err(|e| NormalizeError::Read(e.to_string()))?;
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| NormalizeError::Read(e.to_string()))?;

        let names = workbook.sheet_names();
        debug!("Workbook {} has sheets {:?}", self.path.display(), names);

        let wanted: Vec<String> = match sheet {
            Some(name) => {
                if !names.iter().any(|n| n == name) {
                    return Err(NormalizeError::SheetNotFound(name.to_string()));
                }
                vec![name.to_string()]
            }
            None => names,
        };

        let mut sheets = Vec::with_capacity(wanted.len());
        for name in wanted {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| NormalizeError::Read(format!("sheet '{name}': {e}")))?;
            let grid = range_to_grid(&range);
            debug!(
                "Loaded sheet '{}': {} rows x {} columns",
                name,
                grid.height(),
                grid.width()
            );
            sheets.push(NamedSheet::new(name, grid));
        }

        info!("Loaded {} sheet(s) from {}", sheets.len(), self.path.display());
        Ok(sheets)
    }
}

pub fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    SheetGrid::new(
        range
            .rows()
            .map(|row| row.iter().map(data_to_cell).collect())
            .collect(),
    )
}

/// Map a decoded spreadsheet value onto the normalizer's cell model.
pub fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            // time-only cells carry no calendar date
            if serial < 1.0 || dt.is_duration() {
                return Cell::Number(serial);
            }
            match dt.as_datetime() {
                Some(naive) => Cell::DateTime(naive),
                None => Cell::Number(serial),
            }
        }
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_input_not_found() {
        let loader = WorkbookLoader::new("/nonexistent/path/to/file.xlsx");
        match loader.load(None) {
            Err(NormalizeError::InputNotFound(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/path/to/file.xlsx"));
            }
            other => panic!("Expected InputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(data_to_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(data_to_cell(&Data::Float(23.5)), Cell::Number(23.5));
        assert_eq!(data_to_cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(data_to_cell(&Data::String("4,5".into())), Cell::Text("4,5".into()));
        assert_eq!(data_to_cell(&Data::Bool(true)), Cell::Text("true".into()));
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
    }
}
