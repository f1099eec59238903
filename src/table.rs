//! Tabular model shared by the loader and the normalization engine.

use chrono::NaiveDateTime;

/// A single spreadsheet cell after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(f) => f.is_nan(),
            Cell::DateTime(_) => false,
        }
    }

    /// Text rendering used for header labels, keyword scans and
    /// concatenation fallbacks. Empty cells render as "".
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(f) => format_number(*f),
            Cell::Text(s) => s.clone(),
            Cell::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Integral values render without a trailing ".0" so "45000" stays "45000".
fn format_number(f: f64) -> String {
    if f.is_nan() {
        String::new()
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Positional rows of one sheet, no header assumption.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// A sheet as produced by the loader, in workbook order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSheet {
    pub name: String,
    pub grid: SheetGrid,
}

impl NamedSheet {
    pub fn new(name: impl Into<String>, grid: SheetGrid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// Labeled table: `labels[i]` names column `i` of every row. Labels may
/// repeat; columns are always addressed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Promote `header_row` of the grid to labels; the rows below become the
    /// data. Ragged rows are padded with `Cell::Empty` to a common width.
    pub fn from_grid(grid: &SheetGrid, header_row: usize) -> Self {
        let width = grid.width();
        let mut labels: Vec<String> = grid
            .rows
            .get(header_row)
            .map(|row| row.iter().map(|c| c.render().trim().to_string()).collect())
            .unwrap_or_default();
        labels.resize(width, String::new());

        let rows = grid
            .rows
            .iter()
            .skip(header_row + 1)
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        RawTable { labels, rows }
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> Vec<&Cell> {
        (0..self.height()).map(|row| self.cell(row, col)).collect()
    }

    /// First non-empty cell per row across `cols`, in column order.
    pub fn unified_column(&self, cols: &[usize]) -> Vec<&Cell> {
        (0..self.height())
            .map(|row| {
                cols.iter()
                    .map(|&col| self.cell(row, col))
                    .find(|c| !c.is_empty())
                    .unwrap_or(&Cell::Empty)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid() -> SheetGrid {
        SheetGrid::new(vec![
            vec![Cell::from("Logger RC-4HC")],
            vec![Cell::from("Data"), Cell::from("Temperatura"), Cell::from("Temperatura")],
            vec![Cell::from("01/02/2024"), Cell::Empty, Cell::Number(21.5)],
            vec![Cell::from("02/02/2024"), Cell::Number(22.0)],
        ])
    }

    #[test]
    fn test_from_grid_promotes_header_and_pads() {
        let table = RawTable::from_grid(&grid(), 1);
        assert_eq!(table.labels, vec!["Data", "Temperatura", "Temperatura"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.cell(1, 2), &Cell::Empty);
    }

    #[test]
    fn test_from_grid_short_header_gets_blank_labels() {
        let table = RawTable::from_grid(&grid(), 0);
        assert_eq!(table.labels, vec!["Logger RC-4HC", "", ""]);
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_unified_column_takes_first_non_empty() {
        let table = RawTable::from_grid(&grid(), 1);
        let unified = table.unified_column(&[1, 2]);
        assert_eq!(unified, vec![&Cell::Number(21.5), &Cell::Number(22.0)]);
    }

    #[test]
    fn test_render() {
        assert_eq!(Cell::Number(45000.0).render(), "45000");
        assert_eq!(Cell::Number(21.5).render(), "21.5");
        assert_eq!(Cell::Empty.render(), "");
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::DateTime(midnight).render(), "2024-01-01");
        let afternoon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(Cell::DateTime(afternoon).render(), "2024-01-01 14:30:05");
    }

    #[test]
    fn test_is_empty() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::from("   ").is_empty());
        assert!(Cell::Number(f64::NAN).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }
}
