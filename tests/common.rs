use datalogger_normalizer::table::{Cell, NamedSheet, SheetGrid};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Cell content for workbook fixtures.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum Fixture<'a> {
    Text(&'a str),
    Number(f64),
    /// Excel serial written with a date+time number format
    DateTime(f64),
    /// Day fraction written with a time-only number format
    Time(f64),
    Blank,
}

/// Write an .xlsx workbook with the given sheets, in order.
#[allow(dead_code)]
pub fn write_workbook(dir: &Path, file_name: &str, sheets: &[(&str, Vec<Vec<Fixture>>)]) -> PathBuf {
    let mut workbook = Workbook::new();
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    let time = Format::new().set_num_format("hh:mm");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("valid sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match value {
                    Fixture::Text(s) => {
                        worksheet.write_string(r, c, *s).expect("write string");
                    }
                    Fixture::Number(n) => {
                        worksheet.write_number(r, c, *n).expect("write number");
                    }
                    Fixture::DateTime(n) => {
                        worksheet
                            .write_number_with_format(r, c, *n, &datetime)
                            .expect("write datetime");
                    }
                    Fixture::Time(n) => {
                        worksheet
                            .write_number_with_format(r, c, *n, &time)
                            .expect("write time");
                    }
                    Fixture::Blank => {}
                }
            }
        }
    }

    let path = dir.join(file_name);
    workbook.save(&path).expect("save workbook");
    path
}

/// In-memory sheet from string cells; "" is an empty cell.
#[allow(dead_code)]
pub fn text_sheet(name: &str, rows: &[&[&str]]) -> NamedSheet {
    NamedSheet::new(
        name,
        SheetGrid::new(
            rows.iter()
                .map(|row| row.iter().map(|s| Cell::from(*s)).collect())
                .collect(),
        ),
    )
}
