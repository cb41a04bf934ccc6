// Reads the first worksheet of a workbook into rows of trimmed cells.

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::tracker::{EmptyExcelSnafu, OpeningExcelSnafu, TrackerResult};

/// Extracts the first worksheet as rows of strings, shaped like the output
/// of the CSV parser: cells trimmed, integral numbers without a decimal
/// point, wholly empty rows dropped.
pub fn read_sheet_rows(path: &str) -> TrackerResult<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {})?
        .context(OpeningExcelSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in wrange.rows() {
        debug!("read_sheet_rows: {:?}", row);
        let fields: Vec<String> = row.iter().map(cell_text).collect();
        if fields.iter().any(|f| !f.is_empty()) {
            rows.push(fields);
        }
    }
    Ok(rows)
}

fn cell_text(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.trim().to_string(),
        calamine::DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Int(i) => i.to_string(),
        calamine::DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_renders_ages_as_integers() {
        assert_eq!(cell_text(&calamine::DataType::Float(2.0)), "2");
        assert_eq!(cell_text(&calamine::DataType::Float(2.5)), "2.5");
        assert_eq!(cell_text(&calamine::DataType::Int(4)), "4");
        assert_eq!(
            cell_text(&calamine::DataType::String(" Accepted ".to_string())),
            "Accepted"
        );
        assert_eq!(cell_text(&calamine::DataType::Empty), "");
    }
}
