// Maps uploaded spreadsheet columns onto the fixed child record schema.

use log::debug;
use std::collections::HashMap;

use immun_registry::{ChildRecord, Vaccine};
use snafu::prelude::*;

use crate::tracker::{EmptyImportSnafu, MissingColumnsSnafu, TrackerResult, SCHEMA_COLUMNS};

/// Resolved column positions for one import.
#[derive(Eq, PartialEq, Debug, Clone)]
struct ColumnIndex {
    child: usize,
    age: usize,
    parent: usize,
    barangay: usize,
    sitio: usize,
    // In Vaccine::ALL order.
    vaccines: [usize; 4],
}

/// Given the header row, finds the position of every required column.
///
/// Matching is case-insensitive on trimmed names; the first occurrence wins
/// for duplicated names. If any required column is missing the whole import
/// is rejected, naming every missing column.
fn resolve_columns(header: &[String]) -> TrackerResult<ColumnIndex> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (pos, name) in header.iter().enumerate() {
        positions.entry(name.trim().to_lowercase()).or_insert(pos);
    }
    debug!("resolve_columns: positions: {:?}", positions);

    let missing: Vec<String> = SCHEMA_COLUMNS
        .iter()
        .filter(|name| !positions.contains_key(name.to_lowercase().as_str()))
        .map(|name| name.to_string())
        .collect();
    ensure!(missing.is_empty(), MissingColumnsSnafu { columns: missing });

    let idx = |name: &str| positions[name];
    Ok(ColumnIndex {
        child: idx("child name"),
        age: idx("age"),
        parent: idx("parent name"),
        barangay: idx("barangay"),
        sitio: idx("sitio"),
        vaccines: [idx("bcg"), idx("opv"), idx("pentavalent"), idx("measles")],
    })
}

/// Builds the records of one import.
///
/// Row 0 is the header. Columns beyond the required nine are ignored. Cells
/// missing from short rows read as empty; empty geography cells default to
/// the importing session's barangay and sitio; a non-numeric age reads as 0.
/// Vaccine statuses are stored verbatim, interpretation happens only at
/// statistics time.
pub fn records_from_rows(
    rows: &[Vec<String>],
    default_barangay: &str,
    default_sitio: &str,
) -> TrackerResult<Vec<ChildRecord>> {
    let header = rows.first().context(EmptyImportSnafu {})?;
    let cols = resolve_columns(header)?;
    debug!("records_from_rows: columns: {:?}", cols);

    let mut records: Vec<ChildRecord> = Vec::new();
    for row in rows.iter().skip(1) {
        let cell = |pos: usize| row.get(pos).map(|s| s.as_str()).unwrap_or("");
        let geo = |pos: usize, default: &str| {
            let v = cell(pos);
            if v.is_empty() {
                default.to_string()
            } else {
                v.to_string()
            }
        };
        let mut record = ChildRecord {
            child: cell(cols.child).to_string(),
            age: cell(cols.age).parse::<u32>().unwrap_or(0),
            parent: cell(cols.parent).to_string(),
            barangay: geo(cols.barangay, default_barangay),
            sitio: geo(cols.sitio, default_sitio),
            bcg: String::new(),
            opv: String::new(),
            pentavalent: String::new(),
            measles: String::new(),
        };
        for (pos, vaccine) in cols.vaccines.iter().zip(Vaccine::ALL.iter()) {
            record.set_status(*vaccine, cell(*pos).to_string());
        }
        records.push(record);
    }
    debug!("records_from_rows: built {:?} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::csv_codec;
    use crate::tracker::TrackerError;

    const B: &str = "Barangay 1";
    const S: &str = "Sitio A";

    fn rows(text: &str) -> Vec<Vec<String>> {
        csv_codec::parse(text)
    }

    #[test]
    fn builds_records_in_header_order() {
        let text = "Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,2,Maria,Barangay 2,Sitio B,Accepted,,Accepted,Refused";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.child, "Ana");
        assert_eq!(r.age, 2);
        assert_eq!(r.parent, "Maria");
        assert_eq!(r.barangay, "Barangay 2");
        assert_eq!(r.sitio, "Sitio B");
        assert_eq!(r.bcg, "Accepted");
        assert_eq!(r.opv, "");
        assert_eq!(r.pentavalent, "Accepted");
        assert_eq!(r.measles, "Refused");
    }

    #[test]
    fn headers_match_case_insensitively_in_any_order() {
        let text = "measles,PENTAVALENT,opv,bcg,SITIO,barangay,PARENT NAME,age,child name\n\
                    Accepted,a,b,c,Sitio C,Barangay 3,Pedro,4,Ben";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        let r = &records[0];
        assert_eq!(r.child, "Ben");
        assert_eq!(r.age, 4);
        assert_eq!(r.measles, "Accepted");
        assert_eq!(r.bcg, "c");
    }

    #[test]
    fn missing_age_column_rejects_the_whole_import() {
        let text = "Child Name,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,Maria,,,,,,";
        let res = records_from_rows(&rows(text), B, S);
        match res {
            Err(TrackerError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["Age".to_string()]);
            }
            x => panic!("expected MissingColumns, got {:?}", x),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let text = "Remarks,Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles,Visit Date\n\
                    note,Ana,2,Maria,,,Accepted,,,,2024-01-05";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        let r = &records[0];
        assert_eq!(r.child, "Ana");
        assert_eq!(r.bcg, "Accepted");
        assert_eq!(r.measles, "");
    }

    #[test]
    fn empty_geography_defaults_to_the_session() {
        let text = "Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,2,Maria,,,,,,";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        assert_eq!(records[0].barangay, B);
        assert_eq!(records[0].sitio, S);
    }

    #[test]
    fn bad_ages_read_as_zero() {
        let text = "Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,two,Maria,,,,,,\n\
                    Ben,,Pedro,,,,,,";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        assert_eq!(records[0].age, 0);
        assert_eq!(records[1].age, 0);
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let text = "Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,2";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        let r = &records[0];
        assert_eq!(r.parent, "");
        assert_eq!(r.barangay, B);
        assert_eq!(r.measles, "");
    }

    #[test]
    fn header_only_imports_an_empty_list() {
        let text = "Child Name,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn no_rows_is_a_validation_error() {
        let res = records_from_rows(&[], B, S);
        assert!(matches!(res, Err(TrackerError::EmptyImport {})));
    }

    #[test]
    fn first_occurrence_wins_for_duplicate_headers() {
        let text = "Child Name,Age,Age,Parent Name,Barangay,Sitio,BCG,OPV,Pentavalent,Measles\n\
                    Ana,3,9,Maria,,,,,,";
        let records = records_from_rows(&rows(text), B, S).unwrap();
        assert_eq!(records[0].age, 3);
    }
}
