// Serializes the scoped records for download.

use immun_registry::{ChildRecord, Vaccine};

use crate::tracker::{csv_codec, Role, Session, SCHEMA_COLUMNS};

fn record_row(r: &ChildRecord) -> Vec<String> {
    let mut row = vec![
        r.child.clone(),
        r.age.to_string(),
        r.parent.clone(),
        r.barangay.clone(),
        r.sitio.clone(),
    ];
    for vaccine in Vaccine::ALL.iter() {
        row.push(r.status(*vaccine).to_string());
    }
    row
}

/// The nine-column CSV export: header row, then one row per record, values
/// as stored.
pub fn records_to_csv(records: &[ChildRecord]) -> String {
    let mut rows: Vec<Vec<String>> = vec![SCHEMA_COLUMNS.iter().map(|s| s.to_string()).collect()];
    rows.extend(records.iter().map(record_row));
    csv_codec::serialize(&rows)
}

/// The legacy spreadsheet export: the records as an HTML table in a minimal
/// document shell. Written with an `.xls` extension, spreadsheet
/// applications claim it (content type `application/vnd.ms-excel`).
pub fn records_to_xls(records: &[ChildRecord]) -> String {
    let mut table = String::from("<table><tr>");
    for name in SCHEMA_COLUMNS.iter() {
        table.push_str(&format!("<th>{}</th>", escape_html(name)));
    }
    table.push_str("</tr>");
    for r in records.iter() {
        table.push_str("<tr>");
        for cell in record_row(r).iter() {
            table.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        table.push_str("</tr>");
    }
    table.push_str("</table>");
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        table
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Download name for the session's scope, without the format extension.
pub fn default_file_stem(session: &Session) -> String {
    match session.role {
        Role::Bhw => format!(
            "{}_{}",
            session.barangay.clone().unwrap_or_default(),
            session.sitio.clone().unwrap_or_default()
        ),
        Role::Bns => format!(
            "{}_all_sitios",
            session.barangay.clone().unwrap_or_default()
        ),
        Role::Mho => "All_Barangays".to_string(),
    }
}
