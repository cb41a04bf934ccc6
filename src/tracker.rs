use log::{debug, info, warn};

use immun_registry::{completion_stats, vaccine_counts, ChildRecord, BARANGAYS, SITIOS};
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::tracker::store::{LocalityKey, RecordStore};

pub mod charts;
pub mod csv_codec;
pub mod export;
pub mod import;
pub mod io_xlsx;
pub mod store;

/// The column schema shared by imports, exports and the table view.
pub const SCHEMA_COLUMNS: [&str; 9] = [
    "Child Name",
    "Age",
    "Parent Name",
    "Barangay",
    "Sitio",
    "BCG",
    "OPV",
    "Pentavalent",
    "Measles",
];

#[derive(Debug, Snafu)]
pub enum TrackerError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display(""))]
    EmptyExcel {},
    #[snafu(display("Error reading {path}"))]
    ReadingInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error accessing the record store at {path}"))]
    StoreIo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    EncodingRecords { source: serde_json::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("The import has no rows"))]
    EmptyImport {},
    #[snafu(display("Missing required columns: {}", columns.join(", ")))]
    MissingColumns { columns: Vec<String> },

    #[snafu(display("No active session, log in first"))]
    NoSession {},
    #[snafu(display("Unknown role {role} (expected BHW, BNS or MHO)"))]
    UnknownRole { role: String },
    #[snafu(display("Unknown barangay {name}"))]
    UnknownBarangay { name: String },
    #[snafu(display("Unknown sitio {name}"))]
    UnknownSitio { name: String },
    #[snafu(display("A {role} session requires a {field} selection"))]
    MissingSelection { role: String, field: String },
    #[snafu(display("A {role} session has read-only access to its records"))]
    ReadOnlyRole { role: String },
    #[snafu(display("No record at position {index}"))]
    NoSuchRecord { index: usize },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// The class of user driving a session. The role fixes the geographic scope
/// a session reads, and whether it may write at all.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Role {
    /// Barangay health worker: keeps the records of one sitio.
    #[serde(rename = "BHW")]
    Bhw,
    /// Barangay nutrition scholar: reads the whole-barangay aggregate.
    #[serde(rename = "BNS")]
    Bns,
    /// Municipal health officer: reads the system-wide aggregate.
    #[serde(rename = "MHO")]
    Mho,
}

impl Role {
    pub fn parse(s: &str) -> TrackerResult<Role> {
        match s.to_uppercase().as_str() {
            "BHW" => Ok(Role::Bhw),
            "BNS" => Ok(Role::Bns),
            "MHO" => Ok(Role::Mho),
            _ => UnknownRoleSnafu { role: s }.fail(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Bhw => "BHW",
            Role::Bns => "BNS",
            Role::Mho => "MHO",
        }
    }
}

/// The session context passed to every operation that needs locality
/// scoping. Nothing reads the current role or geography from ambient state.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub email: String,
    pub barangay: Option<String>,
    pub sitio: Option<String>,
}

impl Session {
    /// The storage key a session writes to. Only BHW sessions own one.
    pub fn write_key(&self) -> TrackerResult<LocalityKey> {
        match self.role {
            Role::Bhw => {
                let barangay = self.barangay.clone().context(MissingSelectionSnafu {
                    role: "BHW",
                    field: "barangay",
                })?;
                let sitio = self.sitio.clone().context(MissingSelectionSnafu {
                    role: "BHW",
                    field: "sitio",
                })?;
                Ok(LocalityKey::new(&barangay, &sitio))
            }
            role => ReadOnlyRoleSnafu {
                role: role.as_str(),
            }
            .fail(),
        }
    }

    /// Human-readable description of the session's scope.
    pub fn scope_label(&self) -> String {
        match self.role {
            Role::Bhw => format!(
                "{} / {}",
                self.barangay.clone().unwrap_or_default(),
                self.sitio.clone().unwrap_or_default()
            ),
            Role::Bns => format!(
                "{} (all sitios)",
                self.barangay.clone().unwrap_or_default()
            ),
            Role::Mho => "All barangays".to_string(),
        }
    }
}

/// Validates the login selections for the role and persists the session.
pub fn login(
    store: &RecordStore,
    role_s: &str,
    email: &str,
    barangay: Option<String>,
    sitio: Option<String>,
) -> TrackerResult<Session> {
    let role = Role::parse(role_s)?;
    let session = match role {
        Role::Bhw => {
            let b = barangay.context(MissingSelectionSnafu {
                role: "BHW",
                field: "barangay",
            })?;
            let s = sitio.context(MissingSelectionSnafu {
                role: "BHW",
                field: "sitio",
            })?;
            ensure!(
                BARANGAYS.contains(&b.as_str()),
                UnknownBarangaySnafu { name: b.as_str() }
            );
            ensure!(
                SITIOS.contains(&s.as_str()),
                UnknownSitioSnafu { name: s.as_str() }
            );
            Session {
                role,
                email: email.to_string(),
                barangay: Some(b),
                sitio: Some(s),
            }
        }
        Role::Bns => {
            let b = barangay.context(MissingSelectionSnafu {
                role: "BNS",
                field: "barangay",
            })?;
            ensure!(
                BARANGAYS.contains(&b.as_str()),
                UnknownBarangaySnafu { name: b.as_str() }
            );
            Session {
                role,
                email: email.to_string(),
                barangay: Some(b),
                sitio: None,
            }
        }
        Role::Mho => Session {
            role,
            email: email.to_string(),
            barangay: None,
            sitio: None,
        },
    };
    store.save_session(&session)?;
    info!("login: {:?}", session);
    Ok(session)
}

/// The records the session may see: its own sitio for a BHW, the barangay
/// aggregate for a BNS, everything for an MHO.
pub fn scoped_records(store: &RecordStore, session: &Session) -> TrackerResult<Vec<ChildRecord>> {
    match session.role {
        Role::Bhw => Ok(store.get(&session.write_key()?)),
        Role::Bns => {
            let b = session.barangay.clone().context(MissingSelectionSnafu {
                role: "BNS",
                field: "barangay",
            })?;
            Ok(store.barangay_records(&b))
        }
        Role::Mho => Ok(store.all_records()),
    }
}

fn current_session(store: &RecordStore) -> TrackerResult<Session> {
    store.load_session().context(NoSessionSnafu {})
}

/// Fields of a record that an edit may update.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub child: Option<String>,
    pub age: Option<u32>,
    pub parent: Option<String>,
    pub barangay: Option<String>,
    pub sitio: Option<String>,
    pub bcg: Option<String>,
    pub opv: Option<String>,
    pub pentavalent: Option<String>,
    pub measles: Option<String>,
}

impl RecordPatch {
    fn apply(self, record: &mut ChildRecord) {
        if let Some(v) = self.child {
            record.child = v;
        }
        if let Some(v) = self.age {
            record.age = v;
        }
        if let Some(v) = self.parent {
            record.parent = v;
        }
        if let Some(v) = self.barangay {
            record.barangay = v;
        }
        if let Some(v) = self.sitio {
            record.sitio = v;
        }
        if let Some(v) = self.bcg {
            record.bcg = v;
        }
        if let Some(v) = self.opv {
            record.opv = v;
        }
        if let Some(v) = self.pentavalent {
            record.pentavalent = v;
        }
        if let Some(v) = self.measles {
            record.measles = v;
        }
    }
}

pub fn run(args: &Args) -> TrackerResult<()> {
    let store = RecordStore::open(&args.data_dir)?;
    match args.command.clone() {
        Command::Login {
            role,
            email,
            barangay,
            sitio,
        } => {
            let session = login(&store, &role, &email, barangay, sitio)?;
            println!(
                "Logged in as {} ({}), scope: {}",
                session.email,
                session.role.as_str(),
                session.scope_label()
            );
            Ok(())
        }
        Command::Import { file, input_type } => run_import(&store, &file, &input_type),
        Command::List => run_list(&store),
        Command::Add {
            child,
            age,
            parent,
            barangay,
            sitio,
            bcg,
            opv,
            pentavalent,
            measles,
        } => {
            let session = current_session(&store)?;
            let key = session.write_key()?;
            let record = ChildRecord {
                child,
                age,
                parent,
                barangay: barangay.unwrap_or_else(|| key.barangay.clone()),
                sitio: sitio.unwrap_or_else(|| key.sitio.clone()),
                bcg,
                opv,
                pentavalent,
                measles,
            };
            let mut records = store.get(&key);
            records.push(record);
            store.put(&key, &records)?;
            println!("Added record at position {}.", records.len() - 1);
            Ok(())
        }
        Command::Edit {
            index,
            child,
            age,
            parent,
            barangay,
            sitio,
            bcg,
            opv,
            pentavalent,
            measles,
        } => {
            let patch = RecordPatch {
                child,
                age,
                parent,
                barangay,
                sitio,
                bcg,
                opv,
                pentavalent,
                measles,
            };
            run_edit(&store, index, patch)
        }
        Command::Delete { index } => run_delete(&store, index),
        Command::Clear => {
            let session = current_session(&store)?;
            let key = session.write_key()?;
            store.clear(&key)?;
            println!("Cleared all records for {} / {}.", key.barangay, key.sitio);
            Ok(())
        }
        Command::Export { format, out } => run_export(&store, &format, &out),
        Command::Stats { out, reference } => run_stats(&store, &out, &reference),
        Command::Charts { out_dir } => run_charts(&store, &out_dir),
    }
}

fn run_import(
    store: &RecordStore,
    path: &str,
    input_type: &Option<String>,
) -> TrackerResult<()> {
    let session = current_session(store)?;
    let key = session.write_key()?;
    let rows = read_import_rows(path, input_type)?;
    let records = import::records_from_rows(&rows, &key.barangay, &key.sitio)?;
    let n = records.len();
    // The whole list is filed under the session's own key, whatever
    // barangay or sitio the individual rows may claim.
    store.put(&key, &records)?;
    info!("run_import: stored {:?} records under {:?}", n, key);
    println!("Imported {} records into {} / {}.", n, key.barangay, key.sitio);
    Ok(())
}

fn read_import_rows(path: &str, input_type: &Option<String>) -> TrackerResult<Vec<Vec<String>>> {
    let kind = match input_type {
        Some(t) => t.to_lowercase(),
        None if path.to_lowercase().ends_with(".xlsx") => "xlsx".to_string(),
        None => "csv".to_string(),
    };
    info!("read_import_rows: reading {:?} as {:?}", path, kind);
    match kind.as_str() {
        "csv" => {
            let text = fs::read_to_string(path).context(ReadingInputSnafu { path })?;
            Ok(csv_codec::parse(&text))
        }
        "xlsx" => io_xlsx::read_sheet_rows(path),
        x => whatever!("Input type not supported: {:?}", x),
    }
}

fn run_list(store: &RecordStore) -> TrackerResult<()> {
    let session = current_session(store)?;
    let records = scoped_records(store, &session)?;
    if records.is_empty() {
        println!("No records for {}.", session.scope_label());
    } else {
        print!("{}", render_table(&records));
        println!("{} records for {}.", records.len(), session.scope_label());
    }
    Ok(())
}

/// Renders records as an aligned text table. Empty statuses read `Needed`,
/// like the dashboard badges.
fn render_table(records: &[ChildRecord]) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header: Vec<String> = vec!["#".to_string()];
    header.extend(SCHEMA_COLUMNS.iter().map(|s| s.to_string()));
    rows.push(header);
    for (idx, r) in records.iter().enumerate() {
        rows.push(vec![
            idx.to_string(),
            r.child.clone(),
            r.age.to_string(),
            r.parent.clone(),
            r.barangay.clone(),
            r.sitio.clone(),
            badge(&r.bcg),
            badge(&r.opv),
            badge(&r.pentavalent),
            badge(&r.measles),
        ]);
    }

    let ncols = rows[0].len();
    let mut widths = vec![0usize; ncols];
    for row in rows.iter() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let mut out = String::new();
    for row in rows.iter() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn badge(status: &str) -> String {
    if status.is_empty() {
        "Needed".to_string()
    } else {
        status.to_string()
    }
}

fn run_edit(store: &RecordStore, index: usize, patch: RecordPatch) -> TrackerResult<()> {
    let session = current_session(store)?;
    let key = session.write_key()?;
    let mut records = store.get(&key);
    let record = records
        .get_mut(index)
        .context(NoSuchRecordSnafu { index })?;
    patch.apply(record);
    store.put(&key, &records)?;
    println!("Updated record at position {}.", index);
    Ok(())
}

fn run_delete(store: &RecordStore, index: usize) -> TrackerResult<()> {
    let session = current_session(store)?;
    let key = session.write_key()?;
    let mut records = store.get(&key);
    ensure!(index < records.len(), NoSuchRecordSnafu { index });
    records.remove(index);
    store.put(&key, &records)?;
    println!("Deleted record at position {}.", index);
    Ok(())
}

fn run_export(store: &RecordStore, format: &str, out: &Option<String>) -> TrackerResult<()> {
    let session = current_session(store)?;
    let records = scoped_records(store, &session)?;
    let (text, ext) = match format.to_lowercase().as_str() {
        "csv" => (export::records_to_csv(&records), "csv"),
        "xls" => (export::records_to_xls(&records), "xls"),
        x => whatever!("Export format not supported: {:?}", x),
    };
    let path = match out {
        Some(p) => p.clone(),
        None => format!("{}.{}", export::default_file_stem(&session), ext),
    };
    fs::write(&path, text).context(WritingOutputSnafu { path: path.as_str() })?;
    println!("Wrote {} records to {}.", records.len(), path);
    Ok(())
}

fn build_summary_js(session: &Session, records: &[ChildRecord]) -> JSValue {
    let stats = completion_stats(records);
    let mut vaccines: JSMap<String, JSValue> = JSMap::new();
    for (vaccine, count) in vaccine_counts(records) {
        vaccines.insert(vaccine.name().to_string(), json!(count));
    }
    json!({
        "scope": session.scope_label(),
        "records": records.len(),
        "completion": {
            "complete": stats.complete,
            "incomplete": stats.incomplete,
        },
        "vaccines": vaccines,
    })
}

pub fn read_summary(path: &str) -> TrackerResult<JSValue> {
    let contents = fs::read_to_string(path).context(ReadingInputSnafu { path })?;
    debug!("read_summary: read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn run_stats(
    store: &RecordStore,
    out: &Option<String>,
    reference: &Option<String>,
) -> TrackerResult<()> {
    let session = current_session(store)?;
    let records = scoped_records(store, &session)?;
    let summary = build_summary_js(&session, &records);
    let pretty_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match out {
        Some(path) if path != "stdout" => {
            fs::write(path, &pretty_stats).context(WritingOutputSnafu { path: path.as_str() })?;
            info!("run_stats: wrote summary to {:?}", path);
        }
        _ => println!("{}", pretty_stats),
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = reference {
        let summary_ref = read_summary(reference_path)?;
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty_stats {
            warn!("Found differences with the reference summary");
            print_diff(pretty_ref.as_str(), pretty_stats.as_ref(), "\n");
            whatever!("Difference detected between the computed summary and the reference summary");
        }
    }
    Ok(())
}

fn run_charts(store: &RecordStore, out_dir: &str) -> TrackerResult<()> {
    let session = current_session(store)?;
    let records = scoped_records(store, &session)?;

    fs::create_dir_all(out_dir).context(WritingOutputSnafu { path: out_dir })?;
    let stats = completion_stats(&records);
    let pie_path = format!("{}/completion.png", out_dir);
    charts::draw_proportion(
        &pie_path,
        [stats.complete, stats.incomplete],
        ["Complete", "Incomplete"],
    )?;

    let counts = vaccine_counts(&records);
    let labels: Vec<&str> = counts.iter().map(|(v, _)| v.name()).collect();
    let values: Vec<u64> = counts.iter().map(|(_, c)| *c).collect();
    let bar_path = format!("{}/vaccines.png", out_dir);
    charts::draw_bar_chart(&bar_path, &labels, &values)?;

    println!("Wrote {} and {}.", pie_path, bar_path);
    Ok(())
}
