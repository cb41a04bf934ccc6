// Key-value persistence for child records, one JSON entry per locality.

use log::{debug, warn};

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use immun_registry::{ChildRecord, BARANGAYS, SITIOS};
use snafu::prelude::*;

use crate::tracker::{EncodingRecordsSnafu, Session, StoreIoSnafu, TrackerResult};

/// Address of one stored record list.
///
/// One key maps to at most one list; writes overwrite the entry wholesale,
/// they never merge.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct LocalityKey {
    pub barangay: String,
    pub sitio: String,
}

impl LocalityKey {
    pub fn new(barangay: &str, sitio: &str) -> LocalityKey {
        LocalityKey {
            barangay: barangay.to_string(),
            sitio: sitio.to_string(),
        }
    }

    fn entry_name(&self) -> String {
        format!("children_{}__{}.json", self.barangay, self.sitio)
    }
}

const SESSION_ENTRY: &str = "session.json";

/// Record storage under a data directory, with one entry per locality key
/// and a separate entry for the session. All operations are synchronous and
/// durable on return; last write wins.
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn open(root: &str) -> TrackerResult<RecordStore> {
        fs::create_dir_all(root).context(StoreIoSnafu { path: root })?;
        Ok(RecordStore {
            root: PathBuf::from(root),
        })
    }

    fn entry_path(&self, key: &LocalityKey) -> PathBuf {
        self.root.join(key.entry_name())
    }

    /// Wholesale overwrite of the list stored under `key`.
    pub fn put(&self, key: &LocalityKey, records: &[ChildRecord]) -> TrackerResult<()> {
        let text = serde_json::to_string(records).context(EncodingRecordsSnafu {})?;
        let path = self.entry_path(key);
        fs::write(&path, text).context(StoreIoSnafu {
            path: path.display().to_string(),
        })?;
        debug!("put: {:?} records under {:?}", records.len(), key);
        Ok(())
    }

    /// The list stored under `key`. An absent entry reads as empty, and so
    /// does an entry whose content no longer deserializes.
    pub fn get(&self, key: &LocalityKey) -> Vec<ChildRecord> {
        let path = self.entry_path(key);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&text) {
            Ok(records) => records,
            Err(e) => {
                warn!("get: discarding unreadable entry {:?}: {}", path, e);
                Vec::new()
            }
        }
    }

    /// Removes the entry under `key`. Clearing an absent key is a no-op.
    pub fn clear(&self, key: &LocalityKey) -> TrackerResult<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e).context(StoreIoSnafu {
                path: path.display().to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// All records of one barangay, concatenated over its sitios in
    /// enumeration order. Absent keys contribute nothing.
    pub fn barangay_records(&self, barangay: &str) -> Vec<ChildRecord> {
        let mut out: Vec<ChildRecord> = Vec::new();
        for sitio in SITIOS.iter() {
            out.extend(self.get(&LocalityKey::new(barangay, sitio)));
        }
        debug!("barangay_records: {:?} -> {:?} records", barangay, out.len());
        out
    }

    /// All records system-wide, concatenated over barangays in enumeration
    /// order.
    pub fn all_records(&self) -> Vec<ChildRecord> {
        let mut out: Vec<ChildRecord> = Vec::new();
        for barangay in BARANGAYS.iter() {
            out.extend(self.barangay_records(barangay));
        }
        out
    }

    pub fn save_session(&self, session: &Session) -> TrackerResult<()> {
        let text = serde_json::to_string(session).context(EncodingRecordsSnafu {})?;
        let path = self.root.join(SESSION_ENTRY);
        fs::write(&path, text).context(StoreIoSnafu {
            path: path.display().to_string(),
        })
    }

    /// The persisted session, if any. An unreadable session entry reads as
    /// absent.
    pub fn load_session(&self) -> Option<Session> {
        let path = self.root.join(SESSION_ENTRY);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("load_session: discarding unreadable session {:?}: {}", path, e);
                None
            }
        }
    }
}
