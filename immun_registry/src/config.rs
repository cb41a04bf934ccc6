// ********* Input data structures ***********

use serde::{Deserialize, Serialize};

/// The status value that marks a vaccine as accepted.
///
/// Comparison against this value is always case-insensitive; anything else
/// (including an empty status) counts as not yet accepted.
pub const ACCEPTED: &str = "Accepted";

/// The barangays known to the system, in aggregation order.
pub const BARANGAYS: [&str; 5] = [
    "Barangay 1",
    "Barangay 2",
    "Barangay 3",
    "Barangay 4",
    "Barangay 5",
];

/// The sitios of a barangay, in aggregation order.
pub const SITIOS: [&str; 3] = ["Sitio A", "Sitio B", "Sitio C"];

/// The immunization types tracked per child.
///
/// This is a closed set: statuses for any other vaccine name are never
/// recorded.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Vaccine {
    Bcg,
    Opv,
    Pentavalent,
    Measles,
}

impl Vaccine {
    /// All tracked vaccines, in reporting order.
    pub const ALL: [Vaccine; 4] = [
        Vaccine::Bcg,
        Vaccine::Opv,
        Vaccine::Pentavalent,
        Vaccine::Measles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Vaccine::Bcg => "BCG",
            Vaccine::Opv => "OPV",
            Vaccine::Pentavalent => "Pentavalent",
            Vaccine::Measles => "Measles",
        }
    }
}

/// One child's immunization record.
///
/// Records carry no identifier: within a stored list they are addressed by
/// position only. The vaccine statuses are free text as entered or imported;
/// they are interpreted (case-insensitively, against [ACCEPTED]) only when
/// statistics are computed.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChildRecord {
    pub child: String,
    pub age: u32,
    pub parent: String,
    pub barangay: String,
    pub sitio: String,
    #[serde(rename = "BCG")]
    pub bcg: String,
    #[serde(rename = "OPV")]
    pub opv: String,
    #[serde(rename = "Pentavalent")]
    pub pentavalent: String,
    #[serde(rename = "Measles")]
    pub measles: String,
}

impl ChildRecord {
    pub fn status(&self, vaccine: Vaccine) -> &str {
        match vaccine {
            Vaccine::Bcg => &self.bcg,
            Vaccine::Opv => &self.opv,
            Vaccine::Pentavalent => &self.pentavalent,
            Vaccine::Measles => &self.measles,
        }
    }

    pub fn set_status(&mut self, vaccine: Vaccine, status: String) {
        match vaccine {
            Vaccine::Bcg => self.bcg = status,
            Vaccine::Opv => self.opv = status,
            Vaccine::Pentavalent => self.pentavalent = status,
            Vaccine::Measles => self.measles = status,
        }
    }

    /// A record is complete when every tracked vaccine has been accepted.
    pub fn is_complete(&self) -> bool {
        Vaccine::ALL
            .iter()
            .all(|v| self.status(*v).eq_ignore_ascii_case(ACCEPTED))
    }
}

// ******** Output data structures *********

/// Completion tallies over a set of records.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CompletionStats {
    pub complete: u64,
    pub incomplete: u64,
}
