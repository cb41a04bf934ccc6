mod config;
use log::debug;

pub use crate::config::*;

/// Tallies complete and incomplete records.
///
/// A record is complete iff every vaccine in [Vaccine::ALL] has the status
/// [ACCEPTED], compared case-insensitively. Any deviation on any vaccine
/// makes the record incomplete.
pub fn completion_stats(records: &[ChildRecord]) -> CompletionStats {
    let mut stats = CompletionStats::default();
    for r in records.iter() {
        if r.is_complete() {
            stats.complete += 1;
        } else {
            stats.incomplete += 1;
        }
    }
    debug!(
        "completion_stats: {:?} records -> {:?}",
        records.len(),
        stats
    );
    stats
}

/// Counts, for each vaccine independently, the records with that vaccine
/// accepted.
///
/// The tally is seeded with a zero for every vaccine in the fixed set, so
/// the result always has one entry per vaccine in [Vaccine::ALL] order, even
/// over an empty record set.
pub fn vaccine_counts(records: &[ChildRecord]) -> Vec<(Vaccine, u64)> {
    let mut counts: Vec<(Vaccine, u64)> = Vaccine::ALL.iter().map(|v| (*v, 0)).collect();
    for r in records.iter() {
        for (v, count) in counts.iter_mut() {
            if r.status(*v).eq_ignore_ascii_case(ACCEPTED) {
                *count += 1;
            }
        }
    }
    debug!("vaccine_counts: {:?} records -> {:?}", records.len(), counts);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bcg: &str, opv: &str, penta: &str, measles: &str) -> ChildRecord {
        ChildRecord {
            child: "Ana Cruz".to_string(),
            age: 2,
            parent: "Maria Cruz".to_string(),
            barangay: "Barangay 1".to_string(),
            sitio: "Sitio A".to_string(),
            bcg: bcg.to_string(),
            opv: opv.to_string(),
            pentavalent: penta.to_string(),
            measles: measles.to_string(),
        }
    }

    #[test]
    fn complete_is_case_insensitive() {
        let r = record("accepted", "ACCEPTED", "Accepted", "aCcEpTeD");
        assert!(r.is_complete());
        let stats = completion_stats(&[r]);
        assert_eq!(
            stats,
            CompletionStats {
                complete: 1,
                incomplete: 0
            }
        );
    }

    #[test]
    fn one_deviation_is_incomplete() {
        let pending = record("Accepted", "Accepted", "Accepted", "Scheduled");
        let blank = record("Accepted", "Accepted", "Accepted", "");
        let stats = completion_stats(&[pending, blank]);
        assert_eq!(
            stats,
            CompletionStats {
                complete: 0,
                incomplete: 2
            }
        );
    }

    #[test]
    fn counts_cover_every_vaccine_when_empty() {
        let counts = vaccine_counts(&[]);
        assert_eq!(counts.len(), Vaccine::ALL.len());
        for (v, count) in counts.iter() {
            assert_eq!(*count, 0, "expected zero for {:?}", v);
        }
    }

    #[test]
    fn counts_tally_each_vaccine_independently() {
        let rs = vec![
            record("Accepted", "", "Accepted", ""),
            record("accepted", "Refused", "", ""),
            record("", "", "", "Accepted"),
        ];
        let counts = vaccine_counts(&rs);
        assert_eq!(
            counts,
            vec![
                (Vaccine::Bcg, 2),
                (Vaccine::Opv, 0),
                (Vaccine::Pentavalent, 1),
                (Vaccine::Measles, 1),
            ]
        );
    }

    #[test]
    fn statuses_are_not_normalized_in_place() {
        let r = record("accepted", "Accepted", "Accepted", "Accepted");
        // The stored text keeps its original casing.
        assert_eq!(r.status(Vaccine::Bcg), "accepted");
        assert!(r.is_complete());
    }
}
