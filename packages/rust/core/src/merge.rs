//! Merge and deduplication rules for the working set.
//!
//! Acronyms key the merge of fallback sources; names are the final identity.

use std::collections::HashSet;

use venuescout_shared::VenueRecord;

/// Append every incoming record whose name is not already in `working`.
///
/// Only names present before the merge are checked: repeats inside
/// `incoming` are all appended and left for [`dedup_by_name`]. Returns how
/// many were added.
pub fn merge_by_name(working: &mut Vec<VenueRecord>, incoming: Vec<VenueRecord>) -> usize {
    let seen: HashSet<String> = working.iter().map(VenueRecord::dedup_key).collect();
    let before = working.len();
    working.extend(incoming.into_iter().filter(|r| !seen.contains(&r.dedup_key())));
    working.len() - before
}

/// Append every incoming record whose acronym is not already present.
///
/// The seen set grows as records are added, so repeats inside `incoming`
/// are excluded too. Returns how many were added.
pub fn merge_by_acronym(working: &mut Vec<VenueRecord>, incoming: Vec<VenueRecord>) -> usize {
    let mut seen: HashSet<String> = working.iter().map(VenueRecord::acronym_key).collect();
    let before = working.len();
    working.extend(incoming.into_iter().filter(|r| seen.insert(r.acronym_key())));
    working.len() - before
}

/// Number of distinct acronyms, compared case-insensitively.
pub fn unique_acronyms(records: &[VenueRecord]) -> usize {
    records
        .iter()
        .map(VenueRecord::acronym_key)
        .collect::<HashSet<_>>()
        .len()
}

/// Keep the first record per name, preserving order.
pub fn dedup_by_name(records: Vec<VenueRecord>) -> Vec<VenueRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: &str, acronym: &str, name: &str) -> VenueRecord {
        VenueRecord::new(id, acronym, name)
    }

    #[test]
    fn merge_by_name_is_case_insensitive() {
        let mut working = vec![venue("1", "ICRA", "International Conference on Robotics")];
        let added = merge_by_name(
            &mut working,
            vec![
                venue("2", "X", "INTERNATIONAL CONFERENCE ON ROBOTICS "),
                venue("3", "CORL", "Conference on Robot Learning"),
            ],
        );
        assert_eq!(added, 1);
        assert_eq!(working.len(), 2);
        assert_eq!(working[1].id, "3");
    }

    #[test]
    fn merge_by_name_keeps_batch_repeats() {
        let mut working = vec![venue("1", "ICRA", "International Conference on Robotics")];
        let added = merge_by_name(
            &mut working,
            vec![
                venue("2", "JA", "Journal A"),
                venue("3", "JA", "journal a"),
                venue("4", "ICRA", "International Conference on Robotics"),
            ],
        );
        assert_eq!(added, 2);
        let ids: Vec<_> = working.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn merge_by_acronym_excludes_existing_and_batch_repeats() {
        let mut working = vec![venue("1", "ICRA 2026", "IEEE ICRA")];
        let added = merge_by_acronym(
            &mut working,
            vec![
                venue("2", "icra 2026", "A different name"),
                venue("3", "IROS 2026", "Intelligent Robots and Systems"),
                venue("4", "IROS 2026", "Intelligent Robots and Systems (again)"),
            ],
        );
        assert_eq!(added, 1);
        let ids: Vec<_> = working.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn unique_acronyms_ignores_case() {
        let records = vec![
            venue("1", "HRI", "Human-Robot Interaction"),
            venue("2", "hri", "Human Robot Interaction"),
            venue("3", "RSS", "Robotics: Science and Systems"),
        ];
        assert_eq!(unique_acronyms(&records), 2);
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let records = vec![
            venue("1", "A", "Alpha Conference"),
            venue("2", "B", "Beta Conference"),
            venue("3", "A2", " alpha conference"),
        ];
        let deduped = dedup_by_name(records);
        let ids: Vec<_> = deduped.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let records = vec![
            venue("1", "A", "Alpha Conference"),
            venue("2", "B", "ALPHA CONFERENCE"),
            venue("3", "C", "Gamma Symposium"),
            venue("4", "C", "Gamma Symposium"),
        ];
        let once = dedup_by_name(records);
        let twice = dedup_by_name(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
