use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

use crate::cli::DuplicatePolicy;
use crate::error::DiffError;
use crate::model::{CaseEntry, CaseResult, Side};

pub const DUPLICATE_POLICY_ENV: &str = "RANKING_DIFF_DUPLICATE_CASE_IDS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersededCase {
    pub id: String,
    pub first_index: usize,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct CaseIndex {
    cases: HashMap<String, CaseResult>,
    superseded: Vec<SupersededCase>,
}

impl CaseIndex {
    pub fn build(
        entries: &[CaseEntry],
        side: Side,
        policy: DuplicatePolicy,
    ) -> Result<Self, DiffError> {
        let mut cases = HashMap::<String, CaseResult>::with_capacity(entries.len());
        let mut positions = HashMap::<String, usize>::with_capacity(entries.len());
        let mut superseded = Vec::<SupersededCase>::new();

        for (index, entry) in entries.iter().enumerate() {
            let Some(id) = entry.id.clone() else {
                return Err(DiffError::Integrity { side, index });
            };

            let case = CaseResult {
                id: id.clone(),
                observed_top_result_id: entry.observed_top_result_id.clone(),
                reciprocal_rank: entry.reciprocal_rank(),
            };

            match positions.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
                Entry::Occupied(slot) => {
                    let first_index = *slot.get();
                    if policy == DuplicatePolicy::Reject {
                        return Err(DiffError::DuplicateCase {
                            side,
                            id,
                            first_index,
                            index,
                        });
                    }
                    warn!(
                        side = %side,
                        case_id = %id,
                        first_index,
                        index,
                        "duplicate case id; later entry supersedes earlier one"
                    );
                    superseded.push(SupersededCase {
                        id: id.clone(),
                        first_index,
                        index,
                    });
                }
            }
            // last-wins: a later entry replaces the stored case wholesale
            cases.insert(id, case);
        }

        Ok(Self { cases, superseded })
    }

    pub fn get(&self, id: &str) -> Option<&CaseResult> {
        self.cases.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    pub fn cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.values()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn superseded(&self) -> &[SupersededCase] {
        &self.superseded
    }
}

pub fn resolve_duplicate_policy(flag: Option<DuplicatePolicy>) -> DuplicatePolicy {
    match flag {
        Some(policy) => policy,
        None => parse_duplicate_policy(std::env::var(DUPLICATE_POLICY_ENV).ok().as_deref()),
    }
}

pub fn parse_duplicate_policy(value: Option<&str>) -> DuplicatePolicy {
    match value.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if matches!(value.as_str(), "reject" | "strict" | "error") => {
            DuplicatePolicy::Reject
        }
        _ => DuplicatePolicy::LastWins,
    }
}

#[cfg(test)]
mod tests {
    use super::{CaseIndex, SupersededCase, parse_duplicate_policy};
    use crate::cli::DuplicatePolicy;
    use crate::error::DiffError;
    use crate::model::{CaseEntry, CaseResult, Side};

    fn entry(id: Option<&str>, top: Option<&str>, rr: Option<f64>) -> CaseEntry {
        CaseEntry {
            id: id.map(str::to_string),
            observed_top_result_id: top.map(str::to_string),
            reciprocal_rank: rr,
        }
    }

    #[test]
    fn last_occurrence_of_duplicate_id_wins() {
        let entries = vec![
            entry(Some("c1"), Some("r1"), Some(1.0)),
            entry(Some("c2"), Some("r5"), Some(0.5)),
            entry(Some("c1"), None, Some(0.25)),
        ];

        let index = CaseIndex::build(&entries, Side::Before, DuplicatePolicy::LastWins)
            .expect("duplicates should be tolerated");
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get("c1"),
            Some(&CaseResult {
                id: "c1".to_string(),
                observed_top_result_id: None,
                reciprocal_rank: 0.25,
            })
        );
        assert_eq!(
            index.superseded(),
            &[SupersededCase {
                id: "c1".to_string(),
                first_index: 0,
                index: 2,
            }]
        );
    }

    #[test]
    fn repeated_duplicates_all_point_back_to_first_occurrence() {
        let entries = vec![
            entry(Some("c1"), Some("r1"), Some(1.0)),
            entry(Some("c1"), Some("r2"), Some(0.5)),
            entry(Some("c1"), Some("r3"), Some(0.25)),
        ];

        let index = CaseIndex::build(&entries, Side::Before, DuplicatePolicy::LastWins)
            .expect("duplicates should be tolerated");
        let positions = index
            .superseded()
            .iter()
            .map(|entry| (entry.first_index, entry.index))
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![(0, 1), (0, 2)]);
        assert_eq!(
            index.get("c1").and_then(|case| case.observed_top_result_id.as_deref()),
            Some("r3")
        );
    }

    #[test]
    fn reject_policy_turns_duplicate_into_integrity_error() {
        let entries = vec![
            entry(Some("c1"), Some("r1"), Some(1.0)),
            entry(Some("c1"), Some("r2"), Some(0.5)),
        ];

        let error = CaseIndex::build(&entries, Side::After, DuplicatePolicy::Reject)
            .expect_err("duplicate should be rejected");
        match error {
            DiffError::DuplicateCase {
                side,
                id,
                first_index,
                index,
            } => {
                assert_eq!(side, Side::After);
                assert_eq!(id, "c1");
                assert_eq!((first_index, index), (0, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_id_is_an_integrity_error_with_position() {
        let entries = vec![
            entry(Some("c1"), Some("r1"), Some(1.0)),
            entry(None, Some("r2"), Some(0.5)),
        ];

        let error = CaseIndex::build(&entries, Side::After, DuplicatePolicy::LastWins)
            .expect_err("missing id should fail");
        assert_eq!(
            error.to_string(),
            "after snapshot case at index 1 is missing required field `id`"
        );
    }

    #[test]
    fn optional_fields_degrade_to_defaults() {
        let entries = vec![entry(Some("c1"), None, None)];
        let index = CaseIndex::build(&entries, Side::Before, DuplicatePolicy::LastWins)
            .expect("index should build");
        let case = index.get("c1").expect("case should be indexed");
        assert_eq!(case.observed_top_result_id, None);
        assert_eq!(case.reciprocal_rank, 0.0);
    }

    #[test]
    fn parse_duplicate_policy_supports_aliases() {
        assert_eq!(parse_duplicate_policy(Some("reject")), DuplicatePolicy::Reject);
        assert_eq!(parse_duplicate_policy(Some(" STRICT ")), DuplicatePolicy::Reject);
        assert_eq!(parse_duplicate_policy(Some("error")), DuplicatePolicy::Reject);
        assert_eq!(
            parse_duplicate_policy(Some("last-wins")),
            DuplicatePolicy::LastWins
        );
        assert_eq!(parse_duplicate_policy(Some("bogus")), DuplicatePolicy::LastWins);
        assert_eq!(parse_duplicate_policy(None), DuplicatePolicy::LastWins);
    }
}
