use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::aggregate::aggregate_value;
use super::case_index::CaseIndex;
use crate::model::{DEFAULT_RECIPROCAL_RANK, Snapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDelta {
    pub name: String,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Added,
    Removed,
    Improved,
    Regressed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseDelta {
    pub id: String,
    pub before_top_result_id: Option<String>,
    pub after_top_result_id: Option<String>,
    pub before_reciprocal_rank: f64,
    pub after_reciprocal_rank: f64,
    pub status: CaseStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub improved: usize,
    pub regressed: usize,
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

pub fn compute_aggregate_deltas(
    before: &Snapshot,
    after: &Snapshot,
    metric_names: &[String],
) -> Vec<MetricDelta> {
    metric_names
        .iter()
        .map(|name| {
            let before_value = aggregate_value(before, name);
            let after_value = aggregate_value(after, name);
            MetricDelta {
                name: name.clone(),
                before: before_value,
                after: after_value,
                delta: after_value - before_value,
            }
        })
        .collect()
}

pub fn compute_case_deltas(before: &CaseIndex, after: &CaseIndex) -> Vec<CaseDelta> {
    let case_ids = before.ids().chain(after.ids()).collect::<BTreeSet<&str>>();

    case_ids
        .into_iter()
        .map(|case_id| {
            let before_case = before.get(case_id);
            let after_case = after.get(case_id);
            let before_rr = before_case
                .map(|case| case.reciprocal_rank)
                .unwrap_or(DEFAULT_RECIPROCAL_RANK);
            let after_rr = after_case
                .map(|case| case.reciprocal_rank)
                .unwrap_or(DEFAULT_RECIPROCAL_RANK);

            let status = match (before_case.is_some(), after_case.is_some()) {
                (false, _) => CaseStatus::Added,
                (_, false) => CaseStatus::Removed,
                _ if after_rr > before_rr => CaseStatus::Improved,
                _ if after_rr < before_rr => CaseStatus::Regressed,
                _ => CaseStatus::Unchanged,
            };
            if matches!(status, CaseStatus::Added | CaseStatus::Removed) {
                debug!(case_id, status = ?status, "case present on one side only");
            }

            CaseDelta {
                id: case_id.to_string(),
                before_top_result_id: before_case
                    .and_then(|case| case.observed_top_result_id.clone()),
                after_top_result_id: after_case.and_then(|case| case.observed_top_result_id.clone()),
                before_reciprocal_rank: before_rr,
                after_reciprocal_rank: after_rr,
                status,
            }
        })
        .collect()
}

pub fn summarize(case_deltas: &[CaseDelta]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for case in case_deltas {
        match case.status {
            CaseStatus::Added => summary.added += 1,
            CaseStatus::Removed => summary.removed += 1,
            CaseStatus::Improved => summary.improved += 1,
            CaseStatus::Regressed => summary.regressed += 1,
            CaseStatus::Unchanged => summary.unchanged += 1,
        }
    }
    summary
}
