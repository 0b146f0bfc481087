use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::InspectArgs;
use crate::commands::diff::{
    CaseIndex, aggregate_value, normalize_metric_names, resolve_duplicate_policy,
};
use crate::model::{Side, Snapshot};

pub fn run(args: InspectArgs) -> Result<()> {
    let policy = resolve_duplicate_policy(args.duplicate_case_ids);
    let metric_names = normalize_metric_names(&args.metrics);

    // Inspected snapshots are reported as the "before" side.
    let snapshot = Snapshot::load(&args.snapshot, Side::Before)?;
    let index = CaseIndex::build(snapshot.cases(), Side::Before, policy)
        .with_context(|| format!("failed to index cases in {}", args.snapshot.display()))?;

    info!(
        path = %args.snapshot.display(),
        profile = %snapshot.profile(),
        duplicate_case_ids = policy.as_str(),
        "inspecting snapshot"
    );

    for name in &metric_names {
        if snapshot.metric(name).is_none() {
            warn!(metric = %name, "metric missing from snapshot; defaulting to 0.0");
        }
        info!(metric = %name, value = aggregate_value(&snapshot, name), "aggregate metric");
    }

    let without_top_result = index
        .cases()
        .filter(|case| case.observed_top_result_id.is_none())
        .count();
    let superseded = index
        .superseded()
        .iter()
        .map(|entry| format!("{}@{}->{}", entry.id, entry.first_index, entry.index))
        .collect::<Vec<_>>();

    info!(
        case_entries = snapshot.cases().len(),
        distinct_cases = index.len(),
        superseded = %superseded.join(","),
        without_top_result,
        empty = index.is_empty(),
        "case summary"
    );

    Ok(())
}
