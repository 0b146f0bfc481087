use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::aggregate::normalize_metric_names;
use super::case_index::{CaseIndex, resolve_duplicate_policy};
use super::delta::{CaseDelta, MetricDelta, compute_aggregate_deltas, compute_case_deltas};
use super::render::{SnapshotRef, render};
use crate::cli::{DiffArgs, DuplicatePolicy, ReportFormat};
use crate::error::DiffError;
use crate::model::{Side, Snapshot};
use crate::util::{sha256_file, write_text_atomic};

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDiff {
    pub metrics: Vec<MetricDelta>,
    pub cases: Vec<CaseDelta>,
}

pub fn run(args: DiffArgs) -> Result<()> {
    let policy = resolve_duplicate_policy(args.duplicate_case_ids);
    let metric_names = normalize_metric_names(&args.metrics);
    info!(
        metrics = %metric_names.join(","),
        duplicate_case_ids = policy.as_str(),
        format = args.format.as_str(),
        "diff requested"
    );

    let before = load_snapshot(&args.before, Side::Before)?;
    let after = load_snapshot(&args.after, Side::After)?;

    let diff = diff_snapshots(&before, &after, &metric_names, policy)?;
    for metric in &diff.metrics {
        info!(
            metric = %metric.name,
            before = metric.before,
            after = metric.after,
            delta = metric.delta,
            "aggregate delta"
        );
    }

    let before_ref = snapshot_ref(&before, &args.before, args.format)?;
    let after_ref = snapshot_ref(&after, &args.after, args.format)?;
    let document = render(args.format, &before_ref, &after_ref, &diff.metrics, &diff.cases)
        .context("failed to serialize diff report")?;

    match args.out {
        Some(path) => {
            write_text_atomic(&path, &document).map_err(|err| DiffError::write(&path, err))?;
            info!(
                path = %path.display(),
                format = args.format.as_str(),
                bytes = document.len(),
                cases = diff.cases.len(),
                "wrote diff report"
            );
        }
        None => {
            let mut output = io::BufWriter::new(io::stdout().lock());
            output
                .write_all(document.as_bytes())
                .and_then(|()| output.flush())
                .context("failed to write diff report to stdout")?;
        }
    }

    Ok(())
}

pub fn diff_snapshots(
    before: &Snapshot,
    after: &Snapshot,
    metric_names: &[String],
    policy: DuplicatePolicy,
) -> Result<SnapshotDiff, DiffError> {
    let before_index = CaseIndex::build(before.cases(), Side::Before, policy)?;
    let after_index = CaseIndex::build(after.cases(), Side::After, policy)?;

    Ok(SnapshotDiff {
        metrics: compute_aggregate_deltas(before, after, metric_names),
        cases: compute_case_deltas(&before_index, &after_index),
    })
}

fn load_snapshot(path: &Path, side: Side) -> Result<Snapshot, DiffError> {
    let snapshot = Snapshot::load(path, side)?;
    info!(
        side = %side,
        path = %path.display(),
        profile = %snapshot.profile(),
        cases = snapshot.cases().len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

fn snapshot_ref(snapshot: &Snapshot, path: &Path, format: ReportFormat) -> Result<SnapshotRef> {
    let sha256 = match format {
        ReportFormat::Json => Some(sha256_file(path)?),
        ReportFormat::Markdown => None,
    };
    Ok(SnapshotRef {
        profile: snapshot.profile().to_string(),
        source: path.display().to_string(),
        sha256,
    })
}
