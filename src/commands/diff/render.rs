use serde::Serialize;

use super::delta::{CaseDelta, DiffSummary, MetricDelta, summarize};
use crate::cli::ReportFormat;

pub const REPORT_TITLE: &str = "# Ranking Budget Contract Diff Report";
pub const ABSENT_TOP_RESULT: &str = "(none)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRef {
    pub profile: String,
    pub source: String,
    pub sha256: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    before: &'a SnapshotRef,
    after: &'a SnapshotRef,
    metrics: &'a [MetricDelta],
    cases: &'a [CaseDelta],
    summary: DiffSummary,
}

pub fn render(
    format: ReportFormat,
    before: &SnapshotRef,
    after: &SnapshotRef,
    metric_deltas: &[MetricDelta],
    case_deltas: &[CaseDelta],
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(before, after, metric_deltas, case_deltas)),
        ReportFormat::Json => render_json(before, after, metric_deltas, case_deltas),
    }
}

pub fn render_markdown(
    before: &SnapshotRef,
    after: &SnapshotRef,
    metric_deltas: &[MetricDelta],
    case_deltas: &[CaseDelta],
) -> String {
    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!("- before profile: `{}`", before.profile),
        format!("- after profile: `{}`", after.profile),
        format!("- before file: `{}`", before.source),
        format!("- after file: `{}`", after.source),
        String::new(),
        "| Metric | Before | After | Delta |".to_string(),
        "| --- | ---: | ---: | ---: |".to_string(),
    ];
    for metric in metric_deltas {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            escape_cell(&metric.name),
            format_percent(metric.before),
            format_percent(metric.after),
            format_percent(metric.delta)
        ));
    }

    lines.extend([
        String::new(),
        "## Case-level deltas".to_string(),
        String::new(),
        "| Case | Before top-result | After top-result | Before RR | After RR |".to_string(),
        "| --- | --- | --- | ---: | ---: |".to_string(),
    ]);
    for case in case_deltas {
        lines.push(format!(
            "| {} | {} | {} | {:.3} | {:.3} |",
            escape_cell(&case.id),
            format_top_result(case.before_top_result_id.as_deref()),
            format_top_result(case.after_top_result_id.as_deref()),
            case.before_reciprocal_rank,
            case.after_reciprocal_rank
        ));
    }

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

pub fn render_json(
    before: &SnapshotRef,
    after: &SnapshotRef,
    metric_deltas: &[MetricDelta],
    case_deltas: &[CaseDelta],
) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        before,
        after,
        metrics: metric_deltas,
        cases: case_deltas,
        summary: summarize(case_deltas),
    };
    let mut document = serde_json::to_string_pretty(&report)?;
    document.push('\n');
    Ok(document)
}

pub fn format_percent(value: f64) -> String {
    let scaled = value * 100.0;
    // -0.0 compares equal here
    if scaled == 0.0 {
        return "0.0%".to_string();
    }
    format!("{scaled:.1}%")
}

fn format_top_result(value: Option<&str>) -> String {
    let Some(value) = value else {
        return ABSENT_TOP_RESULT.to_string();
    };

    let escaped = escape_cell(value);
    let longest_run = escaped
        .split(|ch| ch != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    if escaped.starts_with('`') || escaped.ends_with('`') {
        format!("{fence} {escaped} {fence}")
    } else {
        format!("{fence}{escaped}{fence}")
    }
}

fn escape_cell(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_cell, format_percent, format_top_result};

    #[test]
    fn format_percent_uses_one_decimal_and_keeps_negative_sign() {
        assert_eq!(format_percent(0.80), "80.0%");
        assert_eq!(format_percent(0.75 - 0.80), "-5.0%");
        assert_eq!(format_percent(0.123), "12.3%");
        assert_eq!(format_percent(1.5), "150.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn format_percent_keeps_sign_of_small_negative_values() {
        assert_eq!(format_percent(-0.0), "0.0%");
        assert_eq!(format_percent(0.7996 - 0.8), "-0.0%");
        assert_eq!(format_percent(-0.0000001), "-0.0%");
        assert_eq!(format_percent(0.0000001), "0.0%");
    }

    #[test]
    fn absent_top_result_is_distinct_from_empty_string() {
        assert_eq!(format_top_result(None), "(none)");
        assert_eq!(format_top_result(Some("")), "``");
        assert_eq!(format_top_result(Some("r1")), "`r1`");
        assert_eq!(format_top_result(Some("a|b")), "`a\\|b`");
    }

    #[test]
    fn top_result_with_backticks_uses_a_longer_fence() {
        assert_eq!(format_top_result(Some("a`b")), "``a`b``");
        assert_eq!(format_top_result(Some("a``b")), "```a``b```");
        assert_eq!(format_top_result(Some("`r1")), "`` `r1 ``");
    }

    #[test]
    fn escape_cell_keeps_line_breaks_inside_the_cell() {
        assert_eq!(escape_cell("c1\n| x |"), "c1\\n\\| x \\|");
        assert_eq!(escape_cell("a\r\nb"), "a\\r\\nb");
    }
}
