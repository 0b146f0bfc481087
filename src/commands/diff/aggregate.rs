use crate::model::{DEFAULT_METRIC_VALUE, Snapshot};

pub const DEFAULT_METRICS: &[&str] = &["top1_hit_rate", "mrr"];

pub fn aggregate_value(snapshot: &Snapshot, name: &str) -> f64 {
    snapshot.metric(name).unwrap_or(DEFAULT_METRIC_VALUE)
}

pub fn normalize_metric_names(requested: &[String]) -> Vec<String> {
    let mut names = Vec::<String>::with_capacity(requested.len());
    for name in requested {
        let name = name.trim();
        if name.is_empty() || names.iter().any(|existing| existing == name) {
            continue;
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        return DEFAULT_METRICS.iter().map(|name| name.to_string()).collect();
    }
    names
}

#[cfg(test)]
mod tests {
    use super::{aggregate_value, normalize_metric_names};
    use crate::model::Snapshot;

    #[test]
    fn aggregate_value_defaults_missing_metric_to_zero() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({ "mrr": 0.65 }))
            .expect("snapshot should deserialize");
        assert_eq!(aggregate_value(&snapshot, "mrr"), 0.65);
        assert_eq!(aggregate_value(&snapshot, "top1_hit_rate"), 0.0);
    }

    #[test]
    fn normalize_metric_names_keeps_order_and_drops_repeats() {
        let requested = vec![
            "mrr".to_string(),
            " top1_hit_rate ".to_string(),
            "mrr".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_metric_names(&requested), vec!["mrr", "top1_hit_rate"]);
    }

    #[test]
    fn normalize_metric_names_falls_back_to_default_list() {
        assert_eq!(normalize_metric_names(&[]), vec!["top1_hit_rate", "mrr"]);
    }
}
