mod aggregate;
mod case_index;
mod delta;
mod render;
mod run;

pub use aggregate::{aggregate_value, normalize_metric_names};
pub use case_index::{CaseIndex, resolve_duplicate_policy};
pub use run::run;
