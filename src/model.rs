use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::DiffError;

pub const DEFAULT_PROFILE: &str = "unknown";
pub const DEFAULT_METRIC_VALUE: f64 = 0.0;
pub const DEFAULT_RECIPROCAL_RANK: f64 = 0.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    Before,
    After,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    cases: Option<Vec<CaseEntry>>,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaseEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub observed_top_result_id: Option<String>,
    #[serde(default)]
    pub reciprocal_rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub id: String,
    pub observed_top_result_id: Option<String>,
    pub reciprocal_rank: f64,
}

impl Snapshot {
    pub fn load(path: &Path, side: Side) -> Result<Self, DiffError> {
        let raw = fs::read(path).map_err(|source| DiffError::Load {
            side,
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| DiffError::Parse {
            side,
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn profile(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(serde_json::Value::as_f64)
    }

    pub fn cases(&self) -> &[CaseEntry] {
        self.cases.as_deref().unwrap_or_default()
    }
}

impl CaseEntry {
    pub fn reciprocal_rank(&self) -> f64 {
        self.reciprocal_rank.unwrap_or(DEFAULT_RECIPROCAL_RANK)
    }
}
