use std::path::PathBuf;

use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("failed to read {side} snapshot {}", .path.display())]
    Load {
        side: Side,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {side} snapshot {}", .path.display())]
    Parse {
        side: Side,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{side} snapshot case at index {index} is missing required field `id`")]
    Integrity { side: Side, index: usize },

    #[error(
        "{side} snapshot repeats case id `{id}` at index {index} (first seen at index {first_index})"
    )]
    DuplicateCase {
        side: Side,
        id: String,
        first_index: usize,
        index: usize,
    },

    #[error("failed to write report {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiffError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
