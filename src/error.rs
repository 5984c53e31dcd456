//! Pipeline error taxonomy
//!
//! Only fatal conditions live here. Data-quality rejections (negative amounts,
//! dangling customer references) are counted by the transform stage instead,
//! see [`crate::transform::RejectReason`].

use std::{fmt, path::PathBuf};

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Stage of the run that touched storage when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that terminate a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A raw record is missing a field or carries a value of the wrong shape.
    #[error("malformed record in {source_name} at {location}: {reason}")]
    MalformedRecord {
        source_name: String,
        location: String,
        reason: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage failure during {stage} stage: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: StorageError,
    },
}

impl PipelineError {
    pub(crate) fn malformed(
        source_name: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a [`crate::storage::Storage`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage target {target} is unreachable: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("table '{table}' has columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        table: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("failed writing {rows} rows to table '{table}': {source}")]
    Write {
        table: &'static str,
        rows: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{operation} failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Backend-neutral rejection of a write that would break a table key.
    #[error("table '{table}' rejected {rows} rows: {reason}")]
    Constraint {
        table: &'static str,
        rows: usize,
        reason: String,
    },
}
