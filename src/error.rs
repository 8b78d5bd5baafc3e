use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading, storing and command-line handling.
///
/// The evaluation functions never fail; malformed task data degrades to
/// "not due" there instead of showing up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid task file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid task file {path}: {reason}")]
    InvalidTaskFile { path: PathBuf, reason: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: ignore::Error,
    },

    #[error("Failed to walk task directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Unknown timezone '{0}'")]
    Timezone(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD format")]
    InvalidDate(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task id: {0}")]
    DuplicateId(String),

    #[error("Task {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict { id: String, expected: u64, actual: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
