use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent construction, action selection, and persistence
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value {value} for `{name}`: must be in the interval {interval}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        interval: &'static str,
    },

    #[error("cannot select an action from an empty candidate set")]
    EmptyActionSet,

    #[error("failed to {operation} snapshot at {path:?}: {source}")]
    SnapshotIo {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot at {path:?}: {source}")]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}
