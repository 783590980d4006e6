use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Startup and shutdown failures specific to the node binary.
///
/// Per-request errors (malformed values, missing names) never reach this
/// type; they are defined return values or `EngineError`s handled inside
/// `bitset-engine` long before a binary boundary exists.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to load snapshot from {path}: {source}")]
    SnapshotLoad {
        path: std::path::PathBuf,
        #[source]
        source: bitset_engine::EngineError,
    },

    #[error("failed to save snapshot to {path}: {source}")]
    SnapshotSave {
        path: std::path::PathBuf,
        #[source]
        source: bitset_engine::EngineError,
    },

    #[error("replication apply loop terminated: {0}")]
    Replication(#[from] bitset_replication::ReplicationError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
