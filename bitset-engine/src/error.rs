//! Error types for namespace and algebra operations.

use thiserror::Error;

/// Failure modes surfaced by [`crate::Namespace`].
///
/// Not-found reads (e.g. `contains` on an unknown name) are **not**
/// represented here — per the spec's asymmetry, those are defined return
/// values (`false`, `0`, a zero [`bitset_core::Stats`]), not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `inter`/`inter_store` called with zero operand names.
    #[error("intersection requires at least one operand name")]
    EmptyOperandList,

    /// I/O failure while writing or reading a snapshot stream.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure surfaced by the compressed-set codec itself.
    #[error("snapshot codec error: {0}")]
    Core(#[from] bitset_core::CoreError),

    /// A snapshot entry's name was not valid UTF-8.
    #[error("snapshot entry name is not valid UTF-8")]
    InvalidEntryName,

    /// `save`/`restore` invoked with no configured snapshot path.
    #[error("no snapshot path is configured")]
    NoSnapshotPath,
}
