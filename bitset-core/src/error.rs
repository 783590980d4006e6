//! Error types for the compressed-set primitive.

use thiserror::Error;

/// Failure modes for [`crate::Set`]'s binary codec.
///
/// The only way this primitive fails is I/O on the underlying stream; the
/// container format itself is self-describing and does not have a separate
/// "malformed" variant distinct from an I/O read error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Read or write failed on the underlying byte stream.
    #[error("set codec I/O error: {0}")]
    Io(#[from] std::io::Error),
}
