//! Error types for the command codec, log driver contract, and apply loop.

use thiserror::Error;

/// An error signalled by a [`crate::driver::LogDriver`] implementation.
///
/// Any value received on a driver's error channel is treated as terminal:
/// there is no retryable variant, matching the source's `log.Fatal` on the
/// raft error channel.
#[derive(Debug, Error, Clone)]
#[error("log driver error: {0}")]
pub struct DriverError(pub String);

/// Failure modes of the replication layer.
///
/// Every variant here is, per the spec, log-fatal: decode failures and
/// driver errors both terminate the owning apply loop, which the node
/// binary turns into a non-zero process exit. There is no partial
/// application or retry.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// A committed frame was shorter than the minimum header size.
    #[error("committed frame is truncated")]
    Truncated,

    /// A committed frame named a format version this crate does not speak.
    #[error("unsupported log frame format version: {0}")]
    UnsupportedFormatVersion(u8),

    /// A committed frame named an op code byte this crate does not recognize.
    #[error("unrecognized op code byte: {0}")]
    UnrecognizedOpCode(u8),

    /// A committed payload was not valid UTF-8, or did not match the
    /// `name[,value...]` shape its op code requires.
    #[error("malformed log payload")]
    MalformedPayload,

    /// The log driver reported an error on its error channel.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The commit or error channel closed before the apply loop was told
    /// to stop, indicating the driver task exited unexpectedly.
    #[error("log driver channel closed unexpectedly")]
    ChannelClosed,

    /// The driver handed to [`crate::apply::ApplyLoop::spawn`] had already
    /// had its commit or error receiver taken by something else.
    #[error("log driver's commit or error receiver was already taken")]
    DriverChannelsUnavailable,

    /// A committed `InstallSnapshot` image failed to restore onto the
    /// namespace.
    #[error("failed to install committed snapshot: {0}")]
    SnapshotInstall(#[from] bitset_engine::EngineError),
}
