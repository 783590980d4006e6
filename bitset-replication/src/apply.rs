//! Drains a [`LogDriver`]'s commit stream and replays each entry onto a
//! [`Namespace`], installing the interception point that feeds the driver
//! in the first place.
//!
//! Modeled on the source's `RaftServer.readCommits`: a `nil` commit there
//! means "load the snapshot before continuing"; here that's
//! [`CommitMessage::InstallSnapshot`]. Every other commit is decoded and
//! applied with `via_log = false` so it does not loop back through the
//! sink. Any decode failure or driver error is fatal to the loop, matching
//! the source's `log.Fatal` on its error channel.

use std::io::Cursor;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use bitset_engine::Namespace;

use crate::codec::{self, DecodedOp};
use crate::driver::{CommitMessage, LogDriver};
use crate::error::{DriverError, ReplicationError};
use crate::interceptor::ChannelProposalSink;

/// Owns the background task that applies committed entries to a
/// [`Namespace`], having installed itself as that namespace's write sink.
pub struct ApplyLoop {
    handle: JoinHandle<Result<(), ReplicationError>>,
}

impl ApplyLoop {
    /// Install a [`ChannelProposalSink`] on `namespace` wired to `driver`'s
    /// proposal channel, then spawn the task that drains `driver`'s commit
    /// and error channels for the lifetime of the loop.
    ///
    /// Fails if `driver`'s commit or error receiver has already been taken
    /// by someone else; a freshly constructed driver never hits this.
    pub fn spawn(
        namespace: Namespace,
        mut driver: impl LogDriver + 'static,
    ) -> Result<Self, ReplicationError> {
        let sink = Arc::new(ChannelProposalSink::new(driver.proposal_sender()));
        namespace.install_sink(sink);

        let commit_rx = driver
            .take_commit_receiver()
            .ok_or(ReplicationError::DriverChannelsUnavailable)?;
        let error_rx = driver
            .take_error_receiver()
            .ok_or(ReplicationError::DriverChannelsUnavailable)?;

        let handle = tokio::spawn(run(namespace, commit_rx, error_rx));
        Ok(Self { handle })
    }

    /// Wait for the apply loop to terminate, returning the error that ended
    /// it. Only returns under failure: a healthy loop runs until the
    /// process exits.
    pub async fn join(self) -> Result<(), ReplicationError> {
        match self.handle.await {
            Ok(result) => result,
            Err(_join_error) => Err(ReplicationError::ChannelClosed),
        }
    }
}

async fn run(
    namespace: Namespace,
    mut commits: mpsc::UnboundedReceiver<CommitMessage>,
    mut errors: mpsc::UnboundedReceiver<DriverError>,
) -> Result<(), ReplicationError> {
    loop {
        tokio::select! {
            commit = commits.recv() => {
                match commit {
                    Some(CommitMessage::Entry(frame)) => apply_frame(&namespace, &frame)?,
                    Some(CommitMessage::InstallSnapshot(image)) => {
                        namespace.restore(Cursor::new(image))?;
                    }
                    None => return Err(ReplicationError::ChannelClosed),
                }
            }
            error = errors.recv() => {
                match error {
                    Some(driver_error) => return Err(driver_error.into()),
                    None => return Err(ReplicationError::ChannelClosed),
                }
            }
        }
    }
}

fn apply_frame(namespace: &Namespace, frame: &[u8]) -> Result<(), ReplicationError> {
    let (op, payload) = codec::decode(frame)?;
    match codec::decode_payload(op, &payload)? {
        DecodedOp::Add { name, value } => namespace.add(&name, value, false),
        DecodedOp::AddMany { name, values } => namespace.add_many(&name, &values, false),
        DecodedOp::Remove { name, value } => namespace.remove(&name, value, false),
        DecodedOp::Drop { name } => namespace.drop(&name, false),
        DecodedOp::Clear { name } => namespace.clear(&name, false),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::LoopbackDriver;
    use std::time::Duration;

    #[tokio::test]
    async fn via_log_write_is_applied_only_after_the_loop_drains_it() {
        let namespace = Namespace::new();
        let driver = LoopbackDriver::spawn();
        let _loop_handle = ApplyLoop::spawn(namespace.clone(), driver).unwrap();

        namespace.add("a", 1, true);

        // Give the loopback echo + apply task a chance to run.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(namespace.contains("a", 1));
    }

    #[tokio::test]
    async fn via_log_false_is_visible_immediately_and_not_looped() {
        let namespace = Namespace::new();
        let driver = LoopbackDriver::spawn();
        let _loop_handle = ApplyLoop::spawn(namespace.clone(), driver).unwrap();

        namespace.add("a", 1, false);

        assert!(namespace.contains("a", 1));
    }

    #[tokio::test]
    async fn malformed_committed_frame_terminates_the_loop_with_an_error() {
        let namespace = Namespace::new();
        let mut driver = LoopbackDriver::spawn();
        let proposals = driver.proposal_sender();
        let apply_loop = ApplyLoop::spawn(namespace, driver).unwrap();

        proposals.send(vec![0xFF, 0xFF]).unwrap();

        let result = apply_loop.join().await;
        assert!(result.is_err());
    }
}
