//! The log driver contract and the single-node stand-in that satisfies it
//! without speaking any consensus protocol.
//!
//! A real multi-node driver (Raft, or anything else that totally orders
//! proposals across a cluster) is out of scope; what's in scope is the
//! boundary it must present: a channel of proposals in, a channel of
//! totally-ordered commits out, and an error channel that turns any
//! driver-internal failure into a terminal signal for the owning
//! [`crate::apply::ApplyLoop`].

use tokio::sync::mpsc;

use crate::error::DriverError;

/// A committed entry, or an instruction to reset from a snapshot before
/// replaying further entries. Mirrors the source's `nil` commit meaning
/// "load snapshot, then continue", without overloading `Option` to say it.
#[derive(Debug, Clone)]
pub enum CommitMessage {
    /// A single totally-ordered log frame, ready for [`crate::codec::decode`].
    Entry(Vec<u8>),
    /// Discard current state and install this snapshot image before
    /// resuming entry replay.
    InstallSnapshot(Vec<u8>),
}

/// What an [`crate::apply::ApplyLoop`] needs from a replicated log.
///
/// Each receiver can be taken exactly once; a driver is used by exactly one
/// apply loop over its lifetime, so `take_*` returning `None` on a second
/// call is a caller bug, not a condition the contract tries to recover
/// from.
pub trait LogDriver: Send {
    /// Channel on which proposed (not yet ordered) mutations are sent.
    fn proposal_sender(&self) -> mpsc::UnboundedSender<Vec<u8>>;

    /// Take ownership of the commit stream. Returns `None` if already taken.
    fn take_commit_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<CommitMessage>>;

    /// Take ownership of the error stream. Returns `None` if already taken.
    fn take_error_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<DriverError>>;
}

/// A single-node driver that echoes every proposal back as a commit, in the
/// order it was submitted, performing no real ordering work of its own.
///
/// This is the in-scope substitute for a real replicated log: it satisfies
/// [`LogDriver`]'s contract (proposals in, totally-ordered commits out) for
/// the case where "total order across one node" is trivially "submission
/// order".
pub struct LoopbackDriver {
    proposal_tx: mpsc::UnboundedSender<Vec<u8>>,
    commit_rx: Option<mpsc::UnboundedReceiver<CommitMessage>>,
    error_rx: Option<mpsc::UnboundedReceiver<DriverError>>,
    // Kept alive only to hold the error channel open: a single-node driver
    // never actually reports an error on it.
    _error_tx: mpsc::UnboundedSender<DriverError>,
}

impl LoopbackDriver {
    /// Spawn the echo task and return a driver wired up to it.
    pub fn spawn() -> Self {
        let (proposal_tx, mut proposal_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (commit_tx, commit_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(frame) = proposal_rx.recv().await {
                if commit_tx.send(CommitMessage::Entry(frame)).is_err() {
                    break;
                }
            }
        });

        Self {
            proposal_tx,
            commit_rx: Some(commit_rx),
            error_rx: Some(error_rx),
            _error_tx: error_tx,
        }
    }
}

impl LogDriver for LoopbackDriver {
    fn proposal_sender(&self) -> mpsc::UnboundedSender<Vec<u8>> {
        self.proposal_tx.clone()
    }

    fn take_commit_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<CommitMessage>> {
        self.commit_rx.take()
    }

    fn take_error_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<DriverError>> {
        self.error_rx.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_echoes_proposals_in_submission_order() {
        let mut driver = LoopbackDriver::spawn();
        let proposals = driver.proposal_sender();
        let mut commits = driver.take_commit_receiver().unwrap();

        proposals.send(vec![1]).unwrap();
        proposals.send(vec![2]).unwrap();
        proposals.send(vec![3]).unwrap();

        for expected in [1u8, 2, 3] {
            match commits.recv().await.unwrap() {
                CommitMessage::Entry(frame) => assert_eq!(frame, vec![expected]),
                CommitMessage::InstallSnapshot(_) => panic!("unexpected snapshot commit"),
            }
        }
    }

    #[tokio::test]
    async fn take_commit_receiver_returns_none_on_second_call() {
        let mut driver = LoopbackDriver::spawn();
        assert!(driver.take_commit_receiver().is_some());
        assert!(driver.take_commit_receiver().is_none());
    }

    #[tokio::test]
    async fn take_error_receiver_returns_none_on_second_call() {
        let mut driver = LoopbackDriver::spawn();
        assert!(driver.take_error_receiver().is_some());
        assert!(driver.take_error_receiver().is_none());
    }
}
