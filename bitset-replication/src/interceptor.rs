//! The [`WriteSink`] installed on a [`bitset_engine::Namespace`] to divert
//! `via_log = true` mutations onto the proposal channel instead of applying
//! them locally.

use tokio::sync::mpsc;

use bitset_engine::{OpCode, WriteSink};

use crate::codec;

/// Encodes every proposed mutation and forwards it to a driver's proposal
/// channel.
///
/// A closed channel (the driver task has exited) is not a panic: the
/// proposal is simply dropped and logged, matching the fact that
/// [`WriteSink::propose`] has no error return a caller could observe.
pub struct ChannelProposalSink {
    proposals: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelProposalSink {
    pub fn new(proposals: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self { proposals }
    }
}

impl WriteSink for ChannelProposalSink {
    fn propose(&self, op: OpCode, payload: &str) {
        let frame = codec::encode(op, payload);
        if self.proposals.send(frame).is_err() {
            tracing::error!("dropped proposal: log driver proposal channel is closed");
        }
    }
}
