//! Write interception, a binary log frame codec, and a replicated-log
//! driver contract for `bitset-engine` namespaces.
//!
//! This is the C5/C6 layer: it does not implement consensus. It defines the
//! boundary a consensus implementation must satisfy ([`LogDriver`]) and
//! supplies [`LoopbackDriver`], a single-node stand-in that trivially
//! totally-orders a single proposer's writes, plus [`ApplyLoop`], the task
//! that installs the interception point and replays commits back onto the
//! namespace.

mod apply;
mod codec;
mod driver;
mod error;
mod interceptor;

pub use apply::ApplyLoop;
pub use codec::{decode, decode_payload, encode, DecodedOp, FORMAT_VERSION};
pub use driver::{CommitMessage, LogDriver, LoopbackDriver};
pub use error::{DriverError, ReplicationError};
pub use interceptor::ChannelProposalSink;
