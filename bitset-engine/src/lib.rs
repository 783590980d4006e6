//! Thread-safe namespace of compressed sets, its set-algebra engine, and
//! whole-namespace snapshot codec.
//!
//! This crate is the C2/C3/C4 layer of the bitset service: the registry
//! ([`Namespace`]) owns the name-to-set mapping under a reader/writer
//! discipline distinct from each set's own lock; the algebra engine
//! (`algebra` module, exposed as inherent methods on [`Namespace`]) runs
//! n-ary and pairwise set operations across registry-resolved handles; the
//! snapshot codec (`snapshot` module, also inherent methods) serializes and
//! restores the whole mapping over a byte stream.
//!
//! Replication is layered on top by `bitset-replication`, which implements
//! [`WriteSink`] and installs itself via [`Namespace::install_sink`].

mod algebra;
mod error;
mod registry;
mod snapshot;

pub use error::EngineError;
pub use registry::{Namespace, OpCode, WriteSink};

pub use bitset_core::{CoreError, Set, Stats};
