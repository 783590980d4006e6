//! Whole-namespace binary snapshot codec.
//!
//! ```text
//! stream := entry*
//! entry  := name_len:u32 LE   name:utf8[name_len]   body:roaring_stream
//! ```
//!
//! The outer codec imposes no framing beyond concatenation: `restore` reads
//! entries until it hits EOF exactly at an entry boundary, which is the
//! normal, successful end of the stream. An EOF in the middle of an entry is
//! a hard error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use parking_lot::RwLock;

use bitset_core::Set;

use crate::error::EngineError;
use crate::registry::Namespace;

impl Namespace {
    /// Write every bound set to `sink` as a concatenated stream of entries.
    ///
    /// Entry order is unspecified. Each entry is produced by taking a read
    /// lock on one set just long enough to clone it, so a concurrent writer
    /// to a *different* name is never blocked, and a concurrent writer to
    /// the *same* name is blocked only for the duration of the clone, not
    /// the (potentially much slower) serialization that follows.
    pub fn snapshot<W: Write>(&self, mut sink: W) -> Result<(), EngineError> {
        let keys = self.keys();
        for name in keys {
            let cloned = match self.get(&name) {
                Some(handle) => handle.read().clone(),
                // Dropped between listing and write; this entry simply
                // does not appear in the snapshot.
                None => continue,
            };

            let name_bytes = name.as_bytes();
            sink.write_all(&(name_bytes.len() as u32).to_le_bytes())?;
            sink.write_all(name_bytes)?;
            cloned.write_to(&mut sink)?;

            tracing::debug!(name = %name, cardinality = cloned.cardinality(), "wrote snapshot entry");
        }
        Ok(())
    }

    /// Replace the namespace's entire contents with the entries read from
    /// `source`. Restore is order-agnostic; if a name appears more than
    /// once in an ill-formed stream, the last occurrence wins.
    pub fn restore<R: Read>(&self, mut source: R) -> Result<(), EngineError> {
        let mut restored = HashMap::new();

        loop {
            // Peek one byte to distinguish "clean EOF at an entry boundary"
            // from "EOF in the middle of an entry" (the latter is a hard
            // error, raised by the read_exact below on the remaining bytes).
            let mut first_byte = [0u8; 1];
            let read = source.read(&mut first_byte)?;
            if read == 0 {
                break;
            }

            let mut len_buf = [0u8; 4];
            len_buf[0] = first_byte[0];
            source.read_exact(&mut len_buf[1..])?;
            let name_len = u32::from_le_bytes(len_buf) as usize;

            let mut name_buf = vec![0u8; name_len];
            source.read_exact(&mut name_buf)?;
            let name = String::from_utf8(name_buf).map_err(|_| EngineError::InvalidEntryName)?;

            let set = Set::read_from(&mut source)?;
            tracing::debug!(name = %name, cardinality = set.cardinality(), "restored snapshot entry");
            restored.insert(name, Arc::new(RwLock::new(set)));
        }

        self.replace_all(restored);
        Ok(())
    }

    /// Persist to the path configured via [`Namespace::configure_snapshot_path`].
    ///
    /// Writes to a sibling `.tmp` file and renames it into place, so a
    /// write failure never leaves a half-written snapshot at `path`.
    pub fn save(&self) -> Result<(), EngineError> {
        let path = self.snapshot_path().ok_or(EngineError::NoSnapshotPath)?;
        let tmp_path = path.with_extension("tmp");
        let file = File::create(&tmp_path)?;
        self.snapshot(BufWriter::new(file))?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Restore from the path configured via
    /// [`Namespace::configure_snapshot_path`]. A missing file is not an
    /// error: it means "start empty", matching the configured path simply
    /// having nothing persisted at it yet.
    pub fn restore_from_configured_path(&self) -> Result<(), EngineError> {
        let path = self.snapshot_path().ok_or(EngineError::NoSnapshotPath)?;
        match File::open(&path) {
            Ok(file) => self.restore(BufReader::new(file)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
