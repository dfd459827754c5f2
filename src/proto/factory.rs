//! Builds [`SourceInputStream`]s and owns the collaborators they share.
//!
//! Mirrors the teacher crate's connection-builder shape: a long-lived value
//! configured once (here, from a [`Config`]) that then stamps out cheap
//! per-stream objects. The factory additionally owns the slab and a single
//! scratch buffer used by every stream's slot-compaction step — never
//! touched by two streams at once, since dispatch is single-threaded and
//! synchronous.

use crate::config::Config;
use crate::slab::Slab;

use super::stream::SourceInputStream;

/// Creates [`SourceInputStream`]s that share one slab and one compaction
/// scratch buffer.
pub struct SourceInputStreamFactory {
    slab: Slab,
    scratch: Vec<u8>,
    slot_capacity: usize,
    max_headers: usize,
}

impl SourceInputStreamFactory {
    /// Builds a factory from `config`, allocating its slab and scratch
    /// buffer up front.
    pub fn new(config: &Config) -> SourceInputStreamFactory {
        SourceInputStreamFactory {
            slab: Slab::new(config.slot_capacity_value(), config.slot_count_value()),
            scratch: vec![0u8; config.slot_capacity_value()],
            slot_capacity: config.slot_capacity_value(),
            max_headers: config.max_headers_value(),
        }
    }

    /// Creates a fresh stream for a newly demuxed inbound `source_id`.
    ///
    /// The id is supplied here rather than learned from the stream's own
    /// BEGIN frame, since the fabric has already demultiplexed by id to
    /// decide which `SourceInputStream` to dispatch into before the first
    /// frame ever reaches it.
    pub fn create(&self, source_id: u64) -> SourceInputStream {
        SourceInputStream::new(source_id, self.slot_capacity, self.max_headers)
    }

    /// Mutable access to the shared slab, for assembling a
    /// [`super::stream::Collaborators`] value around a dispatch call.
    pub fn slab_mut(&mut self) -> &mut Slab {
        &mut self.slab
    }

    /// Mutable access to the shared compaction scratch buffer.
    pub fn scratch_mut(&mut self) -> &mut [u8] {
        &mut self.scratch
    }
}
