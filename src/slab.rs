//! A fixed-capacity pool of equal-size byte buffers ("slots").
//!
//! Each `SourceInputStream` defers at most one partially-decoded region at a
//! time — a tail of request headers that hasn't reached the blank line yet,
//! or a tail of request body that the target's window can't absorb yet —
//! and borrows exactly one slot from the slab to hold it. The slab itself
//! only hands out and reclaims slots; it never looks at their contents.
//!
//! Slot storage is built on the `slab` crate's generational allocator (the
//! same crate deno's resource table uses), wrapped so that callers only
//! ever see a plain slot index and the [`NO_SLOT`] sentinel, matching the
//! data model in the specification this adapter implements.

use bytes::BytesMut;
use tracing::trace;

/// Sentinel slot index returned by [`Slab::acquire`] when the slab is
/// exhausted. Distinct from any index a successful `acquire` can return.
pub const NO_SLOT: usize = usize::MAX;

struct Slot {
    owner: u64,
    buf: BytesMut,
}

/// A fixed-capacity pool of `capacity`-byte slots.
pub struct Slab {
    slots: slab::Slab<Slot>,
    capacity: usize,
    max_slots: usize,
}

impl Slab {
    /// Creates a slab of `max_slots` slots, each `capacity` bytes.
    pub fn new(capacity: usize, max_slots: usize) -> Slab {
        Slab {
            slots: slab::Slab::with_capacity(max_slots),
            capacity,
            max_slots,
        }
    }

    /// The byte capacity of every slot in this slab.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Acquires a fresh, zeroed slot for `owner_id`, or returns [`NO_SLOT`]
    /// if every slot is already held.
    pub fn acquire(&mut self, owner_id: u64) -> usize {
        if self.slots.len() >= self.max_slots {
            trace!(owner_id, "slab exhausted");
            return NO_SLOT;
        }
        let mut buf = BytesMut::with_capacity(self.capacity);
        buf.resize(self.capacity, 0);
        let index = self.slots.insert(Slot {
            owner: owner_id,
            buf,
        });
        trace!(owner_id, slot = index, "slab acquire");
        index
    }

    /// Returns the writable region of the slot at `slot_index`, sized to
    /// this slab's capacity. Panics if `slot_index` is [`NO_SLOT`] or not
    /// currently held — callers must check ownership before calling this.
    pub fn buffer(&mut self, slot_index: usize) -> &mut [u8] {
        &mut self.slots[slot_index].buf[..]
    }

    /// Releases the slot at `slot_index` back to the pool. A no-op for
    /// [`NO_SLOT`], matching the specification's lifecycle: streams call
    /// this unconditionally on end/reset regardless of whether they ever
    /// held a slot.
    pub fn release(&mut self, slot_index: usize) {
        if slot_index == NO_SLOT {
            return;
        }
        trace!(slot = slot_index, "slab release");
        self.slots.remove(slot_index);
    }

    #[cfg(test)]
    fn owner_of(&self, slot_index: usize) -> u64 {
        self.slots[slot_index].owner
    }
}
