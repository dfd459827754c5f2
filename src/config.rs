//! Connection and slab configuration.
//!
//! Mirrors the setter-chain `Builder` shape used throughout the fabric
//! adapter's HTTP layer: construct with [`Config::new`], adjust with the
//! `&mut self -> &mut Self` setters, and pass the finished value to a
//! [`SourceInputStreamFactory`](crate::proto::factory::SourceInputStreamFactory).

/// The default number of bytes in a single slab slot.
///
/// Bounds both the maximum size of a request's headers and the amount of
/// request-body bytes the adapter will buffer while waiting on target
/// window.
pub const DEFAULT_SLOT_CAPACITY: usize = 64 * 1024;

/// The default number of slots in the slab, i.e. the number of partially
/// buffered requests the adapter tolerates concurrently.
pub const DEFAULT_SLOT_COUNT: usize = 64;

/// The default cap on the number of headers `httparse` will record for a
/// single request. Distinct from slot capacity, which bounds bytes.
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Configuration for a [`SourceInputStreamFactory`](crate::proto::factory::SourceInputStreamFactory).
#[derive(Clone, Debug)]
pub struct Config {
    slot_capacity: usize,
    slot_count: usize,
    max_headers: usize,
}

impl Config {
    /// Returns a `Config` with the default slot capacity, slot count, and
    /// header limit.
    pub fn new() -> Config {
        Config {
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            slot_count: DEFAULT_SLOT_COUNT,
            max_headers: DEFAULT_MAX_HEADERS,
        }
    }

    /// Sets the byte capacity of each slab slot (`C` in the data model).
    ///
    /// This bounds the largest request-headers block the adapter will
    /// accept before responding `431 Request Header Fields Too Large`, and
    /// the largest amount of body the adapter will buffer while waiting on
    /// target window.
    pub fn slot_capacity(&mut self, capacity: usize) -> &mut Config {
        self.slot_capacity = capacity;
        self
    }

    /// Sets the number of slots in the slab (`N` in the data model), i.e.
    /// the number of concurrently in-flight partially-buffered requests the
    /// adapter tolerates.
    pub fn slot_count(&mut self, count: usize) -> &mut Config {
        self.slot_count = count;
        self
    }

    /// Sets the maximum number of headers `httparse` will parse for a
    /// single request before the adapter treats it as malformed.
    pub fn max_headers(&mut self, max: usize) -> &mut Config {
        self.max_headers = max;
        self
    }

    pub(crate) fn slot_capacity_value(&self) -> usize {
        self.slot_capacity
    }

    pub(crate) fn slot_count_value(&self) -> usize {
        self.slot_count
    }

    pub(crate) fn max_headers_value(&self) -> usize {
        self.max_headers
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}
