//! Contracts for the collaborators the fabric transport would otherwise
//! provide.
//!
//! The fabric itself — ring-buffer I/O, dispatching frames to the right
//! per-stream object — is out of scope (see `spec.md` §1). What the core
//! state machines need from it is captured here as traits, the way the
//! teacher crate represents its own transport boundary as `AsyncRead`/
//! `AsyncWrite` bounds rather than a concrete socket type: it lets the core
//! be driven by a hand-rolled fake in tests instead of a real fabric.

use std::cell::RefCell;
use std::rc::Rc;

use http::{HeaderMap, Method};

use crate::correlation::{Correlation, OutputEstablishedState};
use crate::proto::throttle::ThrottleState;

/// A correlation handle shared between the request side (this crate) and
/// the out-of-scope response side, both of which need to observe and
/// mutate `pending_requests`/`end_requested` as requests and responses
/// complete independently.
pub type SharedCorrelation = Rc<RefCell<Correlation<OutputEstablishedState>>>;

/// The pseudo- and normal headers of a decoded request, assembled the way
/// `doHttpBegin`'s `headersBuilder` collaborator expects them.
///
/// Pseudo-headers are carried as dedicated fields rather than literal
/// `:`-prefixed entries in `headers`, since `http::HeaderName` rejects the
/// leading colon as an invalid token character; downstream adapters that
/// need the wire-level pseudo-header list can reconstruct it from these
/// fields.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// Always `"http"`; TLS termination is out of scope (`spec.md` §1).
    pub scheme: &'static str,
    /// `:method`.
    pub method: Method,
    /// `:path`, i.e. the request-target's path and query.
    pub path: String,
    /// `:authority`, resolved from the request-URI's authority component
    /// or, absent that, the `Host` header (RFC 7230 §5.5 precedence).
    pub authority: String,
    /// The request's normal headers, with lowercased field names.
    pub headers: HeaderMap,
}

/// A frame arriving on the source (inbound) direction of a stream.
#[derive(Debug)]
pub enum SourceFrame<'a> {
    /// The first frame on a new stream.
    Begin {
        /// Id of the inbound stream on the fabric.
        source_id: u64,
        /// Routing key selecting a route table entry.
        source_ref: u64,
        /// Opaque echo value correlating the eventual response.
        correlation_id: u64,
    },
    /// A chunk of raw request bytes.
    Data {
        /// The bytes read from the fabric for this frame.
        payload: &'a [u8],
    },
    /// The source has no more bytes to send on this stream.
    End,
    /// The source peer aborted the stream.
    Reset,
}

/// A throttle-direction frame arriving from the current downstream target.
#[derive(Debug, Clone, Copy)]
pub enum ThrottleFrame {
    /// The target is granting `update` additional bytes of credit.
    Window {
        /// Stream id this credit applies to.
        stream_id: u64,
        /// Number of additional bytes the target is willing to receive.
        update: u32,
    },
    /// The target aborted its stream.
    Reset {
        /// Stream id that was reset.
        stream_id: u64,
    },
}

impl ThrottleFrame {
    /// The stream id this frame concerns, used to detect stale credits
    /// from a previous (already-ended) target stream.
    pub fn stream_id(&self) -> u64 {
        match *self {
            ThrottleFrame::Window { stream_id, .. } => stream_id,
            ThrottleFrame::Reset { stream_id } => stream_id,
        }
    }
}

/// Operations the core performs against the inbound (source) peer.
pub trait SourceHandle {
    /// Grants `update` additional bytes of credit to the source.
    fn do_window(&mut self, source_id: u64, update: u32);
    /// Terminates the inbound stream.
    fn do_reset(&mut self, source_id: u64);
    /// Unregisters the stream; no further frames will be dispatched to it.
    fn remove_stream(&mut self, source_id: u64);
}

/// Operations the core performs against downstream target streams.
///
/// `open` combines what the specification describes as two separate
/// collaborators — a stream-id generator and a target-name lookup — into
/// one trait method, since both are out of scope for this crate and a
/// fabric implementation is free to satisfy them however it likes.
pub trait Target {
    /// Opens a new stream toward `target_name`, returning the fabric stream
    /// id assigned to it.
    fn open(&mut self, target_name: &str) -> u64;
    /// Begins an HTTP request on `target_id` with `target_ref` and the
    /// pseudo- and request headers already assembled.
    fn do_http_begin(&mut self, target_id: u64, target_ref: u64, correlation_id: u64, head: RequestHead);
    /// Forwards `buf` as request body (or, post-upgrade, opaque) bytes.
    fn do_http_data(&mut self, target_id: u64, buf: &[u8]);
    /// Terminates the request body.
    fn do_http_end(&mut self, target_id: u64);
    /// Installs the throttle handler that will receive this target's
    /// WINDOW/RESET credits.
    fn set_throttle(&mut self, target_id: u64, throttle: ThrottleState);
    /// Removes any throttle handler installed for `target_id`.
    fn remove_throttle(&mut self, target_id: u64);
}

/// Registers a correlation handle so the (out-of-scope) response side can
/// retrieve it once the target emits its reply BEGIN.
pub trait CorrelationRegistry {
    /// Registers `correlation` under `target_correlation_id`, so the
    /// response side can retrieve and mutate the same handle once the
    /// target emits its reply BEGIN.
    fn correlate_new(&mut self, target_correlation_id: u64, correlation: SharedCorrelation);
}
