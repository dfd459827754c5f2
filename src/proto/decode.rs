//! The decoder's tagged dispatch state.
//!
//! A function-like dispatch value rather than a closure, per the
//! single-threaded, non-reentrant design this adapter follows throughout:
//! every state transition is a plain enum variant change, inspectable and
//! testable without capturing environment.

/// Where [`crate::proto::stream::SourceInputStream`] currently is in
/// decoding its source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecoderState {
    /// Scanning for a complete request line and header block.
    Begin,
    /// Forwarding request body; `remaining` counts down from
    /// `Content-Length`.
    Body { remaining: u64 },
    /// The request carried `Upgrade`; all further bytes on this stream are
    /// opaque payload forwarded unconditionally.
    Upgrade,
}
