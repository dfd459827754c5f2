//! The target-side throttle state.
//!
//! Mirrors [`crate::proto::decode::DecoderState`]'s shape: a tagged enum
//! dispatched on, not a closure, so the current behavior for an incoming
//! WINDOW or RESET credit is always inspectable from the stream's state
//! alone. Owned by [`crate::proto::stream::SourceInputStream`] and mirrored
//! into the `Target` collaborator via `Target::set_throttle` so that stale
//! credit from an already-superseded target stream can be recognized and
//! dropped before it reaches here.

use bytes::Bytes;

/// What the stream currently does with WINDOW/RESET credit from its
/// downstream target.
#[derive(Debug, Clone)]
pub enum ThrottleState {
    /// No downstream target is open yet; any credit is stale and ignored.
    Ignore,
    /// Forwarding request body; incoming WINDOW increases
    /// `available_target_window` so more buffered or incoming body bytes
    /// can be released.
    ForHttpData,
    /// Same as `ForHttpData`, but the stream has switched to opaque
    /// `Upgrade` passthrough.
    ForHttpDataAfterUpgrade,
    /// Upgrade passthrough is fully established in both directions; WINDOW
    /// credit is propagated straight back to the source 1:1.
    PropagateWindow,
    /// Streaming a canned error response back to the rejecting peer.
    /// `offset` is how much of `payload` has already been sent; WINDOW
    /// credit drives further writes from `payload[offset..]`.
    RejectWriter { payload: Bytes, offset: usize },
}
