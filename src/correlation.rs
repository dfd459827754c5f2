//! The correlation handle shared with the (out-of-scope) response side.
//!
//! One source connection can pipeline several requests; all of them share a
//! single `Correlation`, since the response side needs to know to keep the
//! reply stream open until every in-flight request has been answered and
//! the source has sent its END.

/// Discriminates what kind of shared state a `Correlation` carries. This
/// adapter only ever constructs the `OutputEstablished` kind — the tag
/// exists because the wider nukleus fabric correlates several different
/// kinds of handles through the same registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrelationKind {
    /// Correlates a source stream with its downstream response stream.
    OutputEstablished,
}

/// Shared state for an established output (response) stream, as seen from
/// the request side. The response side itself is out of scope for this
/// crate; this is only the bookkeeping the request side needs to keep it
/// correctly terminated.
#[derive(Debug)]
pub struct OutputEstablishedState {
    /// Stream id of the reply channel on the fabric.
    pub reply_stream_id: u64,
    /// Name of the current downstream target.
    pub target_name: String,
    pending_requests: u32,
    end_requested: bool,
}

impl OutputEstablishedState {
    /// Creates fresh state for a reply channel that has not yet answered
    /// any request.
    pub fn new(reply_stream_id: u64, target_name: String) -> OutputEstablishedState {
        OutputEstablishedState {
            reply_stream_id,
            target_name,
            pending_requests: 0,
            end_requested: false,
        }
    }

    /// The number of requests whose response has not yet completed.
    pub fn pending_requests(&self) -> u32 {
        self.pending_requests
    }

    /// Whether `do_end` latched an end request waiting for `pending_requests`
    /// to reach zero.
    pub fn end_requested(&self) -> bool {
        self.end_requested
    }

    /// Marks the start of a new request sharing this correlation.
    pub fn begin_request(&mut self) {
        self.pending_requests += 1;
    }

    /// Marks the completion of one in-flight request's response.
    pub fn end_request(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
    }
}

/// A handle correlating a source stream's eventual response with the
/// downstream reply channel that will carry it.
#[derive(Debug)]
pub struct Correlation<S> {
    /// Opaque id echoed back by the response side to find this handle.
    pub source_correlation_id: u64,
    /// Whether the source stream this correlation belongs to is still
    /// routable (false once the source has reset or been rejected).
    pub source_routable: bool,
    kind: CorrelationKind,
    /// The correlated state, generic so the registry can hold handles of
    /// different kinds; this crate only ever uses `OutputEstablishedState`.
    pub state: S,
}

impl Correlation<OutputEstablishedState> {
    /// Creates a new `OutputEstablished` correlation handle.
    pub fn new_output_established(
        source_correlation_id: u64,
        source_routable: bool,
        state: OutputEstablishedState,
    ) -> Correlation<OutputEstablishedState> {
        Correlation {
            source_correlation_id,
            source_routable,
            kind: CorrelationKind::OutputEstablished,
            state,
        }
    }

    /// The kind tag for this correlation; always `OutputEstablished` for
    /// values constructed by this crate.
    pub fn kind(&self) -> CorrelationKind {
        self.kind
    }

    /// Called when the source stream sees its END frame. If no response is
    /// still in flight, `end_now` is invoked immediately to close the reply
    /// channel; otherwise the end is latched so the response side can act
    /// on it once the last in-flight request completes.
    pub fn do_end(&mut self, end_now: impl FnOnce()) {
        if self.state.pending_requests() == 0 {
            end_now();
        } else {
            self.state.end_requested = true;
        }
    }
}
