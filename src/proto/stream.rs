//! `SourceInputStream`: the core per-connection state machine.
//!
//! One instance exists per inbound fabric stream. It owns the stream-level
//! [`StreamState`], the header/body [`DecoderState`], and the downstream
//! [`ThrottleState`], and drives all three against at most one borrowed
//! [`crate::slab::Slab`] slot.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use http::HeaderMap;
use tracing::{debug, trace, warn};

use crate::correlation::{Correlation, OutputEstablishedState};
use crate::error::Error;
use crate::fabric::{CorrelationRegistry, SharedCorrelation, SourceFrame, SourceHandle, Target, ThrottleFrame};
use crate::route::RouteTable;
use crate::slab::{self, Slab};

use super::canned;
use super::decode::DecoderState;
use super::parse::{parse_request, ParsedRequest};
use super::throttle::ThrottleState;

/// Sentinel target id meaning "no downstream target is open".
const NO_TARGET: u64 = u64::MAX;

/// Where a [`SourceInputStream`] is in its own lifecycle, independent of
/// what it's currently decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// Waiting for the stream's BEGIN frame.
    BeforeBegin,
    /// Running normally; no slot is held (any input so far has been fully
    /// decoded in place).
    AfterBeginOrData,
    /// A slot is held because some input could not yet be fully decoded —
    /// a partial header block, or body bytes the target's window couldn't
    /// absorb.
    WithDeferredData,
    /// The stream has been reset, either by us (malformed request, no
    /// route, framing violation) or by the source peer.
    RejectedOrReset,
    /// The source sent END and cleanup has run.
    AfterEnd,
}

/// The shared collaborators a [`SourceInputStream`] needs for a single
/// dispatch call. Bundled so call sites don't thread five parameters
/// through every method; borrowed fresh for each frame, never stored.
pub struct Collaborators<'a> {
    pub slab: &'a mut Slab,
    pub source: &'a mut dyn SourceHandle,
    pub target: &'a mut dyn Target,
    pub routes: &'a dyn RouteTable,
    pub correlation_registry: &'a mut dyn CorrelationRegistry,
    /// Scratch region, sized to the slab's slot capacity, used to compact a
    /// slot's live region toward offset zero before an append would
    /// otherwise exceed capacity. Owned by the
    /// [`SourceInputStreamFactory`](crate::proto::factory::SourceInputStreamFactory)
    /// and lent out per call, matching the "single private temporary slot"
    /// the factory keeps for this purpose.
    pub scratch: &'a mut [u8],
}

enum Step {
    /// Made progress and can be asked to decode more of the buffer.
    Consumed(usize),
    /// Consumed `0` bytes and decoding cannot make further progress right
    /// now. The caller decides what that means: if no slot was held, the
    /// remaining bytes must be freshly deferred into one; if a slot was
    /// already held, they simply stay there.
    Stuck(usize),
}

/// One inbound HTTP/1.1 request stream.
pub struct SourceInputStream {
    source_id: u64,
    source_ref: u64,
    source_correlation_id: u64,

    target_id: u64,

    slot_index: usize,
    slot_offset: usize,
    slot_position: usize,

    window: u32,
    available_target_window: u32,
    end_deferred: bool,

    decoder_state: DecoderState,
    stream_state: StreamState,
    throttle_state: ThrottleState,

    correlation: Option<SharedCorrelation>,

    slot_capacity: usize,
    max_headers: usize,
}

impl SourceInputStream {
    pub(crate) fn new(source_id: u64, slot_capacity: usize, max_headers: usize) -> SourceInputStream {
        SourceInputStream {
            source_id,
            source_ref: 0,
            source_correlation_id: 0,
            target_id: NO_TARGET,
            slot_index: slab::NO_SLOT,
            slot_offset: 0,
            slot_position: 0,
            window: 0,
            available_target_window: 0,
            end_deferred: false,
            decoder_state: DecoderState::Begin,
            stream_state: StreamState::BeforeBegin,
            throttle_state: ThrottleState::Ignore,
            correlation: None,
            slot_capacity,
            max_headers,
        }
    }

    /// The fabric id of this stream's inbound source.
    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    /// Dispatches one source-direction frame.
    pub fn on_source_frame(&mut self, cx: &mut Collaborators<'_>, frame: SourceFrame<'_>) {
        match (self.stream_state, frame) {
            (
                StreamState::BeforeBegin,
                SourceFrame::Begin {
                    source_id,
                    source_ref,
                    correlation_id,
                },
            ) => {
                debug_assert_eq!(source_id, self.source_id);
                self.source_ref = source_ref;
                self.source_correlation_id = correlation_id;
                self.window = self.slot_capacity as u32;
                cx.source.do_window(self.source_id, self.window);
                self.stream_state = StreamState::AfterBeginOrData;
                trace!(source_id = self.source_id, source_ref, "stream begin");
            }
            (StreamState::BeforeBegin, _) => self.reset_source_for(cx, Error::new_unexpected_frame()),

            (StreamState::AfterBeginOrData, SourceFrame::Data { payload }) => {
                self.handle_data_fresh(cx, payload);
            }
            (StreamState::AfterBeginOrData, SourceFrame::End) => {
                self.release_slot(cx.slab);
                cx.source.remove_stream(self.source_id);
                self.end_correlation();
                self.stream_state = StreamState::AfterEnd;
            }
            (StreamState::AfterBeginOrData, _) => self.reset_source_for(cx, Error::new_unexpected_frame()),

            (StreamState::WithDeferredData, SourceFrame::Data { payload }) => {
                self.handle_data_deferred(cx, payload);
            }
            (StreamState::WithDeferredData, SourceFrame::End) => {
                self.end_deferred = true;
            }
            (StreamState::WithDeferredData, _) => self.reset_source_for(cx, Error::new_unexpected_frame()),

            (StreamState::RejectedOrReset, SourceFrame::Data { payload }) => {
                cx.source.do_window(self.source_id, payload.len() as u32);
            }
            (StreamState::RejectedOrReset, SourceFrame::End) => {
                cx.source.remove_stream(self.source_id);
                self.stream_state = StreamState::AfterEnd;
            }
            (StreamState::RejectedOrReset, _) => {}

            (StreamState::AfterEnd, _) => {}
        }
    }

    /// Dispatches one throttle-direction frame from the current downstream
    /// target. Frames carrying a stale stream id — from a target stream
    /// this object has already superseded or torn down — are dropped.
    pub fn on_throttle_frame(&mut self, cx: &mut Collaborators<'_>, frame: ThrottleFrame) {
        if frame.stream_id() != self.target_id {
            trace!(
                expected = self.target_id,
                got = frame.stream_id(),
                "dropping stale throttle frame"
            );
            return;
        }
        match frame {
            ThrottleFrame::Window { update, .. } => self.handle_target_window(cx, update),
            ThrottleFrame::Reset { .. } => self.handle_target_reset(cx),
        }
    }

    // -- source DATA handling -------------------------------------------

    fn handle_data_fresh(&mut self, cx: &mut Collaborators<'_>, payload: &[u8]) {
        let len = payload.len() as u32;
        if len > self.window {
            self.reset_source_for(cx, Error::new_window_underrun());
            return;
        }
        self.window -= len;
        self.decode_fresh(cx, payload);
    }

    fn handle_data_deferred(&mut self, cx: &mut Collaborators<'_>, payload: &[u8]) {
        let len = payload.len() as u32;
        if len > self.window {
            self.reset_source_for(cx, Error::new_window_underrun());
            return;
        }
        self.window -= len;
        self.append_to_slot(cx, payload);
        self.drain_slot(cx);
        self.check_headers_too_large(cx);
    }

    // -- decoding ---------------------------------------------------------

    fn decode_fresh(&mut self, cx: &mut Collaborators<'_>, buf: &[u8]) {
        let cursor = self.decode_until_stuck(cx, buf);
        if self.stream_state == StreamState::RejectedOrReset {
            return;
        }
        if cursor < buf.len() {
            self.defer_tail(cx, &buf[cursor..]);
            self.check_headers_too_large(cx);
        }
    }

    fn drain_slot(&mut self, cx: &mut Collaborators<'_>) {
        debug_assert_ne!(self.slot_index, slab::NO_SLOT);
        let live = self.slot_position - self.slot_offset;
        let mut local = vec![0u8; live];
        local.copy_from_slice(&cx.slab.buffer(self.slot_index)[self.slot_offset..self.slot_position]);

        let cursor = self.decode_until_stuck(cx, &local);
        self.slot_offset += cursor;

        if self.slot_offset == self.slot_position {
            cx.slab.release(self.slot_index);
            self.slot_index = slab::NO_SLOT;
            self.slot_offset = 0;
            self.slot_position = 0;
            if self.stream_state == StreamState::WithDeferredData {
                if self.end_deferred {
                    self.end_deferred = false;
                    cx.source.remove_stream(self.source_id);
                    self.end_correlation();
                    self.stream_state = StreamState::AfterEnd;
                } else {
                    self.stream_state = StreamState::AfterBeginOrData;
                }
            }
        }
    }

    fn decode_until_stuck(&mut self, cx: &mut Collaborators<'_>, buf: &[u8]) -> usize {
        let mut cursor = 0usize;
        while cursor < buf.len() {
            match self.decode_step(cx, &buf[cursor..]) {
                Step::Consumed(n) => cursor += n,
                Step::Stuck(n) => {
                    cursor += n;
                    break;
                }
            }
        }
        cursor
    }

    fn decode_step(&mut self, cx: &mut Collaborators<'_>, buf: &[u8]) -> Step {
        match self.decoder_state {
            DecoderState::Begin => self.decode_begin(cx, buf),
            DecoderState::Body { .. } => self.decode_body(cx, buf, false),
            DecoderState::Upgrade => self.decode_body(cx, buf, true),
        }
    }

    fn decode_begin(&mut self, cx: &mut Collaborators<'_>, buf: &[u8]) -> Step {
        match parse_request(buf, self.max_headers) {
            Err(e) => {
                self.reject(cx, e);
                Step::Stuck(0)
            }
            Ok(None) => Step::Stuck(0),
            Ok(Some((parsed, consumed))) => {
                self.begin_request(cx, parsed);
                Step::Consumed(consumed)
            }
        }
    }

    fn decode_body(&mut self, cx: &mut Collaborators<'_>, buf: &[u8], after_upgrade: bool) -> Step {
        // Once upgrade passthrough has settled into 1:1 propagation, WINDOW
        // credit is forwarded straight to the source instead of accounted
        // in `available_target_window` (see `handle_target_window`), so
        // forwarding is unconditional here too.
        if after_upgrade && matches!(self.throttle_state, ThrottleState::PropagateWindow) {
            if buf.is_empty() {
                return Step::Stuck(0);
            }
            cx.target.do_http_data(self.target_id, buf);
            return Step::Consumed(buf.len());
        }

        let remaining = match self.decoder_state {
            DecoderState::Body { remaining } => remaining,
            DecoderState::Upgrade => u64::MAX,
            DecoderState::Begin => unreachable!(),
        };

        let to_forward = (buf.len() as u64)
            .min(remaining)
            .min(self.available_target_window as u64) as usize;

        if to_forward == 0 {
            return Step::Stuck(0);
        }

        cx.target.do_http_data(self.target_id, &buf[..to_forward]);
        self.available_target_window -= to_forward as u32;

        if after_upgrade {
            return if to_forward == buf.len() {
                Step::Consumed(to_forward)
            } else {
                Step::Stuck(to_forward)
            };
        }

        let remaining_after = remaining - to_forward as u64;
        if remaining_after == 0 {
            cx.target.do_http_end(self.target_id);
            self.throttle_state = ThrottleState::Ignore;
            cx.target.set_throttle(self.target_id, ThrottleState::Ignore);
            self.decoder_state = DecoderState::Begin;
            // body complete: any leftover bytes in `buf` belong to a
            // pipelined next request, handled by the next loop iteration.
            Step::Consumed(to_forward)
        } else {
            self.decoder_state = DecoderState::Body {
                remaining: remaining_after,
            };
            Step::Stuck(to_forward)
        }
    }

    // -- request start-up --------------------------------------------------

    fn begin_request(&mut self, cx: &mut Collaborators<'_>, parsed: ParsedRequest) {
        let ParsedRequest {
            head,
            content_length,
            has_upgrade,
        } = parsed;

        let route = match cx.routes.select(self.source_ref, &head.headers) {
            Some(route) => route.clone(),
            None => {
                self.reject(cx, Error::new_no_route());
                return;
            }
        };

        let target_id = cx.target.open(&route.target);
        self.target_id = target_id;

        cx.target.do_http_begin(target_id, route.target_ref, self.source_correlation_id, head);

        let correlation = match self.correlation.take() {
            Some(existing) => existing,
            None => {
                let state = OutputEstablishedState::new(target_id, route.target);
                let fresh = Rc::new(RefCell::new(Correlation::new_output_established(
                    self.source_correlation_id,
                    true,
                    state,
                )));
                cx.correlation_registry.correlate_new(self.source_correlation_id, fresh.clone());
                fresh
            }
        };
        correlation.borrow_mut().state.begin_request();
        self.correlation = Some(correlation);

        self.available_target_window = 0;

        if has_upgrade {
            self.decoder_state = DecoderState::Upgrade;
            self.throttle_state = ThrottleState::ForHttpDataAfterUpgrade;
        } else if content_length > 0 {
            self.decoder_state = DecoderState::Body {
                remaining: content_length,
            };
            self.throttle_state = ThrottleState::ForHttpData;
        } else {
            cx.target.do_http_end(target_id);
            self.throttle_state = ThrottleState::Ignore;
            self.decoder_state = DecoderState::Begin;
        }
        cx.target.set_throttle(target_id, self.throttle_state.clone());
    }

    // -- slot management ----------------------------------------------------

    fn defer_tail(&mut self, cx: &mut Collaborators<'_>, tail: &[u8]) {
        if self.slot_index == slab::NO_SLOT {
            let idx = cx.slab.acquire(self.source_id);
            if idx == slab::NO_SLOT {
                self.reject(cx, Error::new_slab_exhausted());
                return;
            }
            self.slot_index = idx;
            self.slot_offset = 0;
            self.slot_position = 0;
        }
        self.append_to_slot(cx, tail);
        self.stream_state = StreamState::WithDeferredData;
    }

    fn append_to_slot(&mut self, cx: &mut Collaborators<'_>, bytes: &[u8]) {
        let needed = self.slot_position + bytes.len();
        if needed > self.slot_capacity {
            let live = self.slot_position - self.slot_offset;
            {
                let buf = cx.slab.buffer(self.slot_index);
                cx.scratch[..live].copy_from_slice(&buf[self.slot_offset..self.slot_position]);
            }
            {
                let buf = cx.slab.buffer(self.slot_index);
                buf[..live].copy_from_slice(&cx.scratch[..live]);
            }
            self.slot_offset = 0;
            self.slot_position = live;
        }
        debug_assert!(self.slot_position + bytes.len() <= self.slot_capacity);
        let buf = cx.slab.buffer(self.slot_index);
        let start = self.slot_position;
        let end = (start + bytes.len()).min(self.slot_capacity);
        let n = end - start;
        buf[start..end].copy_from_slice(&bytes[..n]);
        self.slot_position = end;
    }

    fn check_headers_too_large(&mut self, cx: &mut Collaborators<'_>) {
        if self.slot_index == slab::NO_SLOT || !matches!(self.decoder_state, DecoderState::Begin) {
            return;
        }
        let free = self.slot_capacity - self.slot_position;
        if self.window == 0 && free < 2 {
            self.reject(cx, Error::new_too_large());
        }
    }

    fn release_slot(&mut self, slab: &mut Slab) {
        if self.slot_index != slab::NO_SLOT {
            slab.release(self.slot_index);
            self.slot_index = slab::NO_SLOT;
            self.slot_offset = 0;
            self.slot_position = 0;
        }
    }

    // -- throttle -----------------------------------------------------------

    fn handle_target_window(&mut self, cx: &mut Collaborators<'_>, update: u32) {
        match self.throttle_state.clone() {
            ThrottleState::Ignore => {}
            ThrottleState::ForHttpData | ThrottleState::ForHttpDataAfterUpgrade => {
                let after_upgrade = matches!(self.throttle_state, ThrottleState::ForHttpDataAfterUpgrade);
                self.available_target_window = self.available_target_window.saturating_add(update);
                if self.slot_index != slab::NO_SLOT {
                    self.drain_slot(cx);
                }
                let granted = self.available_target_window.min(self.slot_capacity as u32);
                let top_up = granted.saturating_sub(self.window);
                if top_up > 0 {
                    self.window += top_up;
                    cx.source.do_window(self.source_id, top_up);
                }
                // Once the upgrade passthrough has caught up on any buffered
                // bytes, WINDOW credit is propagated straight through instead
                // of accounted against `available_target_window`.
                if after_upgrade && self.slot_index == slab::NO_SLOT {
                    self.throttle_state = ThrottleState::PropagateWindow;
                    cx.target.set_throttle(self.target_id, ThrottleState::PropagateWindow);
                }
            }
            ThrottleState::PropagateWindow => {
                cx.source.do_window(self.source_id, update);
            }
            ThrottleState::RejectWriter { payload, offset } => {
                self.drive_reject_writer(cx, payload, offset, update);
            }
        }
    }

    fn handle_target_reset(&mut self, cx: &mut Collaborators<'_>) {
        self.release_slot(cx.slab);
        cx.source.do_reset(self.source_id);
        cx.target.remove_throttle(self.target_id);
        self.target_id = NO_TARGET;
        self.stream_state = StreamState::RejectedOrReset;
    }

    fn drive_reject_writer(&mut self, cx: &mut Collaborators<'_>, payload: Bytes, offset: usize, update: u32) {
        let end = (offset + update as usize).min(payload.len());
        if end > offset {
            cx.target.do_http_data(self.target_id, &payload[offset..end]);
        }
        if end >= payload.len() {
            cx.target.do_http_end(self.target_id);
            cx.target.remove_throttle(self.target_id);
            self.throttle_state = ThrottleState::Ignore;
        } else {
            let next = ThrottleState::RejectWriter { payload, offset: end };
            self.throttle_state = next.clone();
            cx.target.set_throttle(self.target_id, next);
        }
    }

    // -- error paths ----------------------------------------------------

    fn reject(&mut self, cx: &mut Collaborators<'_>, err: Error) {
        debug!(source_id = self.source_id, %err, "rejecting request");
        match err.canned_status() {
            Some(status) => self.reject_with_canned(cx, status),
            None => self.reset_source(cx),
        }
    }

    fn reject_with_canned(&mut self, cx: &mut Collaborators<'_>, status: u16) {
        let body = canned::response_bytes(status);
        let reject_target_id = cx.target.open("reject");
        self.target_id = reject_target_id;
        cx.target.do_http_begin(
            reject_target_id,
            0,
            self.source_correlation_id,
            crate::fabric::RequestHead {
                scheme: "http",
                method: http::Method::GET,
                path: "/".into(),
                authority: String::new(),
                headers: HeaderMap::new(),
            },
        );
        let throttle = ThrottleState::RejectWriter { payload: body, offset: 0 };
        cx.target.set_throttle(reject_target_id, throttle.clone());
        self.throttle_state = throttle;
        self.release_slot(cx.slab);
        cx.source.do_reset(self.source_id);
        self.stream_state = StreamState::RejectedOrReset;
    }

    fn reset_source(&mut self, cx: &mut Collaborators<'_>) {
        self.release_slot(cx.slab);
        cx.source.do_reset(self.source_id);
        self.stream_state = StreamState::RejectedOrReset;
    }

    /// Resets the source for a framing violation that has no canned HTTP
    /// response: a window underrun, or a frame the current stream state
    /// doesn't accept. `err` exists purely for the log line; both of its
    /// possible kinds carry no canned status (`Error::canned_status`), so
    /// this always falls straight through to `reset_source`.
    fn reset_source_for(&mut self, cx: &mut Collaborators<'_>, err: Error) {
        debug_assert!(err.canned_status().is_none());
        warn!(source_id = self.source_id, %err, "resetting source");
        self.reset_source(cx);
    }

    fn end_correlation(&mut self) {
        if let Some(correlation) = &self.correlation {
            correlation.borrow_mut().do_end(|| {
                trace!("reply channel idle at source END, out-of-scope response side would close it now");
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::route::Route;
    use std::collections::HashMap;

    struct FakeSource {
        windows: Vec<(u64, u32)>,
        resets: Vec<u64>,
        removed: Vec<u64>,
    }
    impl FakeSource {
        fn new() -> FakeSource {
            FakeSource {
                windows: vec![],
                resets: vec![],
                removed: vec![],
            }
        }
    }
    impl SourceHandle for FakeSource {
        fn do_window(&mut self, source_id: u64, update: u32) {
            self.windows.push((source_id, update));
        }
        fn do_reset(&mut self, source_id: u64) {
            self.resets.push(source_id);
        }
        fn remove_stream(&mut self, source_id: u64) {
            self.removed.push(source_id);
        }
    }

    struct FakeTarget {
        next_id: u64,
        begins: Vec<(u64, u64, u64, String)>,
        data: Vec<(u64, Vec<u8>)>,
        ends: Vec<u64>,
        throttles: HashMap<u64, ThrottleState>,
    }
    impl FakeTarget {
        fn new() -> FakeTarget {
            FakeTarget {
                next_id: 1,
                begins: vec![],
                data: vec![],
                ends: vec![],
                throttles: HashMap::new(),
            }
        }
    }
    impl Target for FakeTarget {
        fn open(&mut self, target_name: &str) -> u64 {
            let id = self.next_id;
            self.next_id += 1;
            let _ = target_name;
            id
        }
        fn do_http_begin(&mut self, target_id: u64, target_ref: u64, correlation_id: u64, head: crate::fabric::RequestHead) {
            self.begins.push((target_id, target_ref, correlation_id, head.path));
        }
        fn do_http_data(&mut self, target_id: u64, buf: &[u8]) {
            self.data.push((target_id, buf.to_vec()));
        }
        fn do_http_end(&mut self, target_id: u64) {
            self.ends.push(target_id);
        }
        fn set_throttle(&mut self, target_id: u64, throttle: ThrottleState) {
            self.throttles.insert(target_id, throttle);
        }
        fn remove_throttle(&mut self, target_id: u64) {
            self.throttles.remove(&target_id);
        }
    }

    struct FakeRoutes(Vec<Route>);
    impl RouteTable for FakeRoutes {
        fn supply_routes(&self, _source_ref: u64) -> &[Route] {
            &self.0
        }
    }

    struct FakeCorrelationRegistry {
        registered: Vec<u64>,
    }
    impl CorrelationRegistry for FakeCorrelationRegistry {
        fn correlate_new(&mut self, target_correlation_id: u64, _correlation: crate::fabric::SharedCorrelation) {
            self.registered.push(target_correlation_id);
        }
    }

    fn routes() -> FakeRoutes {
        FakeRoutes(vec![Route {
            source_ref: 1,
            header_matchers: vec![],
            target: "svc".into(),
            target_ref: 42,
        }])
    }

    #[test]
    fn begin_grants_initial_window_and_get_with_no_body_ends_immediately() {
        let cfg = Config::new();
        let mut stream = SourceInputStream::new(7, cfg.slot_capacity_value(), cfg.max_headers_value());
        let mut slab = Slab::new(cfg.slot_capacity_value(), cfg.slot_count_value());
        let mut source = FakeSource::new();
        let mut target = FakeTarget::new();
        let routes = routes();
        let mut registry = FakeCorrelationRegistry { registered: vec![] };
        let mut scratch = vec![0u8; cfg.slot_capacity_value()];
        let mut cx = Collaborators {
            slab: &mut slab,
            source: &mut source,
            target: &mut target,
            routes: &routes,
            correlation_registry: &mut registry,
            scratch: &mut scratch,
        };

        stream.on_source_frame(
            &mut cx,
            SourceFrame::Begin {
                source_id: 7,
                source_ref: 1,
                correlation_id: 100,
            },
        );
        assert_eq!(source.windows, vec![(7, cfg.slot_capacity_value() as u32)]);

        stream.on_source_frame(
            &mut cx,
            SourceFrame::Data {
                payload: b"GET /hello HTTP/1.1\r\nHost: h\r\n\r\n",
            },
        );
        assert_eq!(target.begins.len(), 1);
        assert_eq!(target.begins[0].3, "/hello");
        assert_eq!(target.ends, vec![1]);
    }

    #[test]
    fn pipelined_requests_in_one_data_frame_both_begin() {
        let cfg = Config::new();
        let mut stream = SourceInputStream::new(7, cfg.slot_capacity_value(), cfg.max_headers_value());
        let mut slab = Slab::new(cfg.slot_capacity_value(), cfg.slot_count_value());
        let mut source = FakeSource::new();
        let mut target = FakeTarget::new();
        let routes = routes();
        let mut registry = FakeCorrelationRegistry { registered: vec![] };
        let mut scratch = vec![0u8; cfg.slot_capacity_value()];
        let mut cx = Collaborators {
            slab: &mut slab,
            source: &mut source,
            target: &mut target,
            routes: &routes,
            correlation_registry: &mut registry,
            scratch: &mut scratch,
        };

        stream.on_source_frame(
            &mut cx,
            SourceFrame::Begin {
                source_id: 7,
                source_ref: 1,
                correlation_id: 100,
            },
        );
        stream.on_source_frame(
            &mut cx,
            SourceFrame::Data {
                payload: b"GET /one HTTP/1.1\r\nHost: h\r\n\r\nGET /two HTTP/1.1\r\nHost: h\r\n\r\n",
            },
        );
        assert_eq!(target.begins.len(), 2);
        assert_eq!(target.begins[0].3, "/one");
        assert_eq!(target.begins[1].3, "/two");
    }

    #[test]
    fn headers_too_large_triggers_431_and_reset() {
        let mut stream = SourceInputStream::new(7, 32, 16);
        let mut slab = Slab::new(32, 4);
        let mut source = FakeSource::new();
        let mut target = FakeTarget::new();
        let routes = routes();
        let mut registry = FakeCorrelationRegistry { registered: vec![] };
        let mut scratch = vec![0u8; 32];
        let mut cx = Collaborators {
            slab: &mut slab,
            source: &mut source,
            target: &mut target,
            routes: &routes,
            correlation_registry: &mut registry,
            scratch: &mut scratch,
        };

        stream.on_source_frame(
            &mut cx,
            SourceFrame::Begin {
                source_id: 7,
                source_ref: 1,
                correlation_id: 1,
            },
        );
        // consume the whole 32-byte window with headers that never terminate
        let junk = vec![b'a'; 32];
        stream.on_source_frame(&mut cx, SourceFrame::Data { payload: &junk });

        assert_eq!(target.begins.len(), 1);
        assert_eq!(target.begins[0].1, 0);
        assert_eq!(source.resets, vec![7]);
    }

    #[test]
    fn unrouted_request_gets_404_and_reset() {
        let mut stream = SourceInputStream::new(7, 256, 16);
        let mut slab = Slab::new(256, 4);
        let mut source = FakeSource::new();
        let mut target = FakeTarget::new();
        let routes = FakeRoutes(vec![]);
        let mut registry = FakeCorrelationRegistry { registered: vec![] };
        let mut scratch = vec![0u8; 256];
        let mut cx = Collaborators {
            slab: &mut slab,
            source: &mut source,
            target: &mut target,
            routes: &routes,
            correlation_registry: &mut registry,
            scratch: &mut scratch,
        };

        stream.on_source_frame(
            &mut cx,
            SourceFrame::Begin {
                source_id: 7,
                source_ref: 1,
                correlation_id: 1,
            },
        );
        stream.on_source_frame(
            &mut cx,
            SourceFrame::Data {
                payload: b"GET / HTTP/1.1\r\nHost: h\r\n\r\n",
            },
        );
        assert_eq!(target.begins.len(), 1);
        assert_eq!(source.resets, vec![7]);
    }
}
