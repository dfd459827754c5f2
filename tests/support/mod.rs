//! Shared fakes for the integration tests, mirroring the teacher crate's
//! `tests/support` convention: hand-rolled collaborators, no mocking crate.

use std::collections::HashMap;

use http::HeaderMap;
use nukleus_http_source::fabric::{CorrelationRegistry, RequestHead, SharedCorrelation, SourceHandle, Target};
use nukleus_http_source::proto::ThrottleState;
use nukleus_http_source::route::{HeaderMatcher, Route, RouteTable};

#[derive(Default)]
pub struct FakeSource {
    pub windows: Vec<(u64, u32)>,
    pub resets: Vec<u64>,
    pub removed: Vec<u64>,
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

pub struct RecordedBegin {
    pub target_id: u64,
    pub target_ref: u64,
    pub correlation_id: u64,
    pub head: RequestHead,
}

#[derive(Default)]
pub struct FakeTarget {
    pub next_id: u64,
    pub begins: Vec<RecordedBegin>,
    pub data: Vec<(u64, Vec<u8>)>,
    pub ends: Vec<u64>,
    pub throttles: HashMap<u64, ThrottleState>,
}

impl FakeTarget {
    pub fn new() -> FakeTarget {
        FakeTarget {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn data_for(&self, target_id: u64) -> Vec<u8> {
        self.data
            .iter()
            .filter(|(id, _)| *id == target_id)
            .flat_map(|(_, buf)| buf.clone())
            .collect()
    }
}

impl Target for FakeTarget {
    fn open(&mut self, _target_name: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
    fn do_http_begin(&mut self, target_id: u64, target_ref: u64, correlation_id: u64, head: RequestHead) {
        self.begins.push(RecordedBegin {
            target_id,
            target_ref,
            correlation_id,
            head,
        });
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

pub struct FakeRoutes(pub Vec<Route>);

impl RouteTable for FakeRoutes {
    fn supply_routes(&self, _source_ref: u64) -> &[Route] {
        &self.0
    }
}

pub fn single_route(target: &str) -> FakeRoutes {
    FakeRoutes(vec![Route {
        source_ref: 1,
        header_matchers: vec![],
        target: target.to_string(),
        target_ref: 99,
    }])
}

pub fn host_routed(matches_host: &str, target: &str, fallback_target: &str) -> FakeRoutes {
    FakeRoutes(vec![
        Route {
            source_ref: 1,
            header_matchers: vec![HeaderMatcher {
                name: "host".into(),
                value: Some(matches_host.to_string()),
            }],
            target: target.to_string(),
            target_ref: 1,
        },
        Route {
            source_ref: 1,
            header_matchers: vec![],
            target: fallback_target.to_string(),
            target_ref: 2,
        },
    ])
}

#[derive(Default)]
pub struct FakeCorrelationRegistry {
    pub registered: Vec<u64>,
}

impl CorrelationRegistry for FakeCorrelationRegistry {
    fn correlate_new(&mut self, target_correlation_id: u64, _correlation: SharedCorrelation) {
        self.registered.push(target_correlation_id);
    }
}

pub fn empty_headers() -> HeaderMap {
    HeaderMap::new()
}
