mod support;

use nukleus_http_source::config::Config;
use nukleus_http_source::fabric::{SourceFrame, ThrottleFrame};
use nukleus_http_source::proto::{Collaborators, SourceInputStreamFactory};

use support::{single_route, FakeCorrelationRegistry, FakeSource, FakeTarget};

#[test]
fn body_released_across_several_small_window_grants() {
    let config = Config::new();
    let mut factory = SourceInputStreamFactory::new(&config);
    let mut stream = factory.create(1);

    let mut source = FakeSource::default();
    let mut target = FakeTarget::new();
    let routes = single_route("svc");
    let mut registry = FakeCorrelationRegistry::default();
    let mut cx = Collaborators {
        slab: factory.slab_mut(),
        source: &mut source,
        target: &mut target,
        routes: &routes,
        correlation_registry: &mut registry,
        scratch: factory.scratch_mut(),
    };

    stream.on_source_frame(
        &mut cx,
        SourceFrame::Begin {
            source_id: 1,
            source_ref: 1,
            correlation_id: 10,
        },
    );

    // headers plus the whole 12-byte body, in one frame; no target window
    // yet, so the entire body is buffered in the slab slot
    stream.on_source_frame(
        &mut cx,
        SourceFrame::Data {
            payload: b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 12\r\n\r\nabcdefghijkl",
        },
    );
    assert_eq!(target.data_for(1), Vec::<u8>::new());
    assert!(target.ends.is_empty());

    // credit trickles in across three separate grants, none of which by
    // itself covers the whole body
    stream.on_throttle_frame(&mut cx, ThrottleFrame::Window { stream_id: 1, update: 4 });
    assert_eq!(target.data_for(1), b"abcd".to_vec());
    assert!(target.ends.is_empty());

    stream.on_throttle_frame(&mut cx, ThrottleFrame::Window { stream_id: 1, update: 4 });
    assert_eq!(target.data_for(1), b"abcdefgh".to_vec());
    assert!(target.ends.is_empty());

    stream.on_throttle_frame(&mut cx, ThrottleFrame::Window { stream_id: 1, update: 4 });
    assert_eq!(target.data_for(1), b"abcdefghijkl".to_vec());
    assert_eq!(target.ends, vec![1]);
}

#[test]
fn single_grant_exceeding_body_length_does_not_over_forward() {
    let config = Config::new();
    let mut factory = SourceInputStreamFactory::new(&config);
    let mut stream = factory.create(1);

    let mut source = FakeSource::default();
    let mut target = FakeTarget::new();
    let routes = single_route("svc");
    let mut registry = FakeCorrelationRegistry::default();
    let mut cx = Collaborators {
        slab: factory.slab_mut(),
        source: &mut source,
        target: &mut target,
        routes: &routes,
        correlation_registry: &mut registry,
        scratch: factory.scratch_mut(),
    };

    stream.on_source_frame(
        &mut cx,
        SourceFrame::Begin {
            source_id: 1,
            source_ref: 1,
            correlation_id: 10,
        },
    );
    stream.on_source_frame(
        &mut cx,
        SourceFrame::Data {
            payload: b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello",
        },
    );

    // grant far more credit than the 5-byte body needs
    stream.on_throttle_frame(&mut cx, ThrottleFrame::Window { stream_id: 1, update: 1024 });

    assert_eq!(target.data_for(1), b"hello".to_vec());
    assert_eq!(target.ends, vec![1]);
}
