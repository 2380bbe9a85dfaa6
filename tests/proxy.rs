// SPDX-License-Identifier: MPL-2.0

use gst::prelude::*;
use pretty_assertions::assert_eq;
use serial_test::serial;

use gst_pipeline_control::{Error, PipelineControl, ProxyLink};

fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        gst::init().unwrap();
    });
}

/// The proxy elements live in a separate plugin set that is not always
/// installed; without them these tests have nothing to exercise.
fn have_proxy_elements() -> bool {
    gst::ElementFactory::find("proxysrc").is_some()
        && gst::ElementFactory::find("proxysink").is_some()
}

fn bound_sink(source: &PipelineControl, name: &str) -> Option<gst::Element> {
    source
        .pipeline()
        .unwrap()
        .by_name(name)
        .unwrap()
        .property::<Option<gst::Element>>("proxysink")
}

#[test]
#[serial]
fn relinking_rebinds_and_shares_one_clock() {
    init();
    if !have_proxy_elements() {
        eprintln!("proxy elements not available, skipping");
        return;
    }

    let source = PipelineControl::new("proxysrc name=ssrc ! fakesink").unwrap();
    let sink_t = PipelineControl::new("fakesrc ! proxysink name=tsink").unwrap();
    let sink_u = PipelineControl::new("fakesrc ! proxysink name=usink").unwrap();

    let _first = ProxyLink::link(&source, "ssrc", &sink_t, "tsink").unwrap();
    assert_eq!(
        bound_sink(&source, "ssrc"),
        sink_t.pipeline().unwrap().by_name("tsink")
    );

    // Re-linking the same source cleanly replaces the binding.
    let second = ProxyLink::link(&source, "ssrc", &sink_u, "usink").unwrap();
    assert_eq!(
        bound_sink(&source, "ssrc"),
        sink_u.pipeline().unwrap().by_name("usink")
    );
    assert_eq!(second.sink_element(), "usink");

    let source_clock = source.pipeline().unwrap().pipeline_clock();
    let u_clock = sink_u.pipeline().unwrap().pipeline_clock();
    assert_eq!(source_clock, u_clock);
    assert_eq!(second.clock(), &source_clock);

    // Unlinking clears the binding but leaves the clocks alone.
    second.unlink().unwrap();
    assert_eq!(bound_sink(&source, "ssrc"), None);
    assert_eq!(source.pipeline().unwrap().pipeline_clock(), u_clock);
}

#[test]
#[serial]
fn link_failure_names_the_failing_side() {
    init();
    if !have_proxy_elements() {
        eprintln!("proxy elements not available, skipping");
        return;
    }

    let source = PipelineControl::new("proxysrc name=ssrc ! fakesink name=plainsink").unwrap();
    let sink = PipelineControl::new("fakesrc ! proxysink name=tsink").unwrap();

    assert!(matches!(
        ProxyLink::link(&source, "missing", &sink, "tsink"),
        Err(Error::ElementNotFound { ref element, .. }) if element == "missing"
    ));
    assert!(matches!(
        ProxyLink::link(&source, "ssrc", &sink, "missing"),
        Err(Error::ElementNotFound { ref element, .. }) if element == "missing"
    ));

    // An element that resolves but is no proxy source fails on that side.
    assert!(matches!(
        ProxyLink::link(&source, "plainsink", &sink, "tsink"),
        Err(Error::ElementNotFound { ref element, .. }) if element == "plainsink"
    ));
}

#[test]
#[serial]
fn sink_element_must_satisfy_the_binding() {
    init();
    if gst::ElementFactory::find("proxysrc").is_none() {
        eprintln!("proxy elements not available, skipping");
        return;
    }

    let source = PipelineControl::new("proxysrc name=ssrc ! fakesink").unwrap();
    let sink = PipelineControl::new("fakesrc ! fakesink name=notproxy").unwrap();

    assert!(matches!(
        ProxyLink::link(&source, "ssrc", &sink, "notproxy"),
        Err(Error::ElementNotFound { ref element, .. }) if element == "notproxy"
    ));
}
