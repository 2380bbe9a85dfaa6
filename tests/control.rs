// SPDX-License-Identifier: MPL-2.0

use gst::prelude::*;
use pretty_assertions::assert_eq;
use serial_test::serial;

use gst_pipeline_control::{Error, PipelineControl, PipelineState};

fn init() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        gst::init().unwrap();
    });
}

#[test]
#[serial]
fn construction_error_carries_diagnostic() {
    init();

    let err = PipelineControl::new("no-such-element-zzz ! fakesink").unwrap_err();
    assert!(matches!(err, Error::Construction(ref message) if !message.is_empty()));
}

#[test]
#[serial]
fn single_element_description_is_rejected() {
    init();

    // A lone element is not wrapped into a pipeline by the parser.
    let err = PipelineControl::new("fakesink").unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[test]
#[serial]
fn adopts_prebuilt_pipeline() {
    init();

    let control = PipelineControl::from_pipeline(gst::Pipeline::new());
    assert_eq!(control.state().unwrap(), PipelineState::Null);
    assert!(control.find_child("anything").unwrap().is_none());
}

#[test]
#[serial]
fn state_transitions_are_observable() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();
    assert_eq!(control.state().unwrap(), PipelineState::Null);

    control.play().unwrap();
    let _ = control.pipeline().unwrap().state(gst::ClockTime::NONE);
    assert_eq!(control.state().unwrap(), PipelineState::Playing);

    control.pause().unwrap();
    let _ = control.pipeline().unwrap().state(gst::ClockTime::NONE);
    assert_eq!(control.state().unwrap(), PipelineState::Paused);

    control.stop().unwrap();
    assert_eq!(control.state().unwrap(), PipelineState::Null);
}

#[test]
#[serial]
fn find_child_returns_absence() {
    init();

    let control = PipelineControl::new("fakesrc name=src ! fakesink name=out").unwrap();

    assert!(control.find_child("nope").unwrap().is_none());

    let element = control.find_child("out").unwrap().unwrap();
    assert_eq!(element.name(), "out");
}

#[test]
#[serial]
fn quit_invalidates_every_operation() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();
    control.quit();

    assert!(matches!(control.play(), Err(Error::InvalidState)));
    assert!(matches!(control.stop(), Err(Error::InvalidState)));
    assert!(matches!(
        control.seek(gst::ClockTime::ZERO, gst::SeekFlags::FLUSH),
        Err(Error::InvalidState)
    ));
    assert!(matches!(control.query_position(), Err(Error::InvalidState)));
    assert!(matches!(control.find_child("src"), Err(Error::InvalidState)));
    assert!(matches!(control.delay(), Err(Error::InvalidState)));

    // Releasing twice is a no-op.
    control.quit();
}

#[test]
#[serial]
fn queries_report_unknown_as_absence() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();

    // Nothing is flowing, the engine cannot answer either query.
    assert_eq!(control.query_position().unwrap(), None);
    assert_eq!(control.query_duration().unwrap(), None);
}

#[test]
#[serial]
fn send_eos_reaches_the_bus() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();
    control.play().unwrap();
    let pipeline = control.pipeline().unwrap();
    let _ = pipeline.state(gst::ClockTime::NONE);

    control.send_eos().unwrap();

    let bus = pipeline.bus().unwrap();
    let msg = bus
        .timed_pop_filtered(10 * gst::ClockTime::SECOND, &[gst::MessageType::Eos])
        .expect("no EOS message");
    assert_eq!(msg.type_(), gst::MessageType::Eos);

    control.stop().unwrap();
}

#[test]
#[serial]
fn delay_and_latency_round_trip_within_one_nanosecond() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();

    // Unset until forced.
    assert_eq!(control.latency().unwrap(), None);

    for seconds in [0.0, 0.125, 0.123456789, 1.5, 2.000000001] {
        control.set_delay(seconds).unwrap();
        assert!((control.delay().unwrap() - seconds).abs() <= 1e-9);

        control.set_latency(seconds).unwrap();
        assert!((control.latency().unwrap().unwrap() - seconds).abs() <= 1e-9);
    }
}

#[test]
#[serial]
fn auto_flush_bus_is_settable() {
    init();

    let control = PipelineControl::new("fakesrc ! fakesink").unwrap();

    assert!(control.is_auto_flush_bus().unwrap());
    control.set_auto_flush_bus(false).unwrap();
    assert!(!control.is_auto_flush_bus().unwrap());
}
