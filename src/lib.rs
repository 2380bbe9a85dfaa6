// SPDX-License-Identifier: MPL-2.0

//! Control facade over running GStreamer pipelines.
//!
//! This crate drives pipelines that something else assembled: it parses a
//! textual launch description into a [`PipelineControl`], requests state
//! transitions, seeks and trick-play rate changes, resolves named elements
//! and their pads, links two independently owned pipelines through a
//! `proxysrc`/`proxysink` pair with a shared clock ([`ProxyLink`]), and
//! relays bus messages to a caller-supplied callback without blocking the
//! caller's thread ([`BusEventPump`]).
//!
//! GStreamer must be initialized once per process before any pipeline is
//! constructed:
//!
//! ```no_run
//! use gst_pipeline_control::{BusEventPump, PipelineControl};
//!
//! gst_pipeline_control::init()?;
//!
//! let control = PipelineControl::new("videotestsrc ! autovideosink")?;
//! control.play()?;
//! let mut pump = BusEventPump::start(&control, |event| {
//!     println!("{}: {}", event.source, event.kind);
//! })?;
//!
//! // ... later, from the owning thread:
//! control.stop()?;
//! pump.join();
//! # Ok::<(), gst_pipeline_control::Error>(())
//! ```

mod bus;
mod control;
mod element;
mod error;
mod proxy;

pub use bus::{BusEvent, BusEventPump, ErrorDetail, PumpState};
pub use control::{PipelineControl, PipelineState};
pub use element::ElementRef;
pub use error::Error;
pub use proxy::ProxyLink;

pub use gst;
pub use gst::{ClockTime, SeekFlags};

/// Initializes GStreamer.
///
/// Must be called exactly once before the first [`PipelineControl`] is
/// constructed; calling it again is harmless. The process owns this call —
/// it is never performed implicitly.
pub fn init() -> Result<(), Error> {
    gst::init().map_err(Error::Init)
}
