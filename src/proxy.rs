// SPDX-License-Identifier: MPL-2.0

use gst::glib;
use gst::prelude::*;

use std::sync::{LazyLock, Mutex, Weak};

use crate::control::PipelineControl;
use crate::error::Error;

static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "proxylink",
        gst::DebugColorFlags::empty(),
        Some("Cross-pipeline proxy link"),
    )
});

/// A proxy binding between two independently owned pipelines.
///
/// [`link`](ProxyLink::link) wires the source pipeline's proxy-source element
/// to the sink pipeline's proxy-sink element and puts both pipelines on one
/// shared system clock, so buffers produced in the sink pipeline carry
/// timestamps the source pipeline can interpret. The clock stays assigned for
/// the rest of both pipelines' lives; [`unlink`](ProxyLink::unlink) only
/// clears the element binding.
pub struct ProxyLink {
    source: Weak<Mutex<Option<gst::Pipeline>>>,
    source_element: String,
    sink_pipeline: String,
    sink_element: String,
    clock: gst::Clock,
}

impl ProxyLink {
    /// Binds `source_element` in `source` to `sink_element` in `sink` and
    /// installs one shared clock on both pipelines.
    ///
    /// Any previous binding on the source element is cleared first, so
    /// re-linking the same source to a different sink is clean. Both elements
    /// are resolved, and the source element's `proxysink` property verified
    /// against the sink element, before anything is mutated; resolution
    /// failure on either side is reported as [`Error::ElementNotFound`]
    /// naming that side, and leaves the clocks untouched.
    pub fn link(
        source: &PipelineControl,
        source_element: &str,
        sink: &PipelineControl,
        sink_element: &str,
    ) -> Result<ProxyLink, Error> {
        let source_pipeline = source.pipeline()?;
        let sink_pipeline = sink.pipeline()?;

        let psrc = source_pipeline
            .by_name(source_element)
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: source_pipeline.name().to_string(),
                element: source_element.to_string(),
            })?;
        let psink = sink_pipeline
            .by_name(sink_element)
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: sink_pipeline.name().to_string(),
                element: sink_element.to_string(),
            })?;

        // The source element must be a proxy source, i.e. expose a sink
        // binding the resolved sink element satisfies.
        let pspec = psrc
            .find_property("proxysink")
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: source_pipeline.name().to_string(),
                element: source_element.to_string(),
            })?;
        if !psink.type_().is_a(pspec.value_type()) {
            return Err(Error::ElementNotFound {
                pipeline: sink_pipeline.name().to_string(),
                element: sink_element.to_string(),
            });
        }

        gst::debug!(
            CAT,
            obj = source_pipeline,
            "linking {:?} to {:?} in {:?}",
            source_element,
            sink_element,
            sink_pipeline.name()
        );

        // Clear-then-bind so a stale binding never survives a re-link.
        psrc.set_property_from_value("proxysink", &glib::Value::from_type(pspec.value_type()));
        psrc.set_property("proxysink", &psink);

        let clock = gst::SystemClock::obtain();
        source_pipeline.use_clock(Some(&clock));
        sink_pipeline.use_clock(Some(&clock));

        Ok(ProxyLink {
            source: source.handle_slot(),
            source_element: source_element.to_string(),
            sink_pipeline: sink_pipeline.name().to_string(),
            sink_element: sink_element.to_string(),
            clock,
        })
    }

    /// Clears the source element's sink binding, disconnecting the two
    /// pipelines. The shared clock assignment stays in place on both sides.
    pub fn unlink(&self) -> Result<(), Error> {
        let slot = self.source.upgrade().ok_or(Error::InvalidState)?;
        let pipeline = slot.lock().unwrap().clone().ok_or(Error::InvalidState)?;

        let psrc = pipeline
            .by_name(&self.source_element)
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: pipeline.name().to_string(),
                element: self.source_element.clone(),
            })?;
        let pspec = psrc
            .find_property("proxysink")
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: pipeline.name().to_string(),
                element: self.source_element.clone(),
            })?;

        gst::debug!(CAT, obj = pipeline, "unlinking {:?}", self.source_element);
        psrc.set_property_from_value("proxysink", &glib::Value::from_type(pspec.value_type()));

        Ok(())
    }

    /// The proxy-source element this link binds.
    pub fn source_element(&self) -> &str {
        &self.source_element
    }

    /// Name of the pipeline the source is bound into.
    pub fn sink_pipeline(&self) -> &str {
        &self.sink_pipeline
    }

    /// The proxy-sink element the source is bound to.
    pub fn sink_element(&self) -> &str {
        &self.sink_element
    }

    /// The clock shared by both pipelines.
    pub fn clock(&self) -> &gst::Clock {
        &self.clock
    }
}
