// SPDX-License-Identifier: MPL-2.0

use gst::prelude::*;

use std::sync::LazyLock;

use crate::control::PipelineControl;
use crate::error::Error;

static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "elementref",
        gst::DebugColorFlags::empty(),
        Some("Named element access"),
    )
});

/// A name-backed reference to one element inside a pipeline.
///
/// The reference never caches the element: every operation re-resolves it by
/// name against the pipeline's current graph and fails with
/// [`Error::ElementNotFound`] if it has disappeared in the meantime.
/// Obtained from [`PipelineControl::find_child`].
pub struct ElementRef<'a> {
    control: &'a PipelineControl,
    name: String,
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(control: &'a PipelineControl, name: String) -> Self {
        ElementRef { control, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves the element in the pipeline's current graph.
    pub fn element(&self) -> Result<gst::Element, Error> {
        let pipeline = self.control.pipeline()?;
        pipeline
            .by_name(&self.name)
            .ok_or_else(|| Error::ElementNotFound {
                pipeline: pipeline.name().to_string(),
                element: self.name.clone(),
            })
    }

    /// Assigns the named static pad to one of the element's own properties.
    ///
    /// Best effort: a missing pad or property leaves the element untouched
    /// without reporting failure.
    pub fn set_pad(&self, property: &str, pad_name: &str) -> Result<(), Error> {
        let element = self.element()?;

        let Some(pad) = element.static_pad(pad_name) else {
            gst::debug!(
                CAT,
                obj = element,
                "no pad {:?} to assign to {:?}",
                pad_name,
                property
            );
            return Ok(());
        };

        let Some(pspec) = element.find_property(property) else {
            gst::debug!(
                CAT,
                obj = element,
                "no property {:?} to assign pad {:?} to",
                property,
                pad_name
            );
            return Ok(());
        };

        if !pad.type_().is_a(pspec.value_type()) {
            gst::debug!(
                CAT,
                obj = element,
                "property {:?} does not take a pad",
                property
            );
            return Ok(());
        }

        element.set_property(property, &pad);

        Ok(())
    }

    /// Looks up a static pad by name. `Ok(None)` when the element has no such
    /// pad.
    pub fn static_pad(&self, pad_name: &str) -> Result<Option<gst::Pad>, Error> {
        Ok(self.element()?.static_pad(pad_name))
    }

    /// The currently negotiated caps on the named pad, or `Ok(None)` while the
    /// pad is missing or its format has not been negotiated yet.
    pub fn pad_caps(&self, pad_name: &str) -> Result<Option<gst::Caps>, Error> {
        Ok(self
            .element()?
            .static_pad(pad_name)
            .and_then(|pad| pad.current_caps()))
    }

    /// Pushes an upstream force-key-unit request with the given counter on the
    /// element's "sink" pad.
    ///
    /// Fire-and-forget; without a "sink" pad nothing is sent.
    pub fn force_key_unit(&self, count: u32) -> Result<(), Error> {
        let element = self.element()?;

        let Some(pad) = element.static_pad("sink") else {
            gst::debug!(CAT, obj = element, "no sink pad for force-key-unit request");
            return Ok(());
        };

        let fku = gst_video::UpstreamForceKeyUnitEvent::builder()
            .all_headers(true)
            .count(count)
            .build();

        gst::debug!(CAT, obj = element, "requesting key unit {}", count);
        let _ = pad.push_event(fku);

        Ok(())
    }

    /// Requests a transition of this element alone to PLAYING.
    pub fn play(&self) -> Result<(), Error> {
        let element = self.element()?;
        gst::debug!(CAT, obj = element, "requesting PLAYING");
        let _ = element.set_state(gst::State::Playing);
        Ok(())
    }

    /// Requests a transition of this element alone to PAUSED.
    pub fn pause(&self) -> Result<(), Error> {
        let element = self.element()?;
        gst::debug!(CAT, obj = element, "requesting PAUSED");
        let _ = element.set_state(gst::State::Paused);
        Ok(())
    }

    /// Requests a transition of this element alone to NULL.
    pub fn stop(&self) -> Result<(), Error> {
        let element = self.element()?;
        gst::debug!(CAT, obj = element, "requesting NULL");
        let _ = element.set_state(gst::State::Null);
        Ok(())
    }

    /// Forces renegotiation of the branch downstream of this element, then
    /// sets the element to PLAYING.
    pub fn negotiate(&self) -> Result<(), Error> {
        let element = self.element()?;

        if let Some(pad) = element.static_pad("src") {
            gst::debug!(CAT, obj = element, "pushing reconfigure");
            let _ = pad.push_event(gst::event::Reconfigure::new());
        } else {
            gst::debug!(CAT, obj = element, "no src pad to reconfigure");
        }

        let _ = element.set_state(gst::State::Playing);

        Ok(())
    }
}
