// SPDX-License-Identifier: MPL-2.0

use gst::prelude::*;

use std::sync::{Arc, LazyLock, Mutex, Weak};

use crate::element::ElementRef;
use crate::error::Error;

static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "pipelinectl",
        gst::DebugColorFlags::empty(),
        Some("Pipeline control facade"),
    )
});

/// Pipeline state as exposed to callers.
///
/// The engine's READY intermediate is not surfaced; [`PipelineControl::state`]
/// maps it to [`PipelineState::Null`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Null,
    Paused,
    Playing,
}

/// Owns one running pipeline and exposes lifecycle and motion control over it.
///
/// State transitions are fire-and-forget requests: completion (or failure) is
/// only observable through bus events or later queries. After [`quit`] every
/// other operation fails with [`Error::InvalidState`].
///
/// [`quit`]: PipelineControl::quit
#[derive(Debug)]
pub struct PipelineControl {
    inner: Arc<Mutex<Option<gst::Pipeline>>>,
}

impl PipelineControl {
    /// Parses a textual pipeline description into a pipeline in the NULL
    /// state.
    ///
    /// The engine's diagnostic message is carried in
    /// [`Error::Construction`] when the description is malformed or does not
    /// describe a pipeline.
    pub fn new(description: &str) -> Result<Self, Error> {
        let element = gst::parse::launch(description)
            .map_err(|err| Error::Construction(err.message().to_string()))?;

        let pipeline = element.downcast::<gst::Pipeline>().map_err(|_| {
            Error::Construction("description does not describe a pipeline".to_string())
        })?;

        gst::debug!(CAT, obj = pipeline, "constructed from {:?}", description);

        Ok(Self::from_pipeline(pipeline))
    }

    /// Adopts an already-built pipeline.
    pub fn from_pipeline(pipeline: gst::Pipeline) -> Self {
        PipelineControl {
            inner: Arc::new(Mutex::new(Some(pipeline))),
        }
    }

    /// Returns the underlying pipeline handle for direct engine access.
    pub fn pipeline(&self) -> Result<gst::Pipeline, Error> {
        self.inner.lock().unwrap().clone().ok_or(Error::InvalidState)
    }

    pub(crate) fn handle_slot(&self) -> Weak<Mutex<Option<gst::Pipeline>>> {
        Arc::downgrade(&self.inner)
    }

    /// Requests a transition to PLAYING.
    pub fn play(&self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        gst::debug!(CAT, obj = pipeline, "requesting PLAYING");
        let _ = pipeline.set_state(gst::State::Playing);
        Ok(())
    }

    /// Requests a transition to PAUSED.
    pub fn pause(&self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        gst::debug!(CAT, obj = pipeline, "requesting PAUSED");
        let _ = pipeline.set_state(gst::State::Paused);
        Ok(())
    }

    /// Requests a transition to NULL. A running [`BusEventPump`] observes this
    /// on its next cycle and halts.
    ///
    /// [`BusEventPump`]: crate::BusEventPump
    pub fn stop(&self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        gst::debug!(CAT, obj = pipeline, "requesting NULL");
        let _ = pipeline.set_state(gst::State::Null);
        Ok(())
    }

    /// Requests an absolute seek to `target` with the given flag set.
    ///
    /// The returned flag reflects whether the engine accepted the request,
    /// not whether the seek has completed.
    pub fn seek(&self, target: gst::ClockTime, flags: gst::SeekFlags) -> Result<bool, Error> {
        let pipeline = self.pipeline()?;
        gst::debug!(CAT, obj = pipeline, "seeking to {}", target);

        Ok(pipeline
            .seek(
                1.0,
                flags,
                gst::SeekType::Set,
                target,
                gst::SeekType::None,
                gst::ClockTime::ZERO,
            )
            .is_ok())
    }

    /// Changes playback speed and direction.
    ///
    /// For `rate > 0` this seeks from the current position to the end of the
    /// stream at the new rate. For `rate <= 0` it seeks from the start of the
    /// stream to the current position, playing the already-elapsed segment in
    /// reverse. If the current position is unknown the request is not
    /// accepted.
    pub fn set_rate(&self, rate: f64, flags: gst::SeekFlags) -> Result<bool, Error> {
        let pipeline = self.pipeline()?;

        let Some(position) = pipeline.query_position::<gst::ClockTime>() else {
            gst::debug!(
                CAT,
                obj = pipeline,
                "rejecting rate change to {}, position unknown",
                rate
            );
            return Ok(false);
        };

        gst::debug!(
            CAT,
            obj = pipeline,
            "changing rate to {} at position {}",
            rate,
            position
        );

        let res = if rate > 0.0 {
            pipeline.seek(
                rate,
                flags,
                gst::SeekType::Set,
                position,
                gst::SeekType::End,
                gst::ClockTime::ZERO,
            )
        } else {
            pipeline.seek(
                rate,
                flags,
                gst::SeekType::Set,
                gst::ClockTime::ZERO,
                gst::SeekType::Set,
                position,
            )
        };

        Ok(res.is_ok())
    }

    /// Returns the current playback position, or `None` if the engine cannot
    /// answer yet.
    pub fn query_position(&self) -> Result<Option<gst::ClockTime>, Error> {
        Ok(self.pipeline()?.query_position::<gst::ClockTime>())
    }

    /// Returns the total duration, or `None` if the engine cannot answer yet.
    pub fn query_duration(&self) -> Result<Option<gst::ClockTime>, Error> {
        Ok(self.pipeline()?.query_duration::<gst::ClockTime>())
    }

    /// Injects an end-of-stream event into the pipeline. Fire-and-forget; the
    /// resulting EOS message arrives on the bus once all sinks drained.
    pub fn send_eos(&self) -> Result<(), Error> {
        let pipeline = self.pipeline()?;
        gst::debug!(CAT, obj = pipeline, "sending EOS");
        let _ = pipeline.send_event(gst::event::Eos::new());
        Ok(())
    }

    /// Observes the current caller-visible pipeline state.
    pub fn state(&self) -> Result<PipelineState, Error> {
        Ok(match self.pipeline()?.current_state() {
            gst::State::Playing => PipelineState::Playing,
            gst::State::Paused => PipelineState::Paused,
            _ => PipelineState::Null,
        })
    }

    /// Looks up a named child element, searching nested bins too.
    ///
    /// Returns `Ok(None)` when no such element exists. The returned reference
    /// re-resolves by name on every operation, it never caches the element.
    pub fn find_child(&self, name: &str) -> Result<Option<ElementRef<'_>>, Error> {
        let pipeline = self.pipeline()?;
        Ok(pipeline
            .by_name(name)
            .map(|_| ElementRef::new(self, name.to_string())))
    }

    /// Whether the bus is flushed automatically when the pipeline goes to
    /// NULL.
    pub fn is_auto_flush_bus(&self) -> Result<bool, Error> {
        Ok(self.pipeline()?.property::<bool>("auto-flush-bus"))
    }

    pub fn set_auto_flush_bus(&self, auto_flush: bool) -> Result<(), Error> {
        self.pipeline()?.set_property("auto-flush-bus", auto_flush);
        Ok(())
    }

    /// The extra output delay in seconds.
    pub fn delay(&self) -> Result<f64, Error> {
        Ok(clock_time_to_seconds(self.pipeline()?.delay()))
    }

    /// Sets the extra output delay in seconds. `seconds` must be
    /// non-negative; the value is stored with nanosecond resolution and reads
    /// back within 1 ns.
    pub fn set_delay(&self, seconds: f64) -> Result<(), Error> {
        self.pipeline()?
            .set_delay(gst::ClockTime::from_seconds_f64(seconds));
        Ok(())
    }

    /// The configured end-to-end latency in seconds, or `None` when the
    /// pipeline computes it on its own.
    pub fn latency(&self) -> Result<Option<f64>, Error> {
        Ok(self.pipeline()?.latency().map(clock_time_to_seconds))
    }

    /// Forces the end-to-end latency, in non-negative seconds. Stored with
    /// nanosecond resolution, reads back within 1 ns.
    pub fn set_latency(&self, seconds: f64) -> Result<(), Error> {
        self.pipeline()?
            .set_latency(gst::ClockTime::from_seconds_f64(seconds));
        Ok(())
    }

    /// Releases the owned pipeline handle.
    ///
    /// Idempotent. Afterwards every other operation on this control fails
    /// with [`Error::InvalidState`]. A running [`BusEventPump`] keeps its own
    /// reference to the handle and halts on its next liveness check.
    ///
    /// [`BusEventPump`]: crate::BusEventPump
    pub fn quit(&self) {
        if let Some(pipeline) = self.inner.lock().unwrap().take() {
            gst::debug!(CAT, obj = pipeline, "releasing pipeline");
        }
    }
}

fn clock_time_to_seconds(time: gst::ClockTime) -> f64 {
    time.nseconds() as f64 / 1_000_000_000.0
}
