// SPDX-License-Identifier: MPL-2.0

use gst::prelude::*;

use std::sync::{Arc, LazyLock, Mutex, Weak};
use std::thread;

use crate::control::PipelineControl;
use crate::error::Error;

mod message;

pub use message::{BusEvent, ErrorDetail};

static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "buspump",
        gst::DebugColorFlags::empty(),
        Some("Bus event pump"),
    )
});

/// Upper bound on one blocking bus wait. A timeout is not an error, it only
/// makes the pump recheck pipeline liveness while the bus is quiet.
const POLL_TIMEOUT: gst::ClockTime = gst::ClockTime::from_mseconds(200);

/// Lifecycle of a [`BusEventPump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    /// Created but not yet scheduled on the background thread.
    Idle,
    /// Blocked waiting for the next bus message, bounded by a timeout.
    Polling,
    /// Marshaling a drained message and invoking the caller's callback.
    Delivering,
    /// Terminal. The pump released its pipeline reference and performs no
    /// further work; pumping again requires a fresh
    /// [`start`](BusEventPump::start).
    Stopped,
}

/// Where the pump's cycle gets its messages and its liveness answer from.
///
/// The production source wraps a pipeline's bus; tests drive the same loop
/// with a scripted source.
trait MessageSource {
    /// Blocks for up to `timeout` waiting for the next message. `None` is a
    /// timeout, not an error.
    fn poll(&mut self, timeout: gst::ClockTime) -> Option<gst::Message>;

    /// Whether the pipeline behind this source is still live. Once this
    /// returns `false` the pump stops for good.
    fn is_live(&mut self) -> bool;
}

struct BusSource {
    bus: gst::Bus,
    // Keeps the pipeline handle alive for the whole run, even after the
    // owning control released its own reference.
    pipeline: gst::Pipeline,
    control: Weak<Mutex<Option<gst::Pipeline>>>,
}

impl MessageSource for BusSource {
    fn poll(&mut self, timeout: gst::ClockTime) -> Option<gst::Message> {
        self.bus.timed_pop(timeout)
    }

    fn is_live(&mut self) -> bool {
        let control_alive = self
            .control
            .upgrade()
            .is_some_and(|slot| slot.lock().unwrap().is_some());

        // The raw engine state, not the caller-visible mapping: a pipeline
        // passing through READY is not being torn down.
        control_alive && self.pipeline.current_state() != gst::State::Null
    }
}

/// Drains a pipeline's bus on a background thread and hands each message,
/// marshaled into a [`BusEvent`], to a caller-supplied callback.
///
/// The pump runs autonomously once started: it polls with a bounded timeout,
/// delivers at most one event at a time in bus order, and halts on its own
/// once it observes the pipeline in NULL or the control
/// [`quit`](PipelineControl::quit). No lock is held across the blocking wait,
/// so the owning thread can stop or seek the pipeline at any time; a stop is
/// observed within one timeout interval.
///
/// Dropping the handle detaches the pump without stopping it; it still halts
/// once the pipeline is torn down.
pub struct BusEventPump {
    state: Arc<Mutex<PumpState>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl BusEventPump {
    /// Starts pumping `control`'s bus into `on_event`.
    ///
    /// Callbacks run serialized on the pump's background thread; callers that
    /// need deliveries on a particular thread bridge them with a channel.
    pub fn start<F>(control: &PipelineControl, on_event: F) -> Result<BusEventPump, Error>
    where
        F: FnMut(BusEvent) + Send + 'static,
    {
        let pipeline = control.pipeline()?;
        let bus = pipeline.bus().expect("pipeline without a bus");

        gst::debug!(CAT, obj = pipeline, "starting bus pump");

        let source = BusSource {
            bus,
            pipeline,
            control: control.handle_slot(),
        };

        let state = Arc::new(Mutex::new(PumpState::Idle));
        let thread = thread::spawn({
            let state = state.clone();
            move || run(source, on_event, &state)
        });

        Ok(BusEventPump {
            state,
            thread: Some(thread),
        })
    }

    pub fn state(&self) -> PumpState {
        *self.state.lock().unwrap()
    }

    /// Blocks until the pump reaches [`PumpState::Stopped`].
    ///
    /// The pump only stops once the pipeline goes to NULL or the control is
    /// quit; join after requesting one of those from the owning thread.
    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// One poll in flight at a time: the next poll is not issued until the
/// previous message's delivery completed and liveness was rechecked.
fn run<S: MessageSource>(
    mut source: S,
    mut on_event: impl FnMut(BusEvent),
    state: &Mutex<PumpState>,
) {
    loop {
        *state.lock().unwrap() = PumpState::Polling;
        let message = source.poll(POLL_TIMEOUT);

        *state.lock().unwrap() = PumpState::Delivering;
        if let Some(message) = message {
            on_event(BusEvent::from_message(&message));
        }

        if !source.is_live() {
            break;
        }
    }

    gst::debug!(CAT, "bus pump stopped");
    *state.lock().unwrap() = PumpState::Stopped;
}
