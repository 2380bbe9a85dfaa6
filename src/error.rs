// SPDX-License-Identifier: MPL-2.0

use gst::glib;

/// Errors surfaced synchronously by the control surface.
///
/// Errors reported by a running pipeline (decode failures, negotiation
/// failures, ...) are never raised through this type. They arrive
/// asynchronously as error-tagged [`BusEvent`](crate::BusEvent)s carrying an
/// [`ErrorDetail`](crate::ErrorDetail).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The pipeline description could not be turned into a pipeline. Carries
    /// the engine's diagnostic message.
    #[error("failed to construct pipeline: {0}")]
    Construction(String),

    /// A named element lookup failed.
    #[error("no element {element:?} in pipeline {pipeline:?}")]
    ElementNotFound { pipeline: String, element: String },

    /// The operation was attempted after [`quit`](crate::PipelineControl::quit)
    /// released the pipeline.
    #[error("pipeline has been shut down")]
    InvalidState,

    /// GStreamer could not be initialized.
    #[error("failed to initialize GStreamer: {0}")]
    Init(glib::Error),
}
