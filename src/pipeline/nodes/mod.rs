//! Built-in algorithms.
//!
//! Each one forwards a transformed copy of the payload it receives, so it
//! can sit anywhere between a source and a sink.

pub mod head;
pub mod passthrough;
pub mod select;

pub use head::HeadNode;
pub use passthrough::PassthroughNode;
pub use select::SelectNode;

use crate::pipeline::channel::{Envelope, Payload};
use crate::pipeline::error::{PipelineError, PipelineResult};

/// The payload carried by `event`, or `MissingPayload` for `node`.
pub(crate) fn payload<'a>(node: &str, event: &'a Envelope) -> PipelineResult<&'a Payload> {
    event.data.as_ref().ok_or_else(|| PipelineError::MissingPayload {
        node: node.to_string(),
    })
}
