//! Node abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`Algorithm` trait**: for registered handlers. Any type that can
//!   react to an event implements it; the registry constructs them by name.
//! - **`AnyNode` enum**: a node is either a `DataContext` (source or sink)
//!   or a boxed algorithm, so the topology handles both uniformly.
//!
//! Pub/sub capability is composed, not inherited: `Node` pairs whatever it
//! wraps with its own `NotificationChannel`, so handlers never implement
//! attach/detach/notify themselves.

use crate::data::DataContext;
use crate::pipeline::channel::{Envelope, NotificationChannel, Payload};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::NodeId;
use std::fmt;

/// Receives events published by a node it is attached to.
pub trait Observer {
    /// React to `event`.
    ///
    /// Returning `Some(payload)` publishes the payload to this node's own
    /// subscribers; `None` ends the cascade along this branch.
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>>;
}

/// A registered, name-constructible handler.
pub trait Algorithm: Observer {
    /// Type name seeded into the envelope as its discriminator.
    fn kind(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Where a node sits in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Source,
    Algorithm,
    Sink,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeRole::Source => "data source",
            NodeRole::Algorithm => "algorithm",
            NodeRole::Sink => "data output",
        };
        f.write_str(label)
    }
}

/// Wrapper that holds either a data context or an algorithm (trait object).
pub enum AnyNode {
    Data(DataContext),
    Algorithm(Box<dyn Algorithm>),
}

impl AnyNode {
    pub fn kind(&self) -> &'static str {
        match self {
            AnyNode::Data(_) => DataContext::KIND,
            AnyNode::Algorithm(a) => a.kind(),
        }
    }

    pub fn as_data(&self) -> Option<&DataContext> {
        match self {
            AnyNode::Data(ctx) => Some(ctx),
            AnyNode::Algorithm(_) => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataContext> {
        match self {
            AnyNode::Data(ctx) => Some(ctx),
            AnyNode::Algorithm(_) => None,
        }
    }
}

impl Observer for AnyNode {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        match self {
            AnyNode::Data(ctx) => ctx.update(event),
            AnyNode::Algorithm(a) => a.update(event),
        }
    }
}

/// A constructed node: a name, its role, what it wraps and its channel.
pub struct Node {
    pub(crate) name: String,
    pub(crate) role: NodeRole,
    pub(crate) inner: AnyNode,
    pub(crate) channel: NotificationChannel<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, role: NodeRole, inner: AnyNode, envelope: Envelope) -> Self {
        Self {
            name: name.into(),
            role,
            inner,
            channel: NotificationChannel::new(envelope),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn inner(&self) -> &AnyNode {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut AnyNode {
        &mut self.inner
    }

    pub fn channel(&self) -> &NotificationChannel<NodeId> {
        &self.channel
    }

    pub fn envelope(&self) -> &Envelope {
        self.channel.envelope()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("kind", &self.inner.kind())
            .field("subscribers", &self.channel.subscribers())
            .finish()
    }
}
