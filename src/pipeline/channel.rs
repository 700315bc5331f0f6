//! Notification channel: the attach/detach/notify delivery mechanism.
//!
//! Every node in a topology owns exactly one `NotificationChannel`. The
//! channel keeps an ordered list of subscriber handles and the node's last
//! event envelope. It never owns its subscribers: handles are `NodeId`s in
//! the topology, or any comparable token a caller chooses.
//!
//! # Delivery contract
//!
//! - `notify` visits subscribers in attachment order, synchronously, once
//!   per attachment. Attaching the same subscriber twice means two
//!   deliveries per `notify`.
//! - Delivery is fail-fast: the first subscriber error stops the
//!   broadcast and is returned to the caller.
//! - The subscriber list must not change during `notify`. The borrow
//!   checker enforces this here (`notify` takes `&self`); the topology
//!   enforces it across the graph by lifting the publisher's channel out
//!   while it broadcasts. Concurrent attach/detach is unsupported.

use polars::prelude::DataFrame;

/// Tabular data flowing between nodes.
pub type Payload = DataFrame;

/// The event a node publishes to its subscribers.
///
/// Mutated in place by the owning node before each `notify`, read-only for
/// subscribers.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    /// Discriminator naming what published the event (`data_context`, or
    /// the algorithm's type name).
    pub kind: String,
    /// Snapshot of the configuration the publisher was built from.
    pub cfg: serde_yaml::Value,
    /// Current data payload, if the publisher has produced one.
    pub data: Option<Payload>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, cfg: serde_yaml::Value) -> Self {
        Self {
            kind: kind.into(),
            cfg,
            data: None,
        }
    }
}

/// Ordered subscriber list plus the owner's event envelope.
#[derive(Debug, Clone)]
pub struct NotificationChannel<S> {
    subscribers: Vec<S>,
    envelope: Envelope,
}

impl<S> Default for NotificationChannel<S> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            envelope: Envelope::default(),
        }
    }
}

impl<S: PartialEq> NotificationChannel<S> {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            subscribers: Vec::new(),
            envelope,
        }
    }

    /// Append a subscriber. Not idempotent.
    pub fn attach(&mut self, subscriber: S) {
        self.subscribers.push(subscriber);
    }

    /// Remove the first matching subscriber.
    ///
    /// Returns `None` when the subscriber is not attached.
    pub fn detach(&mut self, subscriber: &S) -> Option<S> {
        let pos = self.subscribers.iter().position(|s| s == subscriber)?;
        Some(self.subscribers.remove(pos))
    }

    /// Deliver the envelope to every subscriber in attachment order.
    pub fn notify<F, E>(&self, mut deliver: F) -> Result<(), E>
    where
        F: FnMut(&S, &Envelope) -> Result<(), E>,
    {
        for subscriber in &self.subscribers {
            deliver(subscriber, &self.envelope)?;
        }
        Ok(())
    }

    /// Deliver the envelope to a single subscriber, bypassing the broadcast.
    ///
    /// The target need not be attached; this is point-to-point forwarding.
    pub fn notify_one<F, E>(&self, subscriber: &S, deliver: F) -> Result<(), E>
    where
        F: FnOnce(&S, &Envelope) -> Result<(), E>,
    {
        deliver(subscriber, &self.envelope)
    }

    pub fn subscribers(&self) -> &[S] {
        &self.subscribers
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    /// Store a new payload in the envelope.
    pub fn publish(&mut self, payload: Payload) {
        self.envelope.data = Some(payload);
    }
}
