//! Topology: the live node graph of one independent run.
//!
//! Nodes live in an arena indexed by `NodeId`; each node's channel lists the
//! ids of its subscribers. A cascade is plain recursion: `notify` delivers
//! the publisher's envelope to each subscriber, and a subscriber that
//! returns a payload publishes it and notifies its own subscribers before
//! the broadcast moves on.
//!
//! While a node broadcasts, its channel is lifted out of the arena so the
//! subscriber list cannot change under iteration. Edges that would close a
//! cycle are rejected when attached, which also guarantees no node is
//! re-entered during its own broadcast.

use crate::config::RunConfig;
use crate::data::DataContext;
use crate::pipeline::channel::Envelope;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::NodeId;
use crate::pipeline::node::{AnyNode, Node, NodeRole, Observer};
use crate::pipeline::registry::Registry;
use std::collections::HashMap;

pub struct Topology {
    name: String,
    nodes: Vec<Node>,
    /// Source ids in declaration order; fixes the firing order.
    sources: Vec<NodeId>,
    source_names: HashMap<String, NodeId>,
    algorithms: HashMap<String, NodeId>,
    sinks: HashMap<String, NodeId>,
    deliveries: u64,
}

impl Topology {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            sources: Vec::new(),
            source_names: HashMap::new(),
            algorithms: HashMap::new(),
            sinks: HashMap::new(),
            deliveries: 0,
        }
    }

    /// Construct and wire every node of `run`.
    ///
    /// Sources are built first, then algorithms through `registry`, then
    /// sinks. Edges are wired last, each target resolved among algorithms
    /// and then sinks. A sink that lists observers is rejected. No data
    /// moves until `execute`.
    pub fn build(name: &str, run: &RunConfig, registry: &Registry) -> PipelineResult<Self> {
        let mut topology = Self::new(name);
        let mut edges: Vec<(NodeId, &[String])> = Vec::new();

        for (source, cfg) in &run.data_sources {
            let ctx = DataContext::new(source, cfg).map_err(|e| e.at_node(source))?;
            let envelope = Envelope::new(DataContext::KIND, serde_yaml::to_value(cfg)?);
            let id = topology.add_node(Node::new(
                source,
                NodeRole::Source,
                AnyNode::Data(ctx),
                envelope,
            ));
            edges.push((id, cfg.observers.as_slice()));
        }

        for (algorithm, cfg) in &run.algorithms {
            let node = registry
                .create(algorithm, cfg)
                .map_err(|e| e.at_node(algorithm))?;
            let id = topology.add_node(node);
            edges.push((id, cfg.observers.as_slice()));
        }

        for (sink, cfg) in &run.data_output {
            if !cfg.observers.is_empty() {
                return Err(PipelineError::InvalidParam {
                    node: sink.clone(),
                    key: "observers".to_string(),
                    message: "a data output cannot have observers".to_string(),
                });
            }
            let ctx = DataContext::new(sink, cfg).map_err(|e| e.at_node(sink))?;
            let envelope = Envelope::new(DataContext::KIND, serde_yaml::to_value(cfg)?);
            topology.add_node(Node::new(sink, NodeRole::Sink, AnyNode::Data(ctx), envelope));
        }

        for (from, targets) in edges {
            for target in targets {
                let to = topology.resolve_target(target).ok_or_else(|| {
                    PipelineError::UnknownEdgeTarget {
                        from: topology.nodes[from.index()].name.clone(),
                        target: target.clone(),
                    }
                })?;
                topology.attach(from, to)?;
            }
        }

        tracing::info!(
            "built run {}: {} sources, {} algorithms, {} outputs",
            name,
            topology.sources.len(),
            topology.algorithms.len(),
            topology.sinks.len()
        );
        Ok(topology)
    }

    /// Add a node to the arena. A name already used in the same role is
    /// rebound to the new node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let names = match node.role {
            NodeRole::Source => {
                self.sources.push(id);
                &mut self.source_names
            }
            NodeRole::Algorithm => &mut self.algorithms,
            NodeRole::Sink => &mut self.sinks,
        };
        names.insert(node.name.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Look up a node by role and name.
    pub fn find(&self, role: NodeRole, name: &str) -> Option<NodeId> {
        let names = match role {
            NodeRole::Source => &self.source_names,
            NodeRole::Algorithm => &self.algorithms,
            NodeRole::Sink => &self.sinks,
        };
        names.get(name).copied()
    }

    /// Resolve an edge target: algorithms take precedence over sinks.
    pub fn resolve_target(&self, name: &str) -> Option<NodeId> {
        self.find(NodeRole::Algorithm, name)
            .or_else(|| self.find(NodeRole::Sink, name))
    }

    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    pub fn algorithm_count(&self) -> usize {
        self.algorithms.len()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Subscriber deliveries performed so far.
    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }

    fn check(&self, id: NodeId) -> PipelineResult<usize> {
        let idx = id.index();
        if idx < self.nodes.len() {
            Ok(idx)
        } else {
            Err(PipelineError::UnknownNode(id))
        }
    }

    /// Subscribe `subscriber` to `publisher`.
    pub fn attach(&mut self, publisher: NodeId, subscriber: NodeId) -> PipelineResult<()> {
        let from = self.check(publisher)?;
        self.check(subscriber)?;

        self.check_acyclic(publisher, subscriber)?;

        self.nodes[from].channel.attach(subscriber);
        tracing::debug!(
            "attached {} to {}",
            self.nodes[subscriber.index()].name,
            self.nodes[from].name
        );
        Ok(())
    }

    /// Remove the first attachment of `subscriber` to `publisher`.
    pub fn detach(&mut self, publisher: NodeId, subscriber: NodeId) -> PipelineResult<()> {
        let from = self.check(publisher)?;
        let to = self.check(subscriber)?;
        match self.nodes[from].channel.detach(&subscriber) {
            Some(_) => {
                tracing::debug!("detached {} from {}", self.nodes[to].name, self.nodes[from].name);
                Ok(())
            }
            None => Err(PipelineError::SubscriberNotFound {
                publisher: self.nodes[from].name.clone(),
                subscriber: self.nodes[to].name.clone(),
            }),
        }
    }

    fn check_acyclic(&self, from: NodeId, to: NodeId) -> PipelineResult<()> {
        match self.cycle_path(from, to) {
            Some(path) => Err(PipelineError::CycleDetected {
                path: path
                    .iter()
                    .map(|id| self.nodes[id.index()].name.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> "),
            }),
            None => Ok(()),
        }
    }

    /// The path `from -> to -> ... -> from` if attaching `from -> to` would
    /// close a cycle.
    fn cycle_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let mut parent: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![to];
        visited[to.index()] = true;

        while let Some(current) = stack.pop() {
            if current == from {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(prev) = parent[cursor.index()] {
                    path.push(prev);
                    cursor = prev;
                }
                path.push(from);
                path.reverse();
                return Some(path);
            }
            for &next in self.nodes[current.index()].channel.subscribers() {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    parent[next.index()] = Some(current);
                    stack.push(next);
                }
            }
        }
        None
    }

    /// Broadcast `publisher`'s envelope to all of its subscribers.
    pub fn notify(&mut self, publisher: NodeId) -> PipelineResult<()> {
        let idx = self.check(publisher)?;
        let channel = std::mem::take(&mut self.nodes[idx].channel);
        tracing::debug!(
            "{} notifying {} subscribers",
            self.nodes[idx].name,
            channel.len()
        );
        let result = channel.notify(|&subscriber, event| self.deliver(subscriber, event));
        self.nodes[idx].channel = channel;
        result
    }

    /// Deliver `publisher`'s envelope to `subscriber` only. The subscriber
    /// need not be attached.
    pub fn notify_one(&mut self, publisher: NodeId, subscriber: NodeId) -> PipelineResult<()> {
        let idx = self.check(publisher)?;
        self.check(subscriber)?;
        self.check_acyclic(publisher, subscriber)?;
        let channel = std::mem::take(&mut self.nodes[idx].channel);
        let result = channel.notify_one(&subscriber, |&s, event| self.deliver(s, event));
        self.nodes[idx].channel = channel;
        result
    }

    fn deliver(&mut self, subscriber: NodeId, event: &Envelope) -> PipelineResult<()> {
        let idx = self.check(subscriber)?;
        self.deliveries += 1;

        let node = &mut self.nodes[idx];
        tracing::debug!("delivering {} event to {}", event.kind, node.name);
        let output = node
            .inner
            .update(event)
            .map_err(|e| e.at_node(node.name.as_str()))?;

        if let Some(payload) = output {
            node.channel.publish(payload);
            self.notify(subscriber)?;
        }
        Ok(())
    }

    /// Load `source` once and cascade its data through the graph.
    pub fn on(&mut self, source: NodeId) -> PipelineResult<()> {
        let idx = self.check(source)?;
        let node = &mut self.nodes[idx];
        let ctx = match (node.role, node.inner.as_data_mut()) {
            (NodeRole::Source, Some(ctx)) => ctx,
            _ => {
                return Err(PipelineError::NotASource {
                    name: node.name.clone(),
                })
            }
        };

        let batch = ctx.load().map_err(|e| e.at_node(node.name.as_str()))?;
        tracing::info!(
            "loaded {} rows from {} ({})",
            batch.payload.height(),
            node.name,
            batch.key
        );
        node.channel.publish(batch.payload);
        self.notify(source)
    }

    /// Fire every source in declaration order.
    pub fn execute(&mut self) -> PipelineResult<()> {
        tracing::info!("executing run {}", self.name);
        for source in self.sources.clone() {
            self.on(source)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("deliveries", &self.deliveries)
            .finish()
    }
}
