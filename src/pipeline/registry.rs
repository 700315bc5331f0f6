//! Name-keyed algorithm registry.
//!
//! Maps a string name to a factory that builds a boxed `Algorithm` from its
//! instance name and configuration. The registry is an ordinary value: the
//! caller builds one per process and hands it to the topology builder.

use crate::config::AlgorithmConfig;
use crate::pipeline::channel::Envelope;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node::{Algorithm, AnyNode, Node, NodeRole};
use crate::pipeline::nodes::{HeadNode, PassthroughNode, SelectNode};
use std::collections::BTreeMap;

/// Builds an algorithm from its instance name and configuration.
pub type AlgorithmFactory =
    Box<dyn Fn(&str, &AlgorithmConfig) -> PipelineResult<Box<dyn Algorithm>>>;

#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<String, AlgorithmFactory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in algorithms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(PassthroughNode::NAME, |name, cfg| {
            Ok(Box::new(PassthroughNode::from_config(name, cfg)?))
        });
        registry.register(SelectNode::NAME, |name, cfg| {
            Ok(Box::new(SelectNode::from_config(name, cfg)?))
        });
        registry.register(HeadNode::NAME, |name, cfg| {
            Ok(Box::new(HeadNode::from_config(name, cfg)?))
        });
        registry
    }

    /// Bind `name` to `factory`. An existing binding is replaced with a
    /// warning.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str, &AlgorithmConfig) -> PipelineResult<Box<dyn Algorithm>> + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            tracing::warn!("overriding registered algorithm {}", name);
        }
        self.factories.insert(name, Box::new(factory));
    }

    /// Bind `name` to a type constructed with `Default`, ignoring its
    /// configuration.
    pub fn register_default<A>(&mut self, name: impl Into<String>)
    where
        A: Algorithm + Default + 'static,
    {
        self.register(name, |_, _| Ok(Box::new(A::default())));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct the algorithm instance `instance` from `cfg`.
    ///
    /// The handler is looked up by `cfg.algorithm`, falling back to the
    /// instance name. The returned node carries a fresh channel whose
    /// envelope is seeded with the algorithm's kind and its configuration.
    pub fn create(&self, instance: &str, cfg: &AlgorithmConfig) -> PipelineResult<Node> {
        let handler = cfg.handler_name(instance);
        let factory = self
            .factories
            .get(handler)
            .ok_or_else(|| PipelineError::UnknownHandler {
                name: handler.to_string(),
            })?;
        let algorithm = factory(instance, cfg)?;
        let envelope = Envelope::new(algorithm.kind(), serde_yaml::to_value(cfg)?);
        tracing::debug!("created {} ({}) from {}", instance, algorithm.kind(), handler);
        Ok(Node::new(
            instance,
            NodeRole::Algorithm,
            AnyNode::Algorithm(algorithm),
            envelope,
        ))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
