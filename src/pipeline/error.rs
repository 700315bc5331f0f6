//! Pipeline-specific error types.

use crate::pipeline::id::NodeId;
use thiserror::Error;

/// Errors that can occur within the pipeline system.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("class {name} does not exist in the registry")]
    UnknownHandler { name: String },

    #[error("strategy '{strategy}' not implemented for {component}; options include: {options}")]
    UnsupportedStrategy {
        component: &'static str,
        strategy: String,
        options: &'static str,
    },

    #[error("edge {from} -> {target}: target is neither an algorithm nor a data output")]
    UnknownEdgeTarget { from: String, target: String },

    #[error("subscriber {subscriber} is not attached to {publisher}")]
    SubscriberNotFound {
        publisher: String,
        subscriber: String,
    },

    #[error("cycle detected in pipeline graph: {path}")]
    CycleDetected { path: String },

    #[error("data source {name} has already been loaded")]
    SourceConsumed { name: String },

    #[error("{node} received an event without a data payload")]
    MissingPayload { node: String },

    #[error("{node}: missing required parameter '{key}'")]
    MissingParam { node: String, key: String },

    #[error("{node}: invalid parameter '{key}': {message}")]
    InvalidParam {
        node: String,
        key: String,
        message: String,
    },

    #[error("no node with id {0}")]
    UnknownNode(NodeId),

    #[error("{name} is not a data source")]
    NotASource { name: String },

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("algorithm error: {0}")]
    Algorithm(String),

    #[error("{node}: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl PipelineError {
    /// Attach the name of the node that raised this error.
    ///
    /// Errors already carrying node context are returned unchanged so a
    /// failure deep in a cascade names the node where it originated.
    pub fn at_node(self, node: impl Into<String>) -> Self {
        match self {
            err @ PipelineError::NodeFailed { .. } => err,
            err => PipelineError::NodeFailed {
                node: node.into(),
                source: Box::new(err),
            },
        }
    }

    /// Whether this error is detected while building a topology from its
    /// configuration, before any data moves.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.root(),
            PipelineError::UnknownHandler { .. }
                | PipelineError::UnsupportedStrategy { .. }
                | PipelineError::UnknownEdgeTarget { .. }
                | PipelineError::CycleDetected { .. }
                | PipelineError::MissingParam { .. }
                | PipelineError::InvalidParam { .. }
                | PipelineError::NotImplemented(_)
        )
    }

    /// The innermost error, with node context stripped.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::NodeFailed { source, .. } => source.root(),
            err => err,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_node_wraps_once() {
        let err = PipelineError::MissingPayload {
            node: "Out".to_string(),
        }
        .at_node("Out")
        .at_node("A1");

        match &err {
            PipelineError::NodeFailed { node, .. } => assert_eq!(node, "Out"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), PipelineError::MissingPayload { .. }));
    }

    #[test]
    fn test_backend_diagnostic_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "orders.csv not found");
        let err = PipelineError::from(io).at_node("S");
        assert_eq!(err.to_string(), "S: orders.csv not found");
    }

    #[test]
    fn test_unknown_edge_names_both_ends() {
        let err = PipelineError::UnknownEdgeTarget {
            from: "A1".to_string(),
            target: "Nowhere".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("A1"));
        assert!(msg.contains("Nowhere"));
    }
}
