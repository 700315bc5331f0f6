//! Integration tests for topology construction
//!
//! These tests validate building and wiring from configuration:
//! - User-registered algorithms and registry overrides
//! - Edge resolution and cycle rejection
//! - Envelopes seeded at construction

mod common;

use common::builders::RunBuilder;
use common::{orders, read_csv, Workspace};
use datapipes::pipeline::{NodeRole, PipelineResult};
use datapipes::{
    Algorithm, AlgorithmConfig, DataContext, DataNodeConfig, Envelope, Observer, Payload,
    PipelineError, Registry, Topology,
};
use std::cell::RefCell;
use std::rc::Rc;

type Seen = Rc<RefCell<Vec<String>>>;

/// Records `label:rows` for every event and forwards nothing.
struct Recorder {
    label: String,
    seen: Seen,
}

impl Observer for Recorder {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        let rows = event.data.as_ref().map_or(0, |df| df.height());
        self.seen.borrow_mut().push(format!("{}:{}", self.label, rows));
        Ok(None)
    }
}

impl Algorithm for Recorder {}

fn register_recorder(registry: &mut Registry, name: &str, label: &str, seen: &Seen) {
    let label = label.to_string();
    let seen = seen.clone();
    registry.register(name, move |_, _| {
        Ok(Box::new(Recorder {
            label: label.clone(),
            seen: seen.clone(),
        }))
    });
}

#[test]
fn test_user_registered_algorithm_receives_source_data() {
    let ws = Workspace::new();
    ws.seed("orders", &orders());
    let seen = Seen::default();

    let mut registry = Registry::with_builtins();
    register_recorder(&mut registry, "record", "r", &seen);

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["record"])
        .algorithm("record", AlgorithmConfig::new(), &[])
        .build();

    let mut topology = Topology::build("run", &run, &registry).unwrap();
    topology.execute().unwrap();
    assert_eq!(*seen.borrow(), vec!["r:4"]);
}

#[test]
fn test_reregistration_last_wins() {
    let ws = Workspace::new();
    ws.seed("orders", &orders());
    let seen = Seen::default();

    let mut registry = Registry::new();
    register_recorder(&mut registry, "record", "first", &seen);
    register_recorder(&mut registry, "record", "second", &seen);
    assert_eq!(registry.len(), 1);

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["R1", "R2"])
        .algorithm("R1", AlgorithmConfig::new().handler("record"), &[])
        .algorithm("R2", AlgorithmConfig::new().handler("record"), &[])
        .build();

    let mut topology = Topology::build("run", &run, &registry).unwrap();
    topology.execute().unwrap();
    assert_eq!(*seen.borrow(), vec!["second:4", "second:4"]);
}

#[test]
fn test_cycle_in_configuration_rejected() {
    let ws = Workspace::new();
    let registry = Registry::with_builtins();

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["A1"])
        .algorithm("A1", AlgorithmConfig::new().handler("passthrough"), &["A2"])
        .algorithm("A2", AlgorithmConfig::new().handler("passthrough"), &["A1"])
        .build();

    let err = Topology::build("run", &run, &registry).unwrap_err();
    match &err {
        PipelineError::CycleDetected { path } => assert_eq!(path, "A2 -> A1 -> A2"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_config_error());
}

#[test]
fn test_unknown_discriminator_names_node() {
    let ws = Workspace::new();
    let registry = Registry::with_builtins();

    let mut run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["Out"])
        .build();
    run.data_output.push((
        "Out".to_string(),
        DataNodeConfig::new("parquet").with_param("key", "orders"),
    ));

    let err = Topology::build("run", &run, &registry).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Out: "), "{msg}");
    assert!(msg.contains("parquet"));
    assert!(matches!(err.root(), PipelineError::UnsupportedStrategy { .. }));
}

#[test]
fn test_sink_with_observers_rejected() {
    let ws = Workspace::new();
    let registry = Registry::with_builtins();

    let mut run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["A1"])
        .algorithm("A1", AlgorithmConfig::new().handler("passthrough"), &["Out"])
        .build();
    run.data_output.push((
        "Out".to_string(),
        DataNodeConfig::new("csv")
            .with_param("key", "orders")
            .with_param("path", ws.output().to_string_lossy().into_owned())
            .with_observer("A1")
            .with_observer("DoesNotExist"),
    ));

    let err = Topology::build("run", &run, &registry).unwrap_err();
    assert!(matches!(
        &err,
        PipelineError::InvalidParam { node, key, .. } if node == "Out" && key == "observers"
    ));
    assert!(err.is_config_error());
}

#[test]
fn test_missing_backend_param_names_key() {
    let registry = Registry::with_builtins();
    let mut run = RunBuilder::new().build();
    run.data_sources.push((
        "S".to_string(),
        DataNodeConfig::new("csv").with_param("key", "orders"),
    ));

    let err = Topology::build("run", &run, &registry).unwrap_err();
    assert!(matches!(err.root(), PipelineError::MissingParam { key, .. } if key == "path"));
}

#[test]
fn test_envelopes_seeded_at_construction() {
    let ws = Workspace::new();
    let registry = Registry::with_builtins();

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["A1"])
        .algorithm("A1", AlgorithmConfig::new().handler("head").with_param("n", 2), &["Out"])
        .csv_sink("Out", "orders", &ws.output())
        .build();
    let topology = Topology::build("run", &run, &registry).unwrap();

    let s = topology.find(NodeRole::Source, "S").unwrap();
    let source = topology.node(s).unwrap();
    assert_eq!(source.envelope().kind, DataContext::KIND);
    assert_eq!(
        source.envelope().cfg.get("key").and_then(|v| v.as_str()),
        Some("orders")
    );
    assert!(source.envelope().data.is_none());

    let a = topology.find(NodeRole::Algorithm, "A1").unwrap();
    let algorithm = topology.node(a).unwrap();
    assert_eq!(algorithm.envelope().kind, "HeadNode");
    assert_eq!(algorithm.channel().subscribers().len(), 1);
}

#[test]
fn test_algorithm_shadows_sink_of_same_name() {
    let ws = Workspace::new();
    ws.seed("orders", &orders());
    let seen = Seen::default();

    let mut registry = Registry::with_builtins();
    register_recorder(&mut registry, "record", "alg", &seen);

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["X"])
        .algorithm("X", AlgorithmConfig::new().handler("record"), &[])
        .csv_sink("X", "orders", &ws.output())
        .build();

    let mut topology = Topology::build("run", &run, &registry).unwrap();
    topology.execute().unwrap();
    assert_eq!(*seen.borrow(), vec!["alg:4"]);
    assert!(!ws.output_file("orders").exists());
}

#[test]
fn test_detach_after_build() {
    let ws = Workspace::new();
    ws.seed("orders", &orders());
    let registry = Registry::with_builtins();

    let run = RunBuilder::new()
        .csv_source("S", "orders", &ws.input(), &["A1", "A2"])
        .algorithm("A1", AlgorithmConfig::new().handler("passthrough"), &["Out1"])
        .algorithm("A2", AlgorithmConfig::new().handler("passthrough"), &["Out2"])
        .csv_sink("Out1", "one", &ws.output())
        .csv_sink("Out2", "two", &ws.output())
        .build();

    let mut topology = Topology::build("run", &run, &registry).unwrap();
    let s = topology.find(NodeRole::Source, "S").unwrap();
    let a1 = topology.find(NodeRole::Algorithm, "A1").unwrap();
    topology.detach(s, a1).unwrap();
    assert!(matches!(
        topology.detach(s, a1),
        Err(PipelineError::SubscriberNotFound { .. })
    ));

    topology.execute().unwrap();
    assert!(!ws.output_file("one").exists());
    assert_eq!(read_csv(&ws.output_file("two")).height(), 4);
}
