//! Publish/subscribe dispatch engine.
//!
//! A run is a graph of nodes: data sources fire, registered algorithms
//! react and forward results, data outputs persist what reaches them.
//!
//! # Architecture
//!
//! ```text
//! [DataContext S] ──► [Algorithm A1] ──► [DataContext Out]
//!                 └─► [Algorithm A2] ──┘
//! ```
//!
//! # Design
//!
//! - **Arena + ids**: a `Topology` owns every `Node`; channels hold `NodeId`s.
//! - **Composed pub/sub**: each `Node` pairs its handler with one
//!   `NotificationChannel`; handlers only implement `Observer::update`.
//! - **Registry value**: algorithms are built by name from a `Registry`
//!   passed in by the caller, not from process-wide state.
//! - **Synchronous cascade**: `Topology::on` returns only after every
//!   reachable node has processed the data, depth first, in attachment order.

pub mod channel;
pub mod error;
pub mod id;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod runner;
pub mod topology;

pub use channel::{Envelope, NotificationChannel, Payload};
pub use error::{PipelineError, PipelineResult};
pub use id::NodeId;
pub use node::{Algorithm, AnyNode, Node, NodeRole, Observer};
pub use registry::{AlgorithmFactory, Registry};
pub use runner::{DataMode, RunContext, RunReport, RunStrategy, RunSummary};
pub use topology::Topology;
