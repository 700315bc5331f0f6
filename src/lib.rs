//! # DataPipes: configuration-driven data pipelines
//!
//! A YAML document declares named data sources, algorithm instances and
//! data outputs, and the observer edges between them. DataPipes builds the
//! nodes, wires their notification channels and fires each source once.
//!
//! ## Architecture
//!
//! - **Config**: typed YAML model, declaration order preserved
//! - **Data**: `DataContext` over pluggable storage backends (CSV, PostgreSQL)
//! - **Pipeline**: registry, notification channels, topology and runner
//! - **Logging**: tracing subscriber in JSON or text format
//!
//! ## Example
//!
//! ```ignore
//! use datapipes::{PipelineConfig, Registry, RunContext};
//!
//! fn main() -> datapipes::Result<()> {
//!     let config = PipelineConfig::load("config.yml")?;
//!     config.validate()?;
//!
//!     let registry = Registry::with_builtins();
//!     let report = RunContext::new(&config, &registry)?.execute()?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use config::{AlgorithmConfig, DataNodeConfig, LogFormat, PipelineConfig, RunConfig};
pub use data::{Batch, DataBackend, DataContext};
pub use error::{DataPipesError, Result, ResultExt};
pub use pipeline::{
    Algorithm, Envelope, Observer, Payload, PipelineError, Registry, RunContext, RunReport,
    Topology,
};
