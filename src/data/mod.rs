//! Data I/O.
//!
//! A `DataContext` wraps one storage backend, selected by the `format`
//! discriminator of its configuration, behind a uniform load/save contract.
//! As a source it is fired by the topology (`Topology::on`); as a sink it is
//! an `Observer` that persists every payload it receives.
//!
//! Each write fully replaces the destination. When several algorithms feed
//! one sink, the last delivery in attachment order wins.

pub mod csv;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use self::csv::CsvBackend;
pub use memory::MemoryBackend;
#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

use crate::config::DataNodeConfig;
use crate::pipeline::channel::{Envelope, Payload};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node::Observer;

/// Discriminator values understood by `DataContext::new`.
#[cfg(feature = "postgres")]
pub const STRATEGY_OPTIONS: &str = "\"csv\" or \"postgres\"";
#[cfg(not(feature = "postgres"))]
pub const STRATEGY_OPTIONS: &str = "\"csv\" (\"postgres\" requires the `postgres` feature)";

/// The single result of loading a data source.
#[derive(Debug, Clone)]
pub struct Batch {
    pub key: String,
    pub payload: Payload,
}

/// A concrete storage backend.
#[cfg_attr(test, mockall::automock)]
pub trait DataBackend {
    /// Read the whole dataset.
    fn load(&mut self) -> PipelineResult<Batch>;

    /// Replace the stored dataset with `payload`.
    fn save(&mut self, payload: &Payload) -> PipelineResult<()>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// A data source or sink.
pub struct DataContext {
    name: String,
    strategy: String,
    backend: Box<dyn DataBackend>,
    consumed: bool,
}

impl DataContext {
    /// Envelope discriminator for data published by a context.
    pub const KIND: &'static str = "data_context";

    /// Select the backend named by `config.format`.
    pub fn new(name: impl Into<String>, config: &DataNodeConfig) -> PipelineResult<Self> {
        let name = name.into();
        let backend: Box<dyn DataBackend> = match config.format.as_str() {
            "csv" => Box::new(CsvBackend::from_params(&name, &config.params)?),
            #[cfg(feature = "postgres")]
            "postgres" => Box::new(PostgresBackend::from_params(&name, &config.params)?),
            other => {
                return Err(PipelineError::UnsupportedStrategy {
                    component: "DataContext",
                    strategy: other.to_string(),
                    options: STRATEGY_OPTIONS,
                })
            }
        };
        Ok(Self::with_backend(name, config.format.clone(), backend))
    }

    /// Wrap a caller-supplied backend.
    pub fn with_backend(
        name: impl Into<String>,
        strategy: impl Into<String>,
        backend: Box<dyn DataBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy: strategy.into(),
            backend,
            consumed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Pull the one batch this context yields.
    pub fn load(&mut self) -> PipelineResult<Batch> {
        if self.consumed {
            return Err(PipelineError::SourceConsumed {
                name: self.name.clone(),
            });
        }
        tracing::debug!("creating batch from {}", self.backend.describe());
        let batch = self.backend.load()?;
        self.consumed = true;
        Ok(batch)
    }

    pub fn save(&mut self, payload: &Payload) -> PipelineResult<()> {
        tracing::debug!(
            "writing {} rows to {}",
            payload.height(),
            self.backend.describe()
        );
        self.backend.save(payload)
    }
}

impl Observer for DataContext {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        let payload = event.data.as_ref().ok_or_else(|| PipelineError::MissingPayload {
            node: self.name.clone(),
        })?;
        self.save(payload)?;
        Ok(None)
    }
}
