//! Run orchestration.
//!
//! A `RunContext` checks the run strategy and data mode, builds every
//! independent run's topology, and only then fires sources run by run in
//! declaration order.

use crate::config::PipelineConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::registry::Registry;
use crate::pipeline::topology::Topology;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Where runs execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStrategy {
    Local,
    /// Declared but has no implementation.
    Gcp,
}

impl FromStr for RunStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> PipelineResult<Self> {
        match s {
            "local" => Ok(RunStrategy::Local),
            "gcp" => Ok(RunStrategy::Gcp),
            other => Err(PipelineError::UnsupportedStrategy {
                component: "RunContext",
                strategy: other.to_string(),
                options: "\"local\", \"gcp\"",
            }),
        }
    }
}

/// How sources deliver data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Batch,
    /// Declared but has no implementation.
    Stream,
}

impl FromStr for DataMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> PipelineResult<Self> {
        match s {
            "batch" => Ok(DataMode::Batch),
            "stream" => Ok(DataMode::Stream),
            other => Err(PipelineError::UnsupportedStrategy {
                component: "data_mode",
                strategy: other.to_string(),
                options: "\"batch\", \"stream\"",
            }),
        }
    }
}

/// Counts for one executed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub name: String,
    pub sources: usize,
    pub algorithms: usize,
    pub sinks: usize,
    pub deliveries: u64,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub runs: Vec<RunSummary>,
}

impl RunReport {
    pub fn deliveries(&self) -> u64 {
        self.runs.iter().map(|r| r.deliveries).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} run(s), {} deliveries in {:.3}s (started {})",
            self.runs.len(),
            self.deliveries(),
            self.elapsed.as_secs_f64(),
            self.started_at.to_rfc3339()
        )
    }
}

/// Executes a configuration against a registry.
pub struct RunContext<'a> {
    config: &'a PipelineConfig,
    registry: &'a Registry,
    strategy: RunStrategy,
    mode: DataMode,
}

impl<'a> RunContext<'a> {
    /// Select the strategy and mode. Unimplemented choices fail here, before
    /// any node is constructed.
    pub fn new(config: &'a PipelineConfig, registry: &'a Registry) -> PipelineResult<Self> {
        let strategy: RunStrategy = config.run_strategy.parse()?;
        if strategy == RunStrategy::Gcp {
            return Err(PipelineError::NotImplemented(
                "run_strategy 'gcp'".to_string(),
            ));
        }
        let mode: DataMode = config.data_mode.parse()?;
        if mode == DataMode::Stream {
            return Err(PipelineError::NotImplemented(
                "data_mode 'stream'".to_string(),
            ));
        }
        Ok(Self {
            config,
            registry,
            strategy,
            mode,
        })
    }

    pub fn strategy(&self) -> RunStrategy {
        self.strategy
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// Build every run's topology without executing any of them.
    pub fn build(&self) -> PipelineResult<Vec<Topology>> {
        self.config
            .independent_runs
            .iter()
            .map(|(name, run)| Topology::build(name, run, self.registry))
            .collect()
    }

    /// Build all runs, then execute them in declaration order. The first
    /// failure aborts the remaining runs.
    pub fn execute(&self) -> PipelineResult<RunReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let topologies = self.build()?;
        let mut runs = Vec::with_capacity(topologies.len());
        for mut topology in topologies {
            topology.execute()?;
            let summary = RunSummary {
                name: topology.name().to_string(),
                sources: topology.sources().len(),
                algorithms: topology.algorithm_count(),
                sinks: topology.sink_count(),
                deliveries: topology.deliveries(),
            };
            tracing::info!(
                "run {} finished: {} deliveries",
                summary.name,
                summary.deliveries
            );
            runs.push(summary);
        }

        let report = RunReport {
            started_at,
            elapsed: clock.elapsed(),
            runs,
        };
        tracing::info!("{}", report);
        Ok(report)
    }
}
