//! Configuration module for DataPipes
//!
//! A pipeline is described by one YAML document:
//!
//! ```yaml
//! run_strategy: local        # local | gcp (not implemented)
//! data_mode: batch           # batch | stream (not implemented)
//! log_level: debug
//! log_format: text           # json | text
//! independent_runs:
//!   orders_run:
//!     data_sources:
//!       S:
//!         format: csv
//!         key: orders
//!         path: /tmp/in
//!         observers: [A1]
//!     algorithms:
//!       A1:
//!         algorithm: passthrough   # registry name, defaults to the key
//!         observers: [Out]
//!     data_output:
//!       Out:
//!         format: csv
//!         key: orders
//!         path: /tmp/out
//! ```
//!
//! Every named mapping keeps its declaration order, which fixes the order
//! in which runs execute and sources fire.

mod ordered;

use crate::error::{DataPipesError, Result, ResultExt};
use crate::pipeline::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Default log level when the configuration names none
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default run strategy
pub const DEFAULT_RUN_STRATEGY: &str = "local";

/// Default data mode
pub const DEFAULT_DATA_MODE: &str = "batch";

// ==================== Logging ====================

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single-line text
    Text,
}

// ==================== Node Parameters ====================

/// Backend or algorithm parameters not otherwise interpreted by the runner.
///
/// Accessors take the owning node's name so errors identify the offending
/// node and key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Mapping);

impl Params {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(Value::String(key.into()), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A required scalar parameter, rendered as a string.
    pub fn string(&self, node: &str, key: &str) -> PipelineResult<String> {
        self.opt_string(node, key)?
            .ok_or_else(|| PipelineError::MissingParam {
                node: node.to_string(),
                key: key.to_string(),
            })
    }

    /// An optional scalar parameter, rendered as a string.
    pub fn opt_string(&self, node: &str, key: &str) -> PipelineResult<Option<String>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(invalid(node, key, "expected a scalar value")),
        }
    }

    /// An unsigned integer parameter with a default.
    pub fn u64_or(&self, node: &str, key: &str, default: u64) -> PipelineResult<u64> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| invalid(node, key, "expected a non-negative integer")),
        }
    }

    /// A required list of strings.
    pub fn string_list(&self, node: &str, key: &str) -> PipelineResult<Vec<String>> {
        let Some(value) = self.get(key) else {
            return Err(PipelineError::MissingParam {
                node: node.to_string(),
                key: key.to_string(),
            });
        };
        let Some(items) = value.as_sequence() else {
            return Err(invalid(node, key, "expected a list"));
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(node, key, "expected a list of strings"))
            })
            .collect()
    }
}

fn invalid(node: &str, key: &str, message: &str) -> PipelineError {
    PipelineError::InvalidParam {
        node: node.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}

// ==================== Node Configs ====================

/// A data source or data output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataNodeConfig {
    /// Backend discriminator (`csv`, `postgres`)
    pub format: String,

    /// Names of the nodes notified with this node's data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observers: Vec<String>,

    /// Backend parameters
    #[serde(flatten)]
    pub params: Params,
}

impl DataNodeConfig {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            observers: Vec::new(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn with_observer(mut self, name: impl Into<String>) -> Self {
        self.observers.push(name.into());
        self
    }
}

/// An algorithm instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Registered handler name; the configuration key is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Names of the nodes notified with this algorithm's results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observers: Vec<String>,

    /// Handler parameters
    #[serde(flatten)]
    pub params: Params,
}

impl AlgorithmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn with_observer(mut self, name: impl Into<String>) -> Self {
        self.observers.push(name.into());
        self
    }

    /// The registry name this instance is constructed from.
    pub fn handler_name<'a>(&'a self, instance: &'a str) -> &'a str {
        self.algorithm.as_deref().unwrap_or(instance)
    }
}

// ==================== Runs ====================

/// One independent run: sources, algorithms and outputs wired together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default, with = "ordered")]
    pub data_sources: Vec<(String, DataNodeConfig)>,

    #[serde(default, with = "ordered")]
    pub algorithms: Vec<(String, AlgorithmConfig)>,

    #[serde(default, with = "ordered")]
    pub data_output: Vec<(String, DataNodeConfig)>,
}

impl RunConfig {
    fn validate(&self, run: &str) -> Result<()> {
        if self.data_sources.is_empty() {
            return Err(DataPipesError::Config(format!(
                "run '{}' declares no data_sources",
                run
            )));
        }

        let data_nodes = self.data_sources.iter().chain(self.data_output.iter());
        for (name, node) in data_nodes {
            if node.format.trim().is_empty() {
                return Err(DataPipesError::Config(format!(
                    "run '{}': data node '{}' has an empty format",
                    run, name
                )));
            }
        }

        for (name, node) in &self.data_output {
            if !node.observers.is_empty() {
                return Err(DataPipesError::Config(format!(
                    "run '{}': data output '{}' cannot have observers",
                    run, name
                )));
            }
        }

        check_unique(run, "data_sources", self.data_sources.iter().map(|(n, _)| n))?;
        check_unique(run, "algorithms", self.algorithms.iter().map(|(n, _)| n))?;
        check_unique(run, "data_output", self.data_output.iter().map(|(n, _)| n))?;

        let observer_lists = self
            .data_sources
            .iter()
            .map(|(n, c)| (n, &c.observers))
            .chain(self.algorithms.iter().map(|(n, c)| (n, &c.observers)));
        for (name, observers) in observer_lists {
            if observers.iter().any(|o| o.trim().is_empty()) {
                return Err(DataPipesError::Config(format!(
                    "run '{}': node '{}' lists an empty observer name",
                    run, name
                )));
            }
        }

        for (name, _) in &self.algorithms {
            if self.data_output.iter().any(|(out, _)| out == name) {
                tracing::warn!(
                    "run '{}': '{}' is both an algorithm and a data output; edges resolve to the algorithm",
                    run,
                    name
                );
            }
        }

        Ok(())
    }
}

fn check_unique<'a>(run: &str, section: &str, names: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DataPipesError::Config(format!(
                "run '{}': {} declares '{}' more than once",
                run, section, name
            )));
        }
    }
    Ok(())
}

// ==================== Pipeline Config ====================

fn default_run_strategy() -> String {
    DEFAULT_RUN_STRATEGY.to_string()
}

fn default_data_mode() -> String {
    DEFAULT_DATA_MODE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// The whole configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Execution strategy (`local`, `gcp`)
    #[serde(default = "default_run_strategy")]
    pub run_strategy: String,

    /// Data mode (`batch`, `stream`)
    #[serde(default = "default_data_mode")]
    pub data_mode: String,

    /// Runs executed one after another, in declaration order
    #[serde(default, with = "ordered")]
    pub independent_runs: Vec<(String, RunConfig)>,

    /// Log level handed to the logging setup
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_strategy: default_run_strategy(),
            data_mode: default_data_mode(),
            independent_runs: Vec::new(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration document
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataPipesError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Check the configuration is well-formed before anything is built
    pub fn validate(&self) -> Result<()> {
        if self.independent_runs.is_empty() {
            return Err(DataPipesError::Config(
                "no independent_runs configured".to_string(),
            ));
        }
        check_unique("<root>", "independent_runs", self.independent_runs.iter().map(|(n, _)| n))?;
        for (name, run) in &self.independent_runs {
            run.validate(name)?;
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// Add a run, keeping declaration order
    pub fn with_run(mut self, name: impl Into<String>, run: RunConfig) -> Self {
        self.independent_runs.push((name.into(), run));
        self
    }
}
