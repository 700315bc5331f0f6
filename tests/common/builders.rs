//! Test data builders for pipeline configurations

use datapipes::{AlgorithmConfig, DataNodeConfig, PipelineConfig, RunConfig};
use std::path::Path;

/// Builder for one independent run.
#[derive(Default)]
pub struct RunBuilder {
    run: RunConfig,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A CSV source reading `{dir}/{key}.csv`.
    pub fn csv_source(mut self, name: &str, key: &str, dir: &Path, observers: &[&str]) -> Self {
        let mut cfg = DataNodeConfig::new("csv")
            .with_param("key", key)
            .with_param("path", dir.to_string_lossy().into_owned());
        for o in observers {
            cfg = cfg.with_observer(*o);
        }
        self.run.data_sources.push((name.to_string(), cfg));
        self
    }

    pub fn algorithm(mut self, name: &str, cfg: AlgorithmConfig, observers: &[&str]) -> Self {
        let mut cfg = cfg;
        for o in observers {
            cfg = cfg.with_observer(*o);
        }
        self.run.algorithms.push((name.to_string(), cfg));
        self
    }

    /// A CSV sink writing `{dir}/{key}.csv`.
    pub fn csv_sink(mut self, name: &str, key: &str, dir: &Path) -> Self {
        let cfg = DataNodeConfig::new("csv")
            .with_param("key", key)
            .with_param("path", dir.to_string_lossy().into_owned());
        self.run.data_output.push((name.to_string(), cfg));
        self
    }

    pub fn build(self) -> RunConfig {
        self.run
    }
}

/// Builder for a whole configuration document.
pub struct ConfigBuilder {
    config: PipelineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn data_mode(mut self, mode: &str) -> Self {
        self.config.data_mode = mode.to_string();
        self
    }

    pub fn run_strategy(mut self, strategy: &str) -> Self {
        self.config.run_strategy = strategy.to_string();
        self
    }

    pub fn run(mut self, name: &str, run: RunBuilder) -> Self {
        self.config = self.config.with_run(name, run.build());
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }

    /// Render the configuration as a YAML document.
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.config).expect("serialize config")
    }
}
