//! HeadNode: keeps the first `n` rows (default 10).

use crate::config::AlgorithmConfig;
use crate::pipeline::channel::{Envelope, Payload};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::{Algorithm, Observer};

pub const DEFAULT_ROWS: u64 = 10;

pub struct HeadNode {
    name: String,
    rows: usize,
}

impl HeadNode {
    pub const NAME: &'static str = "head";

    pub fn new(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn from_config(name: &str, cfg: &AlgorithmConfig) -> PipelineResult<Self> {
        let rows = cfg.params.u64_or(name, "n", DEFAULT_ROWS)?;
        Ok(Self::new(name, usize::try_from(rows).unwrap_or(usize::MAX)))
    }
}

impl Observer for HeadNode {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        let data = super::payload(&self.name, event)?;
        Ok(Some(data.head(Some(self.rows))))
    }
}

impl Algorithm for HeadNode {}
