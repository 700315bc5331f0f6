//! PassthroughNode: forwards every payload unchanged.

use crate::config::AlgorithmConfig;
use crate::pipeline::channel::{Envelope, Payload};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::{Algorithm, Observer};

pub struct PassthroughNode {
    name: String,
}

impl PassthroughNode {
    pub const NAME: &'static str = "passthrough";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_config(name: &str, _cfg: &AlgorithmConfig) -> PipelineResult<Self> {
        Ok(Self::new(name))
    }
}

impl Observer for PassthroughNode {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        let data = super::payload(&self.name, event)?;
        Ok(Some(data.clone()))
    }
}

impl Algorithm for PassthroughNode {}
