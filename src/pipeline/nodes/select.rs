//! SelectNode: keeps the listed columns, in the listed order.
//!
//! Parameter `columns`: list of column names. A missing column fails the
//! cascade with the polars diagnostic.

use crate::config::AlgorithmConfig;
use crate::pipeline::channel::{Envelope, Payload};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::node::{Algorithm, Observer};

pub struct SelectNode {
    name: String,
    columns: Vec<String>,
}

impl SelectNode {
    pub const NAME: &'static str = "select";

    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn from_config(name: &str, cfg: &AlgorithmConfig) -> PipelineResult<Self> {
        let columns = cfg.params.string_list(name, "columns")?;
        Ok(Self::new(name, columns))
    }
}

impl Observer for SelectNode {
    fn update(&mut self, event: &Envelope) -> PipelineResult<Option<Payload>> {
        let data = super::payload(&self.name, event)?;
        let selected = data.select(self.columns.iter().map(String::as_str))?;
        Ok(Some(selected))
    }
}

impl Algorithm for SelectNode {}
